use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{GraphError, GraphResult};

/// Source of fresh row identifiers
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Source element id to target element id for one clone.
///
/// Total over the ids it was built from and injective. Lives only as long as
/// the clone that built it.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    entries: IndexMap<String, String>,
}

impl IdentityMap {
    pub fn get(&self, source_id: &str) -> Option<&str> {
        self.entries.get(source_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Map every id through the table. Returns the mapped ids in input order
    /// and, separately, the ids that had no entry.
    pub fn rewrite(&self, ids: &[String]) -> (Vec<String>, Vec<String>) {
        let mut mapped = Vec::with_capacity(ids.len());
        let mut unmapped = Vec::new();
        for id in ids {
            match self.entries.get(id) {
                Some(target) => mapped.push(target.clone()),
                None => unmapped.push(id.clone()),
            }
        }
        (mapped, unmapped)
    }
}

/// Allocates target identifiers for a clone
#[derive(Clone)]
pub struct IdentityRemapper {
    generator: Arc<dyn IdGenerator>,
    max_attempts: usize,
}

impl IdentityRemapper {
    pub fn new(generator: Arc<dyn IdGenerator>, max_attempts: usize) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// A single fresh id that is not in `reserved`
    pub fn allocate(&self, reserved: &HashSet<String>) -> GraphResult<String> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generator.generate();
            if !candidate.is_empty() && !reserved.contains(&candidate) {
                return Ok(candidate);
            }
            debug!("Id allocation attempt {} collided", attempt);
        }
        Err(GraphError::IdAllocation {
            attempts: self.max_attempts,
        })
    }

    /// Build the identity map for the complete element id set of a source model.
    ///
    /// New ids never repeat each other and never equal any id in `reserved`
    /// or in `source_ids`. Either the whole map is returned or nothing is.
    pub fn build(
        &self,
        source_ids: &[String],
        reserved: &HashSet<String>,
    ) -> GraphResult<IdentityMap> {
        let mut taken: HashSet<String> = reserved.clone();
        taken.extend(source_ids.iter().cloned());

        let mut entries = IndexMap::with_capacity(source_ids.len());
        for source_id in source_ids {
            if entries.contains_key(source_id) {
                return Err(GraphError::InvalidReference(format!(
                    "element id {} appears twice in the source model",
                    source_id
                )));
            }
            let target_id = self.allocate(&taken).map_err(|err| {
                warn!(
                    "Aborting identity map after {} of {} elements: {}",
                    entries.len(),
                    source_ids.len(),
                    err
                );
                err
            })?;
            taken.insert(target_id.clone());
            entries.insert(source_id.clone(), target_id);
        }

        Ok(IdentityMap { entries })
    }
}

impl Default for IdentityRemapper {
    fn default() -> Self {
        Self::new(Arc::new(UuidGenerator), 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays a fixed script of ids, then repeats the last one
    struct ScriptedGenerator {
        script: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(ids: &[&str]) -> Self {
            let mut script: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            script.reverse();
            Self {
                script: Mutex::new(script),
            }
        }
    }

    impl IdGenerator for ScriptedGenerator {
        fn generate(&self) -> String {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop().unwrap()
            } else {
                script.last().cloned().unwrap_or_default()
            }
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_build_is_total_and_injective() {
        let remapper = IdentityRemapper::default();
        let source = ids(&["a", "b", "c"]);
        let map = remapper.build(&source, &HashSet::new()).unwrap();

        assert_eq!(map.len(), 3);
        let targets: HashSet<_> = map.iter().map(|(_, t)| t.to_string()).collect();
        assert_eq!(targets.len(), 3);
        for id in &source {
            let target = map.get(id).unwrap();
            assert_ne!(target, id);
        }
    }

    #[test]
    fn test_collisions_are_retried() {
        let generator = ScriptedGenerator::new(&["a", "x1", "x1", "x2"]);
        let remapper = IdentityRemapper::new(Arc::new(generator), 4);
        let map = remapper.build(&ids(&["a", "b"]), &HashSet::new()).unwrap();

        assert_eq!(map.get("a"), Some("x1"));
        assert_eq!(map.get("b"), Some("x2"));
    }

    #[test]
    fn test_exhausted_generator_exposes_no_partial_map() {
        let generator = ScriptedGenerator::new(&["n1", "n1"]);
        let remapper = IdentityRemapper::new(Arc::new(generator), 3);
        let err = remapper
            .build(&ids(&["a", "b"]), &HashSet::new())
            .unwrap_err();

        assert!(matches!(err, GraphError::IdAllocation { attempts: 3 }));
    }

    #[test]
    fn test_duplicate_source_ids_are_rejected() {
        let remapper = IdentityRemapper::default();
        let err = remapper
            .build(&ids(&["a", "a"]), &HashSet::new())
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidReference(_)));
    }

    #[test]
    fn test_rewrite_splits_mapped_and_unmapped() {
        let generator = ScriptedGenerator::new(&["x1", "x2"]);
        let remapper = IdentityRemapper::new(Arc::new(generator), 2);
        let map = remapper.build(&ids(&["a", "b"]), &HashSet::new()).unwrap();

        let (mapped, unmapped) = map.rewrite(&ids(&["b", "zz", "a"]));
        assert_eq!(mapped, ids(&["x2", "x1"]));
        assert_eq!(unmapped, ids(&["zz"]));
    }
}
