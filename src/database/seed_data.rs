use sea_orm::*;
use tracing::{error, info};

use crate::database::begin_write;
use crate::database::entities::{domains, element_types, relationship_types};
use crate::errors::GraphResult;

/// Domain id, domain name, element types as (id, name, description)
const DOMAINS: &[(&str, &str, &[(&str, &str, &str)])] = &[
    (
        "strategy",
        "Strategy",
        &[
            ("capability", "Capability", "An ability that an active structure element possesses"),
            ("value-stream", "Value Stream", "A sequence of activities that create an overall result"),
        ],
    ),
    (
        "business",
        "Business",
        &[
            ("business-actor", "Business Actor", "An organizational entity capable of performing behavior"),
            ("business-process", "Business Process", "Behavior grouped by an ordering of activities"),
        ],
    ),
    (
        "application",
        "Application",
        &[
            ("application-component", "Application Component", "An encapsulation of application functionality"),
            ("application-service", "Application Service", "Explicitly defined exposed application behavior"),
        ],
    ),
    (
        "data",
        "Data",
        &[("data-object", "Data Object", "Data structured for automated processing")],
    ),
    (
        "technology",
        "Technology",
        &[
            ("node", "Node", "A computational or physical resource that hosts artifacts"),
            ("system-software", "System Software", "Software that provides an environment for other software"),
        ],
    ),
];

/// Relationship type id, name, directional
const RELATIONSHIP_TYPES: &[(&str, &str, bool)] = &[
    ("composition", "Composition", true),
    ("aggregation", "Aggregation", true),
    ("assignment", "Assignment", true),
    ("realization", "Realization", true),
    ("serving", "Serving", true),
    ("access", "Access", true),
    ("influence", "Influence", true),
    ("association", "Association", false),
    ("flow", "Flow", true),
    ("triggering", "Triggering", true),
    ("specialization", "Specialization", true),
];

/// Insert the default ArchiMate-style metamodel. Safe to call repeatedly.
///
/// All rows go in one transaction, so a failed seed leaves no domains behind
/// and the next call starts over.
pub async fn seed_metamodel<C>(conn: &C) -> GraphResult<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = begin_write(conn).await?;

    match insert_metamodel(&txn).await {
        Ok(type_count) => {
            txn.commit().await?;
            if type_count > 0 {
                info!(
                    "Seeded {} domains, {} element types, {} relationship types",
                    DOMAINS.len(),
                    type_count,
                    RELATIONSHIP_TYPES.len()
                );
            }
            Ok(())
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!("Rollback after failed seed also failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}

/// Returns the number of element types written, zero when already seeded
async fn insert_metamodel<C>(db: &C) -> GraphResult<usize>
where
    C: ConnectionTrait,
{
    let existing = domains::Entity::find().count(db).await?;
    if existing > 0 {
        info!("Metamodel already present, skipping seed");
        return Ok(0);
    }

    info!("Seeding default metamodel");

    let mut type_count = 0;
    for (domain_id, domain_name, types) in DOMAINS {
        domains::ActiveModel {
            id: Set(domain_id.to_string()),
            name: Set(domain_name.to_string()),
            description: Set(Some(format!("{} architecture domain", domain_name))),
        }
        .insert(db)
        .await?;

        for (type_id, type_name, description) in types.iter() {
            element_types::ActiveModel {
                id: Set(type_id.to_string()),
                domain_id: Set(domain_id.to_string()),
                name: Set(type_name.to_string()),
                description: Set(Some(description.to_string())),
            }
            .insert(db)
            .await?;
            type_count += 1;
        }
    }

    for (id, name, directional) in RELATIONSHIP_TYPES {
        relationship_types::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            description: Set(None),
            directional: Set(*directional),
        }
        .insert(db)
        .await?;
    }

    Ok(type_count)
}
