//! Clones and deletes running at the same time against one file-backed store

mod common;

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use eagraph::database::entities::{elements, models};
use eagraph::database::store;
use sea_orm::{EntityTrait, PaginatorTrait};

use common::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_clones_of_one_source_all_succeed() -> Result<()> {
    let (ctx, _temp_file) = setup_context().await?;
    let sample = sample_model(&ctx).await?;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ctx = ctx.clone();
            let source = sample.model_id.clone();
            tokio::spawn(async move { ctx.clone_model(&source, &format!("copy-{}", i)).await })
        })
        .collect();

    let mut copies = HashSet::new();
    for handle in handles {
        let outcome = handle.await??;
        assert!(outcome.warnings.is_empty());
        assert_eq!(
            (outcome.element_count, outcome.relationship_count, outcome.view_count),
            (2, 1, 1)
        );
        copies.insert(outcome.model_id().to_string());
    }
    assert_eq!(copies.len(), 8);

    for model_id in &copies {
        let graph = ctx.graph_service().load_graph(model_id).await?;
        assert_eq!(graph.model.versioned_from.as_deref(), Some(sample.model_id.as_str()));
        assert_eq!(graph.elements.len(), 2);
        assert_graph_consistent(&ctx, model_id).await?;
    }
    assert_eq!(models::Entity::find().count(ctx.db()).await?, 9);
    assert_eq!(elements::Entity::find().count(ctx.db()).await?, 18);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_clone_racing_cascade_delete_of_its_source() -> Result<()> {
    let (ctx, _temp_file) = setup_context().await?;

    for round in 0..5 {
        let sample = sample_model(&ctx).await?;

        let cloning = {
            let ctx = ctx.clone();
            let source = sample.model_id.clone();
            tokio::spawn(async move { ctx.clone_model(&source, &format!("race-{}", round)).await })
        };
        let deleting = {
            let ctx = ctx.clone();
            let source = sample.model_id.clone();
            tokio::spawn(async move { ctx.delete_model(&source, true).await })
        };

        let report = deleting.await??;
        assert_eq!(report.models_removed, 1);

        match cloning.await? {
            Ok(outcome) => {
                let graph = ctx.graph_service().load_graph(outcome.model_id()).await?;
                assert_eq!(graph.elements.len(), 2);
                assert_eq!(graph.relationships.len(), 1);
                assert_eq!(graph.views.len(), 1);
                assert_graph_consistent(&ctx, outcome.model_id()).await?;
            }
            Err(err) => assert!(err.is_not_found(), "unexpected clone error: {}", err),
        }

        assert!(ctx.graph_service().get_model(&sample.model_id).await.is_err());
        assert_no_orphan_rows(ctx.db()).await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_deadline_during_large_clone_rolls_back() -> Result<()> {
    let (ctx, _temp_file) = setup_context().await?;
    let source = bulk_model(ctx.db(), 1000).await?;

    let hurried = ctx.clone().with_timeout(Duration::from_millis(20));
    let err = hurried.clone_model(&source, "hurried").await.unwrap_err();
    assert!(err.is_timeout());

    assert_eq!(models::Entity::find().count(ctx.db()).await?, 1);
    assert_eq!(elements::Entity::find().count(ctx.db()).await?, 1000);
    assert!(ctx.descendants(&source).await?.is_empty());

    // the store is usable again once the abandoned transaction is gone
    let outcome = ctx
        .clone()
        .with_timeout(Duration::from_secs(60))
        .clone_model(&source, "patient")
        .await?;
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.element_count, 1000);
    assert_eq!(outcome.relationship_count, 999);
    assert_eq!(store::count_elements(ctx.db(), outcome.model_id()).await?, 1000);
    assert_graph_consistent(&ctx, outcome.model_id()).await?;
    Ok(())
}
