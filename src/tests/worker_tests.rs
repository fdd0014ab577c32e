//! Worker pool scenarios

use std::collections::HashSet;

use serde_json::json;

use crate::categories::BlockCategory;
use crate::config::WorkerConfig;
use crate::core::Block;
use crate::runtime::protocol::{CheckPayload, Envelope, Request, ResponseData, ResponseKind};
use crate::runtime::{CompatibilityService, CompatibilityWorker, MessageHandler, WorkerError};

fn spawn(workers: usize) -> CompatibilityWorker {
    CompatibilityWorker::spawn(
        MessageHandler::default(),
        WorkerConfig::default()
            .with_worker_count(workers)
            .with_max_queue_size(8),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_correlated_by_id() {
    let worker = spawn(4);
    let mut handles = Vec::new();

    // Alternate between a valid and an over-cap event placement
    for i in 0..64 {
        let worker = worker.clone();
        handles.push(tokio::spawn(async move {
            let existing = if i % 2 == 0 {
                vec![]
            } else {
                vec![Block::with_type("message")]
            };
            let request = Request::check(
                format!("req-{}", i),
                CheckPayload {
                    block: Block::with_category(BlockCategory::Event),
                    context: Some("logic".into()),
                    existing_blocks: existing,
                },
            );
            (i, worker.request(request).await.unwrap())
        }));
    }

    let mut seen = HashSet::new();
    for handle in handles {
        let (i, response) = handle.await.unwrap();
        assert_eq!(response.id, format!("req-{}", i));
        match response.data {
            ResponseData::Verdict(verdict) => assert_eq!(verdict.is_valid, i % 2 == 0),
            other => panic!("expected verdict, got {:?}", other),
        }
        seen.insert(i);
    }
    assert_eq!(seen.len(), 64);
}

#[tokio::test]
async fn test_raw_envelope_with_unknown_type() {
    let worker = spawn(2);
    let envelope: Envelope =
        serde_json::from_value(json!({ "id": "u-1", "type": "SHUTDOWN", "data": null })).unwrap();

    let response = worker.request_envelope(envelope).await.unwrap();
    assert_eq!(response.id, "u-1");
    assert_eq!(response.kind, ResponseKind::Error);
}

#[tokio::test]
async fn test_raw_envelope_check() {
    let worker = spawn(1);
    let envelope: Envelope = serde_json::from_value(json!({
        "id": "r-1",
        "type": "CHECK_COMPATIBILITY",
        "data": { "block": { "blockType": "bubble" }, "context": "flex" }
    }))
    .unwrap();

    let response = worker.request_envelope(envelope).await.unwrap();
    assert_eq!(response.kind, ResponseKind::CompatibilityResult);
}

async fn place_event(service: &dyn CompatibilityService, existing: Vec<Block>) -> bool {
    service
        .check(Block::with_category(BlockCategory::Event), "logic", existing)
        .await
        .unwrap()
        .is_valid
}

#[tokio::test]
async fn test_service_trait_object() {
    let worker = spawn(2);
    assert!(place_event(&worker, vec![]).await);
    assert!(!place_event(&worker, vec![Block::with_type("join")]).await);
}

#[tokio::test]
async fn test_service_batch_matches_engine() {
    let worker = spawn(2);
    let blocks = vec![
        Block::with_category(BlockCategory::Reply),
        Block::with_type("carousel"),
        Block::with_type("spacer"),
    ];

    let verdicts = worker.check_batch(blocks.clone(), "flex", vec![]).await.unwrap();
    let expected = MessageHandler::default()
        .engine()
        .check_batch(&blocks, "flex", &[]);
    assert_eq!(verdicts, expected);
}

#[tokio::test]
async fn test_invalid_context_is_a_verdict_not_an_error() {
    let worker = spawn(1);
    let verdict = worker
        .check(Block::with_type("text"), "sidebar", vec![])
        .await
        .unwrap();
    assert!(!verdict.is_valid);
}

#[test]
fn test_worker_error_messages() {
    assert_eq!(WorkerError::Closed.to_string(), "Worker pool closed");
    assert_eq!(
        WorkerError::Remote("boom".into()).to_string(),
        "Worker reported an error: boom"
    );
}
