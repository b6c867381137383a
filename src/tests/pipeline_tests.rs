//! Sentiment-to-stake pipeline and the worker pool

use std::sync::Arc;

use super::{pipeline, test_pool, FakePosts, FakeScorer, FakeWallet, PanickingScorer, HOTKEY};
use crate::db::{operation, sentiment};
use crate::models::OperationType;
use crate::tasks::{JobError, PipelineOutcome, WorkerPool};

#[tokio::test]
async fn test_no_posts_short_circuits() {
    let pool = test_pool().await;
    let wallet = FakeWallet::accepting();
    let pipeline = pipeline(&pool, FakePosts::with(0), Arc::new(FakeScorer(Ok(50))), wallet.clone());

    let outcome = pipeline.run(18, HOTKEY).await;

    assert_eq!(
        outcome,
        PipelineOutcome::NoData { netuid: 18, search_term: "Bittensor netuid 18".to_string() }
    );
    assert!(wallet.calls.lock().await.is_empty());
    assert!(sentiment::get_records(&pool, 18).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_neutral_score_records_no_operation() {
    let pool = test_pool().await;
    let wallet = FakeWallet::accepting();
    let pipeline = pipeline(&pool, FakePosts::with(4), Arc::new(FakeScorer(Ok(0))), wallet.clone());

    let outcome = pipeline.run(18, HOTKEY).await;

    assert_eq!(outcome, PipelineOutcome::Neutral { netuid: 18, sentiment_score: 0 });
    assert!(wallet.calls.lock().await.is_empty());
    assert!(operation::get_operations(&pool, None, None).await.unwrap().is_empty());

    let records = sentiment::get_records(&pool, 18).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sentiment_score, 0);
    assert_eq!(records[0].tweet_count, 4);
}

#[tokio::test]
async fn test_positive_score_stakes() {
    let pool = test_pool().await;
    let wallet = FakeWallet::accepting();
    let pipeline = pipeline(&pool, FakePosts::with(3), Arc::new(FakeScorer(Ok(40))), wallet.clone());

    let PipelineOutcome::Executed { operation } = pipeline.run(18, HOTKEY).await else {
        panic!("expected an executed operation");
    };

    assert_eq!(operation.operation_type, OperationType::Stake);
    assert!((operation.amount - 0.4).abs() < 1e-9);
    assert!(operation.successful);
    assert_eq!(operation.transaction_hash.as_deref(), Some("0xabc"));

    let calls = wallet.calls.lock().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, OperationType::Stake);
    assert_eq!(calls[0].2, HOTKEY);

    let stored = operation::get_operations(&pool, Some(18), Some(HOTKEY)).await.unwrap();
    assert_eq!(stored, vec![operation.clone()]);
}

#[tokio::test]
async fn test_negative_score_unstakes() {
    let pool = test_pool().await;
    let wallet = FakeWallet::accepting();
    let pipeline = pipeline(&pool, FakePosts::with(3), Arc::new(FakeScorer(Ok(-70))), wallet.clone());

    let PipelineOutcome::Executed { operation } = pipeline.run(5, HOTKEY).await else {
        panic!("expected an executed operation");
    };

    assert_eq!(operation.operation_type, OperationType::Unstake);
    assert!((operation.amount - 0.7).abs() < 1e-9);
    assert_eq!(operation.sentiment_score, -70);
}

#[tokio::test]
async fn test_wallet_failure_is_recorded() {
    let pool = test_pool().await;
    let pipeline = pipeline(
        &pool,
        FakePosts::with(2),
        Arc::new(FakeScorer(Ok(10))),
        FakeWallet::rejecting("insufficient balance"),
    );

    let PipelineOutcome::Executed { operation } = pipeline.run(18, HOTKEY).await else {
        panic!("expected an executed operation");
    };

    assert!(!operation.successful);
    assert!(operation.transaction_hash.is_none());
    assert!(operation.error_message.unwrap().contains("insufficient balance"));
    assert_eq!(operation::get_operations(&pool, Some(18), None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_scorer_failure_becomes_failed_outcome() {
    let pool = test_pool().await;
    let wallet = FakeWallet::accepting();
    let pipeline = pipeline(&pool, FakePosts::with(2), Arc::new(FakeScorer(Err("down"))), wallet.clone());

    let outcome = pipeline.run(18, HOTKEY).await;

    assert!(matches!(outcome, PipelineOutcome::Failed { ref error } if error.contains("503")));
    assert!(wallet.calls.lock().await.is_empty());
    assert!(sentiment::get_records(&pool, 18).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_operations_filtering() {
    let pool = test_pool().await;
    let wallet = FakeWallet::accepting();
    let pipeline = pipeline(&pool, FakePosts::with(1), Arc::new(FakeScorer(Ok(20))), wallet);

    pipeline.run(1, HOTKEY).await;
    pipeline.run(2, HOTKEY).await;
    pipeline.run(2, "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY").await;

    assert_eq!(operation::get_operations(&pool, None, None).await.unwrap().len(), 3);
    assert_eq!(operation::get_operations(&pool, Some(2), None).await.unwrap().len(), 2);
    assert_eq!(operation::get_operations(&pool, None, Some(HOTKEY)).await.unwrap().len(), 2);
    assert_eq!(operation::get_operations(&pool, Some(2), Some(HOTKEY)).await.unwrap().len(), 1);

    let newest_first = operation::get_operations(&pool, None, None).await.unwrap();
    assert!(newest_first.windows(2).all(|w| w[0].id > w[1].id));
}

#[tokio::test]
async fn test_job_handle_resolves_with_outcome() {
    let pool = test_pool().await;
    let workers = WorkerPool::new(
        pipeline(&pool, FakePosts::with(2), Arc::new(FakeScorer(Ok(30))), FakeWallet::accepting()),
        2,
        10,
    );

    let handle = workers.queue().submit(18, HOTKEY).await.unwrap();
    assert_eq!(handle.job().netuid, 18);

    let outcome = handle.outcome().await.expect("worker replied");
    assert!(matches!(outcome, PipelineOutcome::Executed { ref operation } if operation.successful));

    // Finished jobs no longer block resubmission
    let again = workers.queue().submit(18, HOTKEY).await.unwrap();
    assert!(again.outcome().await.is_some());

    workers.shutdown().await;
}

#[tokio::test]
async fn test_duplicate_job_rejected_while_in_flight() {
    let pool = test_pool().await;
    let workers = WorkerPool::new(
        pipeline(&pool, FakePosts::with(2), Arc::new(FakeScorer(Ok(30))), FakeWallet::accepting()),
        1,
        10,
    );
    let queue = workers.queue();

    let first = queue.submit(18, HOTKEY).await.unwrap();
    let duplicate = queue.submit(18, HOTKEY).await;
    assert_eq!(duplicate.unwrap_err(), JobError::AlreadyQueued(18, HOTKEY.to_string()));

    // A different subnet is a different job
    let other = queue.submit(19, HOTKEY).await.unwrap();

    assert!(first.outcome().await.is_some());
    assert!(other.outcome().await.is_some());

    workers.shutdown().await;
}

#[tokio::test]
async fn test_submit_after_shutdown_fails() {
    let pool = test_pool().await;
    let workers = WorkerPool::new(
        pipeline(&pool, FakePosts::with(1), Arc::new(FakeScorer(Ok(1))), FakeWallet::accepting()),
        1,
        10,
    );
    let queue = workers.queue();
    workers.shutdown().await;

    assert_eq!(queue.submit(18, HOTKEY).await.unwrap_err(), JobError::Closed);
}

#[tokio::test]
async fn test_panicking_job_fails_and_frees_its_slot() {
    let pool = test_pool().await;
    let workers = WorkerPool::new(
        pipeline(&pool, FakePosts::with(2), Arc::new(PanickingScorer), FakeWallet::accepting()),
        1,
        10,
    );
    let queue = workers.queue();

    let outcome = queue.submit(18, HOTKEY).await.unwrap().outcome().await;
    assert!(matches!(outcome, Some(PipelineOutcome::Failed { .. })));

    // Same key can be queued again and the single worker is still serving
    let again = queue.submit(18, HOTKEY).await.unwrap();
    assert!(matches!(again.outcome().await, Some(PipelineOutcome::Failed { .. })));

    workers.shutdown().await;
}
