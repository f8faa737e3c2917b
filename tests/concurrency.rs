mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::memory_state;
use linkcore::error::AppError;
use linkcore::state::AppState;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_alias_has_one_winner() {
    let state = memory_state();

    let a = {
        let state = state.clone();
        tokio::spawn(async move {
            state
                .allocation_service
                .create("https://example.com/a", Some("test"), None)
                .await
        })
    };
    let b = {
        let state = state.clone();
        tokio::spawn(async move {
            state
                .allocation_service
                .create("https://example.com/b", Some("test"), None)
                .await
        })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::DuplicateAlias { .. })))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(duplicates, 1);

    let winner_url = results
        .iter()
        .find_map(|r| r.as_ref().ok())
        .map(|l| l.original_url.clone())
        .unwrap();
    assert_eq!(
        state.resolution_service.resolve("test").await.unwrap(),
        winner_url
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_many_tasks_racing_for_one_alias() {
    let state = memory_state();
    let mut tasks = JoinSet::new();

    for i in 0..64 {
        let state = state.clone();
        tasks.spawn(async move {
            state
                .allocation_service
                .create(&format!("https://example.com/{i}"), Some("hot-alias"), None)
                .await
        });
    }

    let mut ok = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert!(matches!(e, AppError::DuplicateAlias { .. })),
        }
    }

    assert_eq!(ok, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_generated_codes_unique_under_load() {
    let state = memory_state();
    let mut tasks = JoinSet::new();

    for i in 0..500 {
        let state = state.clone();
        tasks.spawn(async move {
            state
                .allocation_service
                .create(&format!("https://example.com/{i}"), None, None)
                .await
                .unwrap()
        });
    }

    let mut codes = HashSet::new();
    let mut ids = HashSet::new();
    while let Some(result) = tasks.join_next().await {
        let link = result.unwrap();
        assert!(codes.insert(link.short_code));
        assert!(ids.insert(link.id));
    }

    assert_eq!(codes.len(), 500);
}

/// Renames every link back and forth across a shared pool of target codes while new
/// links are being created, then checks that each live code maps to exactly one link.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_uniqueness_under_concurrent_create_and_rename() {
    let state = memory_state();

    let mut ids = Vec::new();
    for i in 0..16 {
        let link = state
            .allocation_service
            .create(&format!("https://example.com/seed/{i}"), None, None)
            .await
            .unwrap();
        ids.push(link.id);
    }
    let ids = Arc::new(ids);

    let mut tasks = JoinSet::new();
    for worker in 0..8 {
        let state = state.clone();
        let ids = ids.clone();
        tasks.spawn(async move {
            for round in 0..50 {
                let id = ids[(worker * 7 + round) % ids.len()];
                let target = format!("slot-{}", (worker + round) % 10);
                match state.lifecycle_service.rename(id, &target, None).await {
                    Ok(link) => assert_eq!(link.short_code, target),
                    Err(AppError::DuplicateAlias { .. }) => {}
                    Err(e) => panic!("unexpected rename error: {e:?}"),
                }

                if round % 5 == 0 {
                    let alias = format!("slot-{}", (worker * 3 + round) % 10);
                    let _ = state
                        .allocation_service
                        .create("https://example.com/new", Some(&alias), None)
                        .await;
                }
            }
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    assert_consistent(&state, &ids).await;
}

async fn assert_consistent(state: &AppState, ids: &[i64]) {
    let mut seen = HashSet::new();

    for id in ids {
        let link = state
            .link_repository
            .get_by_id(*id)
            .await
            .unwrap()
            .expect("seed link still live");

        assert!(seen.insert(link.short_code.clone()), "code shared by two links");

        let by_code = state
            .link_repository
            .get(&link.short_code)
            .await
            .unwrap()
            .expect("code indexed");
        assert_eq!(by_code.id, link.id);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_delete_has_one_success() {
    let state = memory_state();
    let link = state
        .allocation_service
        .create("https://example.com", Some("delete-me"), None)
        .await
        .unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let state = state.clone();
        tasks.spawn(async move { state.lifecycle_service.delete(link.id, None).await });
    }

    let mut ok = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(()) => ok += 1,
            Err(e) => assert!(matches!(e, AppError::NotFound { .. })),
        }
    }

    assert_eq!(ok, 1);
}
