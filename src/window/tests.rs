//! Window Module Tests
//!
//! Validates the sliding window and the published ranking.
//!
//! ## Test Scopes
//! - **Ranking**: grouping, ordering, averages and the top-ten bound.
//! - **Eviction**: window membership at and after the ten minute boundary.
//! - **Snapshot**: publish/clear semantics, including the empty-window case.
//! - **Lifecycle**: idempotent start/stop of the recompute loop, including
//!   racing starts.
//! - **HTTP**: the ranking endpoint stamped with the aggregator's clock.
//! - **Concurrency**: many writers against a recomputing reader.

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;
    use crate::window::aggregator::{WindowAggregator, RECOMPUTE_INTERVAL, TOP_K, WINDOW_DURATION_MS};
    use crate::window::handlers::handle_current_ranking;
    use crate::window::types::RatingInput;
    use axum::{Extension, Json};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    // 2026-01-01T00:00:00Z
    const BASE_MS: u64 = 1_767_225_600_000;

    fn setup() -> (Arc<ManualClock>, Arc<WindowAggregator>) {
        let clock = ManualClock::new(BASE_MS);
        let aggregator = WindowAggregator::new(clock.clone());
        (clock, aggregator)
    }

    // ============================================================
    // RANKING TESTS
    // ============================================================

    #[test]
    fn test_ranking_orders_items_by_rating_count() {
        // ARRANGE: 3 ratings for item 42 and 1 for item 7 within the last minute
        let (_clock, aggregator) = setup();
        aggregator.ingest(1, 42, 4.0, Some(BASE_MS - 50_000));
        aggregator.ingest(2, 7, 3.0, Some(BASE_MS - 40_000));
        aggregator.ingest(3, 42, 5.0, Some(BASE_MS - 30_000));
        aggregator.ingest(4, 42, 3.0, Some(BASE_MS - 10_000));

        // ACT
        aggregator.recompute();

        // ASSERT
        let ranking = aggregator.current_ranking();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].item_id, 42);
        assert_eq!(ranking[0].rating_count, 3);
        assert_eq!(ranking[1].item_id, 7);
        assert_eq!(ranking[1].rating_count, 1);
    }

    #[test]
    fn test_ranking_averages_ratings_per_item() {
        let (_clock, aggregator) = setup();
        aggregator.ingest(1, 5, 4.0, None);
        aggregator.ingest(2, 5, 5.0, None);
        aggregator.ingest(3, 5, 3.0, None);
        aggregator.ingest(4, 9, 2.5, None);

        aggregator.recompute();

        let ranking = aggregator.current_ranking();
        assert!((ranking[0].avg_rating - 4.0).abs() < 1e-9);
        assert!((ranking[1].avg_rating - 2.5).abs() < 1e-9);
        assert!(ranking.iter().all(|item| item.computed_at_ms == BASE_MS));
    }

    #[test]
    fn test_ranking_is_bounded_to_top_ten() {
        // ARRANGE: item i receives i ratings, for 15 items
        let (_clock, aggregator) = setup();
        for item_id in 1..=15u64 {
            for user_id in 0..item_id {
                aggregator.ingest(user_id, item_id, 3.0, None);
            }
        }

        // ACT
        let published = aggregator.recompute().expect("window is not empty");

        // ASSERT
        assert_eq!(published.len(), TOP_K);
        for pair in published.windows(2) {
            assert!(pair[0].rating_count >= pair[1].rating_count);
        }
        assert_eq!(published[0].item_id, 15);
        assert_eq!(published[0].rating_count, 15);
        assert_eq!(published[TOP_K - 1].item_id, 6);
    }

    #[test]
    fn test_current_ranking_is_empty_before_first_recompute() {
        let (_clock, aggregator) = setup();
        aggregator.ingest(1, 1, 4.0, None);

        assert!(aggregator.current_ranking().is_empty());
        assert_eq!(aggregator.publication_count(), 0);
    }

    #[test]
    fn test_held_snapshot_is_not_modified_by_later_recompute() {
        let (_clock, aggregator) = setup();
        aggregator.ingest(1, 1, 4.0, None);
        aggregator.recompute();

        let before = aggregator.current_ranking();

        aggregator.ingest(2, 2, 4.0, None);
        aggregator.ingest(3, 2, 4.0, None);
        aggregator.recompute();

        assert_eq!(before.len(), 1, "A reader's snapshot never changes");
        assert_eq!(aggregator.current_ranking().len(), 2);
        assert_eq!(aggregator.current_ranking()[0].item_id, 2);
    }

    // ============================================================
    // EVICTION TESTS
    // ============================================================

    #[test]
    fn test_event_is_evicted_after_window() {
        let (clock, aggregator) = setup();
        aggregator.ingest(1, 1, 4.0, None);

        clock.advance(WINDOW_DURATION_MS + 1);
        aggregator.recompute();

        assert_eq!(aggregator.window_len(), 0);
    }

    #[test]
    fn test_event_at_window_boundary_is_retained() {
        let (clock, aggregator) = setup();
        aggregator.ingest(1, 1, 4.0, None);

        clock.advance(WINDOW_DURATION_MS);
        let published = aggregator.recompute();

        assert_eq!(aggregator.window_len(), 1);
        assert!(published.is_some());
    }

    #[test]
    fn test_ingest_evicts_expired_events() {
        let (clock, aggregator) = setup();
        aggregator.ingest(1, 1, 4.0, None);
        aggregator.ingest(2, 2, 4.0, None);

        clock.advance(WINDOW_DURATION_MS + 1);
        aggregator.ingest(3, 3, 4.0, None);

        // Only the new event survives, without any recompute
        assert_eq!(aggregator.window_len(), 1);
    }

    #[test]
    fn test_ranking_only_contains_items_inside_window() {
        // ARRANGE: old events for items 100..105, fresh events for items 1 and 2
        let (clock, aggregator) = setup();
        for item_id in 100..105u64 {
            for user_id in 0..5 {
                aggregator.ingest(user_id, item_id, 2.0, Some(BASE_MS));
            }
        }
        clock.advance(WINDOW_DURATION_MS);
        aggregator.ingest(1, 1, 4.0, None);
        aggregator.ingest(2, 2, 4.0, None);

        // ACT: the old events are now 600_001ms old
        clock.advance(1);
        let published = aggregator.recompute().unwrap();

        // ASSERT
        let now = BASE_MS + WINDOW_DURATION_MS + 1;
        let mut items: Vec<u64> = published.iter().map(|item| item.item_id).collect();
        items.sort();
        assert_eq!(items, vec![1, 2]);
        assert!(published.iter().all(|item| item.computed_at_ms == now));
    }

    #[test]
    fn test_partial_eviction_updates_item_average() {
        // ARRANGE: item 3 has one old 1.0 rating and two recent 5.0 ratings
        let (clock, aggregator) = setup();
        aggregator.ingest(1, 3, 1.0, Some(BASE_MS));
        aggregator.ingest(2, 3, 5.0, Some(BASE_MS + 300_000));
        aggregator.ingest(3, 3, 5.0, Some(BASE_MS + 400_000));
        aggregator.ingest(4, 8, 2.0, Some(BASE_MS));

        let before = aggregator.recompute().unwrap();
        assert_eq!(before[0].item_id, 3);
        assert_eq!(before[0].rating_count, 3);
        assert!((before[0].avg_rating - 11.0 / 3.0).abs() < 1e-9);

        // ACT: the BASE_MS ratings fall out of the window
        clock.advance(WINDOW_DURATION_MS + 1);
        let after = aggregator.recompute().unwrap();

        // ASSERT
        assert_eq!(aggregator.window_len(), 2);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].item_id, 3);
        assert_eq!(after[0].rating_count, 2);
        assert_eq!(after[0].avg_rating, 5.0);
    }

    #[test]
    fn test_out_of_order_timestamps_are_evicted_correctly() {
        let (clock, aggregator) = setup();
        aggregator.ingest(1, 1, 4.0, Some(BASE_MS));
        aggregator.ingest(2, 2, 4.0, Some(BASE_MS - 300_000));
        aggregator.ingest(3, 3, 4.0, Some(BASE_MS - 100_000));

        // Now only the event stamped BASE_MS is inside the window
        clock.advance(WINDOW_DURATION_MS - 100_000 + 1);
        let published = aggregator.recompute().unwrap();

        assert_eq!(aggregator.window_len(), 1);
        assert_eq!(published[0].item_id, 1);
    }

    #[test]
    fn test_batch_without_timestamps_shares_ingestion_time() {
        let (clock, aggregator) = setup();
        let accepted = aggregator.ingest_batch(vec![
            RatingInput::new(1, 10, 4.0),
            RatingInput::new(2, 11, 3.5),
            RatingInput::new(3, 12, 5.0).at(BASE_MS - WINDOW_DURATION_MS + 5),
        ]);
        assert_eq!(accepted, 3);

        // The explicitly stamped event leaves first
        clock.advance(10);
        aggregator.recompute();
        assert_eq!(aggregator.window_len(), 2);

        // Both unstamped events carry BASE_MS and expire together
        clock.set(BASE_MS + WINDOW_DURATION_MS + 1);
        aggregator.recompute();
        assert_eq!(aggregator.window_len(), 0);
    }

    // ============================================================
    // SNAPSHOT TESTS
    // ============================================================

    #[test]
    fn test_empty_window_keeps_previous_ranking() {
        // ARRANGE
        let (clock, aggregator) = setup();
        aggregator.ingest(1, 42, 4.0, None);
        aggregator.recompute();
        assert_eq!(aggregator.current_ranking().len(), 1);

        // ACT: everything expires
        clock.advance(WINDOW_DURATION_MS + 1);
        let published = aggregator.recompute();

        // ASSERT: nothing published, previous ranking still visible
        assert!(published.is_none());
        assert_eq!(aggregator.publication_count(), 1);
        assert_eq!(aggregator.current_ranking()[0].item_id, 42);
    }

    #[test]
    fn test_clear_cache_keeps_the_window() {
        let (_clock, aggregator) = setup();
        aggregator.ingest(1, 42, 4.0, None);
        aggregator.recompute();

        aggregator.clear_cache();

        assert!(aggregator.current_ranking().is_empty());
        assert_eq!(aggregator.window_len(), 1);

        aggregator.recompute();
        assert_eq!(aggregator.current_ranking().len(), 1);
    }

    // ============================================================
    // LIFECYCLE TESTS
    // ============================================================

    #[tokio::test(start_paused = true)]
    async fn test_double_start_runs_a_single_loop() {
        // ARRANGE
        let (_clock, aggregator) = setup();
        aggregator.ingest(1, 42, 4.0, None);

        // ACT
        aggregator.start().unwrap();
        aggregator.start().unwrap();
        assert!(aggregator.is_running());

        // ASSERT: one publication per tick
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(aggregator.publication_count(), 1);

        tokio::time::sleep(RECOMPUTE_INTERVAL).await;
        assert_eq!(aggregator.publication_count(), 2);

        aggregator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_publications() {
        let (_clock, aggregator) = setup();
        aggregator.ingest(1, 42, 4.0, None);
        aggregator.start().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        aggregator.stop().await;
        assert!(!aggregator.is_running());

        let published = aggregator.publication_count();
        tokio::time::sleep(RECOMPUTE_INTERVAL * 3).await;
        assert_eq!(aggregator.publication_count(), published);

        // Stopping again is a no-op
        aggregator.stop().await;
        assert!(!aggregator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let (_clock, aggregator) = setup();
        aggregator.ingest(1, 42, 4.0, None);

        aggregator.start().unwrap();
        aggregator.stop().await;
        aggregator.start().unwrap();

        assert!(aggregator.is_running());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(aggregator.publication_count() >= 1);

        aggregator.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_starts_run_a_single_loop() {
        // ARRANGE
        let (_clock, aggregator) = setup();
        aggregator.ingest(1, 42, 4.0, None);
        let barrier = Arc::new(Barrier::new(8));

        // ACT: eight callers start the aggregator at once
        let starters: Vec<_> = (0..8)
            .map(|_| {
                let aggregator = aggregator.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    aggregator.start()
                })
            })
            .collect();
        for starter in starters {
            starter.await.unwrap().unwrap();
        }

        // ASSERT: a single loop published its immediate first pass
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(aggregator.is_running());
        assert_eq!(aggregator.publication_count(), 1);

        aggregator.stop().await;
        assert!(!aggregator.is_running());
    }

    #[test]
    fn test_start_outside_runtime_fails_and_stays_stopped() {
        let (_clock, aggregator) = setup();

        assert!(aggregator.start().is_err());
        assert!(!aggregator.is_running());
    }

    // ============================================================
    // CONCURRENCY TESTS
    // ============================================================

    #[test]
    fn test_concurrent_ingest_while_recomputing() {
        let (_clock, aggregator) = setup();

        let writers: Vec<_> = (0..8u64)
            .map(|writer| {
                let aggregator = aggregator.clone();
                std::thread::spawn(move || {
                    for i in 0..1_000u64 {
                        aggregator.ingest(writer, i % 20, 4.0, None);
                    }
                })
            })
            .collect();

        let reader = {
            let aggregator = aggregator.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    if let Some(ranking) = aggregator.recompute() {
                        assert!(ranking.len() <= TOP_K);
                    }
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(aggregator.window_len(), 8_000);

        let ranking = aggregator.recompute().unwrap();
        assert_eq!(ranking.len(), TOP_K);
        assert!(ranking.iter().all(|item| item.rating_count == 400));
    }

    // ============================================================
    // HTTP TESTS
    // ============================================================

    #[tokio::test]
    async fn test_ranking_response_uses_aggregator_clock() {
        let (clock, aggregator) = setup();
        aggregator.ingest(1, 42, 4.0, None);
        aggregator.recompute();
        clock.advance(1_500);

        let Json(response) = handle_current_ranking(Extension(aggregator)).await;

        assert_eq!(response.timestamp, BASE_MS + 1_500);
        assert_eq!(response.count, 1);
        assert_eq!(response.data[0].computed_at_ms, BASE_MS);
    }
}
