//! Races over one shared store.
//!
//! Every test spawns real tasks on a multi-threaded runtime against a
//! single store instance. The store's single-writer discipline, not test
//! timing, is what must keep the outcomes consistent.

#[cfg(test)]
mod tests {
    use crate::support::{funded_user, harness, money};
    use market_engine::MarketStore;
    use market_types::{Actor, BidStatus, EngineError, Money, TaskStatus, UserId};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_accepts_pick_exactly_one_winner() {
        let h = harness();
        let client = UserId::new();
        let task = h
            .service
            .create_task(client, "Move a couch".to_string(), money(dec!(90.00)))
            .await
            .unwrap();

        let mut bids = Vec::new();
        for i in 0..5 {
            let bid = h
                .service
                .submit_bid(
                    task.id,
                    UserId::new(),
                    money(dec!(70.00)),
                    format!("offer {i}"),
                )
                .await
                .unwrap();
            bids.push(bid);
        }

        // Five clients-worth of accept calls, one per bid, all at once.
        let store = Arc::clone(&h.store);
        let mut handles = Vec::new();
        for bid in &bids {
            let store = Arc::clone(&store);
            let bid_id = bid.id;
            handles.push(tokio::spawn(async move {
                store.accept_bid(bid_id, Actor::user(client)).await
            }));
        }

        let mut winners = Vec::new();
        let mut losses = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(acceptance) => winners.push(acceptance),
                Err(EngineError::TaskNotOpen { .. }) => losses += 1,
                Err(other) => panic!("unexpected race outcome: {other}"),
            }
        }
        assert_eq!(winners.len(), 1);
        assert_eq!(losses, 4);

        // The stored state agrees with the single reported winner.
        let winner = &winners[0].winner;
        let task = h.store.task(task.id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Assigned);
        assert_eq!(task.tasker_id, Some(winner.tasker_id));

        let stored = h.store.bids_for_task(task.id).await.unwrap();
        let accepted: Vec<_> = stored
            .iter()
            .filter(|b| b.status == BidStatus::Accepted)
            .collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id, winner.id);
        assert!(stored
            .iter()
            .filter(|b| b.id != winner.id)
            .all(|b| b.status == BidStatus::Rejected));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_settles_commit_once() {
        let h = harness();
        let client = funded_user(&h.service, money(dec!(100.00))).await;
        let tasker = UserId::new();
        let task =
            crate::support::task_awaiting_payment(&h.service, client, tasker, money(dec!(100.00)))
                .await;

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&h.store);
            let task_id = task.id;
            handles.push(tokio::spawn(async move {
                store.settle(task_id, Actor::user(client)).await
            }));
        }

        let mut committed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => committed += 1,
                Err(EngineError::InvalidState { .. }) => {}
                Err(other) => panic!("unexpected race outcome: {other}"),
            }
        }
        assert_eq!(committed, 1);

        // One debit, one credit, paid exactly once.
        assert_eq!(h.task_rows(task.id).await.len(), 2);
        assert_eq!(h.service.balance_of(client).await.unwrap(), Money::ZERO);
        assert_eq!(
            h.service.balance_of(tasker).await.unwrap(),
            money(dec!(95.00))
        );
        let profile = h.service.profile(tasker).await.unwrap().unwrap();
        assert_eq!(profile.completed_tasks, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_withdrawals_never_overdraw() {
        let h = harness();
        let user = funded_user(&h.service, money(dec!(100.00))).await;

        // Ten withdrawals of 30.00 against 100.00: exactly three can fit.
        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = Arc::clone(&h.store);
            handles.push(tokio::spawn(async move {
                store
                    .withdraw(user, money(dec!(30.00)), "payout".to_string())
                    .await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(EngineError::InsufficientBalance { .. }) => {}
                Err(other) => panic!("unexpected race outcome: {other}"),
            }
        }
        assert_eq!(succeeded, 3);

        let balance = h.service.balance_of(user).await.unwrap();
        assert_eq!(balance, money(dec!(10.00)));
        assert!(!balance.is_negative());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bids_each_land_once() {
        let h = harness();
        let client = UserId::new();
        let task = h
            .service
            .create_task(client, "Clean the gutters".to_string(), money(dec!(45.00)))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&h.store);
            let task_id = task.id;
            handles.push(tokio::spawn(async move {
                let tasker = UserId::new();
                // Same tasker twice: the second submission must lose.
                let first = store
                    .submit_bid(task_id, tasker, money(dec!(40.00)), "offer".to_string())
                    .await;
                let second = store
                    .submit_bid(task_id, tasker, money(dec!(35.00)), "lower".to_string())
                    .await;
                (first, second)
            }));
        }

        for handle in handles {
            let (first, second) = handle.await.unwrap();
            assert!(first.is_ok());
            assert!(matches!(
                second.unwrap_err(),
                EngineError::DuplicateBid { .. }
            ));
        }
        assert_eq!(h.store.bids_for_task(task.id).await.unwrap().len(), 8);
    }
}
