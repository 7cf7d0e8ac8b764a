//! End-to-end task flows through the service facade.
//!
//! Each test runs the same path a deployment would: fund, post, bid,
//! accept, report, settle, and then checks balances, ledger rows, and
//! entity states against the expected outcome.

#[cfg(test)]
mod tests {
    use crate::support::{
        funded_user, harness, harness_with, money, task_awaiting_payment, task_with_bid,
    };
    use market_engine::EngineConfig;
    use market_types::{
        Actor, BidStatus, EngineError, EntryDirection, Money, TaskStatus, TaskerLevel, UserId,
    };
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_full_lifecycle_settles_with_bronze_fee() {
        let h = harness();
        let client = funded_user(&h.service, money(dec!(100.00))).await;
        let tasker = UserId::new();

        let task = task_awaiting_payment(&h.service, client, tasker, money(dec!(100.00))).await;
        assert_eq!(task.status, TaskStatus::PendingPayment);
        assert_eq!(task.tasker_id, Some(tasker));

        let receipt = h
            .service
            .settle(task.id, Actor::user(client))
            .await
            .unwrap();

        // Bronze pays 5%: 100.00 gross, 5.00 fee, 95.00 payout.
        assert_eq!(receipt.fee, money(dec!(5.00)));
        assert_eq!(receipt.debit.amount, money(dec!(100.00)));
        assert_eq!(receipt.credit.amount, money(dec!(95.00)));
        assert_eq!(receipt.task.status, TaskStatus::Completed);

        assert_eq!(h.service.balance_of(client).await.unwrap(), Money::ZERO);
        assert_eq!(
            h.service.balance_of(tasker).await.unwrap(),
            money(dec!(95.00))
        );

        // Exactly two rows settle the task: the client's debit and the
        // tasker's credit.
        let rows = h.task_rows(task.id).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].direction, EntryDirection::Debit);
        assert_eq!(rows[0].user_id, client);
        assert_eq!(rows[1].direction, EntryDirection::Credit);
        assert_eq!(rows[1].user_id, tasker);

        let profile = h.service.profile(tasker).await.unwrap().unwrap();
        assert_eq!(profile.completed_tasks, 1);
        assert_eq!(profile.xp, 10);
    }

    #[tokio::test]
    async fn test_insufficient_balance_aborts_settlement_entirely() {
        let h = harness();
        let client = funded_user(&h.service, money(dec!(50.00))).await;
        let tasker = UserId::new();

        let task = task_awaiting_payment(&h.service, client, tasker, money(dec!(100.00))).await;

        let err = h
            .service
            .settle(task.id, Actor::user(client))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientBalance { .. }));
        assert!(!err.is_retryable());

        // Nothing moved: task still awaiting payment, balances untouched,
        // zero ledger rows for the task.
        let task = h.service.task(task.id).await.unwrap();
        assert_eq!(task.status, TaskStatus::PendingPayment);
        assert_eq!(
            h.service.balance_of(client).await.unwrap(),
            money(dec!(50.00))
        );
        assert_eq!(h.service.balance_of(tasker).await.unwrap(), Money::ZERO);
        assert!(h.task_rows(task.id).await.is_empty());

        // Topping up makes the same call succeed.
        h.service
            .deposit(client, money(dec!(50.00)), "top-up".to_string())
            .await
            .unwrap();
        let receipt = h
            .service
            .settle(task.id, Actor::user(client))
            .await
            .unwrap();
        assert_eq!(receipt.credit.amount, money(dec!(95.00)));
    }

    #[tokio::test]
    async fn test_accepting_one_of_three_bids_rejects_the_rest() {
        let h = harness();
        let client = funded_user(&h.service, money(dec!(200.00))).await;
        let taskers = [UserId::new(), UserId::new(), UserId::new()];

        let task = h
            .service
            .create_task(client, "Paint the fence".to_string(), money(dec!(80.00)))
            .await
            .unwrap();
        let mut bids = Vec::new();
        for (i, tasker) in taskers.iter().enumerate() {
            let amount = money(dec!(60.00));
            let bid = h
                .service
                .submit_bid(task.id, *tasker, amount, format!("offer {i}"))
                .await
                .unwrap();
            bids.push(bid);
        }

        let acceptance = h
            .service
            .accept_bid(bids[1].id, Actor::user(client))
            .await
            .unwrap();
        assert_eq!(acceptance.winner.id, bids[1].id);
        assert_eq!(acceptance.rejected.len(), 2);
        assert_eq!(acceptance.task.status, TaskStatus::Assigned);
        assert_eq!(acceptance.task.tasker_id, Some(taskers[1]));

        let stored = h.service.bids_for_task(task.id).await.unwrap();
        assert_eq!(stored[0].status, BidStatus::Rejected);
        assert_eq!(stored[1].status, BidStatus::Accepted);
        assert_eq!(stored[2].status, BidStatus::Rejected);

        // The losing taskers can no longer bid their way back in.
        let err = h
            .service
            .submit_bid(task.id, taskers[0], money(dec!(50.00)), "retry".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::TaskNotOpen { .. }));
    }

    #[tokio::test]
    async fn test_settling_twice_fails_without_new_rows() {
        let h = harness();
        let client = funded_user(&h.service, money(dec!(100.00))).await;
        let tasker = UserId::new();
        let task = task_awaiting_payment(&h.service, client, tasker, money(dec!(40.00))).await;

        h.service
            .settle(task.id, Actor::user(client))
            .await
            .unwrap();
        let err = h
            .service
            .settle(task.id, Actor::user(client))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));

        assert_eq!(h.task_rows(task.id).await.len(), 2);
        assert_eq!(
            h.service.balance_of(tasker).await.unwrap(),
            money(dec!(38.00))
        );
    }

    #[tokio::test]
    async fn test_duplicate_and_self_bids_are_rejected() {
        let h = harness();
        let client = UserId::new();
        let tasker = UserId::new();
        let (task, _bid) = task_with_bid(&h.service, client, tasker, money(dec!(30.00))).await;

        let err = h
            .service
            .submit_bid(task.id, tasker, money(dec!(25.00)), "again".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateBid { .. }));

        let err = h
            .service
            .submit_bid(task.id, client, money(dec!(25.00)), "mine".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));

        assert_eq!(h.service.bids_for_task(task.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_client_cancels_open_task_but_not_assigned() {
        let h = harness();
        let client = UserId::new();
        let tasker = UserId::new();
        let client_actor = Actor::user(client);

        let open = h
            .service
            .create_task(client, "Walk the dog".to_string(), money(dec!(15.00)))
            .await
            .unwrap();
        let cancelled = h.service.cancel_task(open.id, client_actor).await.unwrap();
        assert_eq!(cancelled.status, TaskStatus::Cancelled);
        assert_eq!(cancelled.tasker_id, None);

        let (task, bid) = task_with_bid(&h.service, client, tasker, money(dec!(15.00))).await;
        h.service.accept_bid(bid.id, client_actor).await.unwrap();

        let err = h
            .service
            .cancel_task(task.id, client_actor)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized { .. }));

        // The administrative override works where the client's cancel
        // does not, and clears the assignment.
        let admin = Actor::admin(UserId::new());
        let cancelled = h.service.cancel_task(task.id, admin).await.unwrap();
        assert_eq!(cancelled.status, TaskStatus::Cancelled);
        assert_eq!(cancelled.tasker_id, None);
        assert!(cancelled.tasker_matches_status());
    }

    #[tokio::test]
    async fn test_only_the_assigned_tasker_reports_completion() {
        let h = harness();
        let client = UserId::new();
        let tasker = UserId::new();
        let (task, bid) = task_with_bid(&h.service, client, tasker, money(dec!(20.00))).await;
        h.service
            .accept_bid(bid.id, Actor::user(client))
            .await
            .unwrap();

        let err = h
            .service
            .request_completion(task.id, Actor::user(UserId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized { .. }));

        let err = h
            .service
            .request_completion(task.id, Actor::user(client))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized { .. }));

        let task = h
            .service
            .request_completion(task.id, Actor::user(tasker))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::PendingPayment);
    }

    #[tokio::test]
    async fn test_only_the_client_settles() {
        let h = harness();
        let client = funded_user(&h.service, money(dec!(20.00))).await;
        let tasker = UserId::new();
        let task = task_awaiting_payment(&h.service, client, tasker, money(dec!(20.00))).await;

        let err = h
            .service
            .settle(task.id, Actor::user(tasker))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized { .. }));

        h.service
            .settle(task.id, Actor::user(client))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_withdrawal_respects_the_balance() {
        let h = harness();
        let user = funded_user(&h.service, money(dec!(10.00))).await;

        let err = h
            .service
            .withdraw(user, money(dec!(10.01)), "payout".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientBalance { .. }));

        h.service
            .withdraw(user, money(dec!(10.00)), "payout".to_string())
            .await
            .unwrap();
        assert_eq!(h.service.balance_of(user).await.unwrap(), Money::ZERO);
    }

    // Promotion thresholds sit at 100, 500, and 2000 xp. A large per-task
    // award walks one tasker through every fee tier without grinding
    // hundreds of settlements.
    #[tokio::test]
    async fn test_fee_rate_drops_as_the_tasker_levels_up() {
        let config = EngineConfig {
            xp_per_completion: 500,
            ..EngineConfig::default()
        };
        let h = harness_with(config);
        let client = funded_user(&h.service, money(dec!(500.00))).await;
        let tasker = UserId::new();

        // The fee uses the level held when the settlement commits; the xp
        // award lands in the same unit but only affects the next task.
        let expected = [
            (TaskerLevel::Bronze, dec!(0.50), Some(TaskerLevel::Gold)),
            (TaskerLevel::Gold, dec!(0.30), None),
            (TaskerLevel::Gold, dec!(0.30), None),
            (TaskerLevel::Gold, dec!(0.30), Some(TaskerLevel::Diamond)),
            (TaskerLevel::Diamond, dec!(0.20), None),
        ];

        for (level_before, fee, promoted) in expected {
            let profile = h.service.profile(tasker).await.unwrap();
            if let Some(p) = &profile {
                assert_eq!(p.level, level_before);
            }
            let task =
                task_awaiting_payment(&h.service, client, tasker, money(dec!(10.00))).await;
            let receipt = h
                .service
                .settle(task.id, Actor::user(client))
                .await
                .unwrap();
            assert_eq!(receipt.fee, money(fee));
            assert_eq!(receipt.promoted, promoted);
        }
    }

    #[tokio::test]
    async fn test_silver_tier_pays_four_percent() {
        let config = EngineConfig {
            xp_per_completion: 100,
            ..EngineConfig::default()
        };
        let h = harness_with(config);
        let client = funded_user(&h.service, money(dec!(200.00))).await;
        let tasker = UserId::new();

        let task = task_awaiting_payment(&h.service, client, tasker, money(dec!(100.00))).await;
        let first = h
            .service
            .settle(task.id, Actor::user(client))
            .await
            .unwrap();
        assert_eq!(first.fee, money(dec!(5.00)));
        assert_eq!(first.promoted, Some(TaskerLevel::Silver));

        let task = task_awaiting_payment(&h.service, client, tasker, money(dec!(100.00))).await;
        let second = h
            .service
            .settle(task.id, Actor::user(client))
            .await
            .unwrap();
        assert_eq!(second.fee, money(dec!(4.00)));
        assert_eq!(second.credit.amount, money(dec!(96.00)));
    }

    #[tokio::test]
    async fn test_payout_plus_fee_always_equals_the_bid() {
        let h = harness();
        let tasker = UserId::new();
        // Amounts chosen so the 5% fee needs rounding.
        for amount in [dec!(0.01), dec!(33.33), dec!(2.50), dec!(99.99)] {
            let client = funded_user(&h.service, money(amount)).await;
            let task = task_awaiting_payment(&h.service, client, tasker, money(amount)).await;
            let receipt = h
                .service
                .settle(task.id, Actor::user(client))
                .await
                .unwrap();
            let total = receipt.credit.amount.checked_add(receipt.fee).unwrap();
            assert_eq!(total, money(amount), "bid amount {amount} split unevenly");
            assert_eq!(h.service.balance_of(client).await.unwrap(), Money::ZERO);
        }
    }
}
