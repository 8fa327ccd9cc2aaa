//! Property tests for the payment lifecycle state machine.

use proptest::prelude::*;
use uuid::Uuid;

use super::error::PaymentError;
use super::service::PaymentLifecycle;
use super::types::PaymentStatus;

fn status_strategy() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Pending),
        Just(PaymentStatus::PendingVerification),
        Just(PaymentStatus::Completed),
        Just(PaymentStatus::Rejected),
        Just(PaymentStatus::Refunded),
        Just(PaymentStatus::Failed),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Verify succeeds exactly from `pending_verification`; every
    /// failure message names the current status.
    #[test]
    fn prop_verify_guard_is_exact(status in status_strategy()) {
        let result = PaymentLifecycle::verify(status, Uuid::new_v4(), None);
        if status == PaymentStatus::PendingVerification {
            prop_assert_eq!(result.unwrap().new_status(), PaymentStatus::Completed);
        } else {
            let err = result.unwrap_err();
            prop_assert_eq!(&err, &PaymentError::NotPendingVerification { current: status });
            prop_assert!(err.to_string().contains(status.as_str()));
        }
    }

    /// Reject mirrors verify's guard.
    #[test]
    fn prop_reject_guard_is_exact(status in status_strategy()) {
        let result = PaymentLifecycle::reject(status, Uuid::new_v4(), None);
        if status == PaymentStatus::PendingVerification {
            prop_assert_eq!(result.unwrap().new_status(), PaymentStatus::Rejected);
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                PaymentError::NotPendingVerification { current: status }
            );
        }
    }

    /// Refund succeeds exactly from `completed` with a non-blank reason.
    #[test]
    fn prop_refund_guard_is_exact(status in status_strategy()) {
        let result =
            PaymentLifecycle::refund(status, Uuid::new_v4(), "duplicate payment".to_string());
        if status == PaymentStatus::Completed {
            prop_assert_eq!(result.unwrap().new_status(), PaymentStatus::Refunded);
        } else {
            let err = result.unwrap_err();
            prop_assert_eq!(&err, &PaymentError::NotRefundable { current: status });
            prop_assert!(err.to_string().contains(status.as_str()));
        }
    }

    /// A whitespace-only reason is rejected regardless of status.
    #[test]
    fn prop_blank_refund_reason_rejected(
        status in status_strategy(),
        reason in "[ \t]{0,8}",
    ) {
        prop_assert_eq!(
            PaymentLifecycle::refund(status, Uuid::new_v4(), reason),
            Err(PaymentError::RefundReasonRequired)
        );
    }

    /// Terminal statuses admit no transition at all.
    #[test]
    fn prop_terminal_statuses_admit_no_transition(
        from in status_strategy(),
        to in status_strategy(),
    ) {
        if from.is_terminal() {
            prop_assert!(!PaymentLifecycle::is_valid_transition(from, to));
        }
    }
}
