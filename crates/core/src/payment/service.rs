//! Payment lifecycle transitions.
//!
//! This module implements the guarded state machine for verifying,
//! rejecting, and refunding payments.

use chrono::Utc;
use uuid::Uuid;

use crate::payment::error::PaymentError;
use crate::payment::types::{PaymentAction, PaymentStatus};

/// Stateless service for payment lifecycle transitions.
///
/// All methods are associated functions that validate the exact-status
/// precondition and return the appropriate `PaymentAction` with audit
/// trail information. Persistence is applied by the repository layer.
pub struct PaymentLifecycle;

impl PaymentLifecycle {
    /// Verify a payment awaiting verification.
    ///
    /// # Arguments
    /// * `current_status` - The payment's current status
    /// * `verified_by` - The administrator verifying the payment
    /// * `notes` - Optional verification notes
    ///
    /// # Returns
    /// * `Ok(PaymentAction::Verify)` if the payment is `PendingVerification`
    /// * `Err(PaymentError::NotPendingVerification)` otherwise
    pub fn verify(
        current_status: PaymentStatus,
        verified_by: Uuid,
        notes: Option<String>,
    ) -> Result<PaymentAction, PaymentError> {
        match current_status {
            PaymentStatus::PendingVerification => Ok(PaymentAction::Verify {
                new_status: PaymentStatus::Completed,
                verified_by,
                verified_at: Utc::now(),
                verification_notes: notes,
            }),
            _ => Err(PaymentError::NotPendingVerification {
                current: current_status,
            }),
        }
    }

    /// Reject a payment awaiting verification.
    ///
    /// The rejecting user is stored in the verifier fields.
    ///
    /// # Returns
    /// * `Ok(PaymentAction::Reject)` if the payment is `PendingVerification`
    /// * `Err(PaymentError::NotPendingVerification)` otherwise
    pub fn reject(
        current_status: PaymentStatus,
        rejected_by: Uuid,
        notes: Option<String>,
    ) -> Result<PaymentAction, PaymentError> {
        match current_status {
            PaymentStatus::PendingVerification => Ok(PaymentAction::Reject {
                new_status: PaymentStatus::Rejected,
                rejected_by,
                rejected_at: Utc::now(),
                verification_notes: notes,
            }),
            _ => Err(PaymentError::NotPendingVerification {
                current: current_status,
            }),
        }
    }

    /// Refund a completed payment.
    ///
    /// The repository layer additionally reverses all payment
    /// applications in the same transaction that applies this action.
    ///
    /// # Returns
    /// * `Ok(PaymentAction::Refund)` if the payment is `Completed`
    /// * `Err(PaymentError::RefundReasonRequired)` if the reason is blank
    /// * `Err(PaymentError::NotRefundable)` otherwise
    pub fn refund(
        current_status: PaymentStatus,
        refunded_by: Uuid,
        refund_reason: String,
    ) -> Result<PaymentAction, PaymentError> {
        if refund_reason.trim().is_empty() {
            return Err(PaymentError::RefundReasonRequired);
        }

        match current_status {
            PaymentStatus::Completed => Ok(PaymentAction::Refund {
                new_status: PaymentStatus::Refunded,
                refunded_by,
                refunded_at: Utc::now(),
                refund_reason,
            }),
            _ => Err(PaymentError::NotRefundable {
                current: current_status,
            }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - PendingVerification → Completed (verify)
    /// - PendingVerification → Rejected (reject)
    /// - Completed → Refunded (refund)
    #[must_use]
    pub fn is_valid_transition(from: PaymentStatus, to: PaymentStatus) -> bool {
        matches!(
            (from, to),
            (
                PaymentStatus::PendingVerification,
                PaymentStatus::Completed | PaymentStatus::Rejected
            ) | (PaymentStatus::Completed, PaymentStatus::Refunded)
        )
    }
}
