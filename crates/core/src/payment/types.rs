//! Payment domain types for lifecycle management.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment status in the verification lifecycle.
///
/// The valid transitions are:
/// - `PendingVerification` → `Completed` (verify)
/// - `PendingVerification` → `Rejected` (reject)
/// - `Completed` → `Refunded` (refund)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment registered but not yet submitted for verification.
    Pending,
    /// Payment awaiting an administrator's verification.
    PendingVerification,
    /// Payment verified and applied.
    Completed,
    /// Payment rejected by an administrator (terminal).
    Rejected,
    /// Payment refunded after completion (terminal).
    Refunded,
    /// Payment failed in the intake flow (terminal).
    Failed,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingVerification => "pending_verification",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "pending_verification" => Some(Self::PendingVerification),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            "refunded" => Some(Self::Refunded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true if no further transition is defined for the status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Refunded | Self::Failed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment transition with its audit data.
///
/// Each variant captures the action performed, the resulting status,
/// and who did it, when, and why.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentAction {
    /// Verify a payment awaiting verification.
    Verify {
        /// The new status after verification.
        new_status: PaymentStatus,
        /// The user who verified the payment.
        verified_by: Uuid,
        /// When the payment was verified.
        verified_at: DateTime<Utc>,
        /// Optional notes from the verifier.
        verification_notes: Option<String>,
    },
    /// Reject a payment awaiting verification.
    Reject {
        /// The new status after rejection.
        new_status: PaymentStatus,
        /// The user who rejected the payment (stored in the verifier
        /// fields).
        rejected_by: Uuid,
        /// When the payment was rejected.
        rejected_at: DateTime<Utc>,
        /// Optional notes explaining the rejection.
        verification_notes: Option<String>,
    },
    /// Refund a completed payment.
    Refund {
        /// The new status after the refund.
        new_status: PaymentStatus,
        /// The user who issued the refund.
        refunded_by: Uuid,
        /// When the refund was issued.
        refunded_at: DateTime<Utc>,
        /// The reason for the refund.
        refund_reason: String,
    },
}

impl PaymentAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub const fn new_status(&self) -> PaymentStatus {
        match self {
            Self::Verify { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Refund { new_status, .. } => *new_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(PaymentStatus::Pending.as_str(), "pending");
        assert_eq!(
            PaymentStatus::PendingVerification.as_str(),
            "pending_verification"
        );
        assert_eq!(PaymentStatus::Completed.as_str(), "completed");
        assert_eq!(PaymentStatus::Rejected.as_str(), "rejected");
        assert_eq!(PaymentStatus::Refunded.as_str(), "refunded");
        assert_eq!(PaymentStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            PaymentStatus::parse("pending_verification"),
            Some(PaymentStatus::PendingVerification)
        );
        assert_eq!(
            PaymentStatus::parse("COMPLETED"),
            Some(PaymentStatus::Completed)
        );
        assert_eq!(PaymentStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(!PaymentStatus::PendingVerification.is_terminal());
        assert!(!PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Rejected.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            format!("{}", PaymentStatus::PendingVerification),
            "pending_verification"
        );
    }
}
