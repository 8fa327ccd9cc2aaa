//! Payment repository: lifecycle persistence.
//!
//! Verify and reject are status-conditioned updates; refund reverses
//! all of the payment's allocations and flips the status in one
//! transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use strata_core::payment::{PaymentAction, PaymentError, PaymentLifecycle, PaymentStatus};

use crate::entities::{payment_applications, payments, sea_orm_active_enums};

/// Result of a refund: the updated payment and how many allocations
/// were reversed.
#[derive(Debug, Clone)]
pub struct RefundOutcome {
    /// The refunded payment.
    pub payment: payments::Model,
    /// Number of payment applications deleted.
    pub reversed_applications: u64,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a payment by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn get_by_id(&self, id: Uuid) -> Result<payments::Model, PaymentError> {
        payments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PaymentError::NotFound(id))
    }

    /// Lists payments in a given lifecycle status, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<payments::Model>, PaymentError> {
        payments::Entity::find()
            .filter(payments::Column::Status.eq(sea_orm_active_enums::PaymentStatus::from(status)))
            .order_by_desc(payments::Column::RegisteredAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Verifies a payment awaiting verification.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the payment does not exist and
    /// `NotPendingVerification` (naming the current status) otherwise.
    pub async fn verify_payment(
        &self,
        payment_id: Uuid,
        verified_by: Uuid,
        notes: Option<String>,
    ) -> Result<payments::Model, PaymentError> {
        let payment = self.get_by_id(payment_id).await?;
        let current: PaymentStatus = payment.status.clone().into();
        let action = PaymentLifecycle::verify(current, verified_by, notes)?;
        self.apply_conditioned(payment, &action).await
    }

    /// Rejects a payment awaiting verification.
    ///
    /// The rejecting user lands in the verifier fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the payment does not exist and
    /// `NotPendingVerification` (naming the current status) otherwise.
    pub async fn reject_payment(
        &self,
        payment_id: Uuid,
        rejected_by: Uuid,
        notes: Option<String>,
    ) -> Result<payments::Model, PaymentError> {
        let payment = self.get_by_id(payment_id).await?;
        let current: PaymentStatus = payment.status.clone().into();
        let action = PaymentLifecycle::reject(current, rejected_by, notes)?;
        self.apply_conditioned(payment, &action).await
    }

    /// Refunds a completed payment.
    ///
    /// Transactionally hard-deletes every payment application of the
    /// payment (reversing the allocations) and sets the status to
    /// `refunded`; the deletions and the status update succeed or fail
    /// together. Quota rows are not touched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the payment does not exist,
    /// `RefundReasonRequired` for a blank reason, `NotRefundable`
    /// (naming the current status) outside `completed`, and database
    /// errors otherwise.
    pub async fn refund_payment(
        &self,
        payment_id: Uuid,
        refund_reason: String,
        refunded_by: Uuid,
    ) -> Result<RefundOutcome, PaymentError> {
        let payment = self.get_by_id(payment_id).await?;
        let current: PaymentStatus = payment.status.clone().into();
        let action = PaymentLifecycle::refund(current, refunded_by, refund_reason)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let deleted = payment_applications::Entity::delete_many()
            .filter(payment_applications::Column::PaymentId.eq(payment_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let updated = apply_action(payment, &action)
            .update(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            payment_id = %payment_id,
            reversed = deleted.rows_affected,
            "payment refunded"
        );

        Ok(RefundOutcome {
            payment: updated,
            reversed_applications: deleted.rows_affected,
        })
    }

    /// Applies a verify/reject action with a status-conditioned update,
    /// so a concurrent transition cannot be overwritten.
    async fn apply_conditioned(
        &self,
        payment: payments::Model,
        action: &PaymentAction,
    ) -> Result<payments::Model, PaymentError> {
        let payment_id = payment.id;
        let result = payments::Entity::update_many()
            .set(apply_action(payment, action))
            .filter(payments::Column::Id.eq(payment_id))
            .filter(
                payments::Column::Status
                    .eq(sea_orm_active_enums::PaymentStatus::PendingVerification),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let fresh = self.get_by_id(payment_id).await?;
        if result.rows_affected == 0 {
            return Err(PaymentError::NotPendingVerification {
                current: fresh.status.into(),
            });
        }
        Ok(fresh)
    }
}

/// Builds the column updates for a lifecycle action.
fn apply_action(payment: payments::Model, action: &PaymentAction) -> payments::ActiveModel {
    let mut active: payments::ActiveModel = payment.into();
    match action {
        PaymentAction::Verify {
            new_status,
            verified_by,
            verified_at,
            verification_notes,
        } => {
            active.status = Set((*new_status).into());
            active.verified_by = Set(Some(*verified_by));
            active.verified_at = Set(Some((*verified_at).into()));
            active.verification_notes = Set(verification_notes.clone());
        }
        PaymentAction::Reject {
            new_status,
            rejected_by,
            rejected_at,
            verification_notes,
        } => {
            active.status = Set((*new_status).into());
            // The verifier fields double as the rejection audit trail.
            active.verified_by = Set(Some(*rejected_by));
            active.verified_at = Set(Some((*rejected_at).into()));
            active.verification_notes = Set(verification_notes.clone());
        }
        PaymentAction::Refund {
            new_status,
            refunded_by,
            refunded_at,
            refund_reason,
        } => {
            active.status = Set((*new_status).into());
            active.refund_reason = Set(Some(refund_reason.clone()));
            active.refunded_by = Set(Some(*refunded_by));
            active.refunded_at = Set(Some((*refunded_at).into()));
        }
    }
    active.updated_at = Set(Utc::now().into());
    active
}

fn db_err(err: DbErr) -> PaymentError {
    PaymentError::Database(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::ActiveValue;

    fn payment_model(status: sea_orm_active_enums::PaymentStatus) -> payments::Model {
        payments::Model {
            id: Uuid::new_v4(),
            payment_number: "PAY-001".to_string(),
            user_id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            amount: dec!(150.00),
            currency_id: Uuid::new_v4(),
            payment_method: sea_orm_active_enums::PaymentMethod::Transfer,
            payment_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            status,
            notes: None,
            verified_by: None,
            verified_at: None,
            verification_notes: None,
            refund_reason: None,
            refunded_by: None,
            refunded_at: None,
            registered_by: Uuid::new_v4(),
            registered_at: Utc::now().into(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn set_value<T: Clone>(value: &ActiveValue<T>) -> T
    where
        T: Into<sea_orm::Value>,
    {
        match value {
            ActiveValue::Set(v) => v.clone(),
            _ => panic!("expected a Set value"),
        }
    }

    #[test]
    fn test_apply_verify_sets_verifier_fields() {
        let admin = Uuid::new_v4();
        let payment =
            payment_model(sea_orm_active_enums::PaymentStatus::PendingVerification);
        let action = PaymentLifecycle::verify(
            PaymentStatus::PendingVerification,
            admin,
            Some("Receipt verified".to_string()),
        )
        .unwrap();

        let active = apply_action(payment, &action);
        assert_eq!(
            set_value(&active.status),
            sea_orm_active_enums::PaymentStatus::Completed
        );
        assert_eq!(set_value(&active.verified_by), Some(admin));
        assert_eq!(
            set_value(&active.verification_notes),
            Some("Receipt verified".to_string())
        );
        assert!(matches!(active.refund_reason, ActiveValue::Unchanged(_)));
    }

    #[test]
    fn test_apply_reject_reuses_verifier_fields() {
        let admin = Uuid::new_v4();
        let payment =
            payment_model(sea_orm_active_enums::PaymentStatus::PendingVerification);
        let action = PaymentLifecycle::reject(
            PaymentStatus::PendingVerification,
            admin,
            Some("Invalid receipt".to_string()),
        )
        .unwrap();

        let active = apply_action(payment, &action);
        assert_eq!(
            set_value(&active.status),
            sea_orm_active_enums::PaymentStatus::Rejected
        );
        assert_eq!(set_value(&active.verified_by), Some(admin));
        assert_eq!(
            set_value(&active.verification_notes),
            Some("Invalid receipt".to_string())
        );
    }

    #[test]
    fn test_apply_refund_sets_refund_fields() {
        let admin = Uuid::new_v4();
        let payment = payment_model(sea_orm_active_enums::PaymentStatus::Completed);
        let action = PaymentLifecycle::refund(
            PaymentStatus::Completed,
            admin,
            "Customer requested refund".to_string(),
        )
        .unwrap();

        let active = apply_action(payment, &action);
        assert_eq!(
            set_value(&active.status),
            sea_orm_active_enums::PaymentStatus::Refunded
        );
        assert_eq!(set_value(&active.refunded_by), Some(admin));
        assert_eq!(
            set_value(&active.refund_reason),
            Some("Customer requested refund".to_string())
        );
        // Verifier fields from the original verification are preserved.
        assert!(matches!(active.verified_by, ActiveValue::Unchanged(_)));
    }
}
