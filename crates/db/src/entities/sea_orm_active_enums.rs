//! Active enums backing the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a quota formula computes amounts (`formula_type`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "formula_type")]
#[serde(rename_all = "snake_case")]
pub enum FormulaType {
    /// Same fixed amount for every unit.
    #[sea_orm(string_value = "fixed")]
    Fixed,
    /// Arithmetic expression over unit attributes.
    #[sea_orm(string_value = "expression")]
    Expression,
    /// Explicit amount table keyed by unit id.
    #[sea_orm(string_value = "per_unit")]
    PerUnit,
}

/// Recurrence of a generation schedule (`frequency_type`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "frequency_type")]
#[serde(rename_all = "snake_case")]
pub enum FrequencyType {
    /// Every month.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Every three months.
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    /// Every six months.
    #[sea_orm(string_value = "semi_annual")]
    SemiAnnual,
    /// Once a year.
    #[sea_orm(string_value = "annual")]
    Annual,
}

/// How a generation run was triggered (`generation_method`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "generation_method")]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    /// Triggered by the recurring scheduler.
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Triggered by an administrator.
    #[sea_orm(string_value = "manual")]
    Manual,
}

/// Outcome of a generation run (`generation_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "generation_status")]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    /// All units produced quotas.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Some units produced quotas, some failed.
    #[sea_orm(string_value = "partial")]
    Partial,
    /// No quota was created.
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Quota payment state (`quota_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "quota_status")]
#[serde(rename_all = "snake_case")]
pub enum QuotaStatus {
    /// Issued and unpaid.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Fully paid.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Partially paid.
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Past its due date and unpaid.
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// Cancelled; excluded from the one-per-period invariant.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Payment lifecycle state (`payment_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Registered, not yet submitted for verification.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Awaiting an administrator's verification.
    #[sea_orm(string_value = "pending_verification")]
    PendingVerification,
    /// Verified and applied.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Failed in the intake flow.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Refunded after completion.
    #[sea_orm(string_value = "refunded")]
    Refunded,
    /// Rejected by an administrator.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// How a payment was made (`payment_method`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Card.
    #[sea_orm(string_value = "card")]
    Card,
    /// Payment gateway.
    #[sea_orm(string_value = "gateway")]
    Gateway,
}

impl From<FormulaType> for strata_core::formula::FormulaType {
    fn from(value: FormulaType) -> Self {
        match value {
            FormulaType::Fixed => Self::Fixed,
            FormulaType::Expression => Self::Expression,
            FormulaType::PerUnit => Self::PerUnit,
        }
    }
}

impl From<strata_core::formula::FormulaType> for FormulaType {
    fn from(value: strata_core::formula::FormulaType) -> Self {
        match value {
            strata_core::formula::FormulaType::Fixed => Self::Fixed,
            strata_core::formula::FormulaType::Expression => Self::Expression,
            strata_core::formula::FormulaType::PerUnit => Self::PerUnit,
        }
    }
}

impl From<GenerationStatus> for strata_core::billing::GenerationStatus {
    fn from(value: GenerationStatus) -> Self {
        match value {
            GenerationStatus::Completed => Self::Completed,
            GenerationStatus::Partial => Self::Partial,
            GenerationStatus::Failed => Self::Failed,
        }
    }
}

impl From<strata_core::billing::GenerationStatus> for GenerationStatus {
    fn from(value: strata_core::billing::GenerationStatus) -> Self {
        match value {
            strata_core::billing::GenerationStatus::Completed => Self::Completed,
            strata_core::billing::GenerationStatus::Partial => Self::Partial,
            strata_core::billing::GenerationStatus::Failed => Self::Failed,
        }
    }
}

impl From<PaymentStatus> for strata_core::payment::PaymentStatus {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::PendingVerification => Self::PendingVerification,
            PaymentStatus::Completed => Self::Completed,
            PaymentStatus::Failed => Self::Failed,
            PaymentStatus::Refunded => Self::Refunded,
            PaymentStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<strata_core::payment::PaymentStatus> for PaymentStatus {
    fn from(value: strata_core::payment::PaymentStatus) -> Self {
        match value {
            strata_core::payment::PaymentStatus::Pending => Self::Pending,
            strata_core::payment::PaymentStatus::PendingVerification => Self::PendingVerification,
            strata_core::payment::PaymentStatus::Completed => Self::Completed,
            strata_core::payment::PaymentStatus::Failed => Self::Failed,
            strata_core::payment::PaymentStatus::Refunded => Self::Refunded,
            strata_core::payment::PaymentStatus::Rejected => Self::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_type_roundtrip() {
        for value in [
            FormulaType::Fixed,
            FormulaType::Expression,
            FormulaType::PerUnit,
        ] {
            let core: strata_core::formula::FormulaType = value.clone().into();
            assert_eq!(FormulaType::from(core), value);
        }
    }

    #[test]
    fn test_payment_status_roundtrip() {
        for value in [
            PaymentStatus::Pending,
            PaymentStatus::PendingVerification,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
            PaymentStatus::Rejected,
        ] {
            let core: strata_core::payment::PaymentStatus = value.clone().into();
            assert_eq!(PaymentStatus::from(core), value);
        }
    }

    #[test]
    fn test_generation_status_roundtrip() {
        for value in [
            GenerationStatus::Completed,
            GenerationStatus::Partial,
            GenerationStatus::Failed,
        ] {
            let core: strata_core::billing::GenerationStatus = value.clone().into();
            assert_eq!(GenerationStatus::from(core), value);
        }
    }
}
