//! Initial database migration.
//!
//! Creates the billing enums and tables: condominium structure, quota
//! formulas and generation rules/schedules, quotas, generation logs,
//! payments, and payment applications.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CONDOMINIUM STRUCTURE
        // ============================================================
        db.execute_unprepared(CONDOMINIUMS_SQL).await?;
        db.execute_unprepared(BUILDINGS_SQL).await?;
        db.execute_unprepared(UNITS_SQL).await?;

        // ============================================================
        // PART 3: QUOTA FORMULAS & GENERATION RULES
        // ============================================================
        db.execute_unprepared(QUOTA_FORMULAS_SQL).await?;
        db.execute_unprepared(QUOTA_GENERATION_RULES_SQL).await?;
        db.execute_unprepared(QUOTA_GENERATION_SCHEDULES_SQL).await?;

        // ============================================================
        // PART 4: QUOTAS & GENERATION LOGS
        // ============================================================
        db.execute_unprepared(QUOTAS_SQL).await?;
        db.execute_unprepared(QUOTA_GENERATION_LOGS_SQL).await?;

        // ============================================================
        // PART 5: PAYMENTS
        // ============================================================
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(PAYMENT_APPLICATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Formula computation strategies
CREATE TYPE formula_type AS ENUM (
    'fixed',
    'expression',
    'per_unit'
);

-- Schedule recurrence
CREATE TYPE frequency_type AS ENUM (
    'monthly',
    'quarterly',
    'semi_annual',
    'annual'
);

-- How a generation run was triggered
CREATE TYPE generation_method AS ENUM (
    'scheduled',
    'manual'
);

-- Outcome of a generation run
CREATE TYPE generation_status AS ENUM (
    'completed',
    'partial',
    'failed'
);

-- Quota payment state
CREATE TYPE quota_status AS ENUM (
    'pending',
    'paid',
    'partial',
    'overdue',
    'cancelled'
);

-- Payment lifecycle state
CREATE TYPE payment_status AS ENUM (
    'pending',
    'pending_verification',
    'completed',
    'failed',
    'refunded',
    'rejected'
);

-- Payment method
CREATE TYPE payment_method AS ENUM (
    'transfer',
    'cash',
    'card',
    'gateway'
);
";

const CONDOMINIUMS_SQL: &str = r"
CREATE TABLE condominiums (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const BUILDINGS_SQL: &str = r"
CREATE TABLE buildings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    condominium_id UUID NOT NULL REFERENCES condominiums(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_buildings_condominium ON buildings(condominium_id);
";

const UNITS_SQL: &str = r"
CREATE TABLE units (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    building_id UUID NOT NULL REFERENCES buildings(id) ON DELETE CASCADE,
    unit_number VARCHAR(50) NOT NULL,
    floor INTEGER NOT NULL DEFAULT 0,
    area_m2 DECIMAL(10, 2) NOT NULL DEFAULT 0,
    parking_spaces INTEGER NOT NULL DEFAULT 0,
    aliquot_percentage DECIMAL(8, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (building_id, unit_number)
);

CREATE INDEX idx_units_building ON units(building_id);
CREATE INDEX idx_units_active ON units(is_active);
";

const QUOTA_FORMULAS_SQL: &str = r"
CREATE TABLE quota_formulas (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    condominium_id UUID NOT NULL REFERENCES condominiums(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    formula_type formula_type NOT NULL,
    -- For formula_type = 'fixed'
    fixed_amount DECIMAL(15, 2),
    -- For formula_type = 'expression'
    expression TEXT,
    variables JSONB,
    -- For formula_type = 'per_unit'
    unit_amounts JSONB,
    currency_id UUID NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    update_reason TEXT
);

CREATE INDEX idx_quota_formulas_condominium ON quota_formulas(condominium_id);
CREATE INDEX idx_quota_formulas_type ON quota_formulas(formula_type);
CREATE INDEX idx_quota_formulas_active ON quota_formulas(is_active);
";

const QUOTA_GENERATION_RULES_SQL: &str = r"
CREATE TABLE quota_generation_rules (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    condominium_id UUID NOT NULL REFERENCES condominiums(id) ON DELETE CASCADE,
    building_id UUID REFERENCES buildings(id) ON DELETE CASCADE,
    payment_concept_id UUID NOT NULL,
    quota_formula_id UUID NOT NULL REFERENCES quota_formulas(id) ON DELETE RESTRICT,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    effective_from DATE NOT NULL,
    effective_to DATE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    update_reason TEXT
);

CREATE INDEX idx_quota_gen_rules_condominium ON quota_generation_rules(condominium_id);
CREATE INDEX idx_quota_gen_rules_formula ON quota_generation_rules(quota_formula_id);
CREATE INDEX idx_quota_gen_rules_active ON quota_generation_rules(is_active);
";

const QUOTA_GENERATION_SCHEDULES_SQL: &str = r"
CREATE TABLE quota_generation_schedules (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    quota_generation_rule_id UUID NOT NULL
        REFERENCES quota_generation_rules(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    frequency_type frequency_type NOT NULL,
    issue_day INTEGER NOT NULL CHECK (issue_day BETWEEN 1 AND 31),
    due_day INTEGER NOT NULL CHECK (due_day BETWEEN 1 AND 31),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_quota_gen_schedules_rule
    ON quota_generation_schedules(quota_generation_rule_id);
CREATE INDEX idx_quota_gen_schedules_active ON quota_generation_schedules(is_active);
";

const QUOTAS_SQL: &str = r"
CREATE TABLE quotas (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    unit_id UUID NOT NULL REFERENCES units(id) ON DELETE CASCADE,
    payment_concept_id UUID NOT NULL,
    period_year INTEGER NOT NULL,
    period_month INTEGER NOT NULL CHECK (period_month BETWEEN 1 AND 12),
    period_description VARCHAR(100) NOT NULL,
    base_amount DECIMAL(15, 2) NOT NULL,
    currency_id UUID NOT NULL,
    issue_date DATE NOT NULL,
    due_date DATE NOT NULL,
    status quota_status NOT NULL DEFAULT 'pending',
    paid_amount DECIMAL(15, 2) NOT NULL DEFAULT 0,
    balance DECIMAL(15, 2) NOT NULL,
    notes TEXT,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_quotas_unit ON quotas(unit_id);
CREATE INDEX idx_quotas_period ON quotas(period_year, period_month);
CREATE INDEX idx_quotas_status ON quotas(status);

-- At most one non-cancelled quota per (unit, concept, period).
CREATE UNIQUE INDEX uq_quotas_unit_concept_period
    ON quotas(unit_id, payment_concept_id, period_year, period_month)
    WHERE status <> 'cancelled';
";

const QUOTA_GENERATION_LOGS_SQL: &str = r"
CREATE TABLE quota_generation_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    generation_rule_id UUID REFERENCES quota_generation_rules(id) ON DELETE SET NULL,
    generation_schedule_id UUID
        REFERENCES quota_generation_schedules(id) ON DELETE SET NULL,
    quota_formula_id UUID REFERENCES quota_formulas(id) ON DELETE SET NULL,
    generation_method generation_method NOT NULL,
    period_year INTEGER NOT NULL,
    period_month INTEGER NOT NULL,
    period_description VARCHAR(100) NOT NULL,
    quotas_created INTEGER NOT NULL DEFAULT 0,
    quotas_failed INTEGER NOT NULL DEFAULT 0,
    total_amount DECIMAL(15, 2) NOT NULL DEFAULT 0,
    currency_id UUID NOT NULL,
    units_affected JSONB,
    parameters JSONB,
    formula_snapshot JSONB,
    status generation_status NOT NULL,
    error_details TEXT,
    generated_by UUID NOT NULL,
    generated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_quota_gen_logs_rule ON quota_generation_logs(generation_rule_id);
CREATE INDEX idx_quota_gen_logs_period
    ON quota_generation_logs(period_year, period_month);
CREATE INDEX idx_quota_gen_logs_status ON quota_generation_logs(status);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    payment_number VARCHAR(50) NOT NULL UNIQUE,
    user_id UUID NOT NULL,
    unit_id UUID NOT NULL REFERENCES units(id) ON DELETE RESTRICT,
    amount DECIMAL(15, 2) NOT NULL,
    currency_id UUID NOT NULL,
    payment_method payment_method NOT NULL,
    payment_date DATE NOT NULL,
    status payment_status NOT NULL DEFAULT 'pending',
    notes TEXT,
    verified_by UUID,
    verified_at TIMESTAMPTZ,
    verification_notes TEXT,
    refund_reason TEXT,
    refunded_by UUID,
    refunded_at TIMESTAMPTZ,
    registered_by UUID NOT NULL,
    registered_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_payments_unit ON payments(unit_id);
CREATE INDEX idx_payments_status ON payments(status);
";

const PAYMENT_APPLICATIONS_SQL: &str = r"
CREATE TABLE payment_applications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    payment_id UUID NOT NULL REFERENCES payments(id) ON DELETE CASCADE,
    quota_id UUID NOT NULL REFERENCES quotas(id) ON DELETE CASCADE,
    applied_amount DECIMAL(15, 2) NOT NULL,
    registered_by UUID NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_payment_applications_payment ON payment_applications(payment_id);
CREATE INDEX idx_payment_applications_quota ON payment_applications(quota_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payment_applications;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS quota_generation_logs;
DROP TABLE IF EXISTS quotas;
DROP TABLE IF EXISTS quota_generation_schedules;
DROP TABLE IF EXISTS quota_generation_rules;
DROP TABLE IF EXISTS quota_formulas;
DROP TABLE IF EXISTS units;
DROP TABLE IF EXISTS buildings;
DROP TABLE IF EXISTS condominiums;

DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS quota_status;
DROP TYPE IF EXISTS generation_status;
DROP TYPE IF EXISTS generation_method;
DROP TYPE IF EXISTS frequency_type;
DROP TYPE IF EXISTS formula_type;
";
