//! Initial database migration.
//!
//! Creates the master-data tables the core reads, the numbering, stock,
//! journal and settlement tables it writes, and the triggers that keep
//! posted history append-only.

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
        // PART 2: MASTER DATA (read-only for the core)
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(GL_ACCOUNT_MAPPINGS_SQL).await?;
        db.execute_unprepared(WAREHOUSES_SQL).await?;
        db.execute_unprepared(ITEMS_SQL).await?;
        db.execute_unprepared(PARTIES_SQL).await?;

        // ============================================================
        // PART 3: DOCUMENT NUMBERING
        // ============================================================
        db.execute_unprepared(NUMBER_SERIES_SQL).await?;
        db.execute_unprepared(NUMBER_ALLOCATION_LOGS_SQL).await?;

        // ============================================================
        // PART 4: INVENTORY
        // ============================================================
        db.execute_unprepared(STOCK_LEDGERS_SQL).await?;
        db.execute_unprepared(STOCK_TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 5: GENERAL LEDGER
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 6: SALES & SETTLEMENT
        // ============================================================
        db.execute_unprepared(SALES_ORDERS_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_LINES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(PAYMENT_ALLOCATIONS_SQL).await?;

        // ============================================================
        // PART 7: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

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
-- Chart of accounts classification
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Customer / supplier
CREATE TYPE party_type AS ENUM ('customer', 'supplier', 'both');

-- Number series
CREATE TYPE year_format AS ENUM ('none', 'YY', 'YYYY');
CREATE TYPE reset_rule AS ENUM ('never', 'yearly');
CREATE TYPE allocation_status AS ENUM ('RESERVED', 'CONFIRMED', 'VOID');

-- Stock movements (direction implied by type)
CREATE TYPE movement_type AS ENUM (
    'receipt',
    'issue',
    'transfer_in',
    'transfer_out',
    'adjustment_in',
    'adjustment_out',
    'return_in',
    'return_out',
    'production_in',
    'production_out'
);

-- Journal entries
CREATE TYPE journal_status AS ENUM ('draft', 'posted', 'reversed');

-- Invoices, orders and payments
CREATE TYPE invoice_kind AS ENUM ('sales', 'purchase');
CREATE TYPE invoice_status AS ENUM (
    'draft',
    'issued',
    'partial',
    'completed',
    'cancelled'
);
CREATE TYPE order_status AS ENUM (
    'draft',
    'confirmed',
    'invoiced',
    'completed',
    'cancelled'
);
CREATE TYPE payment_kind AS ENUM ('receipt', 'disbursement');
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, code)
);

CREATE INDEX idx_accounts_company ON accounts(company_id) WHERE is_active = true;
";

const GL_ACCOUNT_MAPPINGS_SQL: &str = r"
CREATE TABLE gl_account_mappings (
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    mapping_key VARCHAR(50) NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (company_id, mapping_key)
);
";

const WAREHOUSES_SQL: &str = r"
CREATE TABLE warehouses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, code)
);
";

const ITEMS_SQL: &str = r"
CREATE TABLE items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    sku VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    uom VARCHAR(20) NOT NULL DEFAULT 'unit',
    cost_price NUMERIC(19, 6),
    sale_price NUMERIC(19, 2),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, sku),
    CONSTRAINT chk_item_cost_non_negative CHECK (cost_price IS NULL OR cost_price >= 0)
);
";

const PARTIES_SQL: &str = r"
CREATE TABLE parties (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    party_type party_type NOT NULL,
    credit_limit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_credit_limit_non_negative CHECK (credit_limit >= 0)
);

CREATE INDEX idx_parties_company ON parties(company_id);
";

const NUMBER_SERIES_SQL: &str = r"
CREATE TABLE number_series (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    entity_type VARCHAR(50) NOT NULL,
    prefix VARCHAR(20) NOT NULL DEFAULT '',
    separator VARCHAR(5) NOT NULL DEFAULT '-',
    year_format year_format NOT NULL DEFAULT 'YYYY',
    current_value BIGINT NOT NULL DEFAULT 0,
    reset_rule reset_rule NOT NULL DEFAULT 'yearly',
    last_reset_year INTEGER,
    is_active BOOLEAN NOT NULL DEFAULT true,
    is_locked BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_current_value_non_negative CHECK (current_value >= 0)
);

-- One active series per (company, entity type); makes auto-provision idempotent
CREATE UNIQUE INDEX uq_number_series_active
    ON number_series(company_id, entity_type) WHERE is_active = true;
";

const NUMBER_ALLOCATION_LOGS_SQL: &str = r"
CREATE TABLE number_allocation_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    series_id UUID NOT NULL REFERENCES number_series(id),
    entity_type VARCHAR(50) NOT NULL,
    generated_number VARCHAR(100) NOT NULL,
    counter_value BIGINT NOT NULL,
    status allocation_status NOT NULL DEFAULT 'RESERVED',
    entity_id UUID,
    allocated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    confirmed_at TIMESTAMPTZ,
    voided_at TIMESTAMPTZ,
    -- Duplicates are never acceptable
    UNIQUE (company_id, entity_type, generated_number)
);

CREATE INDEX idx_nal_series ON number_allocation_logs(series_id);
CREATE INDEX idx_nal_reserved ON number_allocation_logs(company_id, allocated_at)
    WHERE status = 'RESERVED';
";

const STOCK_LEDGERS_SQL: &str = r"
CREATE TABLE stock_ledgers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    item_id UUID NOT NULL REFERENCES items(id),
    quantity NUMERIC(19, 4) NOT NULL DEFAULT 0,
    quantity_reserved NUMERIC(19, 4) NOT NULL DEFAULT 0,
    quantity_available NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_value NUMERIC(19, 6) NOT NULL DEFAULT 0,
    average_cost NUMERIC(19, 6) NOT NULL DEFAULT 0,
    -- Unit cost resolved by the most recent movement
    last_unit_cost NUMERIC(19, 6) NOT NULL DEFAULT 0,
    last_purchase_at TIMESTAMPTZ,
    last_sale_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, warehouse_id, item_id),
    CONSTRAINT chk_reserved_non_negative CHECK (quantity_reserved >= 0),
    CONSTRAINT chk_available_matches CHECK (quantity_available = quantity - quantity_reserved)
);
";

const STOCK_TRANSACTIONS_SQL: &str = r"
CREATE TABLE stock_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    seq BIGINT GENERATED ALWAYS AS IDENTITY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    ledger_id UUID NOT NULL REFERENCES stock_ledgers(id),
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    item_id UUID NOT NULL REFERENCES items(id),
    movement_type movement_type NOT NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    uom VARCHAR(20) NOT NULL,
    unit_cost NUMERIC(19, 6) NOT NULL,
    total_cost NUMERIC(19, 6) NOT NULL,
    balance_quantity NUMERIC(19, 4) NOT NULL,
    balance_value NUMERIC(19, 6) NOT NULL,
    balance_average_cost NUMERIC(19, 6) NOT NULL,
    reference_type VARCHAR(50),
    reference_id UUID,
    posting_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_movement_quantity_positive CHECK (quantity > 0),
    CONSTRAINT chk_movement_cost_non_negative CHECK (unit_cost >= 0 AND total_cost >= 0)
);

CREATE INDEX idx_st_ledger_seq ON stock_transactions(ledger_id, seq);
CREATE INDEX idx_st_reference ON stock_transactions(reference_type, reference_id);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    entry_number VARCHAR(100) NOT NULL,
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    source_type VARCHAR(50),
    source_id UUID,
    total_debit NUMERIC(19, 2) NOT NULL,
    total_credit NUMERIC(19, 2) NOT NULL,
    status journal_status NOT NULL DEFAULT 'draft',
    is_posted BOOLEAN NOT NULL DEFAULT false,
    reversal_of UUID REFERENCES journal_entries(id),
    reversed_by UUID REFERENCES journal_entries(id),
    reversal_reason TEXT,
    posted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, entry_number),
    CONSTRAINT chk_journal_balanced CHECK (ABS(total_debit - total_credit) <= 0.01),
    CONSTRAINT chk_journal_posted_flag CHECK (is_posted = (status <> 'draft'))
);

CREATE INDEX idx_je_company_date ON journal_entries(company_id, entry_date);
CREATE INDEX idx_je_source ON journal_entries(source_type, source_id);
-- An entry can be reversed at most once
CREATE UNIQUE INDEX uq_je_reversal_of ON journal_entries(reversal_of) WHERE reversal_of IS NOT NULL;
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    description VARCHAR(500),
    cost_center_id UUID,
    party_id UUID REFERENCES parties(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (journal_entry_id, line_number),
    CONSTRAINT chk_line_line_number CHECK (line_number >= 1),
    CONSTRAINT chk_line_one_side CHECK (
        (debit > 0 AND credit = 0) OR (debit = 0 AND credit > 0)
    )
);

CREATE INDEX idx_jl_account ON journal_lines(account_id);
";

const SALES_ORDERS_SQL: &str = r"
CREATE TABLE sales_orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    order_number VARCHAR(100) NOT NULL,
    party_id UUID NOT NULL REFERENCES parties(id),
    order_date DATE NOT NULL,
    total_amount NUMERIC(19, 2) NOT NULL,
    status order_status NOT NULL DEFAULT 'draft',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, order_number)
);

CREATE INDEX idx_so_party_status ON sales_orders(party_id, status);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    kind invoice_kind NOT NULL,
    invoice_number VARCHAR(100) NOT NULL,
    party_id UUID NOT NULL REFERENCES parties(id),
    invoice_date DATE NOT NULL,
    due_date DATE,
    taxable_amount NUMERIC(19, 2) NOT NULL,
    tax_amount NUMERIC(19, 2) NOT NULL,
    total_amount NUMERIC(19, 2) NOT NULL,
    paid_amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
    balance_amount NUMERIC(19, 2) NOT NULL,
    status invoice_status NOT NULL DEFAULT 'draft',
    journal_entry_id UUID REFERENCES journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, kind, invoice_number),
    CONSTRAINT chk_invoice_balance CHECK (balance_amount = total_amount - paid_amount),
    CONSTRAINT chk_invoice_paid_range CHECK (paid_amount >= 0 AND paid_amount <= total_amount)
);

CREATE INDEX idx_invoices_open ON invoices(party_id, kind, invoice_date)
    WHERE balance_amount > 0;
";

const INVOICE_LINES_SQL: &str = r"
CREATE TABLE invoice_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    item_id UUID NOT NULL REFERENCES items(id),
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 6) NOT NULL,
    discount_percent NUMERIC(5, 2) NOT NULL DEFAULT 0,
    tax_percent NUMERIC(5, 2) NOT NULL DEFAULT 0,
    price_includes_tax BOOLEAN NOT NULL DEFAULT false,
    taxable_amount NUMERIC(19, 2) NOT NULL,
    tax_amount NUMERIC(19, 2) NOT NULL,
    total_amount NUMERIC(19, 2) NOT NULL,
    cost_amount NUMERIC(19, 6),
    UNIQUE (invoice_id, line_number),
    CONSTRAINT chk_invoice_line_quantity CHECK (quantity > 0)
);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    payment_number VARCHAR(100) NOT NULL,
    kind payment_kind NOT NULL,
    party_id UUID NOT NULL REFERENCES parties(id),
    payment_date DATE NOT NULL,
    amount NUMERIC(19, 2) NOT NULL,
    allocated_amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
    unallocated_amount NUMERIC(19, 2) NOT NULL,
    journal_entry_id UUID REFERENCES journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, payment_number),
    CONSTRAINT chk_payment_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_payment_allocation_split CHECK (allocated_amount + unallocated_amount = amount),
    CONSTRAINT chk_payment_unallocated_non_negative CHECK (unallocated_amount >= 0)
);
";

const PAYMENT_ALLOCATIONS_SQL: &str = r"
CREATE TABLE payment_allocations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    payment_id UUID NOT NULL REFERENCES payments(id),
    invoice_id UUID NOT NULL REFERENCES invoices(id),
    amount NUMERIC(19, 2) NOT NULL,
    allocation_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_allocation_positive CHECK (amount > 0)
);

CREATE INDEX idx_pa_payment ON payment_allocations(payment_id);
CREATE INDEX idx_pa_invoice ON payment_allocations(invoice_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_journal_balance
-- Lines must match the header totals and balance within 0.01
-- ============================================================
CREATE OR REPLACE FUNCTION check_journal_balance()
RETURNS TRIGGER AS $$
DECLARE
    line_count INTEGER;
    line_debit NUMERIC(19, 2);
    line_credit NUMERIC(19, 2);
    header_debit NUMERIC(19, 2);
    header_credit NUMERIC(19, 2);
BEGIN
    SELECT total_debit, total_credit
    INTO header_debit, header_credit
    FROM journal_entries
    WHERE id = NEW.journal_entry_id;

    SELECT
        COUNT(*),
        COALESCE(SUM(debit), 0),
        COALESCE(SUM(credit), 0)
    INTO line_count, line_debit, line_credit
    FROM journal_lines
    WHERE journal_entry_id = NEW.journal_entry_id;

    IF line_count < 2 THEN
        RAISE EXCEPTION 'Journal entry % needs at least 2 lines', NEW.journal_entry_id;
    END IF;

    IF line_debit <> header_debit OR line_credit <> header_credit THEN
        RAISE EXCEPTION 'Journal lines do not match header. Lines: %/%, Header: %/%',
            line_debit, line_credit, header_debit, header_credit;
    END IF;

    IF ABS(line_debit - line_credit) > 0.01 THEN
        RAISE EXCEPTION 'Journal entry is not balanced. Debit: %, Credit: %',
            line_debit, line_credit;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_journal_balance
AFTER INSERT ON journal_lines
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_journal_balance();

-- ============================================================
-- FUNCTION: prevent_posted_journal_modification
-- Posted entries may only flip to reversed; reversed entries are frozen
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_journal_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        IF OLD.status <> 'draft' THEN
            RAISE EXCEPTION 'Cannot delete % journal entry %. Create a reversing entry instead.',
                OLD.status, OLD.id;
        END IF;
        RETURN OLD;
    END IF;

    IF OLD.status = 'reversed' THEN
        RAISE EXCEPTION 'Cannot modify reversed journal entry %', OLD.id;
    END IF;

    IF OLD.status = 'posted' AND (
        NEW.status NOT IN ('posted', 'reversed')
        OR NEW.total_debit <> OLD.total_debit
        OR NEW.total_credit <> OLD.total_credit
        OR NEW.entry_date <> OLD.entry_date
        OR NEW.entry_number <> OLD.entry_number
        OR NEW.company_id <> OLD.company_id
    ) THEN
        RAISE EXCEPTION 'Cannot modify posted journal entry %. Create a reversing entry instead.',
            OLD.id;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_journal_mod
BEFORE UPDATE OR DELETE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_journal_modification();

-- ============================================================
-- FUNCTION: prevent_journal_line_modification
-- Lines are never updated; they go only with a draft entry
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_journal_line_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'UPDATE' THEN
        RAISE EXCEPTION 'Journal lines are immutable';
    END IF;

    IF EXISTS (
        SELECT 1 FROM journal_entries
        WHERE id = OLD.journal_entry_id AND status <> 'draft'
    ) THEN
        RAISE EXCEPTION 'Cannot delete lines of a posted journal entry';
    END IF;

    RETURN OLD;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_journal_line_mod
BEFORE UPDATE OR DELETE ON journal_lines
FOR EACH ROW
EXECUTE FUNCTION prevent_journal_line_modification();

-- ============================================================
-- FUNCTION: prevent_append_only_modification
-- Audit tables accept inserts only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_append_only_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION '% is append-only', TG_TABLE_NAME;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_stock_transactions_append_only
BEFORE UPDATE OR DELETE ON stock_transactions
FOR EACH ROW
EXECUTE FUNCTION prevent_append_only_modification();

CREATE TRIGGER trg_payment_allocations_append_only
BEFORE UPDATE OR DELETE ON payment_allocations
FOR EACH ROW
EXECUTE FUNCTION prevent_append_only_modification();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop triggers
DROP TRIGGER IF EXISTS trg_payment_allocations_append_only ON payment_allocations;
DROP TRIGGER IF EXISTS trg_stock_transactions_append_only ON stock_transactions;
DROP TRIGGER IF EXISTS trg_prevent_journal_line_mod ON journal_lines;
DROP TRIGGER IF EXISTS trg_prevent_posted_journal_mod ON journal_entries;
DROP TRIGGER IF EXISTS trg_check_journal_balance ON journal_lines;

-- Drop functions
DROP FUNCTION IF EXISTS prevent_append_only_modification();
DROP FUNCTION IF EXISTS prevent_journal_line_modification();
DROP FUNCTION IF EXISTS prevent_posted_journal_modification();
DROP FUNCTION IF EXISTS check_journal_balance();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS payment_allocations CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS invoice_lines CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS sales_orders CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS stock_transactions CASCADE;
DROP TABLE IF EXISTS stock_ledgers CASCADE;
DROP TABLE IF EXISTS number_allocation_logs CASCADE;
DROP TABLE IF EXISTS number_series CASCADE;
DROP TABLE IF EXISTS parties CASCADE;
DROP TABLE IF EXISTS items CASCADE;
DROP TABLE IF EXISTS warehouses CASCADE;
DROP TABLE IF EXISTS gl_account_mappings CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS companies CASCADE;

-- Drop enums
DROP TYPE IF EXISTS payment_kind CASCADE;
DROP TYPE IF EXISTS order_status CASCADE;
DROP TYPE IF EXISTS invoice_status CASCADE;
DROP TYPE IF EXISTS invoice_kind CASCADE;
DROP TYPE IF EXISTS journal_status CASCADE;
DROP TYPE IF EXISTS movement_type CASCADE;
DROP TYPE IF EXISTS allocation_status CASCADE;
DROP TYPE IF EXISTS reset_rule CASCADE;
DROP TYPE IF EXISTS year_format CASCADE;
DROP TYPE IF EXISTS party_type CASCADE;
DROP TYPE IF EXISTS account_type CASCADE;
";
