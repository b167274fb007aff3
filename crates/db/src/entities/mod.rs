//! `SeaORM` entity definitions.

pub mod accounts;
pub mod companies;
pub mod gl_account_mappings;
pub mod invoice_lines;
pub mod invoices;
pub mod items;
pub mod journal_entries;
pub mod journal_lines;
pub mod number_allocation_logs;
pub mod number_series;
pub mod parties;
pub mod payment_allocations;
pub mod payments;
pub mod sales_orders;
pub mod sea_orm_active_enums;
pub mod stock_ledgers;
pub mod stock_transactions;
pub mod warehouses;
