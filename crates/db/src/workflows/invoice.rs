//! Sales and purchase invoice posting.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, TransactionTrait};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use folio_core::costing::MovementType;
use folio_core::ledger::{JournalLineInput, JournalMetadata};
use folio_core::numbering::EntityType;
use folio_core::receivables::{CreditCheck, InvoiceKind, InvoiceStatus};
use folio_core::tax::{DocumentTotals, LineInput, TaxCalculator, TaxMode, TaxSplit};

use super::{DocumentWorkflows, WorkflowError, find_party, journal_lines};
use crate::entities::{invoice_lines, invoices};
use crate::error::FromDbErr;
use crate::repositories::{
    AccountResolver, CreditExposureCalculator, SequenceAllocator, StockMovement,
};
use crate::retry::with_retry;

/// One priced line of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceLine {
    /// Item sold or bought.
    pub item_id: Uuid,
    /// Warehouse the stock leaves or enters.
    pub warehouse_id: Uuid,
    /// Quantity, positive.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Discount percentage.
    pub discount_percent: Decimal,
    /// Tax percentage.
    pub tax_percent: Decimal,
    /// Whether `unit_price` includes tax.
    pub price_includes_tax: bool,
}

impl InvoiceLine {
    /// Creates an undiscounted, tax-exclusive line.
    #[must_use]
    pub const fn new(
        item_id: Uuid,
        warehouse_id: Uuid,
        quantity: Decimal,
        unit_price: Decimal,
        tax_percent: Decimal,
    ) -> Self {
        Self {
            item_id,
            warehouse_id,
            quantity,
            unit_price,
            discount_percent: Decimal::ZERO,
            tax_percent,
            price_includes_tax: false,
        }
    }

    /// Sets a discount percentage.
    #[must_use]
    pub const fn with_discount(mut self, discount_percent: Decimal) -> Self {
        self.discount_percent = discount_percent;
        self
    }

    /// Marks the unit price as tax inclusive.
    #[must_use]
    pub const fn tax_inclusive(mut self) -> Self {
        self.price_includes_tax = true;
        self
    }

    const fn tax_input(&self) -> LineInput {
        LineInput {
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            tax_percent: self.tax_percent,
            mode: if self.price_includes_tax {
                TaxMode::Inclusive
            } else {
                TaxMode::Exclusive
            },
        }
    }
}

/// An invoice to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceInput {
    /// Company.
    pub company_id: Uuid,
    /// Customer or supplier.
    pub party_id: Uuid,
    /// Accounting date.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Lines in document order.
    pub lines: Vec<InvoiceLine>,
}

/// A posted invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedInvoice {
    /// Invoice ID.
    pub invoice_id: Uuid,
    /// Allocated document number.
    pub invoice_number: String,
    /// Journal entry recording the invoice, absent when every amount is zero.
    pub journal_entry_id: Option<Uuid>,
    /// Taxable, tax and total amounts.
    pub totals: DocumentTotals,
    /// Inventory value moved by the invoice.
    pub stock_value: Decimal,
    /// Credit check for sales invoices. Advisory only.
    pub credit_check: Option<CreditCheck>,
}

const fn entity_type(kind: InvoiceKind) -> EntityType {
    match kind {
        InvoiceKind::Sales => EntityType::SalesInvoice,
        InvoiceKind::Purchase => EntityType::PurchaseInvoice,
    }
}

const fn source_type(kind: InvoiceKind) -> &'static str {
    match kind {
        InvoiceKind::Sales => "sales_invoice",
        InvoiceKind::Purchase => "purchase_invoice",
    }
}

/// Stock movement of one invoice line. Purchased stock is valued at exactly
/// the line's taxable amount, the figure debited to inventory.
fn line_movement(
    kind: InvoiceKind,
    input: &InvoiceInput,
    line: &InvoiceLine,
    split: &TaxSplit,
    invoice_id: Uuid,
) -> StockMovement {
    let movement_type = match kind {
        InvoiceKind::Sales => MovementType::Issue,
        InvoiceKind::Purchase => MovementType::Receipt,
    };
    let movement = StockMovement::new(
        input.company_id,
        line.warehouse_id,
        line.item_id,
        movement_type,
        line.quantity,
        input.invoice_date,
    )
    .with_reference(source_type(kind), invoice_id);

    match kind {
        InvoiceKind::Sales => movement,
        InvoiceKind::Purchase => movement.with_value(split.taxable_amount),
    }
}

impl DocumentWorkflows {
    /// Posts a sales invoice: stock issue, revenue, tax and COGS entries.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; nothing is persisted.
    #[instrument(skip_all, fields(company_id = %input.company_id, party_id = %input.party_id))]
    pub async fn post_sales_invoice(
        &self,
        input: &InvoiceInput,
    ) -> Result<PostedInvoice, WorkflowError> {
        self.post_invoice(InvoiceKind::Sales, input).await
    }

    /// Posts a purchase invoice: stock receipt at net cost and the payable.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; nothing is persisted.
    #[instrument(skip_all, fields(company_id = %input.company_id, party_id = %input.party_id))]
    pub async fn post_purchase_invoice(
        &self,
        input: &InvoiceInput,
    ) -> Result<PostedInvoice, WorkflowError> {
        self.post_invoice(InvoiceKind::Purchase, input).await
    }

    async fn post_invoice(
        &self,
        kind: InvoiceKind,
        input: &InvoiceInput,
    ) -> Result<PostedInvoice, WorkflowError> {
        with_retry(
            self.retry.max_attempts,
            source_type(kind),
            move || async move {
                let txn = self.db.begin().await.map_err(WorkflowError::from_db)?;
                let posted = self.post_invoice_in(&txn, kind, input).await?;
                txn.commit().await.map_err(WorkflowError::from_db)?;
                Ok(posted)
            },
        )
        .await
    }

    async fn post_invoice_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        kind: InvoiceKind,
        input: &InvoiceInput,
    ) -> Result<PostedInvoice, WorkflowError> {
        if input.lines.is_empty() {
            return Err(WorkflowError::EmptyDocument);
        }

        let tax_inputs: Vec<LineInput> = input.lines.iter().map(InvoiceLine::tax_input).collect();
        let (splits, totals) = TaxCalculator::document(&tax_inputs)?;

        find_party(conn, input.company_id, input.party_id).await?;

        let credit_check = match kind {
            InvoiceKind::Sales => {
                let check = CreditExposureCalculator::check_exposure_in(
                    conn,
                    input.company_id,
                    input.party_id,
                    totals.total_amount,
                )
                .await?;
                if !check.allowed {
                    warn!(party_id = %input.party_id, message = %check.message, "Credit limit exceeded");
                }
                Some(check)
            }
            InvoiceKind::Purchase => None,
        };

        let accounts = AccountResolver::resolve_in(conn, input.company_id).await?;
        let number = self
            .sequences
            .allocate(input.company_id, entity_type(kind), input.invoice_date)
            .await?;

        let invoice_id = Uuid::now_v7();
        let mut line_costs = Vec::with_capacity(input.lines.len());
        for (line, split) in input.lines.iter().zip(&splits) {
            let movement = line_movement(kind, input, line, split, invoice_id);
            let result = self.costing.record_movement_in(conn, &movement).await?;
            line_costs.push(result.total_cost);
        }
        let stock_value: Decimal = line_costs.iter().copied().sum();

        let journal: Vec<JournalLineInput> = match kind {
            InvoiceKind::Sales => {
                journal_lines::sales_invoice(&accounts, input.party_id, &totals, stock_value)
            }
            InvoiceKind::Purchase => {
                journal_lines::purchase_invoice(&accounts, input.party_id, &totals)
            }
        };
        let metadata = JournalMetadata::from_source(
            input.invoice_date,
            format!("Invoice {}", number.number),
            source_type(kind),
            invoice_id,
        );
        // A free line of a zero-cost item moves nothing in the ledger.
        let journal_entry_id = if journal.is_empty() {
            None
        } else {
            let entry = self
                .posting
                .post_in(conn, input.company_id, &journal, &metadata)
                .await?;
            Some(entry.id)
        };

        let now = Utc::now();
        invoices::ActiveModel {
            id: Set(invoice_id),
            company_id: Set(input.company_id),
            kind: Set(kind.into()),
            invoice_number: Set(number.number.clone()),
            party_id: Set(input.party_id),
            invoice_date: Set(input.invoice_date),
            due_date: Set(input.due_date),
            taxable_amount: Set(totals.taxable_amount),
            tax_amount: Set(totals.tax_amount),
            total_amount: Set(totals.total_amount),
            paid_amount: Set(Decimal::ZERO),
            balance_amount: Set(totals.total_amount),
            status: Set(InvoiceStatus::Issued.into()),
            journal_entry_id: Set(journal_entry_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(conn)
        .await
        .map_err(WorkflowError::from_db)?;

        for (index, ((line, split), cost)) in
            input.lines.iter().zip(&splits).zip(&line_costs).enumerate()
        {
            invoice_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                invoice_id: Set(invoice_id),
                line_number: Set(i32::try_from(index + 1).unwrap_or(i32::MAX)),
                item_id: Set(line.item_id),
                warehouse_id: Set(line.warehouse_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                discount_percent: Set(line.discount_percent),
                tax_percent: Set(line.tax_percent),
                price_includes_tax: Set(line.price_includes_tax),
                taxable_amount: Set(split.taxable_amount),
                tax_amount: Set(split.tax_amount),
                total_amount: Set(split.total_amount),
                cost_amount: Set(Some(*cost)),
            }
            .insert(conn)
            .await
            .map_err(WorkflowError::from_db)?;
        }

        SequenceAllocator::confirm_in(conn, number.allocation_id, invoice_id).await?;

        info!(
            invoice_id = %invoice_id,
            invoice_number = %number.number,
            journal_entry_id = ?journal_entry_id,
            "Invoice posted"
        );

        Ok(PostedInvoice {
            invoice_id,
            invoice_number: number.number,
            journal_entry_id,
            totals,
            stock_value,
            credit_check,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_builder_sets_tax_mode() {
        let line = InvoiceLine::new(Uuid::nil(), Uuid::nil(), dec!(2), dec!(105), dec!(5))
            .with_discount(dec!(10))
            .tax_inclusive();
        let input = line.tax_input();
        assert_eq!(input.mode, TaxMode::Inclusive);
        assert_eq!(input.discount_percent, dec!(10));
    }

    fn input(line: InvoiceLine) -> InvoiceInput {
        InvoiceInput {
            company_id: Uuid::nil(),
            party_id: Uuid::nil(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            due_date: None,
            lines: vec![line],
        }
    }

    #[test]
    fn test_purchase_movement_valued_at_taxable_amount() {
        let line = InvoiceLine::new(Uuid::nil(), Uuid::nil(), dec!(3), dec!(10.50), dec!(5))
            .tax_inclusive();
        let split = TaxCalculator::line(&line.tax_input()).unwrap();
        // 31.50 inclusive of 5% is 30.00 taxable.
        assert_eq!(split.taxable_amount, dec!(30.00));

        let movement = line_movement(InvoiceKind::Purchase, &input(line), &line, &split, Uuid::nil());
        assert_eq!(movement.movement_type, MovementType::Receipt);
        assert_eq!(movement.value, Some(dec!(30.00)));
        assert_eq!(movement.unit_cost, None);
    }

    #[test]
    fn test_sales_movement_leaves_at_average() {
        let line = InvoiceLine::new(Uuid::nil(), Uuid::nil(), dec!(3), dec!(10), dec!(5));
        let split = TaxCalculator::line(&line.tax_input()).unwrap();

        let movement = line_movement(InvoiceKind::Sales, &input(line), &line, &split, Uuid::nil());
        assert_eq!(movement.movement_type, MovementType::Issue);
        assert_eq!(movement.value, None);
        assert_eq!(movement.reference_type.as_deref(), Some("sales_invoice"));
    }

    #[test]
    fn test_number_series_per_invoice_kind() {
        assert_eq!(entity_type(InvoiceKind::Sales), EntityType::SalesInvoice);
        assert_eq!(entity_type(InvoiceKind::Purchase), EntityType::PurchaseInvoice);
        assert_eq!(source_type(InvoiceKind::Purchase), "purchase_invoice");
    }
}
