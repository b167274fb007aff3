//! Demo data seeder for Folio development.
//!
//! Seeds a demo company with a chart of accounts, GL mappings, a warehouse,
//! items and trading partners, then runs one purchase, sale and payment
//! through the document workflows.
//!
//! Usage: cargo run --bin seeder

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use folio_core::ledger::MappingKey;
use folio_core::receivables::PaymentKind;
use folio_db::entities::{
    accounts, companies, items, parties, warehouses,
    sea_orm_active_enums::{AccountType, PartyType},
};
use folio_db::workflows::{InvoiceInput, InvoiceLine, PaymentInput};
use folio_db::{AccountResolver, DocumentWorkflows, connect};
use folio_shared::AppConfig;

/// Demo company ID (stable across runs).
const DEMO_COMPANY_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

const CHART: [(&str, &str, AccountType, MappingKey); 9] = [
    ("1000", "Cash at Bank", AccountType::Asset, MappingKey::DefaultCash),
    ("1100", "Accounts Receivable", AccountType::Asset, MappingKey::DefaultReceivable),
    ("1150", "Input Tax", AccountType::Asset, MappingKey::DefaultTaxReceivable),
    ("1200", "Inventory", AccountType::Asset, MappingKey::DefaultInventory),
    ("2000", "Accounts Payable", AccountType::Liability, MappingKey::DefaultPayable),
    ("2100", "Output Tax", AccountType::Liability, MappingKey::DefaultTaxPayable),
    ("4000", "Sales", AccountType::Revenue, MappingKey::DefaultSales),
    ("5000", "Cost of Goods Sold", AccountType::Expense, MappingKey::DefaultCogs),
    (
        "5100",
        "Inventory Adjustments",
        AccountType::Expense,
        MappingKey::DefaultInventoryAdjustment,
    ),
];

struct Demo {
    warehouse_id: Uuid,
    item_ids: Vec<Uuid>,
    customer_id: Uuid,
    supplier_id: Uuid,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=debug,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let db = connect(&config.database).await?;
    info!("Connected to database");

    if companies::Entity::find_by_id(DEMO_COMPANY_ID)
        .one(&db)
        .await?
        .is_some()
    {
        info!("Demo company already exists, skipping");
        return Ok(());
    }

    let demo = seed_master_data(&db).await?;
    run_document_cycle(DocumentWorkflows::new(db, &config), &demo).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_master_data(db: &DatabaseConnection) -> anyhow::Result<Demo> {
    companies::ActiveModel {
        id: Set(DEMO_COMPANY_ID),
        name: Set("Folio Demo Trading".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let resolver = AccountResolver::new(db.clone());
    for (code, name, account_type, key) in CHART {
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(DEMO_COMPANY_ID),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            account_type: Set(account_type),
            ..Default::default()
        }
        .insert(db)
        .await?;

        resolver
            .set_mapping(DEMO_COMPANY_ID, key, account.id)
            .await?;
    }
    info!(accounts = CHART.len(), "Seeded chart of accounts");

    let warehouse = warehouses::ActiveModel {
        id: Set(Uuid::now_v7()),
        company_id: Set(DEMO_COMPANY_ID),
        code: Set("MAIN".to_string()),
        name: Set("Main Warehouse".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut item_ids = Vec::new();
    for (sku, name, cost, price) in [
        ("CHAIR-01", "Office Chair", Decimal::new(4500, 2), Decimal::new(8900, 2)),
        ("DESK-01", "Standing Desk", Decimal::new(21000, 2), Decimal::new(39900, 2)),
    ] {
        let item = items::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(DEMO_COMPANY_ID),
            sku: Set(sku.to_string()),
            name: Set(name.to_string()),
            uom: Set("pcs".to_string()),
            cost_price: Set(Some(cost)),
            sale_price: Set(Some(price)),
            ..Default::default()
        }
        .insert(db)
        .await?;
        item_ids.push(item.id);
    }

    let customer = parties::ActiveModel {
        id: Set(Uuid::now_v7()),
        company_id: Set(DEMO_COMPANY_ID),
        name: Set("Acme Offices".to_string()),
        party_type: Set(PartyType::Customer),
        credit_limit: Set(Decimal::new(500_000, 2)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let supplier = parties::ActiveModel {
        id: Set(Uuid::now_v7()),
        company_id: Set(DEMO_COMPANY_ID),
        name: Set("Northwind Furniture".to_string()),
        party_type: Set(PartyType::Supplier),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Seeded warehouse, items and parties");

    Ok(Demo {
        warehouse_id: warehouse.id,
        item_ids,
        customer_id: customer.id,
        supplier_id: supplier.id,
    })
}

async fn run_document_cycle(workflows: DocumentWorkflows, demo: &Demo) -> anyhow::Result<()> {
    let today: NaiveDate = Utc::now().date_naive();
    let tax = Decimal::new(11, 0);

    let bill = workflows
        .post_purchase_invoice(&InvoiceInput {
            company_id: DEMO_COMPANY_ID,
            party_id: demo.supplier_id,
            invoice_date: today,
            due_date: Some(today + chrono::Duration::days(30)),
            lines: demo
                .item_ids
                .iter()
                .zip([Decimal::new(4500, 2), Decimal::new(21000, 2)])
                .map(|(item_id, cost)| {
                    InvoiceLine::new(*item_id, demo.warehouse_id, Decimal::from(20), cost, tax)
                })
                .collect(),
        })
        .await?;
    info!(number = %bill.invoice_number, total = %bill.totals.total_amount, "Purchase posted");

    let invoice = workflows
        .post_sales_invoice(&InvoiceInput {
            company_id: DEMO_COMPANY_ID,
            party_id: demo.customer_id,
            invoice_date: today,
            due_date: Some(today + chrono::Duration::days(14)),
            lines: vec![
                InvoiceLine::new(
                    demo.item_ids[0],
                    demo.warehouse_id,
                    Decimal::from(6),
                    Decimal::new(8900, 2),
                    tax,
                )
                .with_discount(Decimal::from(5)),
            ],
        })
        .await?;
    info!(
        number = %invoice.invoice_number,
        total = %invoice.totals.total_amount,
        cogs = %invoice.stock_value,
        "Sale posted"
    );

    let payment = workflows
        .receive_payment(&PaymentInput {
            company_id: DEMO_COMPANY_ID,
            party_id: demo.customer_id,
            kind: PaymentKind::Receipt,
            payment_date: today,
            amount: invoice.totals.total_amount,
        })
        .await?;
    info!(
        number = %payment.payment_number,
        allocated = %payment.allocation.allocated,
        "Payment received"
    );

    Ok(())
}
