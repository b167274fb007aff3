//! Shared fixtures for database integration tests.
//!
//! Tests run against the Postgres named by `DATABASE_URL` and skip when it
//! is unset. Every fixture creates a fresh company, so tests never share
//! rows and can run in parallel.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use tokio::sync::Mutex;
use uuid::Uuid;

use folio_core::ledger::{GlAccounts, MappingKey};
use folio_db::entities::{
    accounts, companies, gl_account_mappings, items, parties, warehouses,
    sea_orm_active_enums::{AccountType, PartyType},
};
use folio_db::migration::{Migrator, MigratorTrait};
use folio_shared::AppConfig;
use folio_shared::config::{
    CostingConfig, DatabaseConfig, NumberingConfig, RetryConfig,
};

static MIGRATED: Mutex<bool> = Mutex::const_new(false);

/// Test configuration: default policies, generous retries.
pub fn config(url: String) -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            url,
            max_connections: 20,
            min_connections: 1,
        },
        numbering: NumberingConfig::default(),
        costing: CostingConfig::default(),
        retry: RetryConfig { max_attempts: 10 },
    }
}

/// Connects and migrates, or returns `None` when no database is configured.
pub async fn connect() -> Option<(DatabaseConnection, AppConfig)> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let config = config(url);
    let db = folio_db::connect(&config.database)
        .await
        .expect("connect to DATABASE_URL");

    let mut migrated = MIGRATED.lock().await;
    if !*migrated {
        Migrator::up(&db, None).await.expect("run migrations");
        *migrated = true;
    }

    Some((db, config))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A company with a full chart of accounts and master data.
pub struct Fixture {
    pub company_id: Uuid,
    pub warehouse_id: Uuid,
    pub second_warehouse_id: Uuid,
    pub item_id: Uuid,
    pub customer_id: Uuid,
    pub supplier_id: Uuid,
    pub accounts: GlAccounts,
}

const CHART: [(MappingKey, &str, &str, AccountType); 9] = [
    (MappingKey::DefaultCash, "1000", "Cash", AccountType::Asset),
    (MappingKey::DefaultReceivable, "1100", "Accounts Receivable", AccountType::Asset),
    (MappingKey::DefaultTaxReceivable, "1150", "Input Tax", AccountType::Asset),
    (MappingKey::DefaultInventory, "1200", "Inventory", AccountType::Asset),
    (MappingKey::DefaultPayable, "2000", "Accounts Payable", AccountType::Liability),
    (MappingKey::DefaultTaxPayable, "2100", "Output Tax", AccountType::Liability),
    (MappingKey::DefaultSales, "4000", "Sales", AccountType::Revenue),
    (MappingKey::DefaultCogs, "5000", "Cost of Goods Sold", AccountType::Expense),
    (
        MappingKey::DefaultInventoryAdjustment,
        "5100",
        "Inventory Adjustments",
        AccountType::Expense,
    ),
];

impl Fixture {
    pub async fn create(db: &DatabaseConnection) -> Self {
        let company_id = Uuid::now_v7();
        companies::ActiveModel {
            id: Set(company_id),
            name: Set(format!("Test Company {company_id}")),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        let mut mapped = Vec::with_capacity(CHART.len());
        for (key, code, name, account_type) in CHART {
            let account_id = Uuid::now_v7();
            accounts::ActiveModel {
                id: Set(account_id),
                company_id: Set(company_id),
                code: Set(code.to_string()),
                name: Set(name.to_string()),
                account_type: Set(account_type),
                ..Default::default()
            }
            .insert(db)
            .await
            .unwrap();

            gl_account_mappings::ActiveModel {
                company_id: Set(company_id),
                mapping_key: Set(key.as_str().to_string()),
                account_id: Set(account_id),
                ..Default::default()
            }
            .insert(db)
            .await
            .unwrap();

            mapped.push((key, account_id));
        }

        let warehouse_id = Self::warehouse(db, company_id, "MAIN").await;
        let second_warehouse_id = Self::warehouse(db, company_id, "BRANCH").await;
        let item_id = Self::item(db, company_id, "WIDGET", Some(Decimal::new(5, 0))).await;
        let customer_id = Self::party(db, company_id, PartyType::Customer, Decimal::ZERO).await;
        let supplier_id = Self::party(db, company_id, PartyType::Supplier, Decimal::ZERO).await;

        Self {
            company_id,
            warehouse_id,
            second_warehouse_id,
            item_id,
            customer_id,
            supplier_id,
            accounts: GlAccounts::from_mappings(mapped).unwrap(),
        }
    }

    pub async fn warehouse(db: &DatabaseConnection, company_id: Uuid, code: &str) -> Uuid {
        let id = Uuid::now_v7();
        warehouses::ActiveModel {
            id: Set(id),
            company_id: Set(company_id),
            code: Set(code.to_string()),
            name: Set(format!("{code} warehouse")),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        id
    }

    pub async fn item(
        db: &DatabaseConnection,
        company_id: Uuid,
        sku: &str,
        cost_price: Option<Decimal>,
    ) -> Uuid {
        let id = Uuid::now_v7();
        items::ActiveModel {
            id: Set(id),
            company_id: Set(company_id),
            sku: Set(sku.to_string()),
            name: Set(sku.to_lowercase()),
            uom: Set("pcs".to_string()),
            cost_price: Set(cost_price),
            sale_price: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        id
    }

    pub async fn party(
        db: &DatabaseConnection,
        company_id: Uuid,
        party_type: PartyType,
        credit_limit: Decimal,
    ) -> Uuid {
        let id = Uuid::now_v7();
        parties::ActiveModel {
            id: Set(id),
            company_id: Set(company_id),
            name: Set(format!("{party_type:?} {id}")),
            party_type: Set(party_type),
            credit_limit: Set(credit_limit),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        id
    }
}
