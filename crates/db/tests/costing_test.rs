//! Costing ledger integration tests.

mod common;

use futures::future::join_all;
use rust_decimal_macros::dec;

use common::{Fixture, connect, date};
use folio_core::costing::{CostingError, MovementType};
use folio_db::CostingLedger;
use folio_db::repositories::StockMovement;
use folio_shared::config::CostingConfig;

fn movement(fixture: &Fixture, movement_type: MovementType, quantity: rust_decimal::Decimal) -> StockMovement {
    StockMovement::new(
        fixture.company_id,
        fixture.warehouse_id,
        fixture.item_id,
        movement_type,
        quantity,
        date(2024, 6, 1),
    )
}

#[tokio::test]
async fn test_weighted_average_receipts_and_issue() {
    let Some((db, config)) = connect().await else { return };
    let fixture = Fixture::create(&db).await;
    let ledger = CostingLedger::new(db.clone(), config.costing);

    ledger
        .record_movement(&movement(&fixture, MovementType::Receipt, dec!(10)).with_unit_cost(dec!(5)))
        .await
        .unwrap();
    let second = ledger
        .record_movement(&movement(&fixture, MovementType::Receipt, dec!(10)).with_unit_cost(dec!(7)))
        .await
        .unwrap();
    assert_eq!(second.new_quantity, dec!(20));
    assert_eq!(second.new_average_cost, dec!(6));

    // An override cost on an issue does not change the valuation.
    let issue = ledger
        .record_movement(&movement(&fixture, MovementType::Issue, dec!(5)).with_unit_cost(dec!(100)))
        .await
        .unwrap();
    assert_eq!(issue.total_cost, dec!(30));
    assert_eq!(issue.new_quantity, dec!(15));
    assert_eq!(issue.new_total_value, dec!(90));
    assert_eq!(issue.new_average_cost, dec!(6));

    let report = ledger
        .replay(fixture.company_id, fixture.warehouse_id, fixture.item_id)
        .await
        .unwrap();
    assert_eq!(report.movements, 3);
    assert!(report.matches());
}

#[tokio::test]
async fn test_receipt_without_cost_uses_master_cost_price() {
    let Some((db, config)) = connect().await else { return };
    let fixture = Fixture::create(&db).await;
    let ledger = CostingLedger::new(db.clone(), config.costing);

    let result = ledger
        .record_movement(&movement(&fixture, MovementType::Receipt, dec!(4)))
        .await
        .unwrap();
    assert_eq!(result.unit_cost, dec!(5));
    assert_eq!(result.new_total_value, dec!(20));

    let history = ledger.history(result.ledger_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].uom, "pcs");
}

#[tokio::test]
async fn test_stockout_clamps_value_and_keeps_average() {
    let Some((db, config)) = connect().await else { return };
    let fixture = Fixture::create(&db).await;
    let ledger = CostingLedger::new(db.clone(), config.costing);

    ledger
        .record_movement(&movement(&fixture, MovementType::Receipt, dec!(5)).with_unit_cost(dec!(4)))
        .await
        .unwrap();
    let overdraw = ledger
        .record_movement(&movement(&fixture, MovementType::Issue, dec!(8)))
        .await
        .unwrap();
    assert_eq!(overdraw.new_quantity, dec!(-3));
    assert_eq!(overdraw.new_total_value, dec!(0));
    assert_eq!(overdraw.new_average_cost, dec!(4));
    assert_eq!(overdraw.total_cost, dec!(32));

    let refill = ledger
        .record_movement(&movement(&fixture, MovementType::Receipt, dec!(10)).with_unit_cost(dec!(6)))
        .await
        .unwrap();
    assert_eq!(refill.new_quantity, dec!(7));
    assert_eq!(refill.new_total_value, dec!(60));
    assert_eq!(refill.new_average_cost, dec!(8.571429));

    let report = ledger
        .replay(fixture.company_id, fixture.warehouse_id, fixture.item_id)
        .await
        .unwrap();
    assert!(report.matches(), "{report:?}");
}

#[tokio::test]
async fn test_overdraw_rejected_when_negative_stock_disallowed() {
    let Some((db, _)) = connect().await else { return };
    let fixture = Fixture::create(&db).await;
    let ledger = CostingLedger::new(
        db.clone(),
        CostingConfig {
            allow_negative_stock: false,
        },
    );

    ledger
        .record_movement(&movement(&fixture, MovementType::Receipt, dec!(2)).with_unit_cost(dec!(3)))
        .await
        .unwrap();
    let err = ledger
        .record_movement(&movement(&fixture, MovementType::Issue, dec!(3)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CostingError::InsufficientStock { requested, on_hand }
            if requested == dec!(3) && on_hand == dec!(2)
    ));

    let row = ledger
        .get_ledger(fixture.company_id, fixture.warehouse_id, fixture.item_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity, dec!(2));
    assert_eq!(ledger.history(row.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_transfer_values_incoming_at_source_average() {
    let Some((db, config)) = connect().await else { return };
    let fixture = Fixture::create(&db).await;
    let ledger = CostingLedger::new(db.clone(), config.costing);

    ledger
        .record_movement(&movement(&fixture, MovementType::Receipt, dec!(10)).with_unit_cost(dec!(5)))
        .await
        .unwrap();
    let transfer = ledger
        .transfer(
            fixture.company_id,
            fixture.warehouse_id,
            fixture.second_warehouse_id,
            fixture.item_id,
            dec!(4),
            date(2024, 6, 2),
        )
        .await
        .unwrap();

    assert_eq!(transfer.outgoing.new_quantity, dec!(6));
    assert_eq!(transfer.outgoing.new_total_value, dec!(30));
    assert_eq!(transfer.incoming.new_quantity, dec!(4));
    assert_eq!(transfer.incoming.new_average_cost, dec!(5));

    let same = ledger
        .transfer(
            fixture.company_id,
            fixture.warehouse_id,
            fixture.warehouse_id,
            fixture.item_id,
            dec!(1),
            date(2024, 6, 2),
        )
        .await
        .unwrap_err();
    assert!(matches!(same, CostingError::SameWarehouseTransfer));
}

#[tokio::test]
async fn test_reserve_and_release() {
    let Some((db, config)) = connect().await else { return };
    let fixture = Fixture::create(&db).await;
    let ledger = CostingLedger::new(db.clone(), config.costing);

    ledger
        .record_movement(&movement(&fixture, MovementType::Receipt, dec!(10)).with_unit_cost(dec!(1)))
        .await
        .unwrap();

    let reserved = ledger
        .reserve(fixture.company_id, fixture.warehouse_id, fixture.item_id, dec!(4))
        .await
        .unwrap();
    assert_eq!(reserved.quantity_reserved, dec!(4));
    assert_eq!(reserved.quantity_available, dec!(6));

    let err = ledger
        .reserve(fixture.company_id, fixture.warehouse_id, fixture.item_id, dec!(7))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CostingError::InsufficientAvailable { available, .. } if available == dec!(6)
    ));

    let released = ledger
        .release(fixture.company_id, fixture.warehouse_id, fixture.item_id, dec!(10))
        .await
        .unwrap();
    assert_eq!(released.quantity_reserved, dec!(0));
    assert_eq!(released.quantity_available, dec!(10));
}

#[tokio::test]
async fn test_concurrent_receipts_keep_ledger_consistent() {
    let Some((db, config)) = connect().await else { return };
    let fixture = Fixture::create(&db).await;
    let ledger = CostingLedger::new(db.clone(), config.costing);

    let tasks = (0..20).map(|i| {
        let ledger = ledger.clone();
        let receipt = movement(&fixture, MovementType::Receipt, dec!(1))
            .with_unit_cost(rust_decimal::Decimal::from(i % 4 + 1));
        tokio::spawn(async move { ledger.record_movement(&receipt).await })
    });
    for joined in join_all(tasks).await {
        joined.unwrap().unwrap();
    }

    let report = ledger
        .replay(fixture.company_id, fixture.warehouse_id, fixture.item_id)
        .await
        .unwrap();
    assert_eq!(report.movements, 20);
    assert_eq!(report.stored.quantity, dec!(20));
    assert_eq!(report.stored.total_value, dec!(50));
    assert!(report.matches());
}
