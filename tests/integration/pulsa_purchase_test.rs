// Instant pulsa/data purchases and the operator-filtered catalog

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::{TestHarness, INSTANT_ADMIN_FEE};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use skuypay::core::AppError;
use skuypay::modules::billing::services::PulsaPurchaseRequest;
use skuypay::modules::billing::{ProductDetail, ProductType, TransactionStatus};
use skuypay::modules::catalog::models::PulsaProductQuery;

fn purchase(product_id: &str, phone_number: &str) -> PulsaPurchaseRequest {
    PulsaPurchaseRequest {
        product_id: product_id.to_string(),
        phone_number: phone_number.to_string(),
        discount_id: None,
    }
}

#[tokio::test]
async fn test_pulsa_purchase_settles_immediately() {
    let h = TestHarness::new();
    let user = h.add_user(100_000);
    let package = h.add_pulsa("pulsa", "Telkomsel", 25_000, true);

    let tx = h
        .billing
        .purchase_pulsa(&user, purchase(&package.id, "081234567890"))
        .await
        .expect("purchase should succeed");

    assert!(Uuid::parse_str(&tx.id).is_ok(), "instant purchases use uuid ids");
    assert_eq!(tx.status, TransactionStatus::Successful);
    assert_eq!(tx.product_type, ProductType::Pulsa);
    assert_eq!(tx.price, dec!(25000));
    assert_eq!(tx.admin_fee, Decimal::new(INSTANT_ADMIN_FEE, 0));
    assert_eq!(tx.total_price, dec!(27500));
    assert_eq!(h.balance(&user), dec!(72500));

    match &tx.product_detail {
        ProductDetail::Pulsa(detail) => {
            assert_eq!(detail.phone_number, "081234567890");
            assert_eq!(detail.package_id, package.id);
            assert_eq!(detail.provider, "Telkomsel");
        }
        other => panic!("unexpected detail: {:?}", other),
    }

    let stored = h.store.transaction(&tx.id).unwrap();
    assert_eq!(stored.status, TransactionStatus::Successful);
    assert_eq!(h.biller.inquiry_count(), 0, "packages are priced from the catalog");
}

#[tokio::test]
async fn test_data_package_recorded_as_data() {
    let h = TestHarness::new();
    let user = h.add_user(100_000);
    let package = h.add_pulsa("data", "XL", 50_000, true);

    let tx = h
        .billing
        .purchase_pulsa(&user, purchase(&package.id, "087812345678"))
        .await
        .unwrap();

    assert_eq!(tx.product_type, ProductType::Data);
    assert_eq!(h.balance(&user), dec!(47500));
}

#[tokio::test]
async fn test_insufficient_balance_records_nothing() {
    let h = TestHarness::new();
    let user = h.add_user(1_000);
    let package = h.add_pulsa("pulsa", "Telkomsel", 25_000, true);

    let err = h
        .billing
        .purchase_pulsa(&user, purchase(&package.id, "081234567890"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientFunds(_)));
    assert_eq!(h.store.transaction_count(), 0);
    assert_eq!(h.balance(&user), dec!(1000));
}

#[tokio::test]
async fn test_inactive_package_not_found() {
    let h = TestHarness::new();
    let user = h.add_user(100_000);
    let package = h.add_pulsa("pulsa", "Telkomsel", 25_000, false);

    let err = h
        .billing
        .purchase_pulsa(&user, purchase(&package.id, "081234567890"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(h.balance(&user), dec!(100000));
}

#[tokio::test]
async fn test_invalid_phone_number_rejected() {
    let h = TestHarness::new();
    let user = h.add_user(100_000);
    let package = h.add_pulsa("pulsa", "Telkomsel", 25_000, true);

    for phone in ["12345", "81234567890", "0812-3456-789", "0812345678901234"] {
        let err = h
            .billing
            .purchase_pulsa(&user, purchase(&package.id, phone))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Validation(_)),
            "phone {:?} should be rejected",
            phone
        );
    }
    assert_eq!(h.store.transaction_count(), 0);
}

#[tokio::test]
async fn test_unknown_user_unauthorized() {
    let h = TestHarness::new();
    let package = h.add_pulsa("pulsa", "Telkomsel", 25_000, true);

    let err = h
        .billing
        .purchase_pulsa("ghost", purchase(&package.id, "081234567890"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_discount_applies_to_instant_purchase() {
    let h = TestHarness::new();
    let user = h.add_user(100_000);
    let package = h.add_pulsa("pulsa", "Telkomsel", 25_000, true);
    let discount = h.add_discount(5_000);

    let request = PulsaPurchaseRequest {
        discount_id: Some(discount.id.clone()),
        ..purchase(&package.id, "081234567890")
    };
    let tx = h.billing.purchase_pulsa(&user, request).await.unwrap();

    assert_eq!(tx.discount_price, dec!(5000));
    assert_eq!(tx.total_price, dec!(22500));
    assert_eq!(h.balance(&user), dec!(77500));
}

#[tokio::test]
async fn test_purchase_sends_receipt() {
    let h = TestHarness::new();
    let user = h.add_user(100_000);
    let package = h.add_pulsa("pulsa", "Telkomsel", 10_000, true);

    let tx = h
        .billing
        .purchase_pulsa(&user, purchase(&package.id, "081234567890"))
        .await
        .unwrap();

    let receipts = h.notifier.wait_for(1).await;
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].order_id, tx.id);
    assert_eq!(receipts[0].product_type, ProductType::Pulsa);
}

#[tokio::test]
async fn test_catalog_filters_by_phone_operator() {
    let h = TestHarness::new();
    h.add_pulsa("pulsa", "Telkomsel", 10_000, true);
    h.add_pulsa("data", "Telkomsel", 50_000, true);
    h.add_pulsa("pulsa", "Telkomsel", 20_000, false);
    h.add_pulsa("pulsa", "XL", 10_000, true);

    let packages = h
        .catalog
        .list_pulsa(PulsaProductQuery {
            phone_number: Some("081298765432".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(packages.len(), 2);
    assert!(packages.iter().all(|p| p.provider == "Telkomsel" && p.is_active));

    let pulsa_only = h
        .catalog
        .list_pulsa(PulsaProductQuery {
            phone_number: Some("081298765432".to_string()),
            kind: Some("pulsa".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pulsa_only.len(), 1);
}

#[tokio::test]
async fn test_catalog_rejects_unknown_operator() {
    let h = TestHarness::new();
    h.add_pulsa("pulsa", "Telkomsel", 10_000, true);

    let err = h
        .catalog
        .list_pulsa(PulsaProductQuery {
            phone_number: Some("080012345678".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(ref msg) if msg == "provider is not supported"));
}

#[tokio::test]
async fn test_explicit_provider_overrides_phone() {
    let h = TestHarness::new();
    h.add_pulsa("pulsa", "Telkomsel", 10_000, true);
    h.add_pulsa("pulsa", "XL", 10_000, true);

    let packages = h
        .catalog
        .list_pulsa(PulsaProductQuery {
            phone_number: Some("081298765432".to_string()),
            provider: Some("XL".to_string()),
            kind: None,
        })
        .await
        .unwrap();

    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].provider, "XL");
}
