// Discount lookup, administration and its effect on bill totals

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::TestHarness;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use skuypay::core::AppError;
use skuypay::modules::billing::services::{BillProduct, InquiryRequest};
use skuypay::modules::billing::{ProductDetail, TransactionStatus};
use skuypay::modules::discounts::models::{CreateDiscountRequest, UpdateDiscountRequest};

fn inquiry(customer_id: &str, discount_id: Option<String>) -> InquiryRequest {
    InquiryRequest {
        customer_id: customer_id.to_string(),
        product_id: "PLN-POSTPAID".to_string(),
        discount_id,
        amount: Decimal::ZERO,
    }
}

fn create_request(code: &str, price: Decimal) -> CreateDiscountRequest {
    CreateDiscountRequest {
        discount_code: code.to_string(),
        discount_price: price,
        image: None,
        description: Some("Ramadan promo".to_string()),
    }
}

#[tokio::test]
async fn test_missing_or_unknown_id_resolves_to_no_discount() {
    let h = TestHarness::new();

    for id in [None, Some(""), Some("   "), Some("no-such-discount")] {
        let discount = h.discounts.resolve_by_id(id).await.unwrap();
        assert!(discount.is_none(), "{:?} should resolve to none", id);
        assert_eq!(discount.discount_price, Decimal::ZERO);
        assert_eq!(discount.snapshot_id(), None);
    }
}

#[tokio::test]
async fn test_known_id_resolves() {
    let h = TestHarness::new();
    let stored = h.add_discount(10_000);

    let discount = h.discounts.resolve_by_id(Some(&stored.id)).await.unwrap();

    assert_eq!(discount.id, stored.id);
    assert_eq!(discount.discount_price, dec!(10000));
}

#[tokio::test]
async fn test_lookup_by_code() {
    let h = TestHarness::new();
    let stored = h.add_discount(15_000);

    let found = h.discounts.resolve_by_code(" PROMO15000 ").await.unwrap();
    assert_eq!(found.id, stored.id);

    let err = h.discounts.resolve_by_code("NOPE").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_inquiry_applies_discount_and_snapshots_it() {
    let h = TestHarness::new();
    let user = h.add_user(1_000_000);
    let discount = h.add_discount(10_000);

    let tx = h
        .billing
        .inquire(
            &user,
            BillProduct::ElectricityPostpaid,
            inquiry("12345678", Some(discount.id.clone())),
        )
        .await
        .unwrap();

    assert_eq!(tx.discount_price, dec!(10000));
    assert_eq!(tx.total_price, dec!(97500));
    match &tx.product_detail {
        ProductDetail::Electricity(detail) => {
            assert_eq!(detail.discount_id.as_deref(), Some(discount.id.as_str()))
        }
        other => panic!("unexpected detail: {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_discount_charges_full_price() {
    let h = TestHarness::new();
    let user = h.add_user(1_000_000);

    let tx = h
        .billing
        .inquire(
            &user,
            BillProduct::ElectricityPostpaid,
            inquiry("12345678", Some("expired-promo".to_string())),
        )
        .await
        .unwrap();

    assert_eq!(tx.discount_price, Decimal::ZERO);
    assert_eq!(tx.total_price, dec!(107500));
}

#[tokio::test]
async fn test_discount_larger_than_bill_makes_it_free() {
    let h = TestHarness::new();
    let user = h.add_user(0);
    let discount = h.add_discount(200_000);

    let tx = h
        .billing
        .inquire(
            &user,
            BillProduct::ElectricityPostpaid,
            inquiry("12345678", Some(discount.id)),
        )
        .await
        .unwrap();

    assert_eq!(tx.discount_price, dec!(107500));
    assert_eq!(tx.total_price, Decimal::ZERO);

    let paid = h.billing.pay(&user, &tx.id).await.unwrap();
    assert_eq!(paid.status, TransactionStatus::Successful);
    assert_eq!(h.balance(&user), Decimal::ZERO);
}

#[tokio::test]
async fn test_deleting_discount_keeps_quoted_total() {
    let h = TestHarness::new();
    let user = h.add_user(1_000_000);
    let discount = h.add_discount(10_000);

    let tx = h
        .billing
        .inquire(
            &user,
            BillProduct::ElectricityPostpaid,
            inquiry("12345678", Some(discount.id.clone())),
        )
        .await
        .unwrap();

    h.discounts.delete(&discount.id).await.unwrap();
    h.billing.pay(&user, &tx.id).await.unwrap();

    assert_eq!(h.balance(&user), dec!(902500));
}

#[tokio::test]
async fn test_admin_create_update_delete() {
    let h = TestHarness::new();

    let created = h
        .discounts
        .create(create_request("MERDEKA", dec!(17000)))
        .await
        .unwrap();
    assert_eq!(created.discount_code, "MERDEKA");

    let updated = h
        .discounts
        .update(
            &created.id,
            UpdateDiscountRequest {
                discount_price: Some(dec!(8000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.discount_price, dec!(8000));
    assert_eq!(updated.discount_code, "MERDEKA");

    h.discounts.delete(&created.id).await.unwrap();
    let err = h.discounts.get(&created.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = h.discounts.delete(&created.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_duplicate_code_conflicts() {
    let h = TestHarness::new();

    h.discounts
        .create(create_request("HEMAT", dec!(5000)))
        .await
        .unwrap();
    let err = h
        .discounts
        .create(create_request("HEMAT", dec!(7000)))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_invalid_discount_requests() {
    let h = TestHarness::new();

    for request in [
        create_request("", dec!(5000)),
        create_request("NEG", dec!(-1)),
        create_request("FRACTION", dec!(10.5)),
    ] {
        let err = h.discounts.create(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
