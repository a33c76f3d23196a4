// Settlement against a real MySQL schema
//
// Run with: TEST_DATABASE_URL=mysql://... cargo test --test mysql_settlement_test -- --ignored

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use helpers::{cleanup_user, create_test_pool, electricity_quote, seed_user, RecordingNotifier, StubBiller};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::MySqlPool;
use uuid::Uuid;

use skuypay::core::BillingPeriod;
use skuypay::modules::billing::models::ElectricityDetail;
use skuypay::modules::billing::services::{BillProduct, InquiryRequest, TariffCalculator};
use skuypay::modules::billing::{
    BillingService, MySqlTransactionRepository, ProductDetail, ProductType, Transaction,
    TransactionRepository, TransactionStatus,
};
use skuypay::modules::catalog::{CatalogService, MySqlBankRepository, MySqlProductRepository};
use skuypay::modules::discounts::{DiscountService, MySqlDiscountRepository};
use skuypay::modules::wallet::models::{SettlementOutcome, SettlementRequest, TopUpCallback};
use skuypay::modules::wallet::{MySqlWalletRepository, WalletLedger};

struct MySqlHarness {
    pool: MySqlPool,
    transactions: Arc<MySqlTransactionRepository>,
    ledger: Arc<WalletLedger>,
    billing: BillingService,
}

impl MySqlHarness {
    async fn new() -> Self {
        let pool = create_test_pool().await;
        let transactions = Arc::new(MySqlTransactionRepository::new(pool.clone()));
        let ledger = Arc::new(WalletLedger::new(Arc::new(MySqlWalletRepository::new(
            pool.clone(),
        ))));
        let billing = BillingService::new(
            transactions.clone(),
            ledger.clone(),
            Arc::new(DiscountService::new(Arc::new(MySqlDiscountRepository::new(
                pool.clone(),
            )))),
            Arc::new(CatalogService::new(
                Arc::new(MySqlBankRepository::new(pool.clone())),
                Arc::new(MySqlProductRepository::new(pool.clone())),
            )),
            Arc::new(StubBiller::new(electricity_quote())),
            Arc::new(RecordingNotifier::default()),
        );

        Self {
            pool,
            transactions,
            ledger,
            billing,
        }
    }
}

/// Random 12-digit customer number that passes validation
fn customer_id() -> String {
    format!("{:011}1", Uuid::new_v4().as_u128() % 100_000_000_000)
}

fn pending_bill(user_id: &str, customer_id: &str) -> Transaction {
    let pricing = TariffCalculator::new()
        .compose(dec!(100000), dec!(7500), Decimal::ZERO)
        .unwrap();

    Transaction::new(
        format!("POSTPAID-{}", Uuid::new_v4().simple()),
        user_id.to_string(),
        TransactionStatus::Unpaid,
        ProductType::Electricity,
        ProductDetail::Electricity(ElectricityDetail {
            customer_id: customer_id.to_string(),
            customer_name: "Siti Rahma".to_string(),
            product_code: "PLN-POSTPAID".to_string(),
            period: Some(BillingPeriod::current()),
            electrical_power: 1300,
            usage_amount: dec!(100000),
            token: None,
            discount_id: None,
            biller_reference: "OY-test".to_string(),
        }),
        "Electricity bill".to_string(),
        pricing,
    )
    .unwrap()
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_inquiry_and_payment_persist() {
    let h = MySqlHarness::new().await;
    let user = seed_user(&h.pool, 1_000_000).await;
    let customer = customer_id();

    let tx = h
        .billing
        .inquire(
            &user,
            BillProduct::ElectricityPostpaid,
            InquiryRequest {
                customer_id: customer.clone(),
                product_id: "PLN-POSTPAID".to_string(),
                discount_id: None,
                amount: Decimal::ZERO,
            },
        )
        .await
        .unwrap();

    let stored = h.transactions.find_by_id(&tx.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Unpaid);
    assert_eq!(stored.product_detail, tx.product_detail);

    let guarded = h
        .transactions
        .find_by_period_and_customer(ProductType::Electricity, &BillingPeriod::current(), &customer)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(guarded.id, tx.id);

    h.billing.pay(&user, &tx.id).await.unwrap();

    let settled = h.transactions.find_by_id(&tx.id).await.unwrap().unwrap();
    assert_eq!(settled.status, TransactionStatus::Successful);
    assert_eq!(h.ledger.balance(&user).await.unwrap(), dec!(892500));

    cleanup_user(&h.pool, &user).await;
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_settled_key_allows_one_settlement_per_bill() {
    let h = MySqlHarness::new().await;
    let first_user = seed_user(&h.pool, 200_000).await;
    let second_user = seed_user(&h.pool, 200_000).await;
    let customer = customer_id();

    let first = h
        .transactions
        .create(&pending_bill(&first_user, &customer))
        .await
        .unwrap();
    let second = h
        .transactions
        .create(&pending_bill(&second_user, &customer))
        .await
        .unwrap();

    let outcome = h
        .ledger
        .settle(&SettlementRequest {
            user_id: first_user.clone(),
            transaction_id: first.id.clone(),
            product_detail: first.product_detail.clone(),
        })
        .await
        .unwrap();
    assert!(matches!(outcome, SettlementOutcome::Settled { .. }));

    let outcome = h
        .ledger
        .settle(&SettlementRequest {
            user_id: second_user.clone(),
            transaction_id: second.id.clone(),
            product_detail: second.product_detail.clone(),
        })
        .await
        .unwrap();
    assert_eq!(outcome, SettlementOutcome::BillAlreadySettled);

    assert_eq!(h.ledger.balance(&first_user).await.unwrap(), dec!(92500));
    assert_eq!(h.ledger.balance(&second_user).await.unwrap(), dec!(200000));
    assert_eq!(
        h.transactions.find_by_id(&second.id).await.unwrap().unwrap().status,
        TransactionStatus::Unpaid
    );

    cleanup_user(&h.pool, &first_user).await;
    cleanup_user(&h.pool, &second_user).await;
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_settlement_rejects_insufficient_balance() {
    let h = MySqlHarness::new().await;
    let user = seed_user(&h.pool, 10_000).await;
    let bill = h
        .transactions
        .create(&pending_bill(&user, &customer_id()))
        .await
        .unwrap();

    let outcome = h
        .ledger
        .settle(&SettlementRequest {
            user_id: user.clone(),
            transaction_id: bill.id.clone(),
            product_detail: bill.product_detail.clone(),
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SettlementOutcome::InsufficientFunds {
            balance: dec!(10000)
        }
    );
    assert_eq!(h.ledger.balance(&user).await.unwrap(), dec!(10000));

    cleanup_user(&h.pool, &user).await;
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_top_up_is_idempotent_in_storage() {
    let h = MySqlHarness::new().await;
    let user = seed_user(&h.pool, 0).await;
    let trx_id = format!("trx-{}", Uuid::new_v4().simple());

    let callback = TopUpCallback {
        trx_id: trx_id.clone(),
        partner_user_id: user.clone(),
        va_number: "9881234567".to_string(),
        amount: dec!(75000),
        success: true,
        username_display: None,
        tx_date: None,
        settlement_status: None,
    };

    let first = h.ledger.top_up(callback.clone()).await.unwrap();
    let replay = h.ledger.top_up(callback).await.unwrap();

    assert!(!first.duplicate);
    assert!(replay.duplicate);
    assert_eq!(h.ledger.balance(&user).await.unwrap(), dec!(75000));

    cleanup_user(&h.pool, &user).await;
}
