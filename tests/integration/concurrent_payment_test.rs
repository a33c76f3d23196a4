// Racing payments, transfers and top-up replays must never double-debit

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use helpers::TestHarness;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use skuypay::core::{AppError, BillingPeriod};
use skuypay::modules::billing::models::ElectricityDetail;
use skuypay::modules::billing::services::{
    BillProduct, InquiryRequest, TariffCalculator, ALREADY_PAID_MESSAGE,
};
use skuypay::modules::billing::{ProductDetail, ProductType, Transaction, TransactionStatus};
use skuypay::modules::wallet::models::{TopUpCallback, TransferRequest};

fn inquiry(customer_id: &str) -> InquiryRequest {
    InquiryRequest {
        customer_id: customer_id.to_string(),
        product_id: "PLN-POSTPAID".to_string(),
        discount_id: None,
        amount: Decimal::ZERO,
    }
}

/// Unpaid electricity bill for the current period, inserted directly
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

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pays_debit_once() {
    let h = TestHarness::new();
    let user = h.add_user(1_000_000);

    let tx = h
        .billing
        .inquire(&user, BillProduct::ElectricityPostpaid, inquiry("12345678"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let billing = Arc::clone(&h.billing);
        let user = user.clone();
        let tx_id = tx.id.clone();
        handles.push(tokio::spawn(async move { billing.pay(&user, &tx_id).await }));
    }

    let mut settled = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(paid) => {
                assert_eq!(paid.status, TransactionStatus::Successful);
                settled += 1;
            }
            Err(e) => assert!(
                matches!(e, AppError::AlreadySettled(_)),
                "losing payment should report already paid, got {:?}",
                e
            ),
        }
    }

    assert_eq!(settled, 1, "exactly one payment must win");
    assert_eq!(h.balance(&user), dec!(892500));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_settlement_per_bill_across_users() {
    let h = TestHarness::new();
    let first_user = h.add_user(200_000);
    let second_user = h.add_user(200_000);

    let first = pending_bill(&first_user, "12345678");
    let second = pending_bill(&second_user, "12345678");
    h.store.insert_transaction(first.clone());
    h.store.insert_transaction(second.clone());

    let pay_first = {
        let billing = Arc::clone(&h.billing);
        let user = first_user.clone();
        let id = first.id.clone();
        tokio::spawn(async move { billing.pay(&user, &id).await })
    };
    let pay_second = {
        let billing = Arc::clone(&h.billing);
        let user = second_user.clone();
        let id = second.id.clone();
        tokio::spawn(async move { billing.pay(&user, &id).await })
    };

    let results = [pay_first.await.unwrap(), pay_second.await.unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);

    for result in &results {
        if let Err(e) = result {
            assert!(matches!(e, AppError::AlreadySettled(msg) if msg == ALREADY_PAID_MESSAGE));
        }
    }

    let total_left = h.balance(&first_user) + h.balance(&second_user);
    assert_eq!(total_left, dec!(292500), "only the winner is debited");

    let settled = [first.id, second.id]
        .iter()
        .filter(|id| h.store.transaction(id).unwrap().status == TransactionStatus::Successful)
        .count();
    assert_eq!(settled, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_never_overdraw() {
    let h = TestHarness::new();
    let sender = h.add_user(100_000);
    let recipient = h.add_user(0);
    let phone = h.phone_of(&recipient);

    let mut handles = Vec::new();
    for _ in 0..5 {
        let ledger = Arc::clone(&h.ledger);
        let sender = sender.clone();
        let phone = phone.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .transfer(
                    &sender,
                    TransferRequest {
                        phone_number: phone,
                        amount: dec!(30000),
                        note: None,
                    },
                )
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) => assert!(matches!(e, AppError::InsufficientFunds(_))),
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(h.balance(&sender), dec!(10000));
    assert_eq!(h.balance(&recipient), dec!(90000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_replayed_top_up_credits_once() {
    let h = TestHarness::new();
    let user = h.add_user(0);

    let callback = TopUpCallback {
        trx_id: "trx-concurrent-1".to_string(),
        partner_user_id: user.clone(),
        va_number: "9881234567".to_string(),
        amount: dec!(50000),
        success: true,
        username_display: None,
        tx_date: None,
        settlement_status: None,
    };

    let mut handles = Vec::new();
    for _ in 0..6 {
        let ledger = Arc::clone(&h.ledger);
        let callback = callback.clone();
        handles.push(tokio::spawn(async move { ledger.top_up(callback).await }));
    }

    let mut credited = 0;
    for handle in handles {
        let receipt = handle.await.unwrap().unwrap();
        assert_eq!(receipt.transaction_id, "TOPUP-trx-concurrent-1");
        if !receipt.duplicate {
            credited += 1;
        }
    }

    assert_eq!(credited, 1);
    assert_eq!(h.balance(&user), dec!(50000));
}
