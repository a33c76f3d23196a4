use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::period_guard::{GuardDecision, PeriodGuard, ALREADY_PAID_MESSAGE};
use super::product_policy::{validate_customer_id, BillProduct, QuoteContext};
use super::tariff_calculator::TariffCalculator;
use crate::core::money::format_rupiah;
use crate::core::{AppError, BillingPeriod, Result};
use crate::modules::billers::{BillerGateway, BillerRequest, BillerResponse};
use crate::modules::billing::models::{
    ProductDetail, ProductType, PulsaDetail, Transaction, TransactionStatus,
};
use crate::modules::billing::repositories::TransactionRepository;
use crate::modules::catalog::models::DATA_KIND;
use crate::modules::catalog::CatalogService;
use crate::modules::discounts::DiscountService;
use crate::modules::notifications::{dispatch, Notifier, PaymentReceipt};
use crate::modules::wallet::models::{SettlementOutcome, SettlementRequest, WalletAccount};
use crate::modules::wallet::services::INSUFFICIENT_BALANCE_MESSAGE;
use crate::modules::wallet::WalletLedger;

/// Flat fee for instant pulsa/data purchases unless configured otherwise
pub const DEFAULT_INSTANT_ADMIN_FEE: i64 = 2500;

const TOKEN_DIGITS: u32 = 20;

/// Bill inquiry request
#[derive(Debug, Clone, Deserialize)]
pub struct InquiryRequest {
    pub customer_id: String,
    /// Biller product code
    pub product_id: String,
    #[serde(default)]
    pub discount_id: Option<String>,
    /// Token amount for pre-paid electricity
    #[serde(default)]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayRequest {
    pub transaction_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub transaction_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PulsaPurchaseRequest {
    pub product_id: String,
    pub phone_number: String,
    #[serde(default)]
    pub discount_id: Option<String>,
}

/// Transaction state machine shared by every product
///
/// `unpaid`/`processing` move to `successful` through a settlement or to
/// `fail` when the wallet cannot cover the total. Both are terminal.
pub struct BillingService {
    transactions: Arc<dyn TransactionRepository>,
    guard: PeriodGuard,
    ledger: Arc<WalletLedger>,
    discounts: Arc<DiscountService>,
    catalog: Arc<CatalogService>,
    biller: Arc<dyn BillerGateway>,
    notifier: Arc<dyn Notifier>,
    calculator: TariffCalculator,
    instant_admin_fee: Decimal,
}

impl BillingService {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        ledger: Arc<WalletLedger>,
        discounts: Arc<DiscountService>,
        catalog: Arc<CatalogService>,
        biller: Arc<dyn BillerGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            guard: PeriodGuard::new(transactions.clone()),
            transactions,
            ledger,
            discounts,
            catalog,
            biller,
            notifier,
            calculator: TariffCalculator::new(),
            instant_admin_fee: Decimal::new(DEFAULT_INSTANT_ADMIN_FEE, 0),
        }
    }

    pub fn with_instant_admin_fee(mut self, fee: Decimal) -> Self {
        self.instant_admin_fee = fee;
        self
    }

    /// Quote a bill and record it as a pending transaction
    ///
    /// For period-guarded products a pending transaction for the same
    /// customer and period is returned as is, without calling the biller.
    pub async fn inquire(
        &self,
        user_id: &str,
        product: BillProduct,
        request: InquiryRequest,
    ) -> Result<Transaction> {
        let customer_id = request.customer_id.trim();
        validate_customer_id(customer_id)?;

        let product_code = request.product_id.trim();
        if product_code.is_empty() {
            return Err(AppError::validation("product_id cannot be empty"));
        }

        self.require_account(user_id).await?;

        let policy = product.policy();
        let period = policy.guard_period.then(BillingPeriod::current);

        if let Some(period) = &period {
            if let GuardDecision::Replay(existing) = self
                .guard
                .check(policy.product_type, period, customer_id)
                .await?
            {
                if existing.is_owned_by(user_id) {
                    return Ok(existing);
                }
                return Err(AppError::conflict(
                    "This bill is already awaiting payment by another user",
                ));
            }
        }

        let discount = self
            .discounts
            .resolve_by_id(request.discount_id.as_deref())
            .await?;

        let transaction_id = policy.transaction_id(&Uuid::new_v4().simple().to_string());
        let biller_request = BillerRequest {
            customer_id: customer_id.to_string(),
            product_id: product_code.to_string(),
            partner_tx_id: transaction_id.clone(),
            period: period.as_ref().map(|p| p.to_string()),
            discount_id: discount.snapshot_id(),
            amount: request.amount,
        };

        let quote = self.biller.inquire(&biller_request).await?;

        let ctx = QuoteContext {
            customer_id,
            product_code,
            period: period.as_ref(),
            discount_id: discount.snapshot_id(),
            requested_amount: request.amount,
            biller: &quote,
        };

        let price = policy.price(&self.calculator, &ctx)?;
        let pricing = self
            .calculator
            .compose(price, quote.admin_fee, discount.discount_price)?;

        let transaction = Transaction::new(
            transaction_id,
            user_id.to_string(),
            policy.initial_status,
            policy.product_type,
            policy.build_detail(&ctx)?,
            policy.describe(&ctx, pricing.total_price),
            pricing,
        )?;

        let created = self.transactions.create(&transaction).await?;
        tracing::info!(
            transaction_id = %created.id,
            user_id = %user_id,
            product_type = %created.product_type,
            total = %created.total_price,
            "Bill inquiry recorded"
        );

        Ok(created)
    }

    /// Pay a pending transaction from the caller's wallet
    pub async fn pay(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        let transaction = self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Transaction '{}' not found", transaction_id))
            })?;

        Self::ensure_payable(&transaction)?;

        if !transaction.is_owned_by(user_id) {
            return Err(AppError::forbidden("Transaction belongs to another user"));
        }

        let account = self.require_account(user_id).await?;

        if account.balance < transaction.total_price {
            tracing::warn!(
                transaction_id = %transaction.id,
                user_id = %user_id,
                balance = %account.balance,
                total = %transaction.total_price,
                "Insufficient balance, failing transaction"
            );
            self.mark_failed(&transaction.id).await;
            return Err(AppError::insufficient_funds(INSUFFICIENT_BALANCE_MESSAGE));
        }

        let detail = if transaction.product_type.issues_token() {
            transaction.product_detail.clone().with_token(generate_token())
        } else {
            transaction.product_detail.clone()
        };

        let outcome = self
            .ledger
            .settle(&SettlementRequest {
                user_id: user_id.to_string(),
                transaction_id: transaction.id.clone(),
                product_detail: detail.clone(),
            })
            .await?;

        match outcome {
            SettlementOutcome::Settled { .. } => {
                let settled = Transaction {
                    status: TransactionStatus::Successful,
                    product_detail: detail,
                    updated_at: Utc::now(),
                    ..transaction
                };

                dispatch(
                    self.notifier.clone(),
                    PaymentReceipt::new(&settled, &account),
                );
                Ok(settled)
            }
            SettlementOutcome::InsufficientFunds { .. } => {
                self.mark_failed(&transaction.id).await;
                Err(AppError::insufficient_funds(INSUFFICIENT_BALANCE_MESSAGE))
            }
            SettlementOutcome::NotPayable { status } => Err(Self::not_payable(&transaction.id, status)),
            SettlementOutcome::BillAlreadySettled => {
                Err(AppError::already_settled(ALREADY_PAID_MESSAGE))
            }
        }
    }

    /// Biller-side status of one of the caller's bills
    pub async fn status_query(
        &self,
        user_id: &str,
        product: BillProduct,
        request: StatusRequest,
    ) -> Result<BillerResponse> {
        let transaction = self
            .transactions
            .find_by_id(request.transaction_id.trim())
            .await?
            .filter(|tx| tx.product_type == product.policy().product_type)
            .ok_or_else(|| {
                AppError::not_found(format!("Transaction '{}' not found", request.transaction_id))
            })?;

        if !transaction.is_owned_by(user_id) {
            return Err(AppError::forbidden("Transaction belongs to another user"));
        }

        let detail = &transaction.product_detail;
        let biller_request = BillerRequest {
            customer_id: detail.customer_id().unwrap_or_default().to_string(),
            product_id: detail.product_code().unwrap_or_default().to_string(),
            partner_tx_id: transaction.id.clone(),
            period: detail.period().map(|p| p.to_string()),
            discount_id: None,
            amount: transaction.price,
        };

        self.biller.status(&biller_request).await
    }

    /// Buy a pulsa/data package and settle it immediately
    pub async fn purchase_pulsa(
        &self,
        user_id: &str,
        request: PulsaPurchaseRequest,
    ) -> Result<Transaction> {
        let phone_number = request.phone_number.trim();
        validate_phone_number(phone_number)?;

        let account = self.require_account(user_id).await?;
        let package = self.catalog.active_pulsa(request.product_id.trim()).await?;
        let discount = self
            .discounts
            .resolve_by_id(request.discount_id.as_deref())
            .await?;

        let pricing =
            self.calculator
                .compose(package.price, self.instant_admin_fee, discount.discount_price)?;

        if account.balance < pricing.total_price {
            tracing::warn!(
                user_id = %user_id,
                package_id = %package.id,
                balance = %account.balance,
                "Insufficient balance for instant purchase"
            );
            return Err(AppError::insufficient_funds(INSUFFICIENT_BALANCE_MESSAGE));
        }

        let product_type = if package.kind == DATA_KIND {
            ProductType::Data
        } else {
            ProductType::Pulsa
        };

        let transaction = Transaction::new(
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            TransactionStatus::Processing,
            product_type,
            ProductDetail::Pulsa(PulsaDetail {
                phone_number: phone_number.to_string(),
                package_id: package.id.clone(),
                name: package.name.clone(),
                code: package.code.clone(),
                provider: package.provider.clone(),
                description: package.description.clone(),
                discount_id: discount.snapshot_id(),
            }),
            format!(
                "{} {} for {}, total {}",
                package.provider,
                package.name,
                phone_number,
                format_rupiah(pricing.total_price)
            ),
            pricing,
        )?;

        let created = self.transactions.create(&transaction).await?;
        tracing::info!(transaction_id = %created.id, user_id = %user_id, "Instant purchase recorded");

        self.pay(user_id, &created.id).await
    }

    async fn require_account(&self, user_id: &str) -> Result<WalletAccount> {
        self.ledger
            .find_account(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("unauthorized"))
    }

    fn ensure_payable(transaction: &Transaction) -> Result<()> {
        if transaction.status.is_terminal() {
            return Err(Self::not_payable(&transaction.id, transaction.status));
        }
        Ok(())
    }

    fn not_payable(transaction_id: &str, status: TransactionStatus) -> AppError {
        match status {
            TransactionStatus::Successful => AppError::already_settled(format!(
                "Transaction '{}' has already been paid",
                transaction_id
            )),
            _ => AppError::conflict(format!(
                "Transaction '{}' is {} and cannot be paid; create a new inquiry",
                transaction_id, status
            )),
        }
    }

    /// Best-effort transition to `fail`; errors are logged and dropped
    async fn mark_failed(&self, transaction_id: &str) {
        match self
            .transactions
            .update_status(
                transaction_id,
                &TransactionStatus::PAYABLE,
                TransactionStatus::Fail,
            )
            .await
        {
            Ok(true) => tracing::info!(transaction_id = %transaction_id, "Transaction failed"),
            Ok(false) => tracing::debug!(transaction_id = %transaction_id, "Transaction no longer payable"),
            Err(e) => tracing::error!(
                transaction_id = %transaction_id,
                error = %e,
                "Failed to mark transaction as failed"
            ),
        }
    }
}

/// 20-digit pre-paid meter token
fn generate_token() -> String {
    let modulus = 10u128.pow(TOKEN_DIGITS);
    format!(
        "{:0width$}",
        Uuid::new_v4().as_u128() % modulus,
        width = TOKEN_DIGITS as usize
    )
}

fn validate_phone_number(phone_number: &str) -> Result<()> {
    let valid = (10..=15).contains(&phone_number.len())
        && phone_number.starts_with('0')
        && phone_number.bytes().all(|b| b.is_ascii_digit());

    if !valid {
        return Err(AppError::validation("invalid phone number"));
    }
    Ok(())
}
