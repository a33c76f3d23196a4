// In-memory repositories
//
// One mutex guards every table, so multi-row operations (settle, transfer,
// top-up) are atomic exactly like their MySQL counterparts. The settled-key
// uniqueness of the transactions table is emulated in `settle`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;

use skuypay::core::{AppError, BillingPeriod, Result};
use skuypay::modules::billing::models::{
    MonthlyRevenue, ProductRevenue, ProductType, Transaction, TransactionFilter, TransactionStatus,
};
use skuypay::modules::billing::TransactionRepository;
use skuypay::modules::catalog::models::{Bank, BillerProduct, PulsaProduct};
use skuypay::modules::catalog::repositories::PulsaListFilter;
use skuypay::modules::catalog::{BankRepository, ProductRepository};
use skuypay::modules::discounts::{Discount, DiscountRepository};
use skuypay::modules::wallet::models::{
    DebitOutcome, SettlementOutcome, SettlementRequest, TopUpOutcome, TransferOutcome,
    VirtualAccount, WalletAccount,
};
use skuypay::modules::wallet::repositories::VirtualAccountRepository;
use skuypay::modules::wallet::WalletRepository;

#[derive(Default)]
struct Tables {
    users: HashMap<String, WalletAccount>,
    transactions: HashMap<String, Transaction>,
    discounts: HashMap<String, Discount>,
    banks: HashMap<String, Bank>,
    biller_products: HashMap<String, BillerProduct>,
    pulsa: HashMap<String, PulsaProduct>,
    virtual_accounts: HashMap<String, VirtualAccount>,
}

impl Tables {
    /// Another transaction already settled the same bill
    fn bill_settled_elsewhere(&self, tx: &Transaction) -> bool {
        let (Some(period), Some(customer_id)) =
            (tx.product_detail.period(), tx.product_detail.customer_id())
        else {
            return false;
        };

        self.transactions.values().any(|other| {
            other.id != tx.id
                && other.status == TransactionStatus::Successful
                && other.product_type == tx.product_type
                && other.product_detail.period() == Some(period)
                && other.product_detail.customer_id() == Some(customer_id)
        })
    }

    fn user_mut(&mut self, user_id: &str) -> Result<&mut WalletAccount> {
        self.users
            .get_mut(user_id)
            .ok_or_else(|| AppError::not_found(format!("User '{}' not found", user_id)))
    }
}

/// Shared in-memory storage implementing every repository trait
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn insert_user(&self, account: WalletAccount) {
        self.lock().users.insert(account.id.clone(), account);
    }

    pub fn insert_discount(&self, discount: Discount) {
        self.lock().discounts.insert(discount.id.clone(), discount);
    }

    pub fn insert_pulsa(&self, product: PulsaProduct) {
        self.lock().pulsa.insert(product.id.clone(), product);
    }

    pub fn insert_transaction(&self, transaction: Transaction) {
        self.lock()
            .transactions
            .insert(transaction.id.clone(), transaction);
    }

    pub fn balance_of(&self, user_id: &str) -> Decimal {
        self.lock()
            .users
            .get(user_id)
            .map(|u| u.balance)
            .unwrap_or_default()
    }

    pub fn phone_of(&self, user_id: &str) -> String {
        self.lock()
            .users
            .get(user_id)
            .map(|u| u.phone.clone())
            .unwrap_or_default()
    }

    pub fn transaction(&self, id: &str) -> Option<Transaction> {
        self.lock().transactions.get(id).cloned()
    }

    pub fn transaction_count(&self) -> usize {
        self.lock().transactions.len()
    }

    pub fn transactions_of(&self, user_id: &str) -> Vec<Transaction> {
        self.lock()
            .transactions
            .values()
            .filter(|tx| tx.user_id == user_id)
            .cloned()
            .collect()
    }
}

fn status_rank(status: TransactionStatus) -> u8 {
    match status {
        TransactionStatus::Successful => 0,
        TransactionStatus::Unpaid => 1,
        TransactionStatus::Processing => 2,
        TransactionStatus::Fail => 3,
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn create(&self, transaction: &Transaction) -> Result<Transaction> {
        let mut tables = self.lock();
        if tables.transactions.contains_key(&transaction.id) {
            return Err(AppError::conflict(format!(
                "Transaction '{}' already exists",
                transaction.id
            )));
        }
        tables
            .transactions
            .insert(transaction.id.clone(), transaction.clone());
        Ok(transaction.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Transaction>> {
        Ok(self.lock().transactions.get(id).cloned())
    }

    async fn find_by_period_and_customer(
        &self,
        product_type: ProductType,
        period: &BillingPeriod,
        customer_id: &str,
    ) -> Result<Option<Transaction>> {
        let tables = self.lock();
        let mut matches: Vec<&Transaction> = tables
            .transactions
            .values()
            .filter(|tx| {
                tx.product_type == product_type
                    && tx.product_detail.period() == Some(period)
                    && tx.product_detail.customer_id() == Some(customer_id)
            })
            .collect();

        matches.sort_by(|a, b| {
            status_rank(a.status)
                .cmp(&status_rank(b.status))
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(matches.first().map(|tx| (*tx).clone()))
    }

    async fn update_status(
        &self,
        id: &str,
        from: &[TransactionStatus],
        to: TransactionStatus,
    ) -> Result<bool> {
        let mut tables = self.lock();
        match tables.transactions.get_mut(id) {
            Some(tx) if from.contains(&tx.status) => {
                tx.status = to;
                tx.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(
        &self,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let tables = self.lock();
        let mut rows: Vec<Transaction> = tables
            .transactions
            .values()
            .filter(|tx| filter.user_id.as_deref().map_or(true, |u| tx.user_id == u))
            .filter(|tx| filter.status.map_or(true, |s| tx.status == s))
            .filter(|tx| filter.product_type.map_or(true, |p| tx.product_type == p))
            .filter(|tx| {
                filter
                    .search
                    .as_deref()
                    .map_or(true, |s| tx.id.contains(s) || tx.description.contains(s))
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn revenue_by_product(&self) -> Result<Vec<ProductRevenue>> {
        let tables = self.lock();
        let mut grouped: HashMap<&'static str, (i64, Decimal)> = HashMap::new();
        for tx in tables
            .transactions
            .values()
            .filter(|tx| tx.status == TransactionStatus::Successful)
        {
            let entry = grouped.entry(tx.product_type.as_str()).or_default();
            entry.0 += 1;
            entry.1 += tx.total_price;
        }

        let mut revenue: Vec<ProductRevenue> = grouped
            .into_iter()
            .map(|(product_type, (count, total))| ProductRevenue {
                product_type: product_type.to_string(),
                transaction_count: count,
                total_revenue: total,
            })
            .collect();
        revenue.sort_by(|a, b| a.product_type.cmp(&b.product_type));
        Ok(revenue)
    }

    async fn revenue_by_month(&self, year: i32) -> Result<Vec<MonthlyRevenue>> {
        let tables = self.lock();
        let mut grouped: HashMap<i64, (i64, Decimal)> = HashMap::new();
        for tx in tables.transactions.values().filter(|tx| {
            tx.status == TransactionStatus::Successful && tx.created_at.year() == year
        }) {
            let entry = grouped.entry(tx.created_at.month() as i64).or_default();
            entry.0 += 1;
            entry.1 += tx.total_price;
        }

        let mut revenue: Vec<MonthlyRevenue> = grouped
            .into_iter()
            .map(|(month, (count, total))| MonthlyRevenue {
                month,
                transaction_count: count,
                total_revenue: total,
            })
            .collect();
        revenue.sort_by_key(|m| m.month);
        Ok(revenue)
    }
}

#[async_trait]
impl WalletRepository for MemoryStore {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<WalletAccount>> {
        Ok(self.lock().users.get(user_id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<WalletAccount>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.phone == phone)
            .cloned())
    }

    async fn debit(&self, user_id: &str, amount: Decimal) -> Result<DebitOutcome> {
        let mut tables = self.lock();
        let user = tables.user_mut(user_id)?;
        if user.balance < amount {
            return Ok(DebitOutcome::Insufficient {
                balance: user.balance,
            });
        }
        user.balance -= amount;
        Ok(DebitOutcome::Debited {
            balance: user.balance,
        })
    }

    async fn credit(&self, user_id: &str, amount: Decimal) -> Result<Decimal> {
        let mut tables = self.lock();
        let user = tables.user_mut(user_id)?;
        user.balance += amount;
        Ok(user.balance)
    }

    async fn settle(&self, request: &SettlementRequest) -> Result<SettlementOutcome> {
        let mut tables = self.lock();
        let balance = tables.user_mut(&request.user_id)?.balance;

        let tx = tables
            .transactions
            .get(&request.transaction_id)
            .filter(|tx| tx.user_id == request.user_id)
            .cloned()
            .ok_or_else(|| {
                AppError::not_found(format!("Transaction '{}' not found", request.transaction_id))
            })?;

        if !TransactionStatus::PAYABLE.contains(&tx.status) {
            return Ok(SettlementOutcome::NotPayable { status: tx.status });
        }
        if balance < tx.total_price {
            return Ok(SettlementOutcome::InsufficientFunds { balance });
        }
        if tables.bill_settled_elsewhere(&tx) {
            return Ok(SettlementOutcome::BillAlreadySettled);
        }

        if let Some(stored) = tables.transactions.get_mut(&tx.id) {
            stored.status = TransactionStatus::Successful;
            stored.product_detail = request.product_detail.clone();
            stored.updated_at = Utc::now();
        }
        let user = tables.user_mut(&request.user_id)?;
        user.balance -= tx.total_price;

        Ok(SettlementOutcome::Settled {
            balance: user.balance,
        })
    }

    async fn transfer(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        record: &Transaction,
    ) -> Result<TransferOutcome> {
        let mut tables = self.lock();
        tables.user_mut(to_user_id)?;
        let sender_balance = tables.user_mut(from_user_id)?.balance;

        if sender_balance < record.total_price {
            return Ok(TransferOutcome::InsufficientFunds {
                balance: sender_balance,
            });
        }
        if tables.transactions.contains_key(&record.id) {
            return Err(AppError::conflict(format!(
                "Transaction '{}' already exists",
                record.id
            )));
        }

        tables.user_mut(from_user_id)?.balance -= record.total_price;
        tables.user_mut(to_user_id)?.balance += record.total_price;
        tables
            .transactions
            .insert(record.id.clone(), record.clone());

        Ok(TransferOutcome::Transferred {
            balance: sender_balance - record.total_price,
        })
    }

    async fn top_up(&self, user_id: &str, record: &Transaction) -> Result<TopUpOutcome> {
        let mut tables = self.lock();
        if tables.transactions.contains_key(&record.id) {
            return Ok(TopUpOutcome::Duplicate);
        }

        let user = tables.user_mut(user_id)?;
        user.balance += record.price;
        let balance = user.balance;
        tables
            .transactions
            .insert(record.id.clone(), record.clone());

        Ok(TopUpOutcome::Credited { balance })
    }
}

#[async_trait]
impl VirtualAccountRepository for MemoryStore {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<VirtualAccount>> {
        Ok(self.lock().virtual_accounts.get(user_id).cloned())
    }

    async fn insert_or_get(&self, account: &VirtualAccount) -> Result<VirtualAccount> {
        let mut tables = self.lock();
        let stored = tables
            .virtual_accounts
            .entry(account.user_id.clone())
            .or_insert_with(|| account.clone());
        Ok(stored.clone())
    }
}

#[async_trait]
impl DiscountRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Discount>> {
        Ok(self.lock().discounts.get(id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Discount>> {
        Ok(self
            .lock()
            .discounts
            .values()
            .find(|d| d.discount_code == code)
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Discount>> {
        let mut rows: Vec<Discount> = self.lock().discounts.values().cloned().collect();
        rows.sort_by(|a, b| a.discount_code.cmp(&b.discount_code));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn create(&self, discount: &Discount) -> Result<Discount> {
        let mut tables = self.lock();
        if tables
            .discounts
            .values()
            .any(|d| d.discount_code == discount.discount_code)
        {
            return Err(AppError::conflict(format!(
                "Discount code '{}' already exists",
                discount.discount_code
            )));
        }
        tables
            .discounts
            .insert(discount.id.clone(), discount.clone());
        Ok(discount.clone())
    }

    async fn update(&self, discount: &Discount) -> Result<Discount> {
        let mut tables = self.lock();
        if tables
            .discounts
            .values()
            .any(|d| d.id != discount.id && d.discount_code == discount.discount_code)
        {
            return Err(AppError::conflict(format!(
                "Discount code '{}' already exists",
                discount.discount_code
            )));
        }
        match tables.discounts.get_mut(&discount.id) {
            Some(stored) => {
                *stored = discount.clone();
                Ok(discount.clone())
            }
            None => Err(AppError::not_found(format!(
                "Discount '{}' not found",
                discount.id
            ))),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.lock().discounts.remove(id).is_some())
    }
}

#[async_trait]
impl BankRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Bank>> {
        Ok(self.lock().banks.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Bank>> {
        Ok(self.lock().banks.values().cloned().collect())
    }

    async fn create(&self, bank: &Bank) -> Result<Bank> {
        self.lock().banks.insert(bank.id.clone(), bank.clone());
        Ok(bank.clone())
    }

    async fn update(&self, bank: &Bank) -> Result<Bank> {
        self.lock().banks.insert(bank.id.clone(), bank.clone());
        Ok(bank.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.lock().banks.remove(id).is_some())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn find_biller_product(&self, id: &str) -> Result<Option<BillerProduct>> {
        Ok(self.lock().biller_products.get(id).cloned())
    }

    async fn list_biller_products(&self, product_type: Option<&str>) -> Result<Vec<BillerProduct>> {
        Ok(self
            .lock()
            .biller_products
            .values()
            .filter(|p| product_type.map_or(true, |t| p.product_type == t))
            .cloned()
            .collect())
    }

    async fn create_biller_product(&self, product: &BillerProduct) -> Result<BillerProduct> {
        self.lock()
            .biller_products
            .insert(product.id.clone(), product.clone());
        Ok(product.clone())
    }

    async fn update_biller_product(&self, product: &BillerProduct) -> Result<BillerProduct> {
        self.create_biller_product(product).await
    }

    async fn delete_biller_product(&self, id: &str) -> Result<bool> {
        Ok(self.lock().biller_products.remove(id).is_some())
    }

    async fn find_pulsa_by_id(&self, id: &str) -> Result<Option<PulsaProduct>> {
        Ok(self.lock().pulsa.get(id).cloned())
    }

    async fn list_pulsa(&self, filter: &PulsaListFilter) -> Result<Vec<PulsaProduct>> {
        let mut rows: Vec<PulsaProduct> = self
            .lock()
            .pulsa
            .values()
            .filter(|p| filter.provider.as_deref().map_or(true, |v| p.provider == v))
            .filter(|p| filter.kind.as_deref().map_or(true, |v| p.kind == v))
            .filter(|p| !filter.active_only || p.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.price.cmp(&b.price));
        Ok(rows)
    }

    async fn create_pulsa(&self, product: &PulsaProduct) -> Result<PulsaProduct> {
        self.insert_pulsa(product.clone());
        Ok(product.clone())
    }

    async fn update_pulsa(&self, product: &PulsaProduct) -> Result<PulsaProduct> {
        self.insert_pulsa(product.clone());
        Ok(product.clone())
    }

    async fn delete_pulsa(&self, id: &str) -> Result<bool> {
        Ok(self.lock().pulsa.remove(id).is_some())
    }
}
