pub mod transaction_repository;

pub(crate) use transaction_repository::insert_transaction;
pub use transaction_repository::{MySqlTransactionRepository, TransactionRepository};
