mod bank_repository;
mod product_repository;

pub use bank_repository::{BankRepository, MySqlBankRepository};
pub use product_repository::{MySqlProductRepository, ProductRepository, PulsaListFilter};
