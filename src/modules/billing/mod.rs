// Bill inquiry, payment and instant purchases

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{ProductDetail, ProductType, Transaction, TransactionStatus};
pub use repositories::{MySqlTransactionRepository, TransactionRepository};
pub use services::{BillProduct, BillingService, TariffCalculator, TransactionQueryService};
