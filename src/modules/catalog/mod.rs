// Catalog: banks, biller products and pulsa/data packages

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Bank, BillerProduct, PulsaProduct};
pub use repositories::{
    BankRepository, MySqlBankRepository, MySqlProductRepository, ProductRepository,
};
pub use services::{provider_for_phone, CatalogService};
