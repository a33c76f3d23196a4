// Wallet balances, deposits and transfers

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{SettlementOutcome, SettlementRequest, WalletAccount};
pub use repositories::{MySqlVirtualAccountRepository, MySqlWalletRepository, WalletRepository};
pub use services::{VirtualAccountService, WalletLedger};
