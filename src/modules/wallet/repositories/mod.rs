pub mod virtual_account_repository;
pub mod wallet_repository;

pub use virtual_account_repository::{MySqlVirtualAccountRepository, VirtualAccountRepository};
pub use wallet_repository::{MySqlWalletRepository, WalletRepository};
