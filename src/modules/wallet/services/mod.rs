pub mod virtual_account_service;
pub mod wallet_ledger;

pub use virtual_account_service::VirtualAccountService;
pub use wallet_ledger::{TopUpReceipt, WalletLedger, INSUFFICIENT_BALANCE_MESSAGE};
