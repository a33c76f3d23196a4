//! SkuyPay PPOB settlement service
//!
//! Wallet-funded bill payments (electricity, insurance, water, internet),
//! instant pulsa/data purchases, top-ups and transfers.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::billing;
pub use modules::discounts;
pub use modules::wallet;
