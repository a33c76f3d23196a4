pub mod billing_controller;
pub mod transaction_controller;
