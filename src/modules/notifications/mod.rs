// Payment notifications

pub mod models;
pub mod services;

pub use models::PaymentReceipt;
pub use services::{dispatch, Notifier, TracingNotifier};
