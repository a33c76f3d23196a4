pub mod billers;
pub mod billing;
pub mod catalog;
pub mod discounts;
pub mod health;
pub mod notifications;
pub mod wallet;
