// Discounts module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::Discount;
pub use repositories::{DiscountRepository, MySqlDiscountRepository};
pub use services::DiscountService;
