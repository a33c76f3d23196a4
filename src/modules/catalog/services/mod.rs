mod catalog_service;
mod provider_lookup;

pub use catalog_service::CatalogService;
pub use provider_lookup::provider_for_phone;
