use std::sync::Arc;

use uuid::Uuid;

use super::provider_lookup::provider_for_phone;
use crate::core::{AppError, Result};
use crate::modules::catalog::models::{
    Bank, BankRequest, BillerProduct, BillerProductRequest, PulsaProduct, PulsaProductQuery,
    PulsaProductRequest,
};
use crate::modules::catalog::repositories::{BankRepository, ProductRepository, PulsaListFilter};

/// Banks, biller products and pulsa/data packages
pub struct CatalogService {
    banks: Arc<dyn BankRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(banks: Arc<dyn BankRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { banks, products }
    }

    pub async fn list_banks(&self) -> Result<Vec<Bank>> {
        self.banks.list().await
    }

    pub async fn get_bank(&self, id: &str) -> Result<Bank> {
        self.banks
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Bank '{}' not found", id)))
    }

    pub async fn create_bank(&self, request: BankRequest) -> Result<Bank> {
        request.validate()?;

        let bank = Bank {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            image: request.image,
            bank_code: request.bank_code.trim().to_string(),
            created_at: None,
            updated_at: None,
        };

        let created = self.banks.create(&bank).await?;
        tracing::info!(bank_id = %created.id, bank_code = %created.bank_code, "Bank created");
        Ok(created)
    }

    pub async fn update_bank(&self, id: &str, request: BankRequest) -> Result<Bank> {
        request.validate()?;

        let existing = self.get_bank(id).await?;
        let bank = Bank {
            name: request.name.trim().to_string(),
            image: request.image.or(existing.image),
            bank_code: request.bank_code.trim().to_string(),
            ..existing
        };

        self.banks.update(&bank).await
    }

    pub async fn delete_bank(&self, id: &str) -> Result<()> {
        if !self.banks.delete(id).await? {
            return Err(AppError::not_found(format!("Bank '{}' not found", id)));
        }
        tracing::info!(bank_id = %id, "Bank deleted");
        Ok(())
    }

    pub async fn list_biller_products(&self, product_type: Option<&str>) -> Result<Vec<BillerProduct>> {
        self.products.list_biller_products(product_type).await
    }

    pub async fn get_biller_product(&self, id: &str) -> Result<BillerProduct> {
        self.products
            .find_biller_product(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Biller product '{}' not found", id)))
    }

    pub async fn create_biller_product(&self, request: BillerProductRequest) -> Result<BillerProduct> {
        request.validate()?;

        let product = BillerProduct {
            id: Uuid::new_v4().to_string(),
            product_type: request.product_type,
            provider_name: request.provider_name.trim().to_string(),
            code: request.code.trim().to_string(),
            name: request.name.trim().to_string(),
            description: request.description,
            is_active: request.is_active,
            created_at: None,
            updated_at: None,
        };

        let created = self.products.create_biller_product(&product).await?;
        tracing::info!(product_id = %created.id, code = %created.code, "Biller product created");
        Ok(created)
    }

    pub async fn update_biller_product(
        &self,
        id: &str,
        request: BillerProductRequest,
    ) -> Result<BillerProduct> {
        request.validate()?;

        let existing = self.get_biller_product(id).await?;
        let product = BillerProduct {
            product_type: request.product_type,
            provider_name: request.provider_name.trim().to_string(),
            code: request.code.trim().to_string(),
            name: request.name.trim().to_string(),
            description: request.description,
            is_active: request.is_active,
            ..existing
        };

        self.products.update_biller_product(&product).await
    }

    pub async fn delete_biller_product(&self, id: &str) -> Result<()> {
        if !self.products.delete_biller_product(id).await? {
            return Err(AppError::not_found(format!("Biller product '{}' not found", id)));
        }
        Ok(())
    }

    /// Customer listing: a phone number narrows the list to its operator
    ///
    /// Without an explicit provider, a number whose prefix is unknown is rejected.
    pub async fn list_pulsa(&self, query: PulsaProductQuery) -> Result<Vec<PulsaProduct>> {
        let provider = match (query.provider, query.phone_number.as_deref()) {
            (Some(provider), _) if !provider.trim().is_empty() => Some(provider),
            (_, Some(phone)) => match provider_for_phone(phone) {
                Some(provider) => Some(provider.to_string()),
                None => return Err(AppError::validation("provider is not supported")),
            },
            _ => None,
        };

        let filter = PulsaListFilter {
            provider,
            kind: query.kind,
            active_only: true,
        };
        self.products.list_pulsa(&filter).await
    }

    /// Admin listing, including inactive packages
    pub async fn list_all_pulsa(&self) -> Result<Vec<PulsaProduct>> {
        self.products.list_pulsa(&PulsaListFilter::default()).await
    }

    pub async fn get_pulsa(&self, id: &str) -> Result<PulsaProduct> {
        self.products
            .find_pulsa_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Pulsa product '{}' not found", id)))
    }

    /// Package available for purchase; inactive packages are reported as missing
    pub async fn active_pulsa(&self, id: &str) -> Result<PulsaProduct> {
        let product = self.get_pulsa(id).await?;
        if !product.is_active {
            return Err(AppError::not_found(format!("Pulsa product '{}' not found", id)));
        }
        Ok(product)
    }

    pub async fn create_pulsa(&self, request: PulsaProductRequest) -> Result<PulsaProduct> {
        request.validate()?;

        let product = PulsaProduct {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            kind: request.kind,
            code: request.code.trim().to_string(),
            provider: request.provider.trim().to_string(),
            price: request.price,
            is_active: request.is_active,
            description: request.description,
            created_at: None,
            updated_at: None,
        };

        let created = self.products.create_pulsa(&product).await?;
        tracing::info!(product_id = %created.id, code = %created.code, "Pulsa product created");
        Ok(created)
    }

    pub async fn update_pulsa(&self, id: &str, request: PulsaProductRequest) -> Result<PulsaProduct> {
        request.validate()?;

        let existing = self.get_pulsa(id).await?;
        let product = PulsaProduct {
            name: request.name.trim().to_string(),
            kind: request.kind,
            code: request.code.trim().to_string(),
            provider: request.provider.trim().to_string(),
            price: request.price,
            is_active: request.is_active,
            description: request.description,
            ..existing
        };

        self.products.update_pulsa(&product).await
    }

    pub async fn delete_pulsa(&self, id: &str) -> Result<()> {
        if !self.products.delete_pulsa(id).await? {
            return Err(AppError::not_found(format!("Pulsa product '{}' not found", id)));
        }
        Ok(())
    }
}
