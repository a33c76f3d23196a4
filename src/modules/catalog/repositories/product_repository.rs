use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::error::{is_unique_violation, AppError};
use crate::core::Result;
use crate::modules::catalog::models::{BillerProduct, PulsaProduct};

/// Listing filter resolved by the service (provider already detected)
#[derive(Debug, Clone, Default)]
pub struct PulsaListFilter {
    pub provider: Option<String>,
    pub kind: Option<String>,
    pub active_only: bool,
}

/// Biller product and pulsa/data package persistence
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_biller_product(&self, id: &str) -> Result<Option<BillerProduct>>;

    async fn list_biller_products(&self, product_type: Option<&str>) -> Result<Vec<BillerProduct>>;

    async fn create_biller_product(&self, product: &BillerProduct) -> Result<BillerProduct>;

    async fn update_biller_product(&self, product: &BillerProduct) -> Result<BillerProduct>;

    async fn delete_biller_product(&self, id: &str) -> Result<bool>;

    async fn find_pulsa_by_id(&self, id: &str) -> Result<Option<PulsaProduct>>;

    async fn list_pulsa(&self, filter: &PulsaListFilter) -> Result<Vec<PulsaProduct>>;

    async fn create_pulsa(&self, product: &PulsaProduct) -> Result<PulsaProduct>;

    async fn update_pulsa(&self, product: &PulsaProduct) -> Result<PulsaProduct>;

    async fn delete_pulsa(&self, id: &str) -> Result<bool>;
}

pub struct MySqlProductRepository {
    pool: MySqlPool,
}

impl MySqlProductRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn map_write_error(err: sqlx::Error, code: &str, operation: &str) -> AppError {
        if is_unique_violation(&err) {
            AppError::conflict(format!("Product code '{}' already exists", code))
        } else {
            AppError::database(operation, err)
        }
    }

    async fn soft_delete(&self, table: &str, id: &str, operation: &str) -> Result<bool> {
        let query = format!(
            "UPDATE {} SET deleted_at = CURRENT_TIMESTAMP WHERE id = ? AND deleted_at IS NULL",
            table
        );

        let result = sqlx::query(&query)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(operation, e))?;

        Ok(result.rows_affected() > 0)
    }
}

const BILLER_PRODUCT_COLUMNS: &str =
    "id, product_type, provider_name, code, name, description, is_active, created_at, updated_at";

const PULSA_COLUMNS: &str =
    "id, name, type, code, provider, price, is_active, description, created_at, updated_at";

#[async_trait]
impl ProductRepository for MySqlProductRepository {
    async fn find_biller_product(&self, id: &str) -> Result<Option<BillerProduct>> {
        let query = format!(
            "SELECT {} FROM biller_products WHERE id = ? AND deleted_at IS NULL",
            BILLER_PRODUCT_COLUMNS
        );

        sqlx::query_as::<_, BillerProduct>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database("find biller product", e))
    }

    async fn list_biller_products(&self, product_type: Option<&str>) -> Result<Vec<BillerProduct>> {
        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {} FROM biller_products WHERE deleted_at IS NULL",
            BILLER_PRODUCT_COLUMNS
        ));

        if let Some(product_type) = product_type {
            builder.push(" AND product_type = ").push_bind(product_type);
        }
        builder.push(" ORDER BY provider_name ASC, name ASC");

        builder
            .build_query_as::<BillerProduct>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database("list biller products", e))
    }

    async fn create_biller_product(&self, product: &BillerProduct) -> Result<BillerProduct> {
        sqlx::query(
            r#"
            INSERT INTO biller_products (id, product_type, provider_name, code, name, description, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.product_type)
        .bind(&product.provider_name)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &product.code, "create biller product"))?;

        self.find_biller_product(&product.id)
            .await?
            .ok_or_else(|| AppError::internal("Biller product was created but not found"))
    }

    async fn update_biller_product(&self, product: &BillerProduct) -> Result<BillerProduct> {
        let result = sqlx::query(
            r#"
            UPDATE biller_products
            SET product_type = ?, provider_name = ?, code = ?, name = ?, description = ?, is_active = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&product.product_type)
        .bind(&product.provider_name)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.is_active)
        .bind(&product.id)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &product.code, "update biller product"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Biller product '{}' not found",
                product.id
            )));
        }

        self.find_biller_product(&product.id).await?.ok_or_else(|| {
            AppError::not_found(format!("Biller product '{}' not found", product.id))
        })
    }

    async fn delete_biller_product(&self, id: &str) -> Result<bool> {
        self.soft_delete("biller_products", id, "delete biller product")
            .await
    }

    async fn find_pulsa_by_id(&self, id: &str) -> Result<Option<PulsaProduct>> {
        let query = format!(
            "SELECT {} FROM pulsa_products WHERE id = ? AND deleted_at IS NULL",
            PULSA_COLUMNS
        );

        sqlx::query_as::<_, PulsaProduct>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database("find pulsa product", e))
    }

    async fn list_pulsa(&self, filter: &PulsaListFilter) -> Result<Vec<PulsaProduct>> {
        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {} FROM pulsa_products WHERE deleted_at IS NULL",
            PULSA_COLUMNS
        ));

        if let Some(provider) = &filter.provider {
            builder.push(" AND provider = ").push_bind(provider.clone());
        }
        if let Some(kind) = &filter.kind {
            builder.push(" AND type = ").push_bind(kind.clone());
        }
        if filter.active_only {
            builder.push(" AND is_active = TRUE");
        }
        builder.push(" ORDER BY price ASC");

        builder
            .build_query_as::<PulsaProduct>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database("list pulsa products", e))
    }

    async fn create_pulsa(&self, product: &PulsaProduct) -> Result<PulsaProduct> {
        sqlx::query(
            r#"
            INSERT INTO pulsa_products (id, name, type, code, provider, price, is_active, description)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.kind)
        .bind(&product.code)
        .bind(&product.provider)
        .bind(product.price)
        .bind(product.is_active)
        .bind(&product.description)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &product.code, "create pulsa product"))?;

        self.find_pulsa_by_id(&product.id)
            .await?
            .ok_or_else(|| AppError::internal("Pulsa product was created but not found"))
    }

    async fn update_pulsa(&self, product: &PulsaProduct) -> Result<PulsaProduct> {
        let result = sqlx::query(
            r#"
            UPDATE pulsa_products
            SET name = ?, type = ?, code = ?, provider = ?, price = ?, is_active = ?, description = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&product.name)
        .bind(&product.kind)
        .bind(&product.code)
        .bind(&product.provider)
        .bind(product.price)
        .bind(product.is_active)
        .bind(&product.description)
        .bind(&product.id)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &product.code, "update pulsa product"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Pulsa product '{}' not found",
                product.id
            )));
        }

        self.find_pulsa_by_id(&product.id).await?.ok_or_else(|| {
            AppError::not_found(format!("Pulsa product '{}' not found", product.id))
        })
    }

    async fn delete_pulsa(&self, id: &str) -> Result<bool> {
        self.soft_delete("pulsa_products", id, "delete pulsa product")
            .await
    }
}
