use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::middleware::auth::{AdminUser, AuthenticatedUser};
use crate::modules::billing::models::{ProductType, TransactionFilter, TransactionStatus};
use crate::modules::billing::services::{TransactionQueryService, DEFAULT_PAGE_SIZE};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub product_type: Option<ProductType>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub status: Option<TransactionStatus>,
    pub product_type: Option<ProductType>,
    pub user_id: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub year: Option<i32>,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Caller's transaction history
/// GET /transactions
pub async fn list_own(
    service: web::Data<Arc<TransactionQueryService>>,
    user: AuthenticatedUser,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let transactions = service
        .history(&user.user_id, query.product_type, query.limit, query.offset)
        .await?;
    Ok(HttpResponse::Ok().json(transactions))
}

/// GET /transactions/{id}
pub async fn get_own(
    service: web::Data<Arc<TransactionQueryService>>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let transaction = service
        .get_for_user(&user.user_id, &path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// GET /admin/transactions
pub async fn list_all(
    service: web::Data<Arc<TransactionQueryService>>,
    _admin: AdminUser,
    query: web::Query<AdminListQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let filter = TransactionFilter {
        user_id: query.user_id,
        status: query.status,
        product_type: query.product_type,
        search: query.search,
    };

    let transactions = service.list(&filter, query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(transactions))
}

/// GET /admin/transactions/summary
pub async fn revenue_summary(
    service: web::Data<Arc<TransactionQueryService>>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.revenue_summary().await?))
}

/// GET /admin/transactions/monthly?year=2024
pub async fn monthly_revenue(
    service: web::Data<Arc<TransactionQueryService>>,
    _admin: AdminUser,
    query: web::Query<MonthlyQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.monthly_revenue(query.year).await?))
}

/// Configure transaction history routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/transactions")
            .route("", web::get().to(list_own))
            .route("/{id}", web::get().to(get_own)),
    )
    .service(
        web::scope("/admin/transactions")
            .route("", web::get().to(list_all))
            .route("/summary", web::get().to(revenue_summary))
            .route("/monthly", web::get().to(monthly_revenue)),
    );
}
