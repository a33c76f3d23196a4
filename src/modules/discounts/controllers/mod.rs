use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::middleware::auth::{AdminUser, AuthenticatedUser};
use crate::modules::discounts::models::{CreateDiscountRequest, UpdateDiscountRequest};
use crate::modules::discounts::services::DiscountService;

#[derive(Debug, Deserialize)]
pub struct ListDiscountsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Look up a discount by its public code
/// GET /discounts/code/{code}
pub async fn get_by_code(
    service: web::Data<Arc<DiscountService>>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let discount = service.resolve_by_code(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(discount))
}

/// GET /discounts
pub async fn list_discounts(
    service: web::Data<Arc<DiscountService>>,
    _user: AuthenticatedUser,
    query: web::Query<ListDiscountsQuery>,
) -> Result<HttpResponse, AppError> {
    let discounts = service
        .list(query.limit.clamp(1, 100), query.offset.max(0))
        .await?;
    Ok(HttpResponse::Ok().json(discounts))
}

/// GET /admin/discounts/{id}
pub async fn get_discount(
    service: web::Data<Arc<DiscountService>>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let discount = service.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(discount))
}

/// POST /admin/discounts
pub async fn create_discount(
    service: web::Data<Arc<DiscountService>>,
    _admin: AdminUser,
    request: web::Json<CreateDiscountRequest>,
) -> Result<HttpResponse, AppError> {
    let discount = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(discount))
}

/// PUT /admin/discounts/{id}
pub async fn update_discount(
    service: web::Data<Arc<DiscountService>>,
    _admin: AdminUser,
    path: web::Path<String>,
    request: web::Json<UpdateDiscountRequest>,
) -> Result<HttpResponse, AppError> {
    let discount = service
        .update(&path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(discount))
}

/// DELETE /admin/discounts/{id}
pub async fn delete_discount(
    service: web::Data<Arc<DiscountService>>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure discount routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/discounts")
            .route("", web::get().to(list_discounts))
            .route("/code/{code}", web::get().to(get_by_code)),
    )
    .service(
        web::scope("/admin/discounts")
            .route("", web::post().to(create_discount))
            .route("/{id}", web::get().to(get_discount))
            .route("/{id}", web::put().to(update_discount))
            .route("/{id}", web::delete().to(delete_discount)),
    );
}
