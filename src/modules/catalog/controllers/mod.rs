use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::middleware::auth::{AdminUser, AuthenticatedUser};
use crate::modules::catalog::models::{
    BankRequest, BillerProductRequest, PulsaProductQuery, PulsaProductRequest,
};
use crate::modules::catalog::services::CatalogService;

#[derive(Debug, Default, Deserialize)]
pub struct BillerProductQuery {
    pub product_type: Option<String>,
}

/// GET /catalog/banks
pub async fn list_banks(
    service: web::Data<Arc<CatalogService>>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list_banks().await?))
}

/// GET /catalog/products?product_type=pdam
pub async fn list_biller_products(
    service: web::Data<Arc<CatalogService>>,
    _user: AuthenticatedUser,
    query: web::Query<BillerProductQuery>,
) -> Result<HttpResponse, AppError> {
    let products = service
        .list_biller_products(query.product_type.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /catalog/pulsa?phone_number=0812...
pub async fn list_pulsa(
    service: web::Data<Arc<CatalogService>>,
    _user: AuthenticatedUser,
    query: web::Query<PulsaProductQuery>,
) -> Result<HttpResponse, AppError> {
    let products = service.list_pulsa(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /catalog/pulsa/{id}
pub async fn get_pulsa(
    service: web::Data<Arc<CatalogService>>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.active_pulsa(&path.into_inner()).await?))
}

// Admin: banks

pub async fn create_bank(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    request: web::Json<BankRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Created().json(service.create_bank(request.into_inner()).await?))
}

pub async fn get_bank(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get_bank(&path.into_inner()).await?))
}

pub async fn update_bank(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    path: web::Path<String>,
    request: web::Json<BankRequest>,
) -> Result<HttpResponse, AppError> {
    let bank = service
        .update_bank(&path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(bank))
}

pub async fn delete_bank(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_bank(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// Admin: biller products

pub async fn create_biller_product(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    request: web::Json<BillerProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product = service.create_biller_product(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

pub async fn get_biller_product(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get_biller_product(&path.into_inner()).await?))
}

pub async fn update_biller_product(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    path: web::Path<String>,
    request: web::Json<BillerProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product = service
        .update_biller_product(&path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(product))
}

pub async fn delete_biller_product(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_biller_product(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// Admin: pulsa/data packages

pub async fn list_all_pulsa(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list_all_pulsa().await?))
}

pub async fn create_pulsa(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    request: web::Json<PulsaProductRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Created().json(service.create_pulsa(request.into_inner()).await?))
}

pub async fn update_pulsa(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    path: web::Path<String>,
    request: web::Json<PulsaProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product = service
        .update_pulsa(&path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(product))
}

pub async fn delete_pulsa(
    service: web::Data<Arc<CatalogService>>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_pulsa(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalog")
            .route("/banks", web::get().to(list_banks))
            .route("/products", web::get().to(list_biller_products))
            .route("/pulsa", web::get().to(list_pulsa))
            .route("/pulsa/{id}", web::get().to(get_pulsa)),
    )
    .service(
        web::scope("/admin/catalog")
            .route("/banks", web::post().to(create_bank))
            .route("/banks/{id}", web::get().to(get_bank))
            .route("/banks/{id}", web::put().to(update_bank))
            .route("/banks/{id}", web::delete().to(delete_bank))
            .route("/products", web::post().to(create_biller_product))
            .route("/products/{id}", web::get().to(get_biller_product))
            .route("/products/{id}", web::put().to(update_biller_product))
            .route("/products/{id}", web::delete().to(delete_biller_product))
            .route("/pulsa", web::get().to(list_all_pulsa))
            .route("/pulsa", web::post().to(create_pulsa))
            .route("/pulsa/{id}", web::put().to(update_pulsa))
            .route("/pulsa/{id}", web::delete().to(delete_pulsa)),
    );
}
