use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::CorrelationId;
use crate::modules::billing::services::{
    BillProduct, BillingService, InquiryRequest, PayRequest, PulsaPurchaseRequest, StatusRequest,
};

/// Quote a bill
/// POST /billing/{product}/inquiry
pub async fn inquire(
    service: web::Data<Arc<BillingService>>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    request: web::Json<InquiryRequest>,
) -> Result<HttpResponse, AppError> {
    let product: BillProduct = path.into_inner().parse()?;
    let transaction = service
        .inquire(&user.user_id, product, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// Pay a quoted bill from the wallet
/// POST /billing/{product}/pay
pub async fn pay(
    service: web::Data<Arc<BillingService>>,
    user: AuthenticatedUser,
    request_id: CorrelationId,
    path: web::Path<String>,
    request: web::Json<PayRequest>,
) -> Result<HttpResponse, AppError> {
    let product: BillProduct = path.into_inner().parse()?;
    let request = request.into_inner();

    tracing::debug!(
        request_id = %request_id.as_str(),
        product = product.as_path(),
        transaction_id = %request.transaction_id,
        "Payment requested"
    );

    let transaction = service
        .pay(&user.user_id, request.transaction_id.trim())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// POST /billing/{product}/status
pub async fn status(
    service: web::Data<Arc<BillingService>>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    request: web::Json<StatusRequest>,
) -> Result<HttpResponse, AppError> {
    let product: BillProduct = path.into_inner().parse()?;
    let response = service
        .status_query(&user.user_id, product, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /billing/pulsa/purchase
pub async fn purchase_pulsa(
    service: web::Data<Arc<BillingService>>,
    user: AuthenticatedUser,
    request_id: CorrelationId,
    request: web::Json<PulsaPurchaseRequest>,
) -> Result<HttpResponse, AppError> {
    tracing::debug!(request_id = %request_id.as_str(), "Instant purchase requested");
    let transaction = service
        .purchase_pulsa(&user.user_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(transaction))
}

/// Configure billing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/billing")
            .route("/pulsa/purchase", web::post().to(purchase_pulsa))
            .route("/{product}/inquiry", web::post().to(inquire))
            .route("/{product}/pay", web::post().to(pay))
            .route("/{product}/status", web::post().to(status)),
    );
}
