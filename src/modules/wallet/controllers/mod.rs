use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::core::error::AppError;
use crate::middleware::auth::{AuthSettings, AuthenticatedUser, CALLBACK_SIGNATURE_HEADER};
use crate::modules::wallet::models::{
    BalanceResponse, GenerateVaPayload, TopUpCallback, TransferRequest,
};
use crate::modules::wallet::services::{VirtualAccountService, WalletLedger};

/// GET /wallet/balance
pub async fn get_balance(
    ledger: web::Data<Arc<WalletLedger>>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let balance = ledger.balance(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse { balance }))
}

/// POST /wallet/transfer
pub async fn transfer(
    ledger: web::Data<Arc<WalletLedger>>,
    user: AuthenticatedUser,
    request: web::Json<TransferRequest>,
) -> Result<HttpResponse, AppError> {
    let transaction = ledger.transfer(&user.user_id, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(transaction))
}

/// POST /wallet/virtual-accounts
pub async fn generate_virtual_account(
    service: web::Data<Arc<VirtualAccountService>>,
    user: AuthenticatedUser,
    request: web::Json<GenerateVaPayload>,
) -> Result<HttpResponse, AppError> {
    let account = service.generate(&user.user_id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(account))
}

/// GET /wallet/virtual-accounts/{id}/status
pub async fn virtual_account_status(
    service: web::Data<Arc<VirtualAccountService>>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let status = service.status(&user.user_id, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Aggregator deposit notification, signed over the raw body
/// POST /wallet/topup/callback
pub async fn topup_callback(
    ledger: web::Data<Arc<WalletLedger>>,
    settings: web::Data<AuthSettings>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = req
        .headers()
        .get(CALLBACK_SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing callback signature"))?;

    settings.verify_callback(&body, signature)?;

    let callback: TopUpCallback = serde_json::from_slice(&body)?;
    let receipt = ledger.top_up(callback).await?;

    Ok(HttpResponse::Ok().json(receipt))
}

/// Configure wallet routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wallet")
            .route("/balance", web::get().to(get_balance))
            .route("/transfer", web::post().to(transfer))
            .route("/virtual-accounts", web::post().to(generate_virtual_account))
            .route(
                "/virtual-accounts/{id}/status",
                web::get().to(virtual_account_status),
            )
            .route("/topup/callback", web::post().to(topup_callback)),
    );
}
