use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skuypay::config::{Config, DatabaseConfig, LogFormat};
use skuypay::middleware::{json_config, query_config, AuthSettings, RequestId};
use skuypay::modules::billers::OyClient;
use skuypay::modules::billing::{
    controllers as billing_controllers, BillingService, MySqlTransactionRepository,
    TransactionQueryService, TransactionRepository,
};
use skuypay::modules::catalog::{self, CatalogService, MySqlBankRepository, MySqlProductRepository};
use skuypay::modules::discounts::{self, DiscountService, MySqlDiscountRepository};
use skuypay::modules::health;
use skuypay::modules::notifications::{Notifier, TracingNotifier};
use skuypay::modules::wallet::{
    self, MySqlVirtualAccountRepository, MySqlWalletRepository, VirtualAccountService,
    WalletLedger, WalletRepository,
};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "skuypay=debug,actix_web=info".into());
    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    init_tracing(config.app.log_format);

    tracing::info!(
        environment = %config.app.env,
        bind = %config.server.bind_address(),
        "Starting SkuyPay settlement service"
    );

    let db_pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;
    DatabaseConfig::run_migrations(&db_pool)
        .await
        .context("Failed to apply migrations")?;

    tracing::info!(
        min_connections = config.database.pool_size,
        max_connections = config.database.max_connections,
        "Database pool initialized"
    );

    // Repositories
    let transaction_repo: Arc<dyn TransactionRepository> =
        Arc::new(MySqlTransactionRepository::new(db_pool.clone()));
    let wallet_repo: Arc<dyn WalletRepository> =
        Arc::new(MySqlWalletRepository::new(db_pool.clone()));

    // Outbound integrations
    let oy_client = Arc::new(OyClient::new(&config.biller).context("Failed to build biller client")?);
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

    // Services
    let ledger = Arc::new(WalletLedger::new(wallet_repo.clone()));
    let discount_service = Arc::new(DiscountService::new(Arc::new(
        MySqlDiscountRepository::new(db_pool.clone()),
    )));
    let catalog_service = Arc::new(CatalogService::new(
        Arc::new(MySqlBankRepository::new(db_pool.clone())),
        Arc::new(MySqlProductRepository::new(db_pool.clone())),
    ));
    let va_service = Arc::new(VirtualAccountService::new(
        Arc::new(MySqlVirtualAccountRepository::new(db_pool.clone())),
        wallet_repo,
        oy_client.clone(),
    ));
    let billing_service = Arc::new(
        BillingService::new(
            transaction_repo.clone(),
            ledger.clone(),
            discount_service.clone(),
            catalog_service.clone(),
            oy_client,
            notifier,
        )
        .with_instant_admin_fee(config.app.instant_admin_fee),
    );
    let query_service = Arc::new(TransactionQueryService::new(transaction_repo));

    let auth_settings = AuthSettings::from(&config.security);
    let permissive_cors = config.app.env == "development";
    let bind_address = config.server.bind_address();

    HttpServer::new(move || {
        let cors = if permissive_cors {
            Cors::permissive()
        } else {
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                .allow_any_header()
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .app_data(json_config())
            .app_data(query_config())
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(auth_settings.clone()))
            .app_data(web::Data::new(ledger.clone()))
            .app_data(web::Data::new(discount_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(va_service.clone()))
            .app_data(web::Data::new(billing_service.clone()))
            .app_data(web::Data::new(query_service.clone()))
            .configure(health::controllers::configure)
            .configure(billing_controllers::billing_controller::configure)
            .configure(billing_controllers::transaction_controller::configure)
            .configure(wallet::controllers::configure)
            .configure(discounts::controllers::configure)
            .configure(catalog::controllers::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server terminated")?;

    Ok(())
}
