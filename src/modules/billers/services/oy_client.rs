use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::biller_trait::{
    BillerGateway, BillerRequest, BillerResponse, GenerateVaRequest, VirtualAccountGateway,
    VirtualAccountInfo,
};
use crate::config::BillerConfig;
use crate::core::{AppError, Result};

/// Aggregator status code for an accepted request
const OY_SUCCESS_CODE: &str = "000";

/// OY Indonesia bill aggregator and VA issuer client
pub struct OyClient {
    client: Client,
    base_url: String,
    username: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct OyStatus {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OyEnvelope<T> {
    status: OyStatus,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct OyBillData {
    #[serde(default)]
    tx_id: Option<String>,
    customer_id: String,
    product_id: String,
    partner_tx_id: String,
    #[serde(default)]
    amount: Decimal,
    #[serde(default)]
    admin_fee: Decimal,
    #[serde(default)]
    description: String,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    /// Product-specific bill attributes
    #[serde(default)]
    additional_data: Option<OyBillAttributes>,
}

#[derive(Debug, Default, Deserialize)]
struct OyBillAttributes {
    #[serde(default)]
    electrical_power: Option<u32>,
    #[serde(default)]
    usage_amount: Option<Decimal>,
    #[serde(default)]
    class: Option<u8>,
    #[serde(default)]
    family_members: Option<u32>,
    #[serde(default)]
    usage_m3: Option<Decimal>,
    #[serde(default)]
    bandwidth: Option<u32>,
    #[serde(default)]
    address: Option<String>,
}

impl From<OyBillData> for BillerResponse {
    fn from(data: OyBillData) -> Self {
        let attributes = data.additional_data.unwrap_or_default();
        BillerResponse {
            partner_tx_id: data.partner_tx_id,
            tx_id: data.tx_id,
            customer_id: data.customer_id,
            product_id: data.product_id,
            amount: data.amount,
            admin_fee: data.admin_fee,
            description: data.description,
            customer_name: data.customer_name,
            status: data.status,
            electrical_power: attributes.electrical_power,
            usage_amount: attributes.usage_amount,
            insurance_class: attributes.class,
            family_members: attributes.family_members,
            usage_m3: attributes.usage_m3,
            bandwidth_mbps: attributes.bandwidth,
            address: attributes.address,
        }
    }
}

impl OyClient {
    /// Build a client with the configured request timeout
    pub fn new(config: &BillerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json")
            .header("x-oy-username", &self.username)
            .header("x-api-key", &self.api_key)
    }

    /// 5xx is treated as transient, 4xx as a rejection
    async fn check_http(response: Response, operation: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(http_rejection(operation, status, &body))
    }

    /// Unwrap the `{status, data}` envelope
    async fn read_envelope<T: DeserializeOwned>(response: Response, operation: &str) -> Result<T> {
        let response = Self::check_http(response, operation).await?;

        let envelope: OyEnvelope<T> = response
            .json()
            .await
            .map_err(|e| malformed_response(operation, e))?;

        if envelope.status.code != OY_SUCCESS_CODE {
            tracing::warn!(
                operation = operation,
                code = %envelope.status.code,
                message = %envelope.status.message,
                "Biller rejected request"
            );
            return Err(AppError::gateway(envelope.status.message));
        }

        envelope
            .data
            .ok_or_else(|| AppError::gateway(format!("OY {} response has no data", operation)))
    }

    /// VA endpoints return the account inline next to `status`
    async fn read_va(response: Response, operation: &str) -> Result<VirtualAccountInfo> {
        #[derive(Deserialize)]
        struct VaReply {
            status: OyStatus,
            #[serde(flatten)]
            account: Option<VirtualAccountInfo>,
        }

        let response = Self::check_http(response, operation).await?;

        let reply: VaReply = response
            .json()
            .await
            .map_err(|e| malformed_response(operation, e))?;

        if reply.status.code != OY_SUCCESS_CODE {
            return Err(AppError::gateway(reply.status.message));
        }

        reply
            .account
            .ok_or_else(|| AppError::gateway(format!("OY {} response has no account", operation)))
    }

    async fn send_bill(
        &self,
        method: Method,
        path: &str,
        request: &BillerRequest,
        operation: &str,
    ) -> Result<BillerResponse> {
        tracing::debug!(
            operation = operation,
            partner_tx_id = %request.partner_tx_id,
            product_id = %request.product_id,
            "Calling biller"
        );

        let is_query = method == Method::GET;
        let builder = self.request(method, path);
        let builder = if is_query {
            builder.query(&[("partner_tx_id", request.partner_tx_id.as_str())])
        } else {
            builder.json(request)
        };

        let response = builder.send().await?;
        let data: OyBillData = Self::read_envelope(response, operation).await?;
        Ok(data.into())
    }
}

/// Non-2xx reply; the raw body stays in the log
fn http_rejection(operation: &str, status: reqwest::StatusCode, body: &str) -> AppError {
    tracing::warn!(operation = operation, status = %status, body = %body, "Biller returned an error status");

    let message = format!("Biller {} failed with HTTP {}", operation, status.as_u16());
    if status.is_server_error() {
        AppError::gateway_transport(message)
    } else {
        AppError::gateway(message)
    }
}

fn malformed_response(operation: &str, err: reqwest::Error) -> AppError {
    tracing::warn!(operation = operation, error = %err, "Biller response could not be decoded");
    AppError::gateway(format!("Malformed biller {} response", operation))
}

#[async_trait]
impl BillerGateway for OyClient {
    async fn inquire(&self, request: &BillerRequest) -> Result<BillerResponse> {
        self.send_bill(Method::POST, "/v2/bill", request, "inquiry").await
    }

    async fn pay(&self, request: &BillerRequest) -> Result<BillerResponse> {
        self.send_bill(Method::POST, "/v2/bill/payment", request, "payment")
            .await
    }

    async fn status(&self, request: &BillerRequest) -> Result<BillerResponse> {
        self.send_bill(Method::GET, "/v2/bill/status", request, "status")
            .await
    }

    fn name(&self) -> &str {
        "oy"
    }
}

#[async_trait]
impl VirtualAccountGateway for OyClient {
    async fn generate_va(&self, request: &GenerateVaRequest) -> Result<VirtualAccountInfo> {
        let response = self
            .request(Method::POST, "/generate-static-va")
            .json(request)
            .send()
            .await?;

        Self::read_va(response, "generate VA").await
    }

    async fn va_status(&self, va_id: &str) -> Result<VirtualAccountInfo> {
        let response = self
            .request(Method::GET, &format!("/static-virtual-account/{}", va_id))
            .send()
            .await?;

        Self::read_va(response, "VA status").await
    }
}
