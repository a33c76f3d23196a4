use std::sync::Arc;

use async_trait::async_trait;

use super::models::PaymentReceipt;
use crate::core::Result;
use crate::core::money::format_rupiah;

/// Outbound payment notifications (email, push, ...)
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, receipt: &PaymentReceipt) -> Result<()>;
}

/// Writes receipts to the structured log
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, receipt: &PaymentReceipt) -> Result<()> {
        tracing::info!(
            order_id = %receipt.order_id,
            recipient = %receipt.recipient_email,
            product_type = %receipt.product_type,
            status = %receipt.status,
            total = %format_rupiah(receipt.total_price),
            "Payment receipt"
        );
        Ok(())
    }
}

/// Fire-and-forget: failures are logged and never reach the caller
pub fn dispatch(notifier: Arc<dyn Notifier>, receipt: PaymentReceipt) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&receipt).await {
            tracing::warn!(order_id = %receipt.order_id, error = %e, "Failed to send payment receipt");
        }
    });
}
