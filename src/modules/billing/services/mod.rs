pub mod billing_service;
pub mod period_guard;
pub mod product_policy;
pub mod tariff_calculator;
pub mod transaction_query_service;

pub use billing_service::{
    BillingService, InquiryRequest, PayRequest, PulsaPurchaseRequest, StatusRequest,
};
pub use period_guard::{GuardDecision, PeriodGuard, ALREADY_PAID_MESSAGE};
pub use product_policy::{validate_customer_id, BillProduct, ProductPolicy};
pub use tariff_calculator::{InsuranceClass, TariffCalculator};
pub use transaction_query_service::{
    MonthlyRevenueReport, RevenueSummary, TransactionQueryService, DEFAULT_PAGE_SIZE,
};
