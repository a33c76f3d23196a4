mod product_detail;
mod transaction;

pub use product_detail::{
    ElectricityDetail, InsuranceDetail, PdamDetail, ProductDetail, PulsaDetail, TopupDetail,
    TransferDetail, WifiDetail,
};
pub use transaction::{
    MonthlyRevenue, PriceBreakdown, ProductRevenue, ProductType, Transaction, TransactionFilter,
    TransactionRow, TransactionStatus,
};
