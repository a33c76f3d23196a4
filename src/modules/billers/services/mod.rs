pub mod biller_trait;
pub mod oy_client;

pub use biller_trait::{
    BillerGateway, BillerRequest, BillerResponse, GenerateVaRequest, VirtualAccountGateway,
    VirtualAccountInfo,
};
pub use oy_client::OyClient;
