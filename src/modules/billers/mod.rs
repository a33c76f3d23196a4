// Outbound bill aggregator / VA issuer integration

pub mod services;

pub use services::{BillerGateway, BillerRequest, BillerResponse, OyClient, VirtualAccountGateway};
