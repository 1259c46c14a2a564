//! Upstream health reporting.
//!
//! ```text
//! HealthService -> PriceQuoteServiceTrait::health   (CoinMarketCap key and quota)
//!               -> ChainHealthCheck::chain_health   (Amberdata status and key)
//!      |
//! HealthReport
//! ```
//!
//! - **Model** (`model.rs`) - HealthReport
//! - **Traits** (`traits.rs`) - Chain status probe seam
//! - **Service** (`service.rs`) - Runs both probes concurrently

pub mod model;
pub mod service;
pub mod traits;

pub use model::HealthReport;
pub use service::HealthService;
pub use traits::ChainHealthCheck;
