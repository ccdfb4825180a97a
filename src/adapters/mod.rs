// Adapters layer: Google Cloud implementations of the domain ports.

pub mod compute;
pub mod http;
pub mod resource_manager;

pub use compute::ComputeQuotaSource;
pub use http::{GcpHttpClient, RetryPolicy};
pub use resource_manager::ResourceManagerDirectory;
