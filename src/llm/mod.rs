//! LLM provider integration: prompt rendering, transport with retry, and
//! reconciliation of free-form model output into a [`RiskVerdict`](crate::domain::RiskVerdict).

pub mod client;
pub mod error;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod retry;

pub use client::ProviderClient;
pub use error::AnalysisError;
pub use provider::{ProviderName, UnknownProvider, WireFormat};
pub use retry::RetryPolicy;
