use crate::domain::VerdictError;
use crate::llm::normalize::NormalizeError;
use crate::llm::provider::{ProviderName, UnknownProvider};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    UnsupportedProvider(#[from] UnknownProvider),

    #[error("LLM provider '{0}' is not configured")]
    ProviderNotConfigured(ProviderName),

    #[error("{provider}: too many requests after {attempts} attempts")]
    TooManyRequests { provider: ProviderName, attempts: u32 },

    #[error("{provider}: insufficient quota or credits: {message}")]
    QuotaExhausted {
        provider: ProviderName,
        message: String,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    ProviderStatus {
        provider: ProviderName,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: ProviderName,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} response is malformed: {detail}")]
    MalformedResponse {
        provider: ProviderName,
        detail: String,
    },

    #[error("{provider}: {source}")]
    Normalize {
        provider: ProviderName,
        #[source]
        source: NormalizeError,
    },

    #[error("{provider}: {source}")]
    InvalidVerdict {
        provider: ProviderName,
        #[source]
        source: VerdictError,
    },
}

impl AnalysisError {
    /// Errors caused by the caller's request rather than the provider.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AnalysisError::UnsupportedProvider(_))
    }
}
