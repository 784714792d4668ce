use crate::config::ProviderSettings;
use crate::domain::{RiskVerdict, Transaction};
use crate::llm::error::AnalysisError;
use crate::llm::normalize::normalize;
use crate::llm::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::llm::provider::{ProviderName, WireFormat};
use crate::llm::retry::{run_with_retry, AttemptOutcome, RetryError, RetryPolicy};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Instant;

pub const TEMPERATURE: f64 = 0.2;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Generated text plus the token usage the provider reported, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub total_tokens: Option<u64>,
}

/// HTTP adapter for a single LLM backend.
#[derive(Clone)]
pub struct ProviderClient {
    provider: ProviderName,
    client: Client,
    settings: ProviderSettings,
    retry: RetryPolicy,
}

impl ProviderClient {
    /// `client` is shared between providers so connections are pooled.
    pub fn new(
        provider: ProviderName,
        settings: ProviderSettings,
        client: Client,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            client,
            settings,
            retry,
        }
    }

    pub fn provider(&self) -> ProviderName {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Sends the transaction to the provider and returns its validated verdict.
    pub async fn analyze(&self, transaction: &Transaction) -> Result<RiskVerdict, AnalysisError> {
        let prompt = build_prompt(self.provider, transaction);
        let body = self.request_body(&prompt);
        let start = Instant::now();

        let body = &body;
        let response = run_with_retry(&self.retry, move |attempt| self.attempt(body, attempt))
            .await
            .map_err(|err| match err {
                RetryError::Exhausted { attempts, .. } => AnalysisError::TooManyRequests {
                    provider: self.provider,
                    attempts,
                },
                RetryError::Permanent(err) => err,
            })?;

        let completion = extract_completion(self.provider.wire_format(), &response).map_err(
            |detail| AnalysisError::MalformedResponse {
                provider: self.provider,
                detail,
            },
        )?;

        tracing::info!(
            provider = %self.provider,
            model = %self.settings.model,
            transaction_id = %transaction.transaction_id,
            duration_ms = start.elapsed().as_millis() as u64,
            total_tokens = ?completion.total_tokens,
            "LLM response received"
        );

        let object = normalize(&completion.text).map_err(|source| {
            tracing::error!(
                provider = %self.provider,
                raw = %completion.text,
                "Could not extract JSON from model output"
            );
            AnalysisError::Normalize {
                provider: self.provider,
                source,
            }
        })?;

        RiskVerdict::from_value(object).map_err(|source| AnalysisError::InvalidVerdict {
            provider: self.provider,
            source,
        })
    }

    /// JSON body for the provider's API, carrying model, prompt and sampling parameters.
    pub fn request_body(&self, prompt: &str) -> Value {
        let messages = json!([{ "role": "user", "content": prompt }]);

        match self.provider.wire_format() {
            WireFormat::ChatCompletions => json!({
                "model": self.settings.model,
                "messages": messages,
                "temperature": TEMPERATURE,
                "max_tokens": self.provider.max_tokens(),
            }),
            WireFormat::AnthropicMessages => json!({
                "model": self.settings.model,
                "max_tokens": self.provider.max_tokens(),
                "temperature": TEMPERATURE,
                "system": SYSTEM_PROMPT,
                "messages": messages,
            }),
        }
    }

    async fn attempt(&self, body: &Value, attempt: u32) -> AttemptOutcome<Value, AnalysisError> {
        let request = self.client.post(&self.settings.api_url).json(body);
        let request = match self.provider.wire_format() {
            WireFormat::ChatCompletions => request.bearer_auth(&self.settings.api_key),
            WireFormat::AnthropicMessages => request
                .header("x-api-key", &self.settings.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                return AttemptOutcome::Permanent(AnalysisError::Transport {
                    provider: self.provider,
                    source,
                })
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<Value>().await {
                Ok(value) => AttemptOutcome::Success(value),
                Err(err) => AttemptOutcome::Permanent(AnalysisError::MalformedResponse {
                    provider: self.provider,
                    detail: err.to_string(),
                }),
            };
        }

        let text = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let message = rate_limit_message(&text);
            if is_quota_exhausted(&message) {
                tracing::error!(provider = %self.provider, message = %message, "Provider quota exhausted");
                return AttemptOutcome::Permanent(AnalysisError::QuotaExhausted {
                    provider: self.provider,
                    message,
                });
            }

            tracing::warn!(
                provider = %self.provider,
                attempt = attempt + 1,
                message = %message,
                "Rate limit hit"
            );
            return AttemptOutcome::Retryable(AnalysisError::ProviderStatus {
                provider: self.provider,
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::error!(
            provider = %self.provider,
            status = status.as_u16(),
            body = %text,
            "Provider returned an error status"
        );
        AttemptOutcome::Permanent(AnalysisError::ProviderStatus {
            provider: self.provider,
            status: status.as_u16(),
            body: text,
        })
    }
}

/// Pulls the generated text out of a 2xx response body.
pub fn extract_completion(format: WireFormat, response: &Value) -> Result<Completion, String> {
    match format {
        WireFormat::ChatCompletions => {
            let text = response
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .ok_or_else(|| "missing choices[0].message.content".to_string())?;
            Ok(Completion {
                text: text.to_string(),
                total_tokens: response.pointer("/usage/total_tokens").and_then(Value::as_u64),
            })
        }
        WireFormat::AnthropicMessages => {
            let text = response
                .pointer("/content/0/text")
                .and_then(Value::as_str)
                .ok_or_else(|| "missing content[0].text".to_string())?;
            let input = response.pointer("/usage/input_tokens").and_then(Value::as_u64);
            let output = response.pointer("/usage/output_tokens").and_then(Value::as_u64);
            Ok(Completion {
                text: text.to_string(),
                total_tokens: input.zip(output).map(|(i, o)| i + o),
            })
        }
    }
}

/// `error.message` from a provider error body, or the raw body.
pub fn rate_limit_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

pub fn is_quota_exhausted(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("quota") || message.contains("insufficient")
}
