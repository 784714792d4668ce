use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::domain::{RiskVerdict, Transaction};
use crate::llm::retry::DEFAULT_BASE_DELAY;
use crate::llm::{AnalysisError, ProviderClient, ProviderName, RetryPolicy};

/// Routes transactions to the configured provider clients by name.
#[derive(Clone)]
pub struct RiskAnalyzer {
    clients: Arc<BTreeMap<ProviderName, ProviderClient>>,
    default_provider: ProviderName,
}

impl RiskAnalyzer {
    pub fn new(clients: impl IntoIterator<Item = ProviderClient>, default_provider: ProviderName) -> Self {
        let clients = clients
            .into_iter()
            .map(|client| (client.provider(), client))
            .collect();

        Self {
            clients: Arc::new(clients),
            default_provider,
        }
    }

    /// Builds one client per configured provider over a single pooled HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let retry = RetryPolicy::new(config.max_attempts, DEFAULT_BASE_DELAY);

        let clients = config.providers.iter().map(|(provider, settings)| {
            ProviderClient::new(*provider, settings.clone(), http.clone(), retry)
        });

        Ok(Self::new(clients, config.default_provider))
    }

    pub fn default_provider(&self) -> ProviderName {
        self.default_provider
    }

    pub fn configured_providers(&self) -> Vec<ProviderName> {
        self.clients.keys().copied().collect()
    }

    /// Case-insensitive lookup; unknown names never fall back to the default.
    pub fn resolve(&self, provider_name: &str) -> Result<&ProviderClient, AnalysisError> {
        let provider: ProviderName = provider_name.parse()?;
        self.clients
            .get(&provider)
            .ok_or(AnalysisError::ProviderNotConfigured(provider))
    }

    pub async fn analyze_transaction(
        &self,
        transaction: &Transaction,
        provider_name: &str,
    ) -> Result<RiskVerdict, AnalysisError> {
        let client = self.resolve(provider_name).map_err(|e| {
            error!(provider = %provider_name, error = %e, "Cannot dispatch transaction");
            e
        })?;

        info!(
            transaction_id = %transaction.transaction_id,
            provider = %client.provider(),
            model = %client.model(),
            "Analyzing transaction"
        );

        let verdict = client.analyze(transaction).await.map_err(|e| {
            error!(
                transaction_id = %transaction.transaction_id,
                provider = %client.provider(),
                error = %e,
                "Error during transaction analysis"
            );
            e
        })?;

        if !verdict.is_consistent() {
            warn!(
                transaction_id = %transaction.transaction_id,
                risk_score = verdict.risk_score,
                recommended_action = %verdict.recommended_action,
                expected_action = %verdict.expected_action(),
                "Provider action disagrees with score thresholds; keeping provider action"
            );
        }

        info!(
            transaction_id = %transaction.transaction_id,
            risk_score = verdict.risk_score,
            recommended_action = %verdict.recommended_action,
            "Analysis complete"
        );

        Ok(verdict)
    }

    pub async fn analyze_with_default(&self, transaction: &Transaction) -> Result<RiskVerdict, AnalysisError> {
        self.analyze_transaction(transaction, self.default_provider.as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderSettings;
    use crate::domain::transaction::fixtures::sample_transaction;
    use mockito::Server;
    use serde_json::json;

    fn chat_body(score: f64, action: &str) -> String {
        let content = json!({
            "risk_score": score,
            "risk_factors": [],
            "reasoning": "test",
            "recommended_action": action
        })
        .to_string();
        json!({ "choices": [{ "message": { "content": content } }] }).to_string()
    }

    fn analyzer_for(server: &Server, providers: &[ProviderName]) -> RiskAnalyzer {
        let clients = providers.iter().map(|provider| {
            let mut settings = ProviderSettings::with_defaults(*provider, "test-key");
            settings.api_url = format!("{}/{}", server.url(), provider);
            ProviderClient::new(
                *provider,
                settings,
                Client::new(),
                RetryPolicy::new(3, Duration::from_millis(1)),
            )
        });
        RiskAnalyzer::new(clients, providers[0])
    }

    #[tokio::test]
    async fn mixed_case_name_routes_like_lowercase() {
        let mut server = Server::new_async().await;
        let groq = server
            .mock("POST", "/groq")
            .with_status(200)
            .with_body(chat_body(0.2, "allow"))
            .expect(2)
            .create_async()
            .await;
        let openai = server
            .mock("POST", "/openai")
            .expect(0)
            .create_async()
            .await;

        let analyzer = analyzer_for(&server, &[ProviderName::OpenAi, ProviderName::Groq]);
        let tx = sample_transaction();
        let upper = analyzer.analyze_transaction(&tx, "GROQ").await.unwrap();
        let lower = analyzer.analyze_transaction(&tx, "groq").await.unwrap();

        groq.assert_async().await;
        openai.assert_async().await;
        assert_eq!(upper, lower);
    }

    #[tokio::test]
    async fn unknown_provider_makes_no_calls() {
        let mut server = Server::new_async().await;
        let any = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let analyzer = analyzer_for(&server, &[ProviderName::OpenAi]);
        let err = analyzer
            .analyze_transaction(&sample_transaction(), "unknown_llm")
            .await
            .unwrap_err();

        any.assert_async().await;
        assert!(matches!(err, AnalysisError::UnsupportedProvider(_)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn known_but_unconfigured_provider() {
        let server = Server::new_async().await;
        let analyzer = analyzer_for(&server, &[ProviderName::OpenAi]);

        let err = analyzer
            .analyze_transaction(&sample_transaction(), "claude")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::ProviderNotConfigured(ProviderName::Claude)
        ));
    }

    #[tokio::test]
    async fn provider_errors_propagate_unchanged() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/openai")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let analyzer = analyzer_for(&server, &[ProviderName::OpenAi]);
        let err = analyzer
            .analyze_with_default(&sample_transaction())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::ProviderStatus { status: 503, .. }
        ));
    }

    #[tokio::test]
    async fn inconsistent_action_is_returned_verbatim() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/openai")
            .with_status(200)
            .with_body(chat_body(0.9, "review"))
            .create_async()
            .await;

        let analyzer = analyzer_for(&server, &[ProviderName::OpenAi]);
        let verdict = analyzer
            .analyze_with_default(&sample_transaction())
            .await
            .unwrap();
        assert_eq!(verdict.recommended_action, crate::domain::RecommendedAction::Review);
    }

    #[test]
    fn lists_configured_providers() {
        let settings = ProviderSettings::with_defaults(ProviderName::Claude, "k");
        let client = ProviderClient::new(ProviderName::Claude, settings, Client::new(), RetryPolicy::default());
        let analyzer = RiskAnalyzer::new([client], ProviderName::Claude);

        assert_eq!(analyzer.configured_providers(), vec![ProviderName::Claude]);
        assert_eq!(analyzer.default_provider(), ProviderName::Claude);
    }
}
