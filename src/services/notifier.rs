use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::domain::{RecommendedAction, RiskVerdict, Transaction};

pub const ALERT_TYPE_HIGH_RISK: &str = "high_risk_transaction";

/// Payload posted to the admin alert endpoint.
#[derive(Debug, Serialize)]
pub struct AdminAlert<'a> {
    pub alert_type: &'static str,
    pub transaction_id: &'a str,
    pub risk_score: f64,
    pub risk_factors: &'a [String],
    pub reasoning: &'a str,
    pub recommended_action: RecommendedAction,
    pub transaction_details: &'a Transaction,
}

impl<'a> AdminAlert<'a> {
    pub fn high_risk(transaction: &'a Transaction, verdict: &'a RiskVerdict) -> Self {
        Self {
            alert_type: ALERT_TYPE_HIGH_RISK,
            transaction_id: &transaction.transaction_id,
            risk_score: verdict.risk_score,
            risk_factors: &verdict.risk_factors,
            reasoning: &verdict.reasoning,
            recommended_action: verdict.recommended_action,
            transaction_details: transaction,
        }
    }
}

/// Best-effort delivery of high-risk alerts. Failures are logged, never returned.
#[derive(Clone)]
pub struct AdminNotifier {
    client: Client,
    url: String,
    threshold: f64,
}

impl AdminNotifier {
    pub fn new(url: String, threshold: f64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url,
            threshold,
        })
    }

    pub fn should_notify(&self, verdict: &RiskVerdict) -> bool {
        verdict.risk_score >= self.threshold
    }

    /// Posts an alert when the verdict crosses the threshold.
    /// Returns whether an alert was attempted.
    pub async fn notify_if_high_risk(&self, transaction: &Transaction, verdict: &RiskVerdict) -> bool {
        if !self.should_notify(verdict) {
            return false;
        }

        let alert = AdminAlert::high_risk(transaction, verdict);
        match self.send(&alert).await {
            Ok(()) => info!(
                transaction_id = %transaction.transaction_id,
                risk_score = verdict.risk_score,
                "Admin notification sent"
            ),
            Err(e) => error!(
                transaction_id = %transaction.transaction_id,
                error = %e,
                "Error sending admin notification"
            ),
        }

        true
    }

    pub async fn send(&self, alert: &AdminAlert<'_>) -> Result<(), reqwest::Error> {
        self.client
            .post(&self.url)
            .json(alert)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
