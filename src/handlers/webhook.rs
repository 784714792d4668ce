use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::domain::{RecommendedAction, Transaction};
use crate::error::AppError;
use crate::validation::validate_transaction;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    /// Overrides the configured default provider for this request.
    pub provider: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub transaction_id: String,
    pub risk_score: f64,
    pub recommended_action: RecommendedAction,
}

/// Parses and validates an inbound webhook body.
pub fn parse_transaction(body: &[u8]) -> Result<Transaction, AppError> {
    let transaction: Transaction = serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Data => AppError::Validation(e.to_string()),
        _ => {
            tracing::warn!(error = %e, "Error parsing request");
            AppError::BadRequest("Invalid request format".to_string())
        }
    })?;

    validate_transaction(&transaction).map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(transaction)
}

pub async fn transaction_webhook(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
    body: Bytes,
) -> Result<Json<AnalysisResponse>, AppError> {
    let transaction = parse_transaction(&body)?;

    let provider = params
        .provider
        .unwrap_or_else(|| state.analyzer.default_provider().to_string());

    let verdict = state
        .analyzer
        .analyze_transaction(&transaction, &provider)
        .await?;

    state
        .notifier
        .notify_if_high_risk(&transaction, &verdict)
        .await;

    Ok(Json(AnalysisResponse {
        transaction_id: transaction.transaction_id,
        risk_score: verdict.risk_score,
        recommended_action: verdict.recommended_action,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::fixtures::sample_transaction;

    #[test]
    fn parses_valid_body() {
        let body = serde_json::to_vec(&sample_transaction()).unwrap();
        assert_eq!(parse_transaction(&body).unwrap(), sample_transaction());
    }

    #[test]
    fn malformed_json_is_bad_request() {
        match parse_transaction(b"{bad json") {
            Err(AppError::BadRequest(message)) => assert!(message.contains("Invalid")),
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn missing_field_is_validation_error() {
        let err = parse_transaction(br#"{"transaction_id":"tx_12345abcde"}"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn field_rules_are_applied() {
        let mut tx = sample_transaction();
        tx.payment_method.last_four = "42".to_string();
        let body = serde_json::to_vec(&tx).unwrap();

        let err = parse_transaction(&body).unwrap_err();
        assert!(err.to_string().contains("payment_method.last_four"));
    }

    #[test]
    fn accepts_iso8601_timestamps_without_offset() {
        for timestamp in ["2025-05-07T14:30:45", "2025-05-07T14:30:45.123456", "20250507T143045Z"] {
            let mut tx = sample_transaction();
            tx.timestamp = timestamp.to_string();
            let body = serde_json::to_vec(&tx).unwrap();

            assert_eq!(parse_transaction(&body).unwrap().timestamp, timestamp);
        }
    }
}
