//! Transaction domain entity.
//! Immutable value object received from the payment webhook and handed to the analyzers.

use serde::{Deserialize, Serialize};

/// A payment event submitted for fraud-risk analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    /// ISO-8601 / RFC 3339 timestamp, kept as received.
    pub timestamp: String,
    pub amount: f64,
    pub currency: String,
    pub customer: Customer,
    pub payment_method: PaymentMethod,
    pub merchant: Merchant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub country: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(rename = "type")]
    pub kind: String,
    pub last_four: String,
    pub country_of_issue: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub category: String,
}

impl Transaction {
    /// Pretty-printed JSON form embedded into prompts and alerts.
    pub fn to_pretty_json(&self) -> String {
        // Serializing plain strings and a finite f64 cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
