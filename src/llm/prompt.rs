//! Per-provider prompt rendering.
//!
//! Every style requests the same four-field verdict schema and embeds the
//! transaction as pretty-printed JSON; only the prose differs.

use crate::domain::Transaction;
use crate::llm::provider::ProviderName;

/// Jurisdictions treated as high risk (weak AML controls), as ISO 3166 alpha-2 codes.
pub const HIGH_RISK_COUNTRIES: &[(&str, &str)] = &[
    ("AF", "Afghanistan"),
    ("HT", "Haiti"),
    ("IR", "Iran"),
    ("KP", "North Korea"),
    ("MM", "Myanmar"),
    ("SS", "South Sudan"),
    ("SY", "Syria"),
    ("YE", "Yemen"),
];

/// System message sent alongside the prompt by providers that support one.
pub const SYSTEM_PROMPT: &str =
    "You are a specialized financial risk analyst responding with valid JSON only.";

const RESPONSE_SCHEMA: &str = r#"{
    "risk_score": 0.0-1.0,
    "risk_factors": ["factor1", "factor2"...],
    "reasoning": "A brief explanation of your analysis",
    "recommended_action": "allow|review|block"
}"#;

const THRESHOLDS: &str =
    "Recommend \"allow\" for scores 0.0-0.3, \"review\" for scores 0.3-0.7, and \"block\" for scores 0.7-1.0.";

pub fn build_prompt(provider: ProviderName, transaction: &Transaction) -> String {
    match provider {
        ProviderName::OpenAi => openai_prompt(transaction),
        ProviderName::Claude => claude_prompt(transaction),
        ProviderName::Groq => groq_prompt(transaction),
    }
}

fn high_risk_country_list() -> String {
    HIGH_RISK_COUNTRIES
        .iter()
        .map(|(code, name)| format!("{} ({})", code, name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn openai_prompt(transaction: &Transaction) -> String {
    format!(
        r#"# Transaction Risk Analysis Prompt

## System Instructions
You are a specialised financial risk analyst. Your task is to evaluate transaction data and determine a risk score from 0.0 (no risk) to 1.0 (extremely high risk) based on patterns and indicators of potential fraud. You must also provide clear reasoning for your risk assessment.

## Response Format
Respond ONLY with a valid JSON object in the following structure. Do NOT include markdown, backticks, or explanations, just the pure JSON.
{schema}
You MUST include ALL of the keys: "risk_score", "risk_factors", "reasoning" and "recommended_action".

## Risk Factors to Consider

1. **Geographic Anomalies**
   - Customer country differs from payment method country
   - Transactions from high-risk countries: {countries}
   - IP address location inconsistent with customer country

2. **Transaction Patterns**
   - Unusual amount for the merchant category
   - Transactions outside business hours
   - Rapid repeat transactions

3. **Payment Method Indicators**
   - Risky payment method types
   - Recently added payment methods

4. **Merchant Factors**
   - Merchant category with high fraud rates
   - Poor merchant history or reputation

## Additional Guidelines
- Combine multiple factors to increase risk
- Higher amounts = higher scrutiny
- Account for common cross-border activity
- Provide actionable reasoning behind the score
- {thresholds}

## Transaction Data
{transaction}
"#,
        schema = RESPONSE_SCHEMA,
        countries = high_risk_country_list(),
        thresholds = THRESHOLDS,
        transaction = transaction.to_pretty_json(),
    )
}

fn claude_prompt(transaction: &Transaction) -> String {
    format!(
        r#"Analyze this financial transaction and respond ONLY with a valid JSON object containing:
- risk_score: number between 0.0 and 1.0
- risk_factors: array of strings
- reasoning: brief string explanation
- recommended_action: string ("allow", "review", or "block")

Expected shape:
{schema}

Consider geographic mismatches between customer, card and IP address, transactions involving high-risk countries ({countries}), unusual amounts for the merchant category, and risky payment methods.
{thresholds}

Transaction data:
{transaction}

Your response must be valid JSON without any additional text, explanation, or markdown.
"#,
        schema = RESPONSE_SCHEMA,
        countries = high_risk_country_list(),
        thresholds = THRESHOLDS,
        transaction = transaction.to_pretty_json(),
    )
}

fn groq_prompt(transaction: &Transaction) -> String {
    format!(
        r#"# Transaction Risk Analysis Prompt
## System Instructions
You are a specialised financial risk analyst. Your task is to evaluate transaction data and determine a risk score from 0.0 (no risk) to 1.0 (extremely high risk) based on patterns and indicators of potential fraud. You must also provide clear reasoning for your risk assessment.

!!! IMPORTANT: Respond in valid JSON format only and only the json format given below.
!!! Do not include any other text or explanations outside of the JSON response.
!!! Do NOT include Markdown formatting like ```json

## Response Format
{schema}

## Risk Factors to Consider
1. **Geographic Anomalies**: customer country differs from the payment method country; transactions from high-risk countries ({countries}); IP address location inconsistent with the customer's country.
2. **Transaction Patterns**: unusual amount for the merchant category; transactions outside normal business hours; multiple transactions in short succession.
3. **Payment Method Indicators**: payment method type and associated risks; recently added payment methods.
4. **Merchant Factors**: merchant category and typical fraud rates; merchant history and reputation.

## Additional Guidelines
- Assign higher risk scores to combinations of multiple risk factors
- Higher amounts generally warrant more scrutiny
- Account for normal cross-border shopping patterns while flagging unusual combinations
- {thresholds}

## Transaction Data
{transaction}
"#,
        schema = RESPONSE_SCHEMA,
        countries = high_risk_country_list(),
        thresholds = THRESHOLDS,
        transaction = transaction.to_pretty_json(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::fixtures::sample_transaction;

    #[test]
    fn every_prompt_contains_identifying_fields() {
        let tx = sample_transaction();
        for provider in ProviderName::ALL {
            let prompt = build_prompt(provider, &tx);
            assert!(prompt.contains("tx_12345abcde"), "{} prompt lacks tx id", provider);
            assert!(prompt.contains("cust_98765zyxwv"), "{} prompt lacks customer id", provider);
            assert!(prompt.contains("merch_abcde12345"), "{} prompt lacks merchant id", provider);
        }
    }

    #[test]
    fn every_prompt_requests_the_same_schema() {
        let tx = sample_transaction();
        for provider in ProviderName::ALL {
            let prompt = build_prompt(provider, &tx);
            for key in ["risk_score", "risk_factors", "reasoning", "recommended_action"] {
                assert!(prompt.contains(key), "{} prompt lacks {}", provider, key);
            }
            assert!(prompt.contains("allow|review|block"));
            assert!(prompt.contains("0.0-0.3"));
            assert!(prompt.contains("0.7-1.0"));
        }
    }

    #[test]
    fn every_prompt_lists_high_risk_countries() {
        let tx = sample_transaction();
        for provider in ProviderName::ALL {
            let prompt = build_prompt(provider, &tx);
            for (code, _) in HIGH_RISK_COUNTRIES {
                assert!(prompt.contains(code), "{} prompt lacks {}", provider, code);
            }
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let tx = sample_transaction();
        assert_eq!(
            build_prompt(ProviderName::Groq, &tx),
            build_prompt(ProviderName::Groq, &tx)
        );
    }

    #[test]
    fn styles_differ_between_providers() {
        let tx = sample_transaction();
        assert_ne!(
            build_prompt(ProviderName::OpenAi, &tx),
            build_prompt(ProviderName::Claude, &tx)
        );
    }
}
