pub mod notifier;
pub mod risk_analyzer;

pub use notifier::{AdminAlert, AdminNotifier};
pub use risk_analyzer::RiskAnalyzer;
