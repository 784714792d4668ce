pub mod transaction;
pub mod verdict;

pub use transaction::{Customer, Merchant, PaymentMethod, Transaction};
pub use verdict::{RecommendedAction, RiskVerdict, VerdictError};
