use serde::{Deserialize, Serialize};

/// Direction of a transfer between the savings and investment buckets.
///
/// The wire encoding matches what the ledger service expects
/// (`SAVINGS_TO_INVESTMENT` / `INVESTMENT_TO_SAVINGS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferDirection {
    SavingsToInvestment,
    InvestmentToSavings,
}

impl TransferDirection {
    /// User-facing label used in activity messages and notifications.
    pub fn describe(self) -> &'static str {
        match self {
            TransferDirection::SavingsToInvestment => "Savings → Investment",
            TransferDirection::InvestmentToSavings => "Investment → Savings",
        }
    }
}
