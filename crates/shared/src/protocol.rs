use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::TransferDirection;

/// Last-fetched balance view for one identity. Field names follow the ledger
/// service's JSON contract. The snapshot is treated as opaque by the client:
/// it is always replaced wholesale, never patched, and `investment_balance`
/// is not re-derived from `funds` locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    pub cash: Decimal,
    pub savings_balance: Decimal,
    pub investment_balance: Decimal,
    pub funds: BTreeMap<String, Decimal>,
}

/// A user-initiated money-movement request, produced by input capture and
/// consumed by the orchestrator's single entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Operation {
    Deposit {
        amount: Decimal,
    },
    Withdraw {
        amount: Decimal,
    },
    Send {
        recipient: String,
        amount: Decimal,
    },
    Transfer {
        direction: TransferDirection,
        amount: Decimal,
    },
    Invest {
        fund: String,
        amount: Decimal,
    },
    LiquidateInvestments,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRequest {
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountRequest {
    pub user: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub user: String,
    pub direction: TransferDirection,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestRequest {
    pub user: String,
    pub fund: String,
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn balance_snapshot_round_trips_camel_case_fields() {
        let raw = r#"{
            "cash": 120.5,
            "savingsBalance": 300.0,
            "investmentBalance": 75.25,
            "funds": { "Green Energy": 50.25, "Tech Growth": 25.0 }
        }"#;

        let snapshot: BalanceSnapshot = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(snapshot.cash, dec!(120.5));
        assert_eq!(snapshot.savings_balance, dec!(300.0));
        assert_eq!(snapshot.investment_balance, dec!(75.25));
        assert_eq!(snapshot.funds.get("Green Energy"), Some(&dec!(50.25)));

        let value = serde_json::to_value(&snapshot).expect("serialize");
        assert!(value.get("savingsBalance").is_some());
        assert!(value.get("investmentBalance").is_some());
    }

    #[test]
    fn transfer_request_carries_wire_direction() {
        let request = TransferRequest {
            user: "alice".into(),
            direction: TransferDirection::SavingsToInvestment,
            amount: dec!(10),
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["direction"], "SAVINGS_TO_INVESTMENT");
    }
}
