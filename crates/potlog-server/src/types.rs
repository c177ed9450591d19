//! Request and response bodies.

use potlog_settle::{Amount, BalanceMode, CashOuts, DebtId, NumericCode, PlayerId, Session};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub stakes: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub numeric_id: NumericCode,
    pub session: Session,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPlayerRequest {
    pub name: String,
    #[serde(default)]
    pub initial_buy_in: Amount,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuyRequest {
    pub player_id: PlayerId,
    pub amount: Amount,
}

/// Body of both settle and preview.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleRequest {
    pub cash_outs: CashOuts,
    #[serde(default)]
    pub balance_mode: BalanceMode,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualSettleRequest {
    pub debt_id: DebtId,
    pub settled_amount: Amount,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTransferRequest {
    pub from_player_id: PlayerId,
    pub to_player_id: PlayerId,
    pub amount: Amount,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiffResponse {
    pub diff: Amount,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            service: "potlog".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_request_defaults_to_max_winner() {
        let req: SettleRequest =
            serde_json::from_str(r#"{"cashOuts":{"p1":100,"p2":0}}"#).unwrap();
        assert_eq!(req.balance_mode, BalanceMode::MaxWinner);
        assert_eq!(req.cash_outs.len(), 2);

        let req: SettleRequest =
            serde_json::from_str(r#"{"cashOuts":{},"balanceMode":"PROPORTIONAL"}"#).unwrap();
        assert_eq!(req.balance_mode, BalanceMode::Proportional);
    }

    #[test]
    fn add_player_request_fields() {
        let req: AddPlayerRequest =
            serde_json::from_str(r#"{"name":"Alice","initialBuyIn":5000,"userId":"u1"}"#)
                .unwrap();
        assert_eq!(req.initial_buy_in, 5000);
        assert_eq!(req.user_id.as_deref(), Some("u1"));
    }
}
