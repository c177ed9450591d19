use potlog_types::{Amount, NumericCode, Session, SessionStatus, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{SettleError, SettleResult};

/// One settled session from a user's point of view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub numeric_id: NumericCode,
    pub stakes: String,
    pub net: Amount,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub settled_at: Timestamp,
}

/// Lifetime results of a user across settled sessions, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: String,
    pub total_net: Amount,
    pub session_count: usize,
    pub sessions: Vec<SessionSummary>,
}

impl UserStats {
    /// Aggregate the user's nets over SETTLED sessions. Sessions the user
    /// did not play in, or that are still ACTIVE, are skipped.
    ///
    /// A session counts the first seat linked to the user; further seats
    /// with the same link are ignored.
    pub fn from_sessions<'a>(
        user_id: &str,
        sessions: impl IntoIterator<Item = &'a Session>,
    ) -> SettleResult<Self> {
        let mut summaries: Vec<SessionSummary> = sessions
            .into_iter()
            .filter(|s| s.status == SessionStatus::Settled)
            .filter_map(|s| {
                let seat = s
                    .players
                    .iter()
                    .find(|p| p.user_id.as_deref() == Some(user_id))?;
                Some(SessionSummary {
                    numeric_id: s.numeric_id,
                    stakes: s.stakes.clone(),
                    net: seat.net,
                    settled_at: s.settled_at.unwrap_or(s.created_at),
                })
            })
            .collect();
        summaries.sort_by(|a, b| b.settled_at.cmp(&a.settled_at));

        let total_net = summaries
            .iter()
            .try_fold(0 as Amount, |total, s| total.checked_add(s.net))
            .ok_or_else(|| SettleError::InvalidArgument("total net out of range".into()))?;
        Ok(Self {
            user_id: user_id.to_string(),
            total_net,
            session_count: summaries.len(),
            sessions: summaries,
        })
    }
}
