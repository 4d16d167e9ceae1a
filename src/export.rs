use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::JournalError;
use crate::models::{JournalEntry, Trade};

/// CSV export column order. The plain-CSV importer reads positionally in
/// this same order.
pub const CSV_HEADER: &str =
    "Date,Symbol,Direction,Entry Price,Exit Price,Size,P&L,Commission,Status,Setup,Risk,Reward,Notes,Tags";

/// Full-backup document: both persisted arrays plus the export timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub trades: Vec<Trade>,
    pub journal: Vec<JournalEntry>,
    /// Missing in hand-edited backups; defaulted rather than rejected.
    #[serde(rename = "exportDate", default = "Utc::now")]
    pub export_date: DateTime<Utc>,
}

/// Render trades as CSV. Notes and tags are double-quoted with internal
/// quotes doubled; tags are joined by `;`.
pub fn trades_to_csv(trades: &[Trade]) -> String {
    let mut out = String::from(CSV_HEADER);
    for trade in trades {
        out.push('\n');
        out.push_str(&csv_row(trade));
    }
    out
}

fn csv_row(trade: &Trade) -> String {
    let exit_price = trade
        .exit_price
        .map(|p| p.to_string())
        .unwrap_or_default();
    let pnl = trade.pnl.map(|p| p.to_string()).unwrap_or_default();
    let status = if trade.is_open { "Open" } else { "Closed" };

    [
        trade.entry_date.to_rfc3339(),
        trade.symbol.clone(),
        trade.direction.to_string(),
        trade.entry_price.to_string(),
        exit_price,
        trade.size.to_string(),
        pnl,
        trade.commission.to_string(),
        status.to_string(),
        trade.setup.clone(),
        trade.risk.to_string(),
        trade.reward.to_string(),
        quote(&trade.notes),
        quote(&trade.tags.join(";")),
    ]
    .join(",")
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Serialize a backup as pretty JSON.
pub fn backup_to_json(backup: &Backup) -> Result<String, JournalError> {
    Ok(serde_json::to_string_pretty(backup)?)
}

/// Parse and validate a JSON backup. The document must carry `trades` and
/// `journal` arrays; anything else is rejected as an invalid backup.
pub fn backup_from_json(text: &str) -> Result<Backup, JournalError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| JournalError::InvalidBackup(e.to_string()))?;

    for field in ["trades", "journal"] {
        if !value.get(field).map_or(false, serde_json::Value::is_array) {
            return Err(JournalError::InvalidBackup(format!(
                "expected a {field} array"
            )));
        }
    }

    serde_json::from_value(value).map_err(|e| JournalError::InvalidBackup(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
