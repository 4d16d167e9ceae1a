use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "long" | "buy" => Some(Direction::Long),
            "short" | "sell" => Some(Direction::Short),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Instrument
// ---------------------------------------------------------------------------

/// Instrument class, carrying the sizing geometry that class needs.
///
/// Stock and crypto positions are sized purely by the trade's share/unit
/// count. Forex carries lot geometry (pip value may be absent, in which case
/// the P&L engine applies its documented default). Commodity/futures carry
/// contract and tick geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "lowercase")]
pub enum Instrument {
    Stock,
    Crypto,
    Forex {
        lots: Decimal,
        lot_size: Decimal,
        pip_value: Option<Decimal>,
    },
    Commodity {
        contracts: Decimal,
        tick_size: Decimal,
        tick_value: Decimal,
    },
}

impl Instrument {
    pub fn class_str(&self) -> &'static str {
        match self {
            Instrument::Stock => "stock",
            Instrument::Crypto => "crypto",
            Instrument::Forex { .. } => "forex",
            Instrument::Commodity { .. } => "commodity",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_str())
    }
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

/// A single position lifecycle record, open or closed.
///
/// `exit_price`, `exit_date` and `pnl` are populated iff the trade is closed
/// (`is_open == false`). `pnl` is derived, recomputed by the journal service
/// whenever a trade transitions to closed, except for broker imports, which
/// carry the broker-reported value verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub symbol: String,
    pub direction: Direction,
    pub instrument: Instrument,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    /// Share/unit count. Forex imports record the raw unit count here in
    /// addition to the lot geometry on the instrument.
    pub size: Decimal,
    pub entry_date: DateTime<Utc>,
    pub exit_date: Option<DateTime<Utc>>,
    pub is_open: bool,
    pub pnl: Option<Decimal>,
    pub commission: Decimal,
    pub notes: String,
    pub tags: Vec<String>,
    pub setup: String,
    pub risk: Decimal,
    pub reward: Decimal,
}
