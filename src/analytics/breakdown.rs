use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Trade;

/// Closed-trade activity for one calendar day (by exit date, UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub pnl: Decimal,
    pub trades: usize,
    pub wins: usize,
    /// Percentage of the day's trades that were winners.
    pub win_rate: Decimal,
}

/// P&L summed over one `YYYY-MM` bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPnl {
    pub month: String,
    pub pnl: Decimal,
}

/// P&L and trade count for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolPnl {
    pub symbol: String,
    pub pnl: Decimal,
    pub trades: usize,
}

/// Group closed trades by exit date, ascending. Feeds the calendar view.
pub fn daily_summaries(trades: &[Trade]) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, (Decimal, usize, usize)> = BTreeMap::new();

    for (exit, pnl) in closed_pnls(trades) {
        let entry = days.entry(exit.date_naive()).or_default();
        entry.0 += pnl;
        entry.1 += 1;
        if pnl > Decimal::ZERO {
            entry.2 += 1;
        }
    }

    days.into_iter()
        .map(|(date, (pnl, trades, wins))| DailySummary {
            date,
            pnl,
            trades,
            wins,
            win_rate: Decimal::from(wins as u64) / Decimal::from(trades as u64)
                * Decimal::ONE_HUNDRED,
        })
        .collect()
}

/// P&L per `YYYY-MM` month of exit, ascending.
pub fn monthly_pnl(trades: &[Trade]) -> Vec<MonthlyPnl> {
    let mut months: BTreeMap<String, Decimal> = BTreeMap::new();

    for (exit, pnl) in closed_pnls(trades) {
        *months.entry(exit.format("%Y-%m").to_string()).or_default() += pnl;
    }

    months
        .into_iter()
        .map(|(month, pnl)| MonthlyPnl { month, pnl })
        .collect()
}

/// P&L and trade count per symbol, ascending by symbol.
pub fn pnl_by_symbol(trades: &[Trade]) -> Vec<SymbolPnl> {
    let mut symbols: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();

    for trade in trades.iter().filter(|t| !t.is_open) {
        if let Some(pnl) = trade.pnl {
            let entry = symbols.entry(trade.symbol.clone()).or_default();
            entry.0 += pnl;
            entry.1 += 1;
        }
    }

    symbols
        .into_iter()
        .map(|(symbol, (pnl, trades))| SymbolPnl {
            symbol,
            pnl,
            trades,
        })
        .collect()
}

fn closed_pnls(trades: &[Trade]) -> impl Iterator<Item = (chrono::DateTime<chrono::Utc>, Decimal)> + '_ {
    trades.iter().filter(|t| !t.is_open).filter_map(|t| {
        match (t.exit_date, t.pnl) {
            (Some(exit), Some(pnl)) => Some((exit, pnl)),
            _ => None,
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
