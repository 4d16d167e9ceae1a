use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Trade;

/// One point on the cumulative P&L curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Exit date, formatted `YYYY-MM-DD`.
    pub date: String,
    /// Cumulative P&L up to and including this trade.
    pub pnl: Decimal,
    /// Symbol of the closing trade, for tooltip display.
    pub symbol: String,
}

/// Cumulative P&L over closed trades, ascending by exit time.
///
/// Pure function of the input: callable repeatedly, fully materialized.
/// Trades closing at the same instant keep their relative input order
/// (stable sort). The final point's `pnl` equals the total P&L of the same
/// closed-trade set.
pub fn equity_curve(trades: &[Trade]) -> Vec<EquityPoint> {
    let mut closed: Vec<_> = trades
        .iter()
        .filter(|t| !t.is_open)
        .filter_map(|t| {
            match (t.exit_date, t.pnl) {
                (Some(exit), Some(pnl)) => Some((exit, pnl, t.symbol.as_str())),
                _ => None,
            }
        })
        .collect();

    closed.sort_by_key(|(exit, _, _)| *exit);

    let mut running = Decimal::ZERO;
    closed
        .into_iter()
        .map(|(exit, pnl, symbol)| {
            running += pnl;
            EquityPoint {
                date: exit.format("%Y-%m-%d").to_string(),
                pnl: running,
                symbol: symbol.to_string(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::analytics::calculate_metrics;
    use crate::models::{Direction, Instrument};

    fn make_trade(symbol: &str, pnl: i64, days_ago: i64) -> Trade {
        let exit = Utc::now() - Duration::days(days_ago);
        Trade {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            direction: Direction::Long,
            instrument: Instrument::Stock,
            entry_price: Decimal::from(100),
            exit_price: Some(Decimal::from(110)),
            size: Decimal::from(10),
            entry_date: exit - Duration::days(1),
            exit_date: Some(exit),
            is_open: false,
            pnl: Some(Decimal::from(pnl)),
            commission: Decimal::ZERO,
            notes: String::new(),
            tags: Vec::new(),
            setup: String::new(),
            risk: Decimal::ZERO,
            reward: Decimal::ZERO,
        }
    }

    #[test]
    fn curve_is_sorted_and_cumulative() {
        // Input deliberately out of exit-date order.
        let trades = vec![
            make_trade("B", -50, 1),
            make_trade("A", 100, 3),
            make_trade("C", 25, 0),
        ];

        let curve = equity_curve(&trades);
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[0].symbol, "A");
        assert_eq!(curve[0].pnl, Decimal::from(100));
        assert_eq!(curve[1].symbol, "B");
        assert_eq!(curve[1].pnl, Decimal::from(50));
        assert_eq!(curve[2].symbol, "C");
        assert_eq!(curve[2].pnl, Decimal::from(75));
    }

    #[test]
    fn final_point_matches_total_pnl() {
        let trades = vec![
            make_trade("A", 100, 4),
            make_trade("B", -30, 2),
            make_trade("C", 45, 1),
        ];
        let curve = equity_curve(&trades);
        let metrics = calculate_metrics(&trades);
        assert_eq!(curve.last().unwrap().pnl, metrics.total_pnl);
    }

    #[test]
    fn open_trades_are_excluded() {
        let mut open = make_trade("A", 0, 0);
        open.is_open = true;
        open.pnl = None;
        open.exit_price = None;
        open.exit_date = None;

        let curve = equity_curve(&[open, make_trade("B", 10, 1)]);
        assert_eq!(curve.len(), 1);
        assert_eq!(curve[0].symbol, "B");
    }

    #[test]
    fn equal_exit_times_keep_input_order() {
        let ts = Utc::now();
        let mut first = make_trade("FIRST", 10, 0);
        let mut second = make_trade("SECOND", 20, 0);
        first.exit_date = Some(ts);
        second.exit_date = Some(ts);

        let curve = equity_curve(&[first, second]);
        assert_eq!(curve[0].symbol, "FIRST");
        assert_eq!(curve[1].symbol, "SECOND");
    }
}
