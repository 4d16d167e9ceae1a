use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Trade;

/// Aggregated performance snapshot over the closed-trade set.
///
/// Derived on demand, never persisted. An empty (or all-open) trade set
/// produces the all-zero record rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub profit_factor: Decimal,
    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    pub consecutive_wins: u32,
    pub consecutive_losses: u32,
    pub risk_reward_ratio: Decimal,
}

/// Compute performance metrics over the full trade set.
///
/// Only closed trades with a realized P&L participate. A win is `pnl > 0`
/// and a loss is `pnl < 0`; break-even trades count toward the totals but
/// toward neither side. Streaks are taken over the trades in the order given
/// (storage insertion order, not re-sorted by date), and a break-even trade
/// extends a loss streak.
pub fn calculate_metrics(trades: &[Trade]) -> PerformanceMetrics {
    let pnls: Vec<Decimal> = trades
        .iter()
        .filter(|t| !t.is_open)
        .filter_map(|t| t.pnl)
        .collect();

    if pnls.is_empty() {
        return PerformanceMetrics::default();
    }

    let wins: Vec<Decimal> = pnls.iter().copied().filter(|p| *p > Decimal::ZERO).collect();
    let losses: Vec<Decimal> = pnls.iter().copied().filter(|p| *p < Decimal::ZERO).collect();

    let total_pnl = pnls.iter().copied().sum::<Decimal>();
    let gross_wins = wins.iter().copied().sum::<Decimal>();
    let gross_losses = losses.iter().copied().sum::<Decimal>().abs();

    let closed_count = Decimal::from(pnls.len() as u64);
    let win_rate = Decimal::from(wins.len() as u64) / closed_count * Decimal::ONE_HUNDRED;

    let average_win = if wins.is_empty() {
        Decimal::ZERO
    } else {
        gross_wins / Decimal::from(wins.len() as u64)
    };
    let average_loss = if losses.is_empty() {
        Decimal::ZERO
    } else {
        gross_losses / Decimal::from(losses.len() as u64)
    };

    let profit_factor = if gross_losses.is_zero() {
        Decimal::ZERO
    } else {
        gross_wins / gross_losses
    };

    let largest_win = wins.iter().copied().max().unwrap_or(Decimal::ZERO);
    let largest_loss = losses.iter().copied().min().unwrap_or(Decimal::ZERO);

    let (consecutive_wins, consecutive_losses) = longest_streaks(&pnls);

    let risk_reward_ratio = if average_loss.is_zero() {
        Decimal::ZERO
    } else {
        average_win / average_loss
    };

    PerformanceMetrics {
        total_trades: pnls.len(),
        win_rate,
        total_pnl,
        average_win,
        average_loss,
        profit_factor,
        largest_win,
        largest_loss,
        consecutive_wins,
        consecutive_losses,
        risk_reward_ratio,
    }
}

/// Longest win and loss streak lengths over the P&L sequence as given.
/// Break-even results fall on the loss side (the win test is `pnl > 0`).
fn longest_streaks(pnls: &[Decimal]) -> (u32, u32) {
    let mut best_wins = 0u32;
    let mut best_losses = 0u32;
    let mut cur_wins = 0u32;
    let mut cur_losses = 0u32;

    for pnl in pnls {
        if *pnl > Decimal::ZERO {
            cur_wins += 1;
            cur_losses = 0;
            best_wins = best_wins.max(cur_wins);
        } else {
            cur_losses += 1;
            cur_wins = 0;
            best_losses = best_losses.max(cur_losses);
        }
    }

    (best_wins, best_losses)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
