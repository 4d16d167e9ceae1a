use rust_decimal::Decimal;

use crate::models::{Direction, Instrument, Trade};

/// Pip scale for standard 4-decimal quoting.
const PIP_SCALE: u32 = 10_000;
/// Pip scale for 2-decimal (JPY-quote) pairs.
const PIP_SCALE_JPY: u32 = 100;

/// Realized P&L of a closed trade, in account currency.
///
/// Pure and total: a trade with no exit price yields `Decimal::ZERO` rather
/// than an error. Commission is subtracted last.
///
/// Forex pip-value convention: when the trade carries no explicit pip value,
/// 10 USD per pip per standard lot is assumed (USD-quote pairs). Pairs quoted
/// to 2 decimals (symbol contains `JPY`) scale at 100 pips per unit of price,
/// all others at 10000.
pub fn realized_pnl(trade: &Trade) -> Decimal {
    let exit = match trade.exit_price {
        Some(p) => p,
        None => return Decimal::ZERO,
    };

    let diff = match trade.direction {
        Direction::Long => exit - trade.entry_price,
        Direction::Short => trade.entry_price - exit,
    };

    let gross = match &trade.instrument {
        Instrument::Stock | Instrument::Crypto => diff * trade.size,
        Instrument::Forex {
            lots, pip_value, ..
        } => {
            let scale = if trade.symbol.contains("JPY") {
                PIP_SCALE_JPY
            } else {
                PIP_SCALE
            };
            let pips = diff * Decimal::from(scale);
            pips * pip_value.unwrap_or(Decimal::TEN) * lots
        }
        Instrument::Commodity {
            contracts,
            tick_size,
            tick_value,
        } => {
            if tick_size.is_zero() {
                Decimal::ZERO
            } else {
                diff / tick_size * tick_value * contracts
            }
        }
    };

    gross - trade.commission
}

/// Intended reward over accepted risk. Zero risk yields 0 by convention.
pub fn risk_reward_ratio(risk: Decimal, reward: Decimal) -> Decimal {
    if risk <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    reward / risk
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
