use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::import::{broker::split_csv_line, parse_timestamp};
use crate::models::{Direction, Instrument, Trade};

/// Parse this crate's own CSV export back into trades.
///
/// Columns are positional, matching the export header order; no header
/// validation is performed. Malformed numeric fields default to zero and a
/// missing date defaults to now; rows are never rejected. The export writes
/// only the entry date, so a closed row's exit date mirrors its date column.
pub fn parse_plain_csv(content: &str) -> Vec<Trade> {
    content
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(parse_row)
        .collect()
}

fn parse_row(line: &str) -> Trade {
    let values = split_csv_line(line);
    let col = |i: usize| values.get(i).map(String::as_str).unwrap_or("");

    let entry_date = parse_timestamp(col(0)).unwrap_or_else(|| {
        tracing::debug!(date = col(0), "Unparseable date, defaulting to now");
        Utc::now()
    });

    let exit_price = if col(4).is_empty() {
        None
    } else {
        Some(parse_decimal(col(4)))
    };
    let pnl = if col(6).is_empty() {
        None
    } else {
        Some(parse_decimal(col(6)))
    };

    Trade {
        id: Uuid::new_v4(),
        symbol: col(1).to_string(),
        direction: Direction::from_api_str(col(2)).unwrap_or(Direction::Long),
        instrument: Instrument::Stock,
        entry_price: parse_decimal(col(3)),
        exit_price,
        size: parse_decimal(col(5)).trunc(),
        entry_date,
        exit_date: exit_price.map(|_| entry_date),
        is_open: col(8) == "Open",
        pnl,
        commission: parse_decimal(col(7)),
        notes: col(12).to_string(),
        tags: col(13)
            .split(';')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        setup: col(9).to_string(),
        risk: parse_decimal(col(10)),
        reward: parse_decimal(col(11)),
    }
}

fn parse_decimal(s: &str) -> Decimal {
    s.parse().unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
