use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::import::parse_timestamp;
use crate::models::{Direction, Instrument, Trade};

/// Exchange/venue prefixes stripped from symbols in action text.
const VENUE_PREFIXES: [&str; 4] = ["FX:", "OANDA:", "PEPPERSTONE:", "SPREADEX:"];

/// Symbol substrings marking a forex pair. Checked before the commodity set.
const FOREX_TOKENS: [&str; 4] = ["JPY", "USD", "EUR", "GBP"];
/// Symbol substrings marking an index/commodity contract.
const COMMODITY_TOKENS: [&str; 3] = ["NAS", "SPX", "NIKKEI"];

const STANDARD_LOT: u32 = 100_000;

/// Does this header line belong to the broker account-history export?
pub fn is_account_history(header_line: &str) -> bool {
    let cols = split_csv_line(header_line);
    ["Time", "Action", "Realized P&L (value)"]
        .iter()
        .all(|required| cols.iter().any(|c| c == required))
}

/// Minimal quote-aware comma splitter.
///
/// Splits on commas outside double quotes; a doubled quote inside a quoted
/// field yields one literal quote. Fields are trimmed.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

// ---------------------------------------------------------------------------
// Action-text extraction
// ---------------------------------------------------------------------------

/// Fields pulled out of one action description.
#[derive(Debug, Clone, PartialEq)]
struct ActionFields {
    symbol: String,
    price: Decimal,
    units: Decimal,
    avg_price: Option<Decimal>,
}

struct ActionRegexes {
    symbol: Regex,
    price: Regex,
    units: Regex,
    avg_price: Regex,
}

fn action_regexes() -> &'static ActionRegexes {
    static REGEXES: OnceLock<ActionRegexes> = OnceLock::new();
    REGEXES.get_or_init(|| ActionRegexes {
        symbol: Regex::new(r"symbol ([A-Z:]+)").expect("valid regex"),
        price: Regex::new(r"price ([\d.]+)").expect("valid regex"),
        units: Regex::new(r"for ([\d.]+) units").expect("valid regex"),
        avg_price: Regex::new(r"AVG Price was ([\d.]+)").expect("valid regex"),
    })
}

fn capture_decimal(re: &Regex, text: &str) -> Option<Decimal> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract symbol, price, unit count and the optional AVG-price override
/// from one action description. `None` when a required field is missing.
fn extract_action_fields(action: &str) -> Option<ActionFields> {
    let re = action_regexes();

    let symbol = re
        .symbol
        .captures(action)
        .and_then(|c| c.get(1))
        .map(|m| strip_venue_prefix(m.as_str()).to_string())?;
    let price = capture_decimal(&re.price, action)?;
    let units = capture_decimal(&re.units, action)?;
    let avg_price = capture_decimal(&re.avg_price, action);

    Some(ActionFields {
        symbol,
        price,
        units,
        avg_price,
    })
}

fn strip_venue_prefix(symbol: &str) -> &str {
    for prefix in VENUE_PREFIXES {
        if let Some(rest) = symbol.strip_prefix(prefix) {
            return rest;
        }
    }
    symbol
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Entry,
    Close,
    Other,
}

/// Classify an action description as a position entry, a position close, or
/// something else (order placements, cancellations, funding lines).
fn classify_action(action: &str) -> LineKind {
    if action.contains("Enter position") {
        LineKind::Entry
    } else if action.contains("Close long position") || action.contains("Close short position") {
        LineKind::Close
    } else {
        LineKind::Other
    }
}

/// A commission line not tied to an entry or close carries no position data.
fn is_pure_commission(action: &str) -> bool {
    action.contains("Commission for:")
        && !action.contains("Enter position")
        && !action.contains("Close")
}

/// Side stated in the action text, if any. Close lines always state one;
/// entry lines frequently do not.
fn stated_direction(action: &str) -> Option<Direction> {
    if action.contains("long position") {
        Some(Direction::Long)
    } else if action.contains("short position") {
        Some(Direction::Short)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Entry/close matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKey {
    symbol: String,
    /// `None` when the entry text stated no side; such entries match a close
    /// of either side.
    direction: Option<Direction>,
    rounded_units: i64,
}

#[derive(Debug, Clone)]
struct PendingEntry {
    time: DateTime<Utc>,
    symbol: String,
    price: Decimal,
    units: Decimal,
}

/// Unit counts are rounded to the nearest thousand for matching, so partial
/// fills and rounding noise on either side still pair up.
fn round_to_thousand(units: Decimal) -> i64 {
    ((units / Decimal::ONE_THOUSAND)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * Decimal::ONE_THOUSAND)
        .to_i64()
        .unwrap_or(0)
}

fn side_compatible(entry: &EntryKey, close_direction: Direction) -> bool {
    entry.direction.is_none() || entry.direction == Some(close_direction)
}

/// Find the pending entry for a close: an exact symbol/side/units key first,
/// otherwise the side-compatible entry on the same symbol whose rounded unit
/// count is nearest. On an exact distance tie the earliest-stored entry wins.
fn find_matching_entry(
    pending: &IndexMap<EntryKey, PendingEntry>,
    symbol: &str,
    close_direction: Direction,
    rounded_units: i64,
) -> Option<EntryKey> {
    let exact = EntryKey {
        symbol: symbol.to_string(),
        direction: Some(close_direction),
        rounded_units,
    };
    if pending.contains_key(&exact) {
        return Some(exact);
    }

    let mut best: Option<(i64, &EntryKey)> = None;
    for candidate in pending.keys() {
        if candidate.symbol == symbol && side_compatible(candidate, close_direction) {
            let diff = (candidate.rounded_units - rounded_units).abs();
            if best.map_or(true, |(best_diff, _)| diff < best_diff) {
                best = Some((diff, candidate));
            }
        }
    }
    best.map(|(_, k)| k.clone())
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a broker account-history CSV into closed trades.
///
/// The export is newest-first; data lines are processed in reverse so each
/// position's entry is seen before its close. Malformed lines and closes
/// with no matching entry are skipped with a diagnostic, never an error;
/// the parser returns whatever it could reconstruct. Realized P&L is taken
/// verbatim from the CSV (commission already netted by the broker).
pub fn parse_account_history(content: &str) -> Vec<Trade> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 2 {
        return Vec::new();
    }

    let mut pending: IndexMap<EntryKey, PendingEntry> = IndexMap::new();
    let mut trades = Vec::new();

    for line in lines[1..].iter().rev() {
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_csv_line(line);
        if fields.len() < 6 {
            tracing::debug!(fields = fields.len(), "Short line skipped");
            continue;
        }

        let time_str = &fields[0];
        let reported_pnl = fields[3].parse::<Decimal>().unwrap_or(Decimal::ZERO);
        let action = &fields[5];

        if is_pure_commission(action) {
            tracing::debug!("Pure commission line skipped");
            continue;
        }

        let Some(parsed) = extract_action_fields(action) else {
            tracing::debug!(action = %truncate(action, 80), "Unparseable action skipped");
            continue;
        };

        let rounded_units = round_to_thousand(parsed.units);

        match classify_action(action) {
            LineKind::Entry => {
                let Some(time) = parse_timestamp(time_str) else {
                    tracing::debug!(time = %time_str, "Entry with bad timestamp skipped");
                    continue;
                };
                let key = EntryKey {
                    symbol: parsed.symbol.clone(),
                    direction: stated_direction(action),
                    rounded_units,
                };
                // Re-entering the same signature replaces the stored entry:
                // the last unmatched entry wins.
                pending.insert(
                    key,
                    PendingEntry {
                        time,
                        symbol: parsed.symbol,
                        price: parsed.avg_price.unwrap_or(parsed.price),
                        units: parsed.units,
                    },
                );
            }
            LineKind::Close => {
                // classify_action guarantees the text states a side.
                let direction = stated_direction(action).unwrap_or(Direction::Short);

                let Some(matched_key) =
                    find_matching_entry(&pending, &parsed.symbol, direction, rounded_units)
                else {
                    tracing::warn!(
                        symbol = %parsed.symbol,
                        direction = %direction,
                        units = rounded_units,
                        "Close with no matching entry dropped"
                    );
                    continue;
                };
                let Some(exit_time) = parse_timestamp(time_str) else {
                    tracing::warn!(time = %time_str, "Close with bad timestamp dropped");
                    continue;
                };

                // shift_remove keeps the remaining entries in insertion order
                // so later tie-breaks stay first-stored-wins.
                let entry = pending
                    .shift_remove(&matched_key)
                    .expect("matched key is present");

                trades.push(build_trade(
                    &entry,
                    direction,
                    exit_time,
                    parsed.avg_price.unwrap_or(parsed.price),
                    reported_pnl,
                ));
            }
            LineKind::Other => {
                tracing::debug!(action = %truncate(action, 80), "Non-position line skipped");
            }
        }
    }

    if !pending.is_empty() {
        tracing::warn!(
            unmatched = pending.len(),
            symbols = ?pending.keys().map(|k| k.symbol.as_str()).collect::<Vec<_>>(),
            "Unmatched entries dropped at end of import"
        );
    }

    trades
}

fn build_trade(
    entry: &PendingEntry,
    direction: Direction,
    exit_time: DateTime<Utc>,
    exit_price: Decimal,
    reported_pnl: Decimal,
) -> Trade {
    let units = entry.units.abs();
    let size = units.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    Trade {
        id: Uuid::new_v4(),
        symbol: entry.symbol.clone(),
        direction,
        instrument: infer_instrument(&entry.symbol, units),
        entry_price: entry.price,
        exit_price: Some(exit_price),
        size,
        entry_date: entry.time,
        exit_date: Some(exit_time),
        is_open: false,
        pnl: Some(reported_pnl),
        commission: Decimal::ZERO,
        notes: "Auto-imported from broker history".to_string(),
        tags: vec!["imported".to_string(), "broker-history".to_string()],
        setup: "Imported".to_string(),
        risk: Decimal::ZERO,
        reward: Decimal::ZERO,
    }
}

/// Infer the instrument class from symbol substrings. Currency tokens win
/// over index tokens, so e.g. `NAS100USD` classifies as forex.
fn infer_instrument(symbol: &str, units: Decimal) -> Instrument {
    let lots = (units / Decimal::from(STANDARD_LOT))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    if FOREX_TOKENS.iter().any(|t| symbol.contains(t)) {
        Instrument::Forex {
            lots,
            lot_size: Decimal::from(STANDARD_LOT),
            pip_value: None,
        }
    } else if COMMODITY_TOKENS.iter().any(|t| symbol.contains(t)) {
        Instrument::Commodity {
            contracts: lots,
            tick_size: Decimal::new(25, 2),
            tick_value: Decimal::from(50),
        }
    } else {
        Instrument::Stock
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
