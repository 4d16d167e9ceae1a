use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use tradelog::models::{Direction, Instrument, JournalEntry, Mood, Trade};

/// Build a closed stock trade with explicit prices and dates.
#[allow(dead_code)]
pub fn closed_trade(
    symbol: &str,
    direction: Direction,
    entry: i64,
    exit: i64,
    size: i64,
    exit_date: &str,
) -> Trade {
    let exit_date: DateTime<Utc> = exit_date.parse().expect("valid fixture date");
    let mut trade = Trade {
        id: Uuid::new_v4(),
        symbol: symbol.to_string(),
        direction,
        instrument: Instrument::Stock,
        entry_price: Decimal::from(entry),
        exit_price: Some(Decimal::from(exit)),
        size: Decimal::from(size),
        entry_date: exit_date - chrono::Duration::days(1),
        exit_date: Some(exit_date),
        is_open: false,
        pnl: None,
        commission: Decimal::ZERO,
        notes: String::new(),
        tags: Vec::new(),
        setup: String::new(),
        risk: Decimal::ZERO,
        reward: Decimal::ZERO,
    };
    trade.pnl = Some(tradelog::analytics::realized_pnl(&trade));
    trade
}

#[allow(dead_code)]
pub fn journal_entry(title: &str, mood: Mood) -> JournalEntry {
    JournalEntry {
        id: Uuid::new_v4(),
        date: Utc::now(),
        title: title.to_string(),
        content: "Session notes.".to_string(),
        mood,
        tags: vec!["review".to_string()],
    }
}

/// A small broker account-history export, newest line first as the broker
/// writes it: one EURUSD long and one GBPUSD short, plus noise lines.
#[allow(dead_code)]
pub fn broker_history_csv() -> String {
    [
        "Time,Balance Before,Balance After,Realized P&L (value),Currency,Action",
        r#"2024-03-06 17:00:00,10740.00,10540.00,-200,USD,"Close short position for symbol OANDA:GBPUSD at price 1.2520 for 50000 units. AVG Price was 1.2520""#,
        r#"2024-03-06 09:00:00,10740.00,10740.00,0,USD,"Enter position for symbol OANDA:GBPUSD at price 1.2480 for 50000 units""#,
        r#"2024-03-05 15:30:00,10240.00,10740.00,500,USD,"Close long position for symbol FX:EURUSD at price 1.1050 for 100000 units. AVG Price was 1.1050""#,
        r#"2024-03-05 15:30:00,10250.00,10240.00,-10,USD,"Commission for: order #1205""#,
        r#"2024-03-04 10:00:00,10250.00,10250.00,0,USD,"Enter position for symbol FX:EURUSD at price 1.1000 for 100000 units""#,
    ]
    .join("\n")
}
