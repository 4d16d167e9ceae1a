mod common;

use rust_decimal::Decimal;

use common::{broker_history_csv, closed_trade};
use tradelog::models::{Direction, Instrument};
use tradelog::store::MemoryStore;
use tradelog::{JournalError, TradeJournal};

#[test]
fn broker_import_reconstructs_both_positions() {
    let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();

    let report = journal.import_trades_csv(&broker_history_csv()).unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.duplicates, 0);

    let trades = journal.trades();
    assert_eq!(trades.len(), 2);

    // Oldest position first: the EURUSD long closed on 2024-03-05.
    let eurusd = &trades[0];
    assert_eq!(eurusd.symbol, "EURUSD");
    assert_eq!(eurusd.direction, Direction::Long);
    assert_eq!(eurusd.entry_price, Decimal::new(11000, 4));
    assert_eq!(eurusd.exit_price, Some(Decimal::new(11050, 4)));
    assert_eq!(eurusd.pnl, Some(Decimal::from(500)));
    assert!(matches!(
        eurusd.instrument,
        Instrument::Forex { .. }
    ));

    let gbpusd = &trades[1];
    assert_eq!(gbpusd.symbol, "GBPUSD");
    assert_eq!(gbpusd.direction, Direction::Short);
    assert_eq!(gbpusd.pnl, Some(Decimal::from(-200)));
    assert_eq!(gbpusd.size, Decimal::from(50_000));
}

#[test]
fn broker_reimport_suppresses_duplicates() {
    let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();

    journal.import_trades_csv(&broker_history_csv()).unwrap();
    let second = journal.import_trades_csv(&broker_history_csv()).unwrap();

    assert_eq!(second.imported, 0);
    assert_eq!(second.duplicates, 2);
    assert_eq!(journal.trades().len(), 2);
}

#[test]
fn broker_import_merges_with_existing_trades() {
    let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();
    journal
        .add_trade(closed_trade(
            "AAPL",
            Direction::Long,
            100,
            110,
            10,
            "2024-02-01T10:00:00Z",
        ))
        .unwrap();

    journal.import_trades_csv(&broker_history_csv()).unwrap();

    assert_eq!(journal.trades().len(), 3);
    assert_eq!(journal.trades()[0].symbol, "AAPL");
}

#[test]
fn plain_csv_import_replaces_trades() {
    let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();
    journal
        .add_trade(closed_trade(
            "AAPL",
            Direction::Long,
            100,
            110,
            10,
            "2024-02-01T10:00:00Z",
        ))
        .unwrap();

    let csv = "Date,Symbol,Direction,Entry Price,Exit Price,Size,P&L,Commission,Status,Setup,Risk,Reward,Notes,Tags\n\
               2024-03-04T10:00:00+00:00,TSLA,short,200,190,5,50,0,Closed,,0,0,\"\",\"\"";
    let report = journal.import_trades_csv(csv).unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(journal.trades().len(), 1);
    assert_eq!(journal.trades()[0].symbol, "TSLA");
}

#[test]
fn unsupported_extension_is_rejected() {
    let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();

    let err = journal.import_file("trades.xlsx", "whatever").unwrap_err();
    assert!(matches!(err, JournalError::UnsupportedFormat(_)));
    assert!(journal.trades().is_empty());

    let report = journal
        .import_file("history.csv", &broker_history_csv())
        .unwrap();
    assert_eq!(report.imported, 2);
}

#[test]
fn invalid_backup_leaves_state_unchanged() {
    let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();
    journal
        .add_trade(closed_trade(
            "AAPL",
            Direction::Long,
            100,
            110,
            10,
            "2024-02-01T10:00:00Z",
        ))
        .unwrap();

    let err = journal.import_backup(r#"{"trades": "oops"}"#).unwrap_err();
    assert!(matches!(err, JournalError::InvalidBackup(_)));
    assert_eq!(journal.trades().len(), 1);
}

#[test]
fn reopening_from_the_same_store_sees_imports() {
    let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();
    journal.import_trades_csv(&broker_history_csv()).unwrap();
    let backup = journal.export_backup_json().unwrap();

    // Fresh journal on a fresh store, restored from the backup.
    let mut restored = TradeJournal::open(MemoryStore::new()).unwrap();
    restored.import_backup(&backup).unwrap();
    assert_eq!(restored.trades(), journal.trades());
}
