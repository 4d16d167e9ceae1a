use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::analytics::realized_pnl;
use crate::errors::JournalError;
use crate::export::{backup_from_json, backup_to_json, trades_to_csv, Backup};
use crate::import::{detect_flavor, parse_account_history, parse_plain_csv, CsvFlavor};
use crate::models::{JournalEntry, Trade};
use crate::store::{KeyValueStore, JOURNAL_KEY, TRADES_KEY};

/// Counters returned by a CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub duplicates: usize,
}

/// The journal service: trade and entry lifecycles over an injected store.
///
/// Both blobs are read once at `open`; the in-memory copies are authoritative
/// until the next mutation, which rewrites the whole blob. Last writer wins:
/// there is no locking or versioning across concurrent journals on the same
/// store.
pub struct TradeJournal<S: KeyValueStore> {
    store: S,
    trades: Vec<Trade>,
    entries: Vec<JournalEntry>,
}

impl<S: KeyValueStore> TradeJournal<S> {
    pub fn open(store: S) -> Result<Self, JournalError> {
        let trades = load_blob(&store, TRADES_KEY)?;
        let entries = load_blob(&store, JOURNAL_KEY)?;
        Ok(Self {
            store,
            trades,
            entries,
        })
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    // -----------------------------------------------------------------------
    // Trade lifecycle
    // -----------------------------------------------------------------------

    /// Add a trade. A fresh id is assigned; a trade submitted closed gets its
    /// P&L computed, an open one stays at `None`.
    pub fn add_trade(&mut self, mut trade: Trade) -> Result<Uuid, JournalError> {
        trade.id = Uuid::new_v4();
        trade.pnl = if trade.is_open {
            None
        } else {
            Some(realized_pnl(&trade))
        };

        let id = trade.id;
        self.trades.push(trade);
        self.save_trades()?;
        Ok(id)
    }

    /// Apply an arbitrary edit to a trade. When the edited trade ends up
    /// closed with an exit price, its P&L is recomputed. Returns `false` when
    /// no trade has the given id.
    pub fn edit_trade(
        &mut self,
        id: Uuid,
        edit: impl FnOnce(&mut Trade),
    ) -> Result<bool, JournalError> {
        let Some(trade) = self.trades.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };

        edit(trade);
        if !trade.is_open && trade.exit_price.is_some() {
            trade.pnl = Some(realized_pnl(trade));
        }

        self.save_trades()?;
        Ok(true)
    }

    /// Transition an open trade to closed at the given exit.
    pub fn close_trade(
        &mut self,
        id: Uuid,
        exit_price: Decimal,
        exit_date: DateTime<Utc>,
    ) -> Result<bool, JournalError> {
        self.edit_trade(id, |trade| {
            trade.exit_price = Some(exit_price);
            trade.exit_date = Some(exit_date);
            trade.is_open = false;
        })
    }

    pub fn delete_trade(&mut self, id: Uuid) -> Result<bool, JournalError> {
        let before = self.trades.len();
        self.trades.retain(|t| t.id != id);
        if self.trades.len() == before {
            return Ok(false);
        }
        self.save_trades()?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Journal entries
    // -----------------------------------------------------------------------

    pub fn add_entry(&mut self, mut entry: JournalEntry) -> Result<Uuid, JournalError> {
        entry.id = Uuid::new_v4();
        let id = entry.id;
        self.entries.push(entry);
        self.save_entries()?;
        Ok(id)
    }

    pub fn edit_entry(
        &mut self,
        id: Uuid,
        edit: impl FnOnce(&mut JournalEntry),
    ) -> Result<bool, JournalError> {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        edit(entry);
        self.save_entries()?;
        Ok(true)
    }

    pub fn delete_entry(&mut self, id: Uuid) -> Result<bool, JournalError> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.save_entries()?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Export / import
    // -----------------------------------------------------------------------

    pub fn export_backup(&self) -> Backup {
        Backup {
            trades: self.trades.clone(),
            journal: self.entries.clone(),
            export_date: Utc::now(),
        }
    }

    pub fn export_backup_json(&self) -> Result<String, JournalError> {
        backup_to_json(&self.export_backup())
    }

    pub fn export_trades_csv(&self) -> String {
        trades_to_csv(&self.trades)
    }

    /// Restore a JSON backup, replacing both lists.
    pub fn import_backup(&mut self, json: &str) -> Result<(usize, usize), JournalError> {
        let backup = backup_from_json(json)?;

        self.trades = backup.trades;
        self.entries = backup.journal;
        self.save_trades()?;
        self.save_entries()?;

        tracing::info!(
            trades = self.trades.len(),
            entries = self.entries.len(),
            "Backup restored"
        );
        Ok((self.trades.len(), self.entries.len()))
    }

    /// Import a user-selected file by extension: `.json` restores a full
    /// backup, `.csv` goes through flavor sniffing. Anything else is
    /// rejected with state unchanged. The JSON path reports trades plus
    /// entries as `imported`.
    pub fn import_file(
        &mut self,
        filename: &str,
        content: &str,
    ) -> Result<ImportReport, JournalError> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".json") {
            let (trades, entries) = self.import_backup(content)?;
            Ok(ImportReport {
                imported: trades + entries,
                duplicates: 0,
            })
        } else if lower.ends_with(".csv") {
            self.import_trades_csv(content)
        } else {
            Err(JournalError::UnsupportedFormat(filename.to_string()))
        }
    }

    /// Import a trades CSV of either flavor.
    ///
    /// Broker account history merges into the existing list, suppressing
    /// exact duplicates by the symbol/entry-date/exit-date/entry-price/
    /// exit-price signature. The plain export format replaces the list
    /// wholesale.
    pub fn import_trades_csv(&mut self, content: &str) -> Result<ImportReport, JournalError> {
        match detect_flavor(content) {
            CsvFlavor::AccountHistory => {
                let parsed = parse_account_history(content);
                let report = self.merge_trades(parsed);
                if report.imported > 0 {
                    self.save_trades()?;
                }
                tracing::info!(
                    imported = report.imported,
                    duplicates = report.duplicates,
                    "Broker history import merged"
                );
                Ok(report)
            }
            CsvFlavor::Plain => {
                self.trades = parse_plain_csv(content);
                self.save_trades()?;
                tracing::info!(imported = self.trades.len(), "Trade CSV imported");
                Ok(ImportReport {
                    imported: self.trades.len(),
                    duplicates: 0,
                })
            }
        }
    }

    fn merge_trades(&mut self, incoming: Vec<Trade>) -> ImportReport {
        let existing: HashSet<String> = self.trades.iter().map(dedup_key).collect();

        let mut report = ImportReport::default();
        for trade in incoming {
            if existing.contains(&dedup_key(&trade)) {
                report.duplicates += 1;
            } else {
                self.trades.push(trade);
                report.imported += 1;
            }
        }
        report
    }

    /// Drop both blobs and the in-memory copies.
    pub fn clear_all(&mut self) -> Result<(), JournalError> {
        self.store.remove(TRADES_KEY)?;
        self.store.remove(JOURNAL_KEY)?;
        self.trades.clear();
        self.entries.clear();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn save_trades(&mut self) -> Result<(), JournalError> {
        save_blob(&mut self.store, TRADES_KEY, &self.trades)
    }

    fn save_entries(&mut self) -> Result<(), JournalError> {
        save_blob(&mut self.store, JOURNAL_KEY, &self.entries)
    }
}

/// Duplicate-suppression signature for imported trades.
fn dedup_key(trade: &Trade) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        trade.symbol,
        trade.entry_date.to_rfc3339(),
        trade
            .exit_date
            .map(|d| d.to_rfc3339())
            .unwrap_or_default(),
        trade.entry_price,
        trade.exit_price.map(|p| p.to_string()).unwrap_or_default(),
    )
}

fn load_blob<S: KeyValueStore, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Vec<T>, JournalError> {
    match store.get(key)? {
        Some(data) if !data.trim().is_empty() => Ok(serde_json::from_str(&data)?),
        _ => Ok(Vec::new()),
    }
}

fn save_blob<S: KeyValueStore, T: Serialize>(
    store: &mut S,
    key: &str,
    items: &[T],
) -> Result<(), JournalError> {
    let json = serde_json::to_string(items)?;
    store.set(key, &json)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, Instrument, Mood};
    use crate::store::MemoryStore;

    fn draft_trade(symbol: &str, is_open: bool) -> Trade {
        Trade {
            id: Uuid::nil(),
            symbol: symbol.to_string(),
            direction: Direction::Long,
            instrument: Instrument::Stock,
            entry_price: Decimal::from(100),
            exit_price: if is_open { None } else { Some(Decimal::from(110)) },
            size: Decimal::from(10),
            entry_date: Utc::now(),
            exit_date: if is_open { None } else { Some(Utc::now()) },
            is_open,
            pnl: None,
            commission: Decimal::from(5),
            notes: String::new(),
            tags: Vec::new(),
            setup: String::new(),
            risk: Decimal::ZERO,
            reward: Decimal::ZERO,
        }
    }

    fn draft_entry(title: &str) -> JournalEntry {
        JournalEntry {
            id: Uuid::nil(),
            date: Utc::now(),
            title: title.to_string(),
            content: String::new(),
            mood: Mood::Neutral,
            tags: Vec::new(),
        }
    }

    #[test]
    fn add_closed_trade_computes_pnl() {
        let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();
        journal.add_trade(draft_trade("AAPL", false)).unwrap();

        // (110 - 100) * 10 - 5 commission
        assert_eq!(journal.trades()[0].pnl, Some(Decimal::from(95)));
    }

    #[test]
    fn add_open_trade_leaves_pnl_unset() {
        let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();
        journal.add_trade(draft_trade("AAPL", true)).unwrap();
        assert_eq!(journal.trades()[0].pnl, None);
    }

    #[test]
    fn close_trade_recomputes_pnl_and_persists() {
        let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();
        let id = journal.add_trade(draft_trade("AAPL", true)).unwrap();

        let closed = journal
            .close_trade(id, Decimal::from(120), Utc::now())
            .unwrap();
        assert!(closed);

        let trade = &journal.trades()[0];
        assert!(!trade.is_open);
        // (120 - 100) * 10 - 5 commission
        assert_eq!(trade.pnl, Some(Decimal::from(195)));
    }

    #[test]
    fn edits_survive_reopen() {
        let mut store = MemoryStore::new();
        let id;
        {
            let mut journal = TradeJournal::open(store.clone()).unwrap();
            id = journal.add_trade(draft_trade("AAPL", false)).unwrap();
            journal
                .edit_trade(id, |t| t.notes = "updated".to_string())
                .unwrap();
            store = journal.store;
        }

        let journal = TradeJournal::open(store).unwrap();
        assert_eq!(journal.trades().len(), 1);
        assert_eq!(journal.trades()[0].id, id);
        assert_eq!(journal.trades()[0].notes, "updated");
    }

    #[test]
    fn delete_missing_trade_is_false() {
        let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();
        assert!(!journal.delete_trade(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn entry_crud() {
        let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();
        let id = journal.add_entry(draft_entry("Choppy day")).unwrap();
        assert_eq!(journal.entries().len(), 1);

        journal
            .edit_entry(id, |e| e.mood = Mood::Terrible)
            .unwrap();
        assert_eq!(journal.entries()[0].mood, Mood::Terrible);

        assert!(journal.delete_entry(id).unwrap());
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn clear_all_wipes_store_and_caches() {
        let mut journal = TradeJournal::open(MemoryStore::new()).unwrap();
        journal.add_trade(draft_trade("AAPL", false)).unwrap();
        journal.add_entry(draft_entry("note")).unwrap();

        journal.clear_all().unwrap();
        assert!(journal.trades().is_empty());
        assert!(journal.entries().is_empty());
        assert!(journal.store.keys().unwrap().is_empty());
    }

    #[test]
    fn blank_blob_loads_as_empty() {
        let mut store = MemoryStore::new();
        store.set(TRADES_KEY, "  ").unwrap();
        let journal = TradeJournal::open(store).unwrap();
        assert!(journal.trades().is_empty());
    }
}
