pub mod broker;
pub mod csv;

pub use broker::{is_account_history, parse_account_history, split_csv_line};
pub use csv::parse_plain_csv;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Supported CSV flavors, detected by header sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvFlavor {
    /// The broker "account history" export (entry/close event log).
    AccountHistory,
    /// This crate's own trade export format, parsed positionally.
    Plain,
}

/// Sniff the first line to decide which CSV parser applies.
pub fn detect_flavor(content: &str) -> CsvFlavor {
    match content.lines().next() {
        Some(header) if is_account_history(header) => CsvFlavor::AccountHistory,
        _ => CsvFlavor::Plain,
    }
}

/// Parse a timestamp as RFC 3339 or naive `YYYY-MM-DD HH:MM:SS` (read as UTC).
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flavor_detection() {
        let broker = "Time,Balance Before,Balance After,Realized P&L (value),Currency,Action\n";
        assert_eq!(detect_flavor(broker), CsvFlavor::AccountHistory);

        let plain = "Date,Symbol,Direction,Entry Price,Exit Price,Size,P&L,Commission,Status,Setup,Risk,Reward,Notes,Tags\n";
        assert_eq!(detect_flavor(plain), CsvFlavor::Plain);
        assert_eq!(detect_flavor(""), CsvFlavor::Plain);
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2024-03-04T10:00:00+00:00").is_some());
        assert!(parse_timestamp("2024-03-04 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
