//! Contract reference data.
//!
//! The reference file is plain CSV with one header line:
//!
//! ```text
//! ticker,exchange,name,product_type,size,price_tick[,...]
//! IF2309,CFFEX,IF Contract,0,300,0.2
//! ```
//!
//! The fourth column is reserved and ignored, as are any columns after the
//! sixth. Contracts get a dense 1-based `ticker_index` in file order; that
//! index is what goes on the wire.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use serde::Serialize;
use tracing::info;

use crate::error::{QtError, Result};

const MIN_FIELDS: usize = 6;

/// Static reference data for one tradable contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contract {
    /// 1-based position in the reference file.
    pub ticker_index: u32,
    pub ticker: String,
    pub exchange: String,
    pub name: String,
    /// Contract multiplier.
    pub size: i64,
    /// Minimum price increment.
    pub price_tick: f64,
}

/// Read-only contract lookup by ticker index or ticker string.
///
/// Build it once at startup and share it as `Arc<ContractTable>`.
#[derive(Debug, Clone, Default)]
pub struct ContractTable {
    /// `contracts[i]` has `ticker_index == i + 1`.
    contracts: Vec<Contract>,
    by_ticker: AHashMap<String, usize>,
}

impl ContractTable {
    /// Load the reference file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            QtError::Config(format!("cannot open contract file {}: {e}", path.display()))
        })?;
        let table = Self::from_reader(BufReader::new(file))?;
        info!("loaded {} contract(s) from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse reference data from any buffered reader.
    ///
    /// The first line is the header. Blank lines are skipped. Duplicate
    /// tickers are rejected.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut table = Self::default();

        for (i, line) in reader.lines().enumerate().skip(1) {
            let line_no = i + 1;
            let line = line.map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => QtError::Format { line: line_no, reason: e.to_string() },
                _ => QtError::Io(e),
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < MIN_FIELDS {
                return Err(QtError::Format {
                    line: line_no,
                    reason: format!("expected at least {MIN_FIELDS} fields, got {}", fields.len()),
                });
            }

            let ticker = fields[0];
            if ticker.is_empty() {
                return Err(QtError::Format { line: line_no, reason: "empty ticker".into() });
            }
            let size = fields[4].parse::<i64>().map_err(|e| QtError::Format {
                line: line_no,
                reason: format!("size '{}': {e}", fields[4]),
            })?;
            let price_tick = fields[5].parse::<f64>().map_err(|e| QtError::Format {
                line: line_no,
                reason: format!("price_tick '{}': {e}", fields[5]),
            })?;

            if table.by_ticker.contains_key(ticker) {
                return Err(QtError::DuplicateTicker { ticker: ticker.to_owned(), line: line_no });
            }

            let ticker_index = u32::try_from(table.contracts.len() + 1).map_err(|_| {
                QtError::Format { line: line_no, reason: "too many contracts".into() }
            })?;
            table.by_ticker.insert(ticker.to_owned(), table.contracts.len());
            table.contracts.push(Contract {
                ticker_index,
                ticker: ticker.to_owned(),
                exchange: fields[1].to_owned(),
                name: fields[2].to_owned(),
                size,
                price_tick,
            });
        }

        Ok(table)
    }

    /// Contract with the given 1-based index.
    ///
    /// Anything outside `[1, len]` (zero and negatives included) is `None`.
    pub fn get_by_index<I: TryInto<usize>>(&self, index: I) -> Option<&Contract> {
        let index: usize = index.try_into().ok()?;
        if index == 0 {
            return None;
        }
        self.contracts.get(index - 1)
    }

    pub fn get_by_ticker(&self, ticker: &str) -> Result<&Contract> {
        self.by_ticker
            .get(ticker)
            .map(|&pos| &self.contracts[pos])
            .ok_or_else(|| QtError::UnknownTicker(ticker.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Contracts in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    const HEADER: &str = "ticker,exchange,name,product_type,size,price_tick\n";

    fn table(rows: &str) -> Result<ContractTable> {
        ContractTable::from_reader(Cursor::new(format!("{HEADER}{rows}")))
    }

    #[test]
    fn loads_reference_row() {
        let t = table("IF2309,CFFEX,IF Contract,0,300,0.2\n").unwrap();
        let expected = Contract {
            ticker_index: 1,
            ticker: "IF2309".into(),
            exchange: "CFFEX".into(),
            name: "IF Contract".into(),
            size: 300,
            price_tick: 0.2,
        };
        let by_index = t.get_by_index(1).unwrap();
        let by_ticker = t.get_by_ticker("IF2309").unwrap();
        assert_eq!(by_index, &expected);
        assert!(std::ptr::eq(by_index, by_ticker));
    }

    #[test]
    fn indices_follow_file_order() {
        let t = table("IF2309,CFFEX,IF,0,300,0.2\n\nrb2310,SHFE,rebar,0,10,1\nau2312,SHFE,gold,0,1000,0.02\n")
            .unwrap();
        assert_eq!(t.len(), 3);
        let tickers: Vec<_> = t.iter().map(|c| (c.ticker_index, c.ticker.as_str())).collect();
        assert_eq!(tickers, vec![(1, "IF2309"), (2, "rb2310"), (3, "au2312")]);
        assert_eq!(t.get_by_ticker("au2312").unwrap().ticker_index, 3);
    }

    #[test]
    fn out_of_range_index_not_found() {
        let t = table("IF2309,CFFEX,IF,0,300,0.2\nrb2310,SHFE,rebar,0,10,1\n").unwrap();
        for i in [-5i64, -1, 0, 3, 100] {
            assert!(t.get_by_index(i).is_none(), "index {i}");
        }
        assert!(t.get_by_index(0u32).is_none());
        assert!(t.get_by_index(2u32).is_some());
        assert!(t.get_by_index(i32::MIN).is_none());
    }

    #[test]
    fn unknown_ticker_is_recoverable() {
        let t = table("IF2309,CFFEX,IF,0,300,0.2\n").unwrap();
        assert!(matches!(t.get_by_ticker("IC2309"), Err(QtError::UnknownTicker(ref s)) if s == "IC2309"));
    }

    #[test]
    fn too_few_fields() {
        let err = table("IF2309,CFFEX,IF,0,300\n").unwrap_err();
        assert!(matches!(err, QtError::Format { line: 2, .. }));
    }

    #[test]
    fn non_numeric_size_and_tick() {
        assert!(matches!(table("IF2309,CFFEX,IF,0,abc,0.2\n"), Err(QtError::Format { .. })));
        assert!(matches!(table("IF2309,CFFEX,IF,0,300,tick\n"), Err(QtError::Format { .. })));
    }

    #[test]
    fn invalid_utf8_row_is_format_error() {
        let mut raw = HEADER.as_bytes().to_vec();
        raw.extend_from_slice(b"IF2309,CFFEX,\xff\xfe,0,300,0.2\n");
        let err = ContractTable::from_reader(Cursor::new(raw)).unwrap_err();
        assert!(matches!(err, QtError::Format { line: 2, .. }), "got {err:?}");
    }

    #[test]
    fn duplicate_ticker_rejected() {
        let err = table("IF2309,CFFEX,IF,0,300,0.2\nIF2309,CFFEX,IF,0,300,0.4\n").unwrap_err();
        assert!(matches!(err, QtError::DuplicateTicker { line: 3, .. }));
    }

    #[test]
    fn extra_columns_and_crlf_tolerated() {
        let t = table("IF2309,CFFEX,IF,index_future,300,0.2,0.12,0.12,10,1\r\n").unwrap();
        assert_eq!(t.get_by_ticker("IF2309").unwrap().price_tick, 0.2);
    }

    #[test]
    fn header_only_is_empty() {
        assert!(table("").unwrap().is_empty());
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}IF2309,CFFEX,IF Contract,0,300,0.2").unwrap();
        let t = ContractTable::load(file.path()).unwrap();
        assert_eq!(t.get_by_index(1).unwrap().size, 300);
    }

    #[test]
    fn missing_file_is_config_error() {
        assert!(matches!(
            ContractTable::load("/nonexistent/contracts.csv"),
            Err(QtError::Config(_))
        ));
    }
}
