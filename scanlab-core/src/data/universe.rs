//! Ticker universe — the ordered list of symbols a scan walks.
//!
//! A universe can come from a TOML file (top-level `tickers` and/or `[sectors]`
//! tables), from a CSV/plain-text list, or from the built-in default. Every
//! source goes through the same normalization: trim, uppercase, drop blanks,
//! and remove duplicates keeping the first occurrence.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Toml(String),

    #[error("parse ticker list: {0}")]
    Csv(String),

    #[error("universe is empty")]
    Empty,
}

/// On-disk TOML shape.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct UniverseFile {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tickers: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    sectors: BTreeMap<String, Vec<String>>,
}

/// Validated, non-empty, deduplicated symbol list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    symbols: Vec<String>,
    sectors: BTreeMap<String, Vec<String>>,
}

/// Trim, uppercase, drop blanks, dedup keeping first occurrence.
pub fn normalize<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| s.as_ref().trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

impl Universe {
    pub fn new<I, S>(symbols: I) -> Result<Self, UniverseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symbols = normalize(symbols);
        if symbols.is_empty() {
            return Err(UniverseError::Empty);
        }
        Ok(Self {
            symbols,
            sectors: BTreeMap::new(),
        })
    }

    /// Flatten sectors in name order; sector membership is kept for display.
    pub fn from_sectors(sectors: BTreeMap<String, Vec<String>>) -> Result<Self, UniverseError> {
        let sectors: BTreeMap<String, Vec<String>> = sectors
            .into_iter()
            .map(|(name, tickers)| (name, normalize(tickers)))
            .collect();
        let mut universe = Self::new(sectors.values().flatten())?;
        universe.sectors = sectors;
        Ok(universe)
    }

    /// `.toml` files are parsed as TOML, anything else as a CSV/plain list.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml(&content)
        } else {
            Self::from_list(&content)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let file: UniverseFile =
            toml::from_str(content).map_err(|e| UniverseError::Toml(e.to_string()))?;
        let sectors: BTreeMap<String, Vec<String>> = file
            .sectors
            .into_iter()
            .map(|(name, tickers)| (name, normalize(tickers)))
            .collect();
        let mut universe = Self::new(file.tickers.iter().chain(sectors.values().flatten()))?;
        universe.sectors = sectors;
        Ok(universe)
    }

    /// Parse a CSV or one-per-line list.
    ///
    /// With a header row naming a `symbol` or `ticker` column only that column is
    /// read; otherwise every field counts, so `AAPL,MSFT` on one line works too.
    /// Lines starting with `#` are ignored.
    pub fn from_list(content: &str) -> Result<Self, UniverseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for record in reader.records() {
            records.push(record.map_err(|e| UniverseError::Csv(e.to_string()))?);
        }

        let header_col = records.first().and_then(|first| {
            first.iter().position(|cell| {
                matches!(cell.to_ascii_lowercase().as_str(), "symbol" | "ticker" | "tickers")
            })
        });

        let symbols: Vec<String> = match header_col {
            Some(col) => records
                .iter()
                .skip(1)
                .filter_map(|r| r.get(col).map(str::to_string))
                .collect(),
            None => records
                .iter()
                .flat_map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .collect(),
        };
        Self::new(symbols)
    }

    /// Built-in US equities, ETFs and major crypto pairs.
    pub fn default_us() -> Self {
        let groups: [(&str, &[&str]); 7] = [
            (
                "Technology",
                &["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "AVGO", "CRM", "ADBE", "ORCL"],
            ),
            ("Healthcare", &["JNJ", "UNH", "PFE", "ABBV", "MRK", "LLY", "TMO", "ABT"]),
            (
                "Finance",
                &["JPM", "BAC", "WFC", "GS", "MS", "BLK", "SCHW", "C", "AXP", "V"],
            ),
            ("Energy", &["XOM", "CVX", "COP", "SLB", "EOG", "MPC", "PSX", "VLO"]),
            (
                "Consumer",
                &["WMT", "PG", "KO", "PEP", "COST", "HD", "MCD", "NKE", "SBUX", "TGT"],
            ),
            ("ETFs", &["SPY", "QQQ", "IWM", "DIA", "XLF", "XLE", "XLK", "XLV"]),
            ("Crypto", &["BTC-USD", "ETH-USD", "SOL-USD", "XRP-USD", "ADA-USD"]),
        ];
        let sectors: BTreeMap<String, Vec<String>> = groups
            .iter()
            .map(|(name, tickers)| {
                (
                    name.to_string(),
                    tickers.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect();
        let symbols = normalize(sectors.values().flatten());
        Self { symbols, sectors }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(String::as_str).collect()
    }

    pub fn sector_tickers(&self, sector: &str) -> Option<&[String]> {
        self.sectors.get(sector).map(Vec::as_slice)
    }

    /// Sectored universes keep their sectors; flat ones write a `tickers` list.
    pub fn to_toml(&self) -> Result<String, UniverseError> {
        let file = if self.sectors.is_empty() {
            UniverseFile {
                tickers: self.symbols.clone(),
                sectors: BTreeMap::new(),
            }
        } else {
            UniverseFile {
                tickers: Vec::new(),
                sectors: self.sectors.clone(),
            }
        };
        toml::to_string_pretty(&file).map_err(|e| UniverseError::Toml(e.to_string()))
    }
}
