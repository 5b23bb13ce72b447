//! Watchlist portfolios: ordered (symbol, display name) pairs.
//!
//! Portfolios are plain values handed to the aggregator by the caller. The
//! built-in presets are constructed on demand and config-defined portfolios
//! are parsed from `SYM:Name` entry lists.

use std::collections::HashSet;

pub const DEFAULT_PORTFOLIO: &str = "gafam";
pub const MAX_SYMBOL_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioEntry {
    pub symbol: String,
    pub display_name: String,
}

impl PortfolioEntry {
    pub fn new(symbol: &str, display_name: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portfolio {
    pub name: String,
    pub entries: Vec<PortfolioEntry>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortfolioError {
    #[error("empty token in entry list")]
    EmptyToken,

    #[error("entry '{0}' is missing a display name (expected SYMBOL:Name)")]
    MissingName(String),

    #[error("invalid symbol '{0}' (expected 1-5 letters)")]
    InvalidSymbol(String),

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("portfolio has no entries")]
    Empty,
}

impl Portfolio {
    pub fn new(name: &str, entries: Vec<PortfolioEntry>) -> Result<Self, PortfolioError> {
        if entries.is_empty() {
            return Err(PortfolioError::Empty);
        }
        let mut seen = HashSet::new();
        for entry in &entries {
            if !is_valid_symbol(&entry.symbol) {
                return Err(PortfolioError::InvalidSymbol(entry.symbol.clone()));
            }
            if !seen.insert(entry.symbol.as_str()) {
                return Err(PortfolioError::DuplicateSymbol(entry.symbol.clone()));
            }
        }
        Ok(Self {
            name: name.to_string(),
            entries,
        })
    }

    pub fn gafam() -> Self {
        Self {
            name: "GAFAM".to_string(),
            entries: vec![
                PortfolioEntry::new("GOOGL", "Google"),
                PortfolioEntry::new("AAPL", "Apple"),
                PortfolioEntry::new("META", "Meta"),
                PortfolioEntry::new("AMZN", "Amazon"),
                PortfolioEntry::new("MSFT", "Microsoft"),
            ],
        }
    }

    pub fn tech() -> Self {
        Self {
            name: "Tech Leaders".to_string(),
            entries: vec![
                PortfolioEntry::new("AAPL", "Apple"),
                PortfolioEntry::new("TSLA", "Tesla"),
                PortfolioEntry::new("GOOGL", "Google"),
                PortfolioEntry::new("MSFT", "Microsoft"),
                PortfolioEntry::new("NVDA", "NVIDIA"),
                PortfolioEntry::new("AMZN", "Amazon"),
            ],
        }
    }

    /// Built-in preset by key (case-insensitive).
    pub fn preset(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "gafam" => Some(Self::gafam()),
            "tech" => Some(Self::tech()),
            _ => None,
        }
    }

    pub fn preset_keys() -> &'static [&'static str] {
        &["gafam", "tech"]
    }

    pub fn get(&self, symbol: &str) -> Option<&PortfolioEntry> {
        let symbol = symbol.trim().to_uppercase();
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 1-5 ASCII letters, already uppercased.
pub fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol.chars().all(|c| c.is_ascii_uppercase())
}

/// Parse `"AAPL:Apple, TSLA:Tesla"` into entries, preserving order.
pub fn parse_entries(input: &str) -> Result<Vec<PortfolioEntry>, PortfolioError> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(PortfolioError::EmptyToken);
        }
        let (symbol, name) = trimmed
            .split_once(':')
            .ok_or_else(|| PortfolioError::MissingName(trimmed.to_string()))?;
        let symbol = symbol.trim().to_uppercase();
        let name = name.trim();
        if name.is_empty() {
            return Err(PortfolioError::MissingName(trimmed.to_string()));
        }
        if !is_valid_symbol(&symbol) {
            return Err(PortfolioError::InvalidSymbol(symbol));
        }
        if !seen.insert(symbol.clone()) {
            return Err(PortfolioError::DuplicateSymbol(symbol));
        }
        entries.push(PortfolioEntry::new(&symbol, name));
    }

    if entries.is_empty() {
        return Err(PortfolioError::Empty);
    }
    Ok(entries)
}
