//! Ticker normalization and typed company metadata

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Longest ticker symbol accepted
pub const MAX_TICKER_LEN: usize = 12;

const NO_SUMMARY: &str = "No summary available.";

/// Trim and uppercase a ticker, rejecting anything outside `A-Z0-9.-`
///
/// ```
/// use price_forecast::profile::normalize_ticker;
///
/// assert_eq!(normalize_ticker(" brk.b "), Some("BRK.B".to_string()));
/// assert_eq!(normalize_ticker("AAPL;DROP"), None);
/// ```
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    let valid = !ticker.is_empty()
        && ticker.len() <= MAX_TICKER_LEN
        && ticker
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');
    valid.then_some(ticker)
}

/// Company fundamentals as published by the market-data provider
///
/// Every field is optional; providers omit them freely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub trailing_eps: Option<f64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub revenue_per_share: Option<f64>,
    #[serde(rename = "profitMargins")]
    pub profit_margin: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub return_on_equity: Option<f64>,
    #[serde(rename = "longBusinessSummary")]
    pub business_summary: Option<String>,
}

impl CompanyProfile {
    /// Parse the provider's JSON info document, ignoring unknown keys
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Business summary, or a placeholder when none was published
    pub fn summary(&self) -> &str {
        self.business_summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_SUMMARY)
    }

    /// Labelled metrics in display order
    pub fn key_metrics(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("Market Cap", self.market_cap),
            ("Beta", self.beta),
            ("EPS", self.trailing_eps),
            ("PE Ratio", self.trailing_pe),
            ("Quick Ratio", self.quick_ratio),
            ("Rev/Share", self.revenue_per_share),
            ("Profit Margin", self.profit_margin),
            ("Debt/Equity", self.debt_to_equity),
            ("ROE", self.return_on_equity),
        ]
    }
}
