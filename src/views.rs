// src/views.rs
//! View logic behind the fund browser and the dashboard.

use crate::api::FIRST_PAGE;
use crate::models::{FundScheme, PortfolioSnapshot};

pub const FUND_HOUSES: [&str; 10] = [
    "HDFC",
    "ICICI",
    "SBI",
    "Axis",
    "Kotak",
    "Aditya Birla",
    "DSP",
    "Franklin",
    "IDFC",
    "UTI",
];

pub const DEFAULT_FUND_HOUSE: &str = FUND_HOUSES[0];

/// Schemes whose name contains `term`, ignoring case. An empty term keeps all.
pub fn filter_schemes<'a>(schemes: &'a [FundScheme], term: &str) -> Vec<&'a FundScheme> {
    let needle = term.trim().to_lowercase();
    schemes
        .iter()
        .filter(|scheme| scheme.scheme_name.to_lowercase().contains(&needle))
        .collect()
}

/// Position in a paged scheme listing. Never below the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: u32,
}

impl Default for Pager {
    fn default() -> Self {
        Self { page: FIRST_PAGE }
    }
}

impl Pager {
    pub fn at(page: u32) -> Self {
        Self {
            page: page.max(FIRST_PAGE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_previous(&self) -> bool {
        self.page > FIRST_PAGE
    }

    pub fn previous(self) -> Self {
        Self::at(self.page.saturating_sub(1))
    }

    pub fn next(self) -> Self {
        Self::at(self.page.saturating_add(1))
    }

    /// Switching fund house starts over.
    pub fn reset(self) -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub fund_count: usize,
    pub top_performer: Option<String>,
}

impl PortfolioSnapshot {
    /// Reported total when the backend sends one, otherwise the sum of the
    /// holdings' current values.
    pub fn total_value(&self) -> f64 {
        self.total_value.unwrap_or_else(|| self.holdings_value())
    }

    /// Sum of the holdings' current values; a missing value counts as zero.
    pub fn holdings_value(&self) -> f64 {
        self.items
            .iter()
            .map(|holding| holding.current_value.unwrap_or(0.0))
            .sum()
    }

    pub fn summary(&self) -> PortfolioSummary {
        PortfolioSummary {
            total_value: self.total_value(),
            fund_count: self.items.len(),
            top_performer: self.top_performer.clone(),
        }
    }
}
