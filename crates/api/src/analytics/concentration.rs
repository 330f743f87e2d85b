use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use super::round2;

pub const EQUITY_TYPE: &str = "equity";

/// Pseudo-sector key length; a name-prefix heuristic until a real
/// industry classification source exists.
const INDUSTRY_PREFIX_CHARS: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct Holding {
    pub security_name: String,
    pub holding_ratio: f64,
    pub security_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryRatio {
    pub industry: String,
    pub ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConcentrationResult {
    pub top5_ratio: f64,
    pub top10_ratio: f64,
    pub industry_breakdown: Vec<IndustryRatio>,
}

/// Equity-type rows only; the input is re-sorted here so the result
/// does not depend on the caller's SQL ordering.
pub fn analyze(holdings: &[Holding]) -> ConcentrationResult {
    let mut stocks: Vec<&Holding> = holdings
        .iter()
        .filter(|h| h.security_type == EQUITY_TYPE)
        .collect();
    stocks.sort_by(|a, b| {
        b.holding_ratio
            .partial_cmp(&a.holding_ratio)
            .unwrap_or(Ordering::Equal)
    });

    let top5_ratio: f64 = stocks.iter().take(5).map(|h| h.holding_ratio).sum();
    let top10_ratio: f64 = stocks.iter().take(10).map(|h| h.holding_ratio).sum();

    let mut industry_map: HashMap<String, f64> = HashMap::new();
    for stock in &stocks {
        let industry: String = stock
            .security_name
            .chars()
            .take(INDUSTRY_PREFIX_CHARS)
            .collect();
        *industry_map.entry(industry).or_insert(0.0) += stock.holding_ratio;
    }

    let mut industry_breakdown: Vec<IndustryRatio> = industry_map
        .into_iter()
        .map(|(industry, ratio)| IndustryRatio {
            industry,
            ratio: round2(ratio),
        })
        .collect();
    industry_breakdown.sort_by(|a, b| {
        b.ratio
            .partial_cmp(&a.ratio)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.industry.cmp(&b.industry))
    });
    industry_breakdown.truncate(10);

    ConcentrationResult {
        top5_ratio: round2(top5_ratio),
        top10_ratio: round2(top10_ratio),
        industry_breakdown,
    }
}

pub fn concentration_level(top10_ratio: f64) -> &'static str {
    if top10_ratio > 70.0 {
        "high"
    } else if top10_ratio > 50.0 {
        "medium"
    } else {
        "low"
    }
}
