use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::Row;

use crate::analytics::backtest::ValuationPoint;
use crate::analytics::concentration::Holding;
use crate::analytics::metrics::NavPoint;
use crate::error::AnalyticsResult;

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<Decimal>().ok().and_then(|d| d.to_f64())
}

/// NAV points for a fund, newest first; rows that fail to parse are
/// skipped.
pub async fn nav_history(
    pool: &sqlx::AnyPool,
    fund_code: &str,
    limit: i64,
) -> AnalyticsResult<Vec<NavPoint>> {
    let rows = sqlx::query(
        r#"
        SELECT
          CAST(nav_date AS TEXT) as nav_date,
          CAST(unit_nav AS TEXT) as unit_nav,
          CAST(accumulated_nav AS TEXT) as accumulated_nav
        FROM fund_nav_history
        WHERE fund_code = $1
        ORDER BY nav_date DESC
        LIMIT $2
        "#,
    )
    .bind(fund_code.trim())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        let d: String = r.get("nav_date");
        let nav: String = r.get("unit_nav");
        let acc: Option<String> = r.get("accumulated_nav");
        let Some(date) = parse_date(&d) else { continue };
        let Some(unit_nav) = parse_f64(&nav) else {
            continue;
        };
        out.push(NavPoint {
            date,
            unit_nav,
            accumulated_nav: acc.as_deref().and_then(parse_f64),
        });
    }
    Ok(out)
}

pub async fn nav_window(
    pool: &sqlx::AnyPool,
    fund_code: &str,
    limit: i64,
) -> AnalyticsResult<Vec<f64>> {
    let points = nav_history(pool, fund_code, limit).await?;
    Ok(points.into_iter().map(|p| p.unit_nav).collect())
}

pub async fn holdings(
    pool: &sqlx::AnyPool,
    fund_code: &str,
    limit: i64,
) -> AnalyticsResult<Vec<Holding>> {
    let rows = sqlx::query(
        r#"
        SELECT
          security_name,
          security_type,
          CAST(holding_ratio AS TEXT) as holding_ratio
        FROM fund_holdings
        WHERE fund_code = $1
        ORDER BY holding_ratio DESC
        LIMIT $2
        "#,
    )
    .bind(fund_code.trim())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        let ratio: String = r.get("holding_ratio");
        let Some(holding_ratio) = parse_f64(&ratio) else {
            continue;
        };
        out.push(Holding {
            security_name: r.get("security_name"),
            security_type: r.get("security_type"),
            holding_ratio,
        });
    }
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub id: String,
    pub index_code: String,
    pub index_name: String,
}

pub async fn index_by_code(
    pool: &sqlx::AnyPool,
    index_code: &str,
) -> AnalyticsResult<Option<IndexInfo>> {
    let row = sqlx::query(
        r#"
        SELECT CAST(id AS TEXT) as id, index_code, index_name
        FROM market_index
        WHERE index_code = $1
        "#,
    )
    .bind(index_code.trim())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| IndexInfo {
        id: r.get("id"),
        index_code: r.get("index_code"),
        index_name: r.get("index_name"),
    }))
}

/// Valuation rows for an index, newest first.
pub async fn valuation_history(
    pool: &sqlx::AnyPool,
    index_id: &str,
    limit: i64,
) -> AnalyticsResult<Vec<ValuationPoint>> {
    let rows = sqlx::query(
        r#"
        SELECT
          CAST(valuation_date AS TEXT) as valuation_date,
          CAST(pe_ratio AS TEXT) as pe_ratio,
          CAST(pe_percentile AS TEXT) as pe_percentile
        FROM index_valuation
        WHERE index_id = $1
        ORDER BY valuation_date DESC
        LIMIT $2
        "#,
    )
    .bind(index_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        let d: String = r.get("valuation_date");
        let pe: String = r.get("pe_ratio");
        let pct: Option<String> = r.get("pe_percentile");
        let Some(date) = parse_date(&d) else { continue };
        let Some(pe_ratio) = parse_f64(&pe) else {
            continue;
        };
        out.push(ValuationPoint {
            date,
            pe_ratio,
            percentile: pct.as_deref().and_then(parse_f64),
        });
    }
    Ok(out)
}

pub async fn latest_valuation(
    pool: &sqlx::AnyPool,
    index_id: &str,
) -> AnalyticsResult<Option<ValuationPoint>> {
    Ok(valuation_history(pool, index_id, 1).await?.into_iter().next())
}

/// Share of trailing-window observations at or below `pe`, 0-100;
/// zero for an empty window.
pub async fn pe_percentile(
    pool: &sqlx::AnyPool,
    index_id: &str,
    pe: f64,
    years: i64,
) -> AnalyticsResult<f64> {
    let cutoff = (Utc::now().date_naive() - Duration::days(years * 365))
        .format("%Y-%m-%d")
        .to_string();

    let rows = sqlx::query(
        r#"
        SELECT CAST(pe_ratio AS TEXT) as pe_ratio
        FROM index_valuation
        WHERE index_id = $1 AND CAST(valuation_date AS TEXT) >= $2
        "#,
    )
    .bind(index_id)
    .bind(&cutoff)
    .fetch_all(pool)
    .await?;

    let mut count = 0_u64;
    let mut rank = 0_u64;
    for r in rows {
        let pe_s: String = r.get("pe_ratio");
        let Some(v) = parse_f64(&pe_s) else { continue };
        count += 1;
        if v <= pe {
            rank += 1;
        }
    }

    if count == 0 {
        return Ok(0.0);
    }
    Ok(rank as f64 / count as f64 * 100.0)
}

/// Per-fund simple return over a trailing calendar window; funds with
/// fewer than two parsable rows are omitted.
pub async fn period_returns(
    pool: &sqlx::AnyPool,
    days: i64,
) -> AnalyticsResult<Vec<(String, f64)>> {
    let cutoff = (Utc::now().date_naive() - Duration::days(days))
        .format("%Y-%m-%d")
        .to_string();

    let rows = sqlx::query(
        r#"
        SELECT
          fund_code,
          CAST(nav_date AS TEXT) as nav_date,
          CAST(unit_nav AS TEXT) as unit_nav
        FROM fund_nav_history
        WHERE CAST(nav_date AS TEXT) >= $1
        ORDER BY fund_code ASC, nav_date ASC
        "#,
    )
    .bind(&cutoff)
    .fetch_all(pool)
    .await?;

    fn flush(out: &mut Vec<(String, f64)>, entry: Option<(String, f64, f64, usize)>) {
        if let Some((code, first, last, count)) = entry {
            if count >= 2 && first > 0.0 {
                out.push((code, (last - first) / first * 100.0));
            }
        }
    }

    let mut out: Vec<(String, f64)> = Vec::new();
    let mut current: Option<(String, f64, f64, usize)> = None; // code, first, last, rows

    for r in rows {
        let code: String = r.get("fund_code");
        let nav_s: String = r.get("unit_nav");
        let Some(nav) = parse_f64(&nav_s) else { continue };

        match current.as_mut() {
            Some((c, _, last, count)) if *c == code => {
                *last = nav;
                *count += 1;
                continue;
            }
            _ => {}
        }
        flush(&mut out, current.take());
        current = Some((code, nav, nav, 1));
    }
    flush(&mut out, current.take());

    Ok(out)
}
