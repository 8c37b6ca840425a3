//! Sale history filters
//!
//! Filtering runs over the page of sales already fetched; nothing here calls
//! the server.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::models::Sale;

use crate::clock::Clock;

/// Coarse date filter of the history screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// Same local calendar day
    Hoy,
    /// Last 7 × 24 h
    Semana,
    /// Last 30 × 24 h
    Mes,
    #[default]
    Todos,
}

impl DateRange {
    fn window(self) -> Option<Duration> {
        match self {
            Self::Semana => Some(Duration::days(7)),
            Self::Mes => Some(Duration::days(30)),
            Self::Hoy | Self::Todos => None,
        }
    }
}

impl std::str::FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hoy" => Ok(Self::Hoy),
            "semana" => Ok(Self::Semana),
            "mes" => Ok(Self::Mes),
            "todos" | "" => Ok(Self::Todos),
            other => Err(format!("unknown date range: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleFilter {
    /// Case-insensitive substring of the customer name
    #[serde(default)]
    pub customer_query: String,
    #[serde(default)]
    pub range: DateRange,
}

impl SaleFilter {
    pub fn is_active(&self) -> bool {
        !self.customer_query.trim().is_empty() || self.range != DateRange::Todos
    }
}

fn matches_range(sale: &Sale, range: DateRange, now: DateTime<Utc>, clock: &dyn Clock) -> bool {
    if range == DateRange::Todos {
        return true;
    }
    let Some(created) = sale.created_at_utc() else {
        return false;
    };
    match range.window() {
        Some(window) => created >= now - window,
        None => clock.local_date(created) == clock.local_date(now),
    }
}

/// Sales matching the filter, in their original order
pub fn filter_sales<'a>(
    sales: &'a [Sale],
    filter: &SaleFilter,
    now: DateTime<Utc>,
    clock: &dyn Clock,
) -> Vec<&'a Sale> {
    let query = filter.customer_query.trim().to_lowercase();
    sales
        .iter()
        .filter(|s| query.is_empty() || s.cliente.to_lowercase().contains(&query))
        .filter(|s| matches_range(s, filter.range, now, clock))
        .collect()
}

/// Where the displayed count came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    /// A filter is active: count and amount of the filtered subset
    Filtered,
    /// No filter: the server's total transaction count
    ServerTotal,
    /// No filter and no server total: length of the fetched page
    PageLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub count: u64,
    /// Summed total of the filtered subset; only set for [`SummarySource::Filtered`]
    pub total_amount: Option<f64>,
    pub source: SummarySource,
}

/// Figures shown above the history table
pub fn summarize(
    filtered: &[&Sale],
    filter: &SaleFilter,
    server_total: Option<u64>,
    page_len: usize,
) -> HistorySummary {
    if filter.is_active() {
        return HistorySummary {
            count: filtered.len() as u64,
            total_amount: Some(filtered.iter().map(|s| s.total).sum()),
            source: SummarySource::Filtered,
        };
    }
    match server_total {
        Some(total) => HistorySummary {
            count: total,
            total_amount: None,
            source: SummarySource::ServerTotal,
        },
        None => HistorySummary {
            count: page_len as u64,
            total_amount: None,
            source: SummarySource::PageLength,
        },
    }
}

/// One fetched page of the sale history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub page: u32,
    pub limit: u32,
    pub sales: Vec<Sale>,
    /// Total transaction count reported by the server
    pub server_total: Option<u64>,
}

impl HistoryPage {
    /// Filtered rows plus the figures to show above them
    pub fn view<'a>(
        &'a self,
        filter: &SaleFilter,
        clock: &dyn Clock,
    ) -> (Vec<&'a Sale>, HistorySummary) {
        let filtered = filter_sales(&self.sales, filter, clock.now(), clock);
        let summary = summarize(&filtered, filter, self.server_total, self.sales.len());
        (filtered, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{FixedOffset, TimeZone};

    fn sale(id: &str, cliente: &str, total: f64, created: Option<DateTime<Utc>>) -> Sale {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "cliente": cliente,
            "total": total,
            "createdAt": created.map(|c| c.to_rfc3339()),
        }))
        .unwrap()
    }

    fn fixture() -> (Vec<Sale>, FixedClock) {
        // 10:00 local in UTC-6
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 16, 0, 0).unwrap();
        let clock = FixedClock::new(now, FixedOffset::west_opt(6 * 3600).unwrap());
        let sales = vec![
            sale("1", "Ana López", 100.0, Some(now - Duration::hours(1))),
            // 23:00 local the previous day
            sale("2", "Pedro", 50.0, Some(now - Duration::hours(11))),
            sale("3", "ana maría", 25.0, Some(now - Duration::days(6))),
            sale("4", "Luis", 10.0, Some(now - Duration::days(20))),
            sale("5", "Cliente general", 5.0, Some(now - Duration::days(45))),
            sale("6", "Ana sin fecha", 1.0, None),
        ];
        (sales, clock)
    }

    fn ids(v: &[&Sale]) -> Vec<String> {
        v.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_date_ranges() {
        let (sales, clock) = fixture();
        let now = clock.now();
        let run = |range| {
            let filter = SaleFilter {
                range,
                ..Default::default()
            };
            ids(&filter_sales(&sales, &filter, now, &clock))
        };
        assert_eq!(run(DateRange::Hoy), vec!["1"]);
        assert_eq!(run(DateRange::Semana), vec!["1", "2", "3"]);
        assert_eq!(run(DateRange::Mes), vec!["1", "2", "3", "4"]);
        assert_eq!(run(DateRange::Todos).len(), 6);
    }

    #[test]
    fn test_customer_substring_is_case_insensitive() {
        let (sales, clock) = fixture();
        let filter = SaleFilter {
            customer_query: " ANA ".into(),
            range: DateRange::Todos,
        };
        let filtered = filter_sales(&sales, &filter, clock.now(), &clock);
        assert_eq!(ids(&filtered), vec!["1", "3", "6"]);

        let summary = summarize(&filtered, &filter, Some(999), sales.len());
        assert_eq!(summary.source, SummarySource::Filtered);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_amount, Some(126.0));
    }

    #[test]
    fn test_summary_without_filter() {
        let (sales, clock) = fixture();
        let filter = SaleFilter::default();
        let filtered = filter_sales(&sales, &filter, clock.now(), &clock);

        let summary = summarize(&filtered, &filter, Some(240), sales.len());
        assert_eq!(summary.source, SummarySource::ServerTotal);
        assert_eq!(summary.count, 240);
        assert_eq!(summary.total_amount, None);

        let summary = summarize(&filtered, &filter, None, sales.len());
        assert_eq!(summary.source, SummarySource::PageLength);
        assert_eq!(summary.count, 6);
    }

    #[test]
    fn test_page_view() {
        let (sales, clock) = fixture();
        let page = HistoryPage {
            page: 1,
            limit: 50,
            sales,
            server_total: Some(80),
        };
        let filter = SaleFilter {
            range: DateRange::Hoy,
            ..Default::default()
        };
        let (rows, summary) = page.view(&filter, &clock);
        assert_eq!(ids(&rows), vec!["1"]);
        assert_eq!(summary.total_amount, Some(100.0));

        let (_, summary) = page.view(&SaleFilter::default(), &clock);
        assert_eq!(summary.count, 80);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!("Semana".parse::<DateRange>().unwrap(), DateRange::Semana);
        assert_eq!("".parse::<DateRange>().unwrap(), DateRange::Todos);
        assert!("ayer".parse::<DateRange>().is_err());
    }
}
