//! Dashboard figures
//!
//! Server aggregates come from `/analysis/sales*`; the helpers below compute
//! the same kind of figures locally from a fetched sales list. Cancelled and
//! returned sales never count as revenue.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use cemac_client::AnalysisApi;
use serde::{Deserialize, Serialize};
use shared::models::{DailySalesPoint, Sale, SaleStatus, SalesAnalysis, TopProduct};
use shared::util::day_key;

use crate::clock::Clock;
use crate::counter::{DailyCounterManager, DailyTotals};
use crate::error::PosResult;
use crate::session::{SessionGuard, guard};

/// Number of products in the top sellers chart
pub const TOP_PRODUCTS_LIMIT: u32 = 5;

fn counts_as_revenue(sale: &Sale) -> bool {
    !matches!(sale.status, SaleStatus::Cancelada | SaleStatus::Devuelta)
}

/// Revenue and count per local day, oldest first; undated sales are skipped
pub fn revenue_by_day(sales: &[Sale], clock: &dyn Clock) -> Vec<DailySalesPoint> {
    let mut days: BTreeMap<String, (u64, f64)> = BTreeMap::new();
    for sale in sales.iter().filter(|s| counts_as_revenue(s)) {
        let Some(created) = sale.created_at_utc() else {
            continue;
        };
        let entry = days.entry(day_key(clock.local_date(created))).or_default();
        entry.0 += 1;
        entry.1 += sale.total;
    }
    days.into_iter()
        .map(|(date, (sales, revenue))| DailySalesPoint {
            date,
            sales,
            revenue,
        })
        .collect()
}

/// Best sellers by units sold
pub fn top_products(sales: &[Sale], limit: usize) -> Vec<TopProduct> {
    let mut by_product: HashMap<&str, TopProduct> = HashMap::new();
    for line in sales
        .iter()
        .filter(|s| counts_as_revenue(s))
        .flat_map(|s| s.products.iter())
    {
        let entry = by_product
            .entry(line.product_id.as_str())
            .or_insert_with(|| TopProduct {
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity: 0,
                revenue: 0.0,
            });
        entry.quantity += u64::from(line.quantity);
        entry.revenue += line.line_total();
    }

    let mut ranked: Vec<TopProduct> = by_product.into_values().collect();
    ranked.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| b.revenue.total_cmp(&a.revenue))
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    ranked.truncate(limit);
    ranked
}

/// Count and amount per payment method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentShare {
    pub method: String,
    pub count: u64,
    pub amount: f64,
}

pub fn payment_breakdown(sales: &[Sale]) -> Vec<PaymentShare> {
    let mut by_method: BTreeMap<String, PaymentShare> = BTreeMap::new();
    for sale in sales.iter().filter(|s| counts_as_revenue(s)) {
        let method = match sale.payment_method.trim() {
            "" => "efectivo".to_string(),
            m => m.to_lowercase(),
        };
        let share = by_method.entry(method.clone()).or_insert(PaymentShare {
            method,
            count: 0,
            amount: 0.0,
        });
        share.count += 1;
        share.amount += sale.total;
    }
    let mut shares: Vec<PaymentShare> = by_method.into_values().collect();
    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    shares
}

/// Mean sale total, 0 with no sales
pub fn average_ticket(sales: &[Sale]) -> f64 {
    let (count, sum) = sales
        .iter()
        .filter(|s| counts_as_revenue(s))
        .fold((0u64, 0.0), |(n, sum), s| (n + 1, sum + s.total));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Everything the dashboard shows in one fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub analysis: SalesAnalysis,
    pub daily: Vec<DailySalesPoint>,
    pub top_products: Vec<TopProduct>,
    pub today: DailyTotals,
}

pub struct AnalyticsService {
    api: Arc<dyn AnalysisApi>,
    counter: Arc<DailyCounterManager>,
    session: Arc<dyn SessionGuard>,
}

impl AnalyticsService {
    pub fn new(
        api: Arc<dyn AnalysisApi>,
        counter: Arc<DailyCounterManager>,
        session: Arc<dyn SessionGuard>,
    ) -> Self {
        Self {
            api,
            counter,
            session,
        }
    }

    /// Aggregates for the last `days` days, fetched concurrently
    pub async fn dashboard(&self, days: u32) -> PosResult<Dashboard> {
        let (analysis, daily, top_products) = guard(
            self.session.as_ref(),
            tokio::try_join!(
                self.api.sales_analysis(),
                self.api.daily_sales(days),
                self.api.top_products(TOP_PRODUCTS_LIMIT),
            ),
        )?;
        let today = self.counter.today_totals(Some(&analysis));
        tracing::debug!(days, source = ?today.source, "Dashboard loaded");
        Ok(Dashboard {
            analysis,
            daily,
            top_products,
            today,
        })
    }

    /// Today's figures; the local tally is used when the server is unreachable
    pub async fn today(&self) -> PosResult<DailyTotals> {
        match self.api.sales_analysis().await {
            Ok(analysis) => Ok(self.counter.today_totals(Some(&analysis))),
            Err(e) if e.is_unauthorized() => guard(self.session.as_ref(), Err(e)),
            Err(e) => {
                tracing::warn!(error = %e, "Sales analysis unavailable, using local counter");
                Ok(self.counter.today_totals(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn sale(id: &str, day: u32, total: f64, status: &str, method: &str, lines: serde_json::Value) -> Sale {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "total": total,
            "status": status,
            "paymentMethod": method,
            "products": lines,
            "createdAt": format!("2024-05-{day:02}T15:00:00Z"),
        }))
        .unwrap()
    }

    fn line(id: &str, qty: u32, price: f64) -> serde_json::Value {
        serde_json::json!({"productId": id, "productName": id.to_uppercase(), "quantity": qty, "price": price})
    }

    fn fixture() -> Vec<Sale> {
        vec![
            sale("1", 1, 30.0, "completada", "efectivo", serde_json::json!([line("a", 3, 10.0)])),
            sale("2", 1, 20.0, "completada", "tarjeta", serde_json::json!([line("b", 1, 20.0)])),
            sale("3", 2, 40.0, "pendiente", "", serde_json::json!([line("a", 2, 10.0), line("b", 1, 20.0)])),
            sale("4", 2, 999.0, "cancelada", "efectivo", serde_json::json!([line("c", 50, 19.98)])),
        ]
    }

    #[test]
    fn test_revenue_by_day_excludes_cancelled() {
        let clock = FixedClock::utc(Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap());
        let days = revenue_by_day(&fixture(), &clock);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2024-05-01");
        assert_eq!(days[0].sales, 2);
        assert_eq!(days[0].revenue, 50.0);
        assert_eq!(days[1].revenue, 40.0);
    }

    #[test]
    fn test_top_products() {
        let top = top_products(&fixture(), 5);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, "a");
        assert_eq!(top[0].quantity, 5);
        assert_eq!(top[0].revenue, 50.0);
        assert_eq!(top_products(&fixture(), 1).len(), 1);
    }

    #[test]
    fn test_payment_breakdown_and_average() {
        let shares = payment_breakdown(&fixture());
        assert_eq!(shares[0].method, "efectivo");
        assert_eq!(shares[0].count, 2);
        assert_eq!(shares[0].amount, 70.0);
        assert_eq!(shares[1].method, "tarjeta");

        assert_eq!(average_ticket(&fixture()), 30.0);
        assert_eq!(average_ticket(&[]), 0.0);
    }
}
