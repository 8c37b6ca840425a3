//! Daily sales counter
//!
//! A local tally of today's sales, persisted under `cemac_daily_counters`.
//! Each sale is counted once, keyed by its server id. The tally starts over
//! whenever the stored date differs from the local calendar day.
//!
//! The server aggregate is authoritative: [`DailyCounterManager::today_totals`]
//! only falls back to the local tally when the server did not report today's
//! figures. Reconciliation with the server list is additive, so a sale
//! cancelled elsewhere is never subtracted.
//!
//! Writes are read-modify-write on the store. Two processes sharing a data
//! directory can lose an update.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use shared::models::{Sale, SalesAnalysis};
use shared::util::day_key;

use crate::clock::Clock;
use crate::error::PosResult;
use crate::storage::{DAILY_COUNTERS_KEY, KeyValueStore, KeyValueStoreExt};

/// Persisted tally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCounter {
    /// Local day (`YYYY-MM-DD`)
    pub date: String,
    pub sales_count: u64,
    pub revenue: f64,
    /// Unix millis of the last counted sale
    #[serde(default)]
    pub last_sale_time: Option<i64>,
    #[serde(default)]
    pub sales_ids: Vec<String>,
}

impl DailyCounter {
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            sales_count: 0,
            revenue: 0.0,
            last_sale_time: None,
            sales_ids: Vec::new(),
        }
    }

    fn contains(&self, sale_id: &str) -> bool {
        self.sales_ids.iter().any(|id| id == sale_id)
    }
}

/// Which source produced today's figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsSource {
    Server,
    Local,
}

/// Today's figures as shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub sales_count: u64,
    pub revenue: f64,
    pub source: TotalsSource,
}

pub struct DailyCounterManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    // serializes read-modify-write within this process
    lock: Mutex<()>,
}

impl DailyCounterManager {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            lock: Mutex::new(()),
        }
    }

    fn today_key(&self) -> String {
        day_key(self.clock.today())
    }

    /// Stored tally, or a fresh one when the stored date is not today
    fn current(&self) -> DailyCounter {
        let today = self.today_key();
        match self.store.get::<DailyCounter>(DAILY_COUNTERS_KEY) {
            Some(counter) if counter.date == today => counter,
            Some(stale) => {
                tracing::info!(stored = %stale.date, today = %today, "Daily counter reset for new day");
                DailyCounter::empty(today)
            }
            None => DailyCounter::empty(today),
        }
    }

    /// Load today's tally, persisting a reset if the day changed
    pub fn load(&self) -> PosResult<DailyCounter> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let counter = self.current();
        self.store.set(DAILY_COUNTERS_KEY, &counter)?;
        Ok(counter)
    }

    /// Count a confirmed sale; returns `false` when it was already counted
    pub fn increment_sale_counter(&self, sale: &Sale) -> PosResult<bool> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut counter = self.current();
        if !Self::apply(&mut counter, sale) {
            tracing::debug!(sale_id = %sale.id, "Sale already counted today");
            return Ok(false);
        }
        counter.last_sale_time = Some(self.clock.now().timestamp_millis());
        self.store.set(DAILY_COUNTERS_KEY, &counter)?;
        tracing::debug!(sale_id = %sale.id, count = counter.sales_count, "Daily counter incremented");
        Ok(true)
    }

    fn apply(counter: &mut DailyCounter, sale: &Sale) -> bool {
        if sale.id.is_empty() || counter.contains(&sale.id) {
            return false;
        }
        counter.sales_ids.push(sale.id.clone());
        counter.sales_count += 1;
        counter.revenue += sale.total;
        true
    }

    /// Add today's sales from a server list that are not yet counted
    ///
    /// Returns how many were added. Sales dated on another day or without a
    /// parseable date are ignored.
    pub fn sync_with_api(&self, sales: &[Sale]) -> PosResult<usize> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let today = self.clock.today();
        let mut counter = self.current();

        let mut added = 0;
        for sale in sales {
            let Some(created) = sale.created_at_utc() else {
                continue;
            };
            if self.clock.local_date(created) != today {
                continue;
            }
            if Self::apply(&mut counter, sale) {
                added += 1;
                let at = created.timestamp_millis();
                counter.last_sale_time = Some(counter.last_sale_time.map_or(at, |t| t.max(at)));
            }
        }

        if added > 0 {
            self.store.set(DAILY_COUNTERS_KEY, &counter)?;
            tracing::info!(added, count = counter.sales_count, "Daily counter synced with server");
        }
        Ok(added)
    }

    /// Start today's tally over
    pub fn reset(&self) -> PosResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.store
            .set(DAILY_COUNTERS_KEY, &DailyCounter::empty(self.today_key()))?;
        Ok(())
    }

    /// Today's figures: the server's when it reported them, the local tally otherwise
    pub fn today_totals(&self, server: Option<&SalesAnalysis>) -> DailyTotals {
        if let Some(analysis) = server
            && let (Some(sales_count), Some(revenue)) = (analysis.sales_today, analysis.revenue_today)
        {
            return DailyTotals {
                sales_count,
                revenue,
                source: TotalsSource::Server,
            };
        }

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let counter = self.current();
        DailyTotals {
            sales_count: counter.sales_count,
            revenue: counter.revenue,
            source: TotalsSource::Local,
        }
    }
}
