//! Stock alerts
//!
//! Alerts are derived from the product list on every refresh and kept only in
//! local storage (`cemac_alerts`). A regenerated alert keeps the id, status
//! and creation time of the stored alert with the same `(product, type)`, so
//! an acknowledged alert stays acknowledged across refreshes.
//!
//! | Stock | Priority | Type |
//! |-------|----------|------|
//! | ≤ 0 | urgente | sin_stock |
//! | 1–5 | alta | stock_bajo |
//! | 6–10 | media | stock_bajo |
//! | 11–20 | baja | stock_bajo |
//! | > 20 | none | - |

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{Alert, AlertPriority, AlertStatus, AlertType, Product};
use shared::types::Timestamp;

use crate::clock::Clock;
use crate::error::{PosError, PosResult};
use crate::storage::{ALERTS_KEY, KeyValueStore, KeyValueStoreExt};

/// Highest stock that still raises an alert
pub const ALERT_STOCK_CEILING: i64 = 20;

/// Priority for a stock level, `None` above the alert ceiling
pub fn priority_for_stock(stock: i64) -> Option<AlertPriority> {
    match stock {
        i64::MIN..=0 => Some(AlertPriority::Urgente),
        1..=5 => Some(AlertPriority::Alta),
        6..=10 => Some(AlertPriority::Media),
        11..=ALERT_STOCK_CEILING => Some(AlertPriority::Baja),
        _ => None,
    }
}

pub fn alert_type_for_stock(stock: i64) -> AlertType {
    if stock <= 0 {
        AlertType::SinStock
    } else {
        AlertType::StockBajo
    }
}

fn alert_message(product: &Product, stock: i64) -> String {
    if stock <= 0 {
        format!("{} está agotado", product.name)
    } else {
        format!("{} tiene solo {} unidades en stock", product.name, stock)
    }
}

/// Alerts for the current product list, merged with the stored ones
///
/// Products without a numeric stock are skipped. Result is ordered by
/// priority, then product name.
pub fn generate_alerts(products: &[Product], previous: &[Alert], now: DateTime<Utc>) -> Vec<Alert> {
    let previous: HashMap<(&str, AlertType), &Alert> = previous
        .iter()
        .map(|a| ((a.product_id.as_str(), a.alert_type), a))
        .collect();
    let now_ts = Timestamp::from(now);

    let mut alerts: Vec<Alert> = products
        .iter()
        .filter_map(|product| {
            let stock = product.stock?;
            let priority = priority_for_stock(stock)?;
            let alert_type = alert_type_for_stock(stock);

            let (id, status, created_at) = match previous.get(&(product.id.as_str(), alert_type)) {
                Some(prev) => (prev.id.clone(), prev.status, prev.created_at.clone()),
                None => (
                    uuid::Uuid::new_v4().to_string(),
                    AlertStatus::default(),
                    now_ts.clone(),
                ),
            };

            Some(Alert {
                id,
                alert_type,
                priority,
                status,
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                stock,
                message: alert_message(product, stock),
                created_at,
                updated_at: now_ts.clone(),
            })
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    alerts
}

/// Counts shown on the alerts screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub total: usize,
    /// pendiente or en_proceso
    pub open: usize,
    pub urgente: usize,
    pub alta: usize,
    pub media: usize,
    pub baja: usize,
}

/// Locally persisted alert set
pub struct AlertStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl AlertStore {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            lock: Mutex::new(()),
        }
    }

    pub fn list(&self) -> Vec<Alert> {
        self.store.get(ALERTS_KEY).unwrap_or_default()
    }

    /// Regenerate from the product list and persist
    pub fn refresh(&self, products: &[Product]) -> PosResult<Vec<Alert>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let alerts = generate_alerts(products, &self.list(), self.clock.now());
        self.store.set(ALERTS_KEY, &alerts)?;
        tracing::debug!(count = alerts.len(), "Stock alerts regenerated");
        Ok(alerts)
    }

    pub fn set_status(&self, id: &str, status: AlertStatus) -> PosResult<Alert> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut alerts = self.list();
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| PosError::NotFound(format!("alerta {id}")))?;
        alert.status = status;
        alert.updated_at = Timestamp::from(self.clock.now());
        let updated = alert.clone();
        self.store.set(ALERTS_KEY, &alerts)?;
        tracing::info!(alert_id = %id, status = ?status, "Alert status changed");
        Ok(updated)
    }

    pub fn summary(&self) -> AlertSummary {
        let alerts = self.list();
        let mut summary = AlertSummary {
            total: alerts.len(),
            ..Default::default()
        };
        for alert in &alerts {
            if alert.status.is_open() {
                summary.open += 1;
            }
            match alert.priority {
                AlertPriority::Urgente => summary.urgente += 1,
                AlertPriority::Alta => summary.alta += 1,
                AlertPriority::Media => summary.media += 1,
                AlertPriority::Baja => summary.baja += 1,
            }
        }
        summary
    }

    /// Open alerts for the home screen, most urgent first
    pub fn home_alerts(&self, limit: usize) -> Vec<Alert> {
        let mut open: Vec<Alert> = self.list().into_iter().filter(|a| a.status.is_open()).collect();
        open.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.stock.cmp(&b.stock)));
        open.truncate(limit);
        open
    }
}
