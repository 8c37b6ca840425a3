//! `/alerts` endpoints

use async_trait::async_trait;
use shared::Listing;
use shared::models::{Alert, AlertStatus, AlertStatusUpdate};
use shared::response::MaybeWrapped;
use urlencoding::encode;

use super::{CemacClient, unwrap_data};
use crate::ClientResult;
use crate::http::HttpClient;

#[async_trait]
pub trait AlertApi: Send + Sync {
    async fn list_alerts(&self) -> ClientResult<Vec<Alert>>;
    async fn create_alert(&self, alert: &Alert) -> ClientResult<Alert>;
    async fn update_alert_status(&self, id: &str, status: AlertStatus) -> ClientResult<Alert>;
    async fn delete_alert(&self, id: &str) -> ClientResult<()>;
}

#[async_trait]
impl<H: HttpClient> AlertApi for CemacClient<H> {
    async fn list_alerts(&self) -> ClientResult<Vec<Alert>> {
        let listing: Listing<Alert> = self.api.get("/alerts").await?;
        Ok(listing.items)
    }

    async fn create_alert(&self, alert: &Alert) -> ClientResult<Alert> {
        let resp: MaybeWrapped<Alert> = self.api.post("/alerts", alert).await?;
        unwrap_data(resp)
    }

    async fn update_alert_status(&self, id: &str, status: AlertStatus) -> ClientResult<Alert> {
        let path = format!("/alerts/{}", encode(id));
        let resp: MaybeWrapped<Alert> = self.api.put(&path, &AlertStatusUpdate { status }).await?;
        unwrap_data(resp)
    }

    async fn delete_alert(&self, id: &str) -> ClientResult<()> {
        let path = format!("/alerts/{}", encode(id));
        let _: serde_json::Value = self.api.delete(&path).await?;
        Ok(())
    }
}
