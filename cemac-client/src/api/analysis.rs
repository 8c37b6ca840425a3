//! `/analysis/sales` endpoints

use async_trait::async_trait;
use shared::Listing;
use shared::models::{DailySalesPoint, SalesAnalysis, TopProduct};
use shared::response::MaybeWrapped;

use super::{CemacClient, unwrap_data};
use crate::ClientResult;
use crate::http::HttpClient;

#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn sales_analysis(&self) -> ClientResult<SalesAnalysis>;
    async fn daily_sales(&self, days: u32) -> ClientResult<Vec<DailySalesPoint>>;
    async fn top_products(&self, limit: u32) -> ClientResult<Vec<TopProduct>>;
}

#[async_trait]
impl<H: HttpClient> AnalysisApi for CemacClient<H> {
    async fn sales_analysis(&self) -> ClientResult<SalesAnalysis> {
        let resp: MaybeWrapped<SalesAnalysis> = self.api.get("/analysis/sales").await?;
        unwrap_data(resp)
    }

    async fn daily_sales(&self, days: u32) -> ClientResult<Vec<DailySalesPoint>> {
        let listing: Listing<DailySalesPoint> = self
            .api
            .get_query("/analysis/sales/daily", &[("days", days.to_string())])
            .await?;
        Ok(listing.items)
    }

    async fn top_products(&self, limit: u32) -> ClientResult<Vec<TopProduct>> {
        let listing: Listing<TopProduct> = self
            .api
            .get_query("/analysis/sales/top-products", &[("limit", limit.to_string())])
            .await?;
        Ok(listing.items)
    }
}
