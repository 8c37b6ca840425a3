//! `/sales` endpoints

use async_trait::async_trait;
use shared::Listing;
use shared::models::{Product, Sale, SaleCreate, SaleStatus, SaleStatusUpdate};
use shared::request::PageQuery;
use shared::response::MaybeWrapped;
use urlencoding::encode;

use super::{CemacClient, unwrap_data};
use crate::ClientResult;
use crate::http::HttpClient;

#[async_trait]
pub trait SalesApi: Send + Sync {
    /// One page of the sale history, newest first, with the server total when reported
    async fn list_sales(&self, page: PageQuery) -> ClientResult<Listing<Sale>>;
    async fn create_sale(&self, sale: &SaleCreate) -> ClientResult<Sale>;
    async fn update_sale_status(&self, id: &str, status: SaleStatus) -> ClientResult<Sale>;
    /// Products matching a name/code fragment, with live stock
    async fn search_products(&self, query: &str) -> ClientResult<Vec<Product>>;
}

#[async_trait]
impl<H: HttpClient> SalesApi for CemacClient<H> {
    async fn list_sales(&self, page: PageQuery) -> ClientResult<Listing<Sale>> {
        self.api
            .get_query(
                "/sales",
                &[
                    ("page", page.page.to_string()),
                    ("limit", page.limit.to_string()),
                ],
            )
            .await
    }

    async fn create_sale(&self, sale: &SaleCreate) -> ClientResult<Sale> {
        let resp: MaybeWrapped<Sale> = self.api.post("/sales", sale).await?;
        unwrap_data(resp)
    }

    async fn update_sale_status(&self, id: &str, status: SaleStatus) -> ClientResult<Sale> {
        let path = format!("/sales/{}/status", encode(id));
        let resp: MaybeWrapped<Sale> = self.api.put(&path, &SaleStatusUpdate { status }).await?;
        unwrap_data(resp)
    }

    async fn search_products(&self, query: &str) -> ClientResult<Vec<Product>> {
        let listing: Listing<Product> = self
            .api
            .get_query("/sales/products/search", &[("q", query.to_string())])
            .await?;
        Ok(listing.items)
    }
}
