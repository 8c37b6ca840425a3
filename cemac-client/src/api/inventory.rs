//! `/inventory` endpoints

use async_trait::async_trait;
use shared::Listing;
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::response::MaybeWrapped;
use urlencoding::encode;

use super::{CemacClient, unwrap_data};
use crate::ClientResult;
use crate::http::HttpClient;

#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn list_products(&self) -> ClientResult<Vec<Product>>;
    async fn create_product(&self, product: &ProductCreate) -> ClientResult<Product>;
    async fn update_product(&self, id: &str, update: &ProductUpdate) -> ClientResult<Product>;
    async fn delete_product(&self, id: &str) -> ClientResult<()>;
}

#[async_trait]
impl<H: HttpClient> InventoryApi for CemacClient<H> {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let listing: Listing<Product> = self.api.get("/inventory").await?;
        Ok(listing.items)
    }

    async fn create_product(&self, product: &ProductCreate) -> ClientResult<Product> {
        let resp: MaybeWrapped<Product> = self.api.post("/inventory", product).await?;
        unwrap_data(resp)
    }

    async fn update_product(&self, id: &str, update: &ProductUpdate) -> ClientResult<Product> {
        let path = format!("/inventory/{}", encode(id));
        let resp: MaybeWrapped<Product> = self.api.put(&path, update).await?;
        unwrap_data(resp)
    }

    async fn delete_product(&self, id: &str) -> ClientResult<()> {
        let path = format!("/inventory/{}", encode(id));
        let _: serde_json::Value = self.api.delete(&path).await?;
        Ok(())
    }
}
