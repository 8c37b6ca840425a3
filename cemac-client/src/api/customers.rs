//! `/customers` endpoints

use async_trait::async_trait;
use shared::Listing;
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use shared::response::MaybeWrapped;
use urlencoding::encode;

use super::{CemacClient, unwrap_data};
use crate::ClientResult;
use crate::http::HttpClient;

#[async_trait]
pub trait CustomerApi: Send + Sync {
    async fn list_customers(&self) -> ClientResult<Vec<Customer>>;
    async fn search_customers(&self, query: &str) -> ClientResult<Vec<Customer>>;
    async fn get_customer(&self, id: &str) -> ClientResult<Customer>;
    async fn create_customer(&self, input: &CustomerCreate) -> ClientResult<Customer>;
    async fn update_customer(&self, id: &str, input: &CustomerUpdate) -> ClientResult<Customer>;
    async fn delete_customer(&self, id: &str) -> ClientResult<()>;
}

#[async_trait]
impl<H: HttpClient> CustomerApi for CemacClient<H> {
    async fn list_customers(&self) -> ClientResult<Vec<Customer>> {
        let listing: Listing<Customer> = self.api.get("/customers").await?;
        Ok(listing.items)
    }

    async fn search_customers(&self, query: &str) -> ClientResult<Vec<Customer>> {
        let listing: Listing<Customer> = self
            .api
            .get_query("/customers/search", &[("q", query.to_string())])
            .await?;
        Ok(listing.items)
    }

    async fn get_customer(&self, id: &str) -> ClientResult<Customer> {
        let path = format!("/customers/{}", encode(id));
        let resp: MaybeWrapped<Customer> = self.api.get(&path).await?;
        unwrap_data(resp)
    }

    async fn create_customer(&self, input: &CustomerCreate) -> ClientResult<Customer> {
        let resp: MaybeWrapped<Customer> = self.api.post("/customers", input).await?;
        unwrap_data(resp)
    }

    async fn update_customer(&self, id: &str, input: &CustomerUpdate) -> ClientResult<Customer> {
        let path = format!("/customers/{}", encode(id));
        let resp: MaybeWrapped<Customer> = self.api.put(&path, input).await?;
        unwrap_data(resp)
    }

    async fn delete_customer(&self, id: &str) -> ClientResult<()> {
        let path = format!("/customers/{}", encode(id));
        let _: serde_json::Value = self.api.delete(&path).await?;
        Ok(())
    }
}
