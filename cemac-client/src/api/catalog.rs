//! `/categories`, `/brands` and `/suppliers` endpoints

use async_trait::async_trait;
use shared::Listing;
use shared::models::{
    Brand, BrandInput, Category, CategoryCreate, CategoryUpdate, Supplier, SupplierInput,
};
use shared::response::MaybeWrapped;
use urlencoding::encode;

use super::{CemacClient, unwrap_data};
use crate::ClientResult;
use crate::http::HttpClient;

#[async_trait]
pub trait CatalogApi: Send + Sync {
    // ========== Categories ==========
    async fn list_categories(&self) -> ClientResult<Vec<Category>>;
    async fn create_category(&self, input: &CategoryCreate) -> ClientResult<Category>;
    async fn update_category(&self, id: &str, input: &CategoryUpdate) -> ClientResult<Category>;
    async fn delete_category(&self, id: &str) -> ClientResult<()>;

    // ========== Brands ==========
    async fn list_brands(&self) -> ClientResult<Vec<Brand>>;
    async fn create_brand(&self, input: &BrandInput) -> ClientResult<Brand>;
    async fn update_brand(&self, id: &str, input: &BrandInput) -> ClientResult<Brand>;
    async fn delete_brand(&self, id: &str) -> ClientResult<()>;

    // ========== Suppliers ==========
    async fn list_suppliers(&self) -> ClientResult<Vec<Supplier>>;
    async fn create_supplier(&self, input: &SupplierInput) -> ClientResult<Supplier>;
    async fn update_supplier(&self, id: &str, input: &SupplierInput) -> ClientResult<Supplier>;
    async fn delete_supplier(&self, id: &str) -> ClientResult<()>;
}

#[async_trait]
impl<H: HttpClient> CatalogApi for CemacClient<H> {
    async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        let listing: Listing<Category> = self.api.get("/categories").await?;
        Ok(listing.items)
    }

    async fn create_category(&self, input: &CategoryCreate) -> ClientResult<Category> {
        let resp: MaybeWrapped<Category> = self.api.post("/categories", input).await?;
        unwrap_data(resp)
    }

    async fn update_category(&self, id: &str, input: &CategoryUpdate) -> ClientResult<Category> {
        let path = format!("/categories/{}", encode(id));
        let resp: MaybeWrapped<Category> = self.api.put(&path, input).await?;
        unwrap_data(resp)
    }

    async fn delete_category(&self, id: &str) -> ClientResult<()> {
        let path = format!("/categories/{}", encode(id));
        let _: serde_json::Value = self.api.delete(&path).await?;
        Ok(())
    }

    async fn list_brands(&self) -> ClientResult<Vec<Brand>> {
        let listing: Listing<Brand> = self.api.get("/brands").await?;
        Ok(listing.items)
    }

    async fn create_brand(&self, input: &BrandInput) -> ClientResult<Brand> {
        let resp: MaybeWrapped<Brand> = self.api.post("/brands", input).await?;
        unwrap_data(resp)
    }

    async fn update_brand(&self, id: &str, input: &BrandInput) -> ClientResult<Brand> {
        let path = format!("/brands/{}", encode(id));
        let resp: MaybeWrapped<Brand> = self.api.put(&path, input).await?;
        unwrap_data(resp)
    }

    async fn delete_brand(&self, id: &str) -> ClientResult<()> {
        let path = format!("/brands/{}", encode(id));
        let _: serde_json::Value = self.api.delete(&path).await?;
        Ok(())
    }

    async fn list_suppliers(&self) -> ClientResult<Vec<Supplier>> {
        let listing: Listing<Supplier> = self.api.get("/suppliers").await?;
        Ok(listing.items)
    }

    async fn create_supplier(&self, input: &SupplierInput) -> ClientResult<Supplier> {
        let resp: MaybeWrapped<Supplier> = self.api.post("/suppliers", input).await?;
        unwrap_data(resp)
    }

    async fn update_supplier(&self, id: &str, input: &SupplierInput) -> ClientResult<Supplier> {
        let path = format!("/suppliers/{}", encode(id));
        let resp: MaybeWrapped<Supplier> = self.api.put(&path, input).await?;
        unwrap_data(resp)
    }

    async fn delete_supplier(&self, id: &str) -> ClientResult<()> {
        let path = format!("/suppliers/{}", encode(id));
        let _: serde_json::Value = self.api.delete(&path).await?;
        Ok(())
    }
}
