//! `/auth/users` endpoints (admin)

use async_trait::async_trait;
use shared::Listing;
use shared::models::{User, UserUpdate};
use shared::response::MaybeWrapped;
use urlencoding::encode;

use super::{CemacClient, unwrap_data};
use crate::ClientResult;
use crate::http::HttpClient;

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self) -> ClientResult<Vec<User>>;
    async fn update_user(&self, id: &str, update: &UserUpdate) -> ClientResult<User>;
}

#[async_trait]
impl<H: HttpClient> UserApi for CemacClient<H> {
    async fn list_users(&self) -> ClientResult<Vec<User>> {
        let listing: Listing<User> = self.auth.get("/auth/users").await?;
        Ok(listing.items)
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> ClientResult<User> {
        let path = format!("/auth/users/{}", encode(id));
        let resp: MaybeWrapped<User> = self.auth.put(&path, update).await?;
        unwrap_data(resp)
    }
}
