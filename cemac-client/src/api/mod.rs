//! Typed endpoints of the remote CEMAC API
//!
//! Each resource gets its own trait so services can depend on exactly the
//! calls they make and tests can substitute in-memory doubles.
//!
//! | Trait | Endpoints |
//! |-------|-----------|
//! | [`AuthApi`] | `POST /auth/login`, `POST /auth/logout`, `GET /auth/verify`, `POST /auth/register` |
//! | [`UserApi`] | `GET /auth/users`, `PUT /auth/users/:id` |
//! | [`InventoryApi`] | `GET/POST /inventory`, `PUT/DELETE /inventory/:id` |
//! | [`CatalogApi`] | `/categories`, `/brands`, `/suppliers` CRUD |
//! | [`CustomerApi`] | `GET/POST /customers`, `GET /customers/search`, `GET/PUT/DELETE /customers/:id` |
//! | [`SalesApi`] | `GET/POST /sales`, `GET /sales/products/search`, `PUT /sales/:id/status` |
//! | [`AlertApi`] | `GET/POST /alerts`, `PUT/DELETE /alerts/:id` |
//! | [`AnalysisApi`] | `GET /analysis/sales`, `/analysis/sales/daily`, `/analysis/sales/top-products` |

mod alerts;
mod analysis;
mod auth;
mod catalog;
mod customers;
mod inventory;
mod sales;
mod users;

pub use alerts::AlertApi;
pub use analysis::AnalysisApi;
pub use auth::AuthApi;
pub use catalog::CatalogApi;
pub use customers::CustomerApi;
pub use inventory::InventoryApi;
pub use sales::SalesApi;
pub use users::UserApi;

use std::time::Duration;

use shared::response::MaybeWrapped;

use crate::config::ClientConfig;
use crate::credential::SharedToken;
use crate::http::{HttpClient, NetworkHttpClient};
use crate::{ClientError, ClientResult};

/// Client of the remote API
///
/// `api` serves the business endpoints and `auth` the `/auth/*` ones; both
/// share the same bearer token.
#[derive(Debug, Clone)]
pub struct CemacClient<H = NetworkHttpClient> {
    api: H,
    auth: H,
    login_timeout: Duration,
}

impl CemacClient<NetworkHttpClient> {
    /// Build network clients from configuration
    pub fn from_config(config: &ClientConfig, token: SharedToken) -> ClientResult<Self> {
        let api = NetworkHttpClient::from_config(config, token.clone())?;
        let auth_config = ClientConfig {
            base_url: config.auth_base_url().to_string(),
            ..config.clone()
        };
        let auth = NetworkHttpClient::from_config(&auth_config, token)?;
        Ok(Self {
            api,
            auth,
            login_timeout: config.login_timeout,
        })
    }
}

impl<H: HttpClient> CemacClient<H> {
    /// Assemble from transports (tests, custom stacks)
    pub fn with_transports(api: H, auth: H, login_timeout: Duration) -> Self {
        Self {
            api,
            auth,
            login_timeout,
        }
    }

    pub fn http(&self) -> &H {
        &self.api
    }

    pub fn token(&self) -> Option<String> {
        self.api.token()
    }
}

/// Take the payload out of an optional envelope
pub(crate) fn unwrap_data<T>(resp: MaybeWrapped<T>) -> ClientResult<T> {
    resp.into_data().map_err(ClientError::InvalidResponse)
}
