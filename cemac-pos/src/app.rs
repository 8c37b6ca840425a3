//! Service wiring
//!
//! Every service receives its collaborators explicitly; nothing is global.
//!
//! ```text
//! PosConfig
//!    │
//!    ├─► CemacClient ──┬─► Session (token + credential file)
//!    │                 ├─► CustomerService ─┐
//!    │                 ├─► SalesService ◄───┤◄── DailyCounterManager ◄── FileStore, Clock
//!    │                 ├─► InventoryService │
//!    │                 ├─► AnalyticsService ◄┘
//!    │                 └─► UserService
//!    ├─► AlertStore ◄── FileStore, Clock
//!    └─► AssistantClient ─► AssistantService ◄── FileStore, Clock
//! ```

use std::sync::Arc;

use cemac_client::credential::CREDENTIAL_FILE;
use cemac_client::{
    AssistantClient, CemacClient, CredentialStorage, NetworkHttpClient, SharedToken,
};

use crate::alerts::AlertStore;
use crate::analytics::AnalyticsService;
use crate::assistant::AssistantService;
use crate::cart::Cart;
use crate::clock::{Clock, SystemClock};
use crate::config::PosConfig;
use crate::counter::DailyCounterManager;
use crate::customers::CustomerService;
use crate::error::PosResult;
use crate::inventory::InventoryService;
use crate::pricing::Percent;
use crate::sales::SalesService;
use crate::session::{Session, SessionGuard};
use crate::storage::{FileStore, KeyValueStore};
use crate::users::UserService;

/// Subdirectory of `DATA_DIR` holding local state documents
const STATE_DIR: &str = "state";

pub struct PosApp {
    pub config: PosConfig,
    pub session: Arc<Session<CemacClient>>,
    pub customers: Arc<CustomerService>,
    pub sales: Arc<SalesService>,
    pub inventory: Arc<InventoryService>,
    pub analytics: Arc<AnalyticsService>,
    pub alerts: Arc<AlertStore>,
    pub assistant: Arc<AssistantService>,
    pub users: Arc<UserService>,
    pub counter: Arc<DailyCounterManager>,
    pub clock: Arc<dyn Clock>,
}

impl PosApp {
    pub fn from_config(config: PosConfig) -> PosResult<Self> {
        let token = SharedToken::default();
        let client = Arc::new(CemacClient::from_config(&config.client_config(), token.clone())?);

        let credentials = CredentialStorage::new(&config.data_dir, CREDENTIAL_FILE);
        let session = Arc::new(Session::new(client.clone(), credentials, token));
        let guard: Arc<dyn SessionGuard> = session.clone();

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.join(STATE_DIR)));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let counter = Arc::new(DailyCounterManager::new(store.clone(), clock.clone()));
        let customers = Arc::new(CustomerService::new(client.clone(), guard.clone()));
        let sales = Arc::new(SalesService::new(
            client.clone(),
            customers.clone(),
            counter.clone(),
            guard.clone(),
            config.history_page_size,
        ));
        let inventory = Arc::new(InventoryService::new(client.clone(), client.clone(), guard.clone()));
        let analytics = Arc::new(AnalyticsService::new(client.clone(), counter.clone(), guard.clone()));
        let users = Arc::new(UserService::new(client.clone(), guard));
        let alerts = Arc::new(AlertStore::new(store.clone(), clock.clone()));

        // the local server needs no bearer token
        let assistant_http =
            NetworkHttpClient::from_config(&config.assistant_client_config(), SharedToken::default())?;
        let assistant = Arc::new(AssistantService::new(
            Arc::new(AssistantClient::new(assistant_http)),
            store,
            clock.clone(),
        ));

        tracing::info!(
            api = %config.api_base_url,
            auth = %config.auth_api_url,
            data_dir = %config.data_dir.display(),
            "POS services initialized"
        );

        Ok(Self {
            config,
            session,
            customers,
            sales,
            inventory,
            analytics,
            alerts,
            assistant,
            users,
            counter,
            clock,
        })
    }

    /// Empty cart with the configured tax rate
    pub fn new_cart(&self) -> Cart {
        Cart::new(Percent::new(self.config.default_iva).unwrap_or_default())
    }
}
