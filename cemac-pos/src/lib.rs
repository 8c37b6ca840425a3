//! CEMAC POS - client-side business logic of the stationery point of sale
//!
//! # Module overview
//!
//! ```text
//! cemac-pos/src/
//! ├── pricing.rs     # sale totals (subtotal, discount, IVA)
//! ├── cart.rs        # in-progress sale
//! ├── sales.rs       # sale submission and history
//! ├── customers.rs   # customer search / cache
//! ├── counter.rs     # daily sales counter
//! ├── history.rs     # client-side history filters
//! ├── alerts.rs      # stock alerts
//! ├── inventory.rs   # products and catalog CRUD
//! ├── analytics.rs   # dashboard figures
//! ├── assistant.rs   # JAVI assistant
//! ├── session.rs     # login state, forced logout on 401
//! ├── users.rs       # user administration
//! ├── storage.rs     # persisted key/value state
//! └── app.rs         # service wiring
//! ```

pub mod alerts;
pub mod analytics;
pub mod app;
pub mod assistant;
pub mod cart;
pub mod clock;
pub mod config;
pub mod counter;
pub mod customers;
pub mod error;
pub mod history;
pub mod inventory;
pub mod logger;
pub mod pricing;
pub mod sales;
pub mod session;
pub mod storage;
pub mod users;
pub mod validation;

// Re-export public types
pub use app::PosApp;
pub use cart::{Cart, CartLineItem};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::PosConfig;
pub use counter::{DailyCounter, DailyCounterManager};
pub use error::{PosError, PosResult};
pub use pricing::{Percent, SaleTotals, compute_totals, format_money};
pub use session::{Session, SessionGuard};
pub use storage::{FileStore, KeyValueStore, KeyValueStoreExt, MemoryStore};

// Re-export logger functions
pub use logger::{init_logger, init_logger_with_file};
