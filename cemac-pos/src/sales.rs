//! Sale submission and history
//!
//! # Submit flow
//!
//! ```text
//! cart empty? ──yes──► EmptyCart (no request)
//!      │
//!      ▼
//! POST /sales ──error──► surfaced, cart untouched (401 → forced logout)
//!      │ ok
//!      ▼
//! daily counter += sale (once per server id)
//!      ▼
//! GET /customers/:id   (best effort)
//!      ▼
//! cart.reset(keep_customer)
//!      ▼
//! GET /sales?page=     (best effort)
//! ```
//!
//! Steps after the server confirmed the sale never fail the submit: the sale
//! exists remotely, so their errors are only logged.

use std::sync::{Arc, Mutex};

use cemac_client::SalesApi;
use serde::{Deserialize, Serialize};
use shared::models::{Customer, PaymentMethod, Product, Sale, SaleCreate, SaleStatus};
use shared::request::PageQuery;

use crate::cart::Cart;
use crate::counter::DailyCounterManager;
use crate::customers::CustomerService;
use crate::error::{PosError, PosResult};
use crate::history::HistoryPage;
use crate::session::{SessionGuard, guard};
use crate::validation::{MAX_NOTE_LEN, non_blank, validate_optional_text};

/// Checkout form fields that are not part of the cart
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetails {
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
    /// Keep the selected customer in the cart for a follow-up sale
    #[serde(default)]
    pub keep_customer: bool,
}

/// Result of a successful submit
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub sale: Sale,
    /// Customer with updated purchase stats, when one was attached and the refresh worked
    pub customer: Option<Customer>,
    /// Reloaded history page, when the reload worked
    pub history: Option<HistoryPage>,
}

/// Build the create-sale payload from the cart
pub fn build_sale_request(cart: &Cart, details: &SaleDetails, vendedor: &str) -> SaleCreate {
    let totals = cart.totals();
    SaleCreate {
        cliente: cart.customer_display_name(),
        customer_id: cart.customer_id().map(str::to_string),
        vendedor: vendedor.to_string(),
        products: cart.to_sale_lines(),
        descuento: cart.discount().value(),
        iva: cart.iva().value(),
        payment_method: details.payment_method,
        notes: non_blank(&details.notes).map(str::to_string),
        subtotal: totals.subtotal,
        discount_amount: totals.discount_amount,
        iva_amount: totals.iva_amount,
        total: totals.total,
    }
}

pub struct SalesService {
    api: Arc<dyn SalesApi>,
    customers: Arc<CustomerService>,
    counter: Arc<DailyCounterManager>,
    session: Arc<dyn SessionGuard>,
    page: Mutex<PageQuery>,
}

impl SalesService {
    pub fn new(
        api: Arc<dyn SalesApi>,
        customers: Arc<CustomerService>,
        counter: Arc<DailyCounterManager>,
        session: Arc<dyn SessionGuard>,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            customers,
            counter,
            session,
            page: Mutex::new(PageQuery::new(1, page_size)),
        }
    }

    fn current_page(&self) -> PageQuery {
        *self.page.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn submit(&self, cart: &mut Cart, details: SaleDetails) -> PosResult<SubmitOutcome> {
        if cart.is_empty() {
            return Err(PosError::EmptyCart);
        }
        validate_optional_text(&details.notes, "Notas", MAX_NOTE_LEN)?;
        let user = self.session.require_user()?;

        let request = build_sale_request(cart, &details, user.display_name());
        let sale = guard(self.session.as_ref(), self.api.create_sale(&request).await)
            .inspect_err(|e| tracing::warn!(error = %e, "Sale submission failed"))?;
        tracing::info!(
            sale_id = %sale.id,
            total = sale.total,
            lines = request.products.len(),
            "Sale registered"
        );

        if let Err(e) = self.counter.increment_sale_counter(&sale) {
            tracing::error!(sale_id = %sale.id, error = %e, "Failed to update daily counter");
        }

        let customer = match request.customer_id.as_deref() {
            Some(id) => match self.customers.refresh(id).await {
                Ok(customer) => Some(customer),
                Err(e) => {
                    tracing::warn!(customer_id = %id, error = %e, "Customer refresh after sale failed");
                    None
                }
            },
            None => None,
        };

        cart.reset(details.keep_customer);
        if details.keep_customer
            && let Some(updated) = &customer
        {
            cart.set_customer(updated.clone());
        }

        let history = match self.reload_history().await {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!(error = %e, "History reload after sale failed");
                None
            }
        };

        Ok(SubmitOutcome {
            sale,
            customer,
            history,
        })
    }

    /// Fetch a history page and reconcile the daily counter with it
    pub async fn load_history(&self, page: u32) -> PosResult<HistoryPage> {
        let query = PageQuery::new(page, self.current_page().limit);
        *self.page.lock().unwrap_or_else(|e| e.into_inner()) = query;
        self.fetch_page(query).await
    }

    /// Re-fetch the page last shown
    pub async fn reload_history(&self) -> PosResult<HistoryPage> {
        self.fetch_page(self.current_page()).await
    }

    async fn fetch_page(&self, query: PageQuery) -> PosResult<HistoryPage> {
        let listing = guard(self.session.as_ref(), self.api.list_sales(query).await)?;
        if let Err(e) = self.counter.sync_with_api(&listing.items) {
            tracing::error!(error = %e, "Failed to sync daily counter");
        }
        Ok(HistoryPage {
            page: query.page,
            limit: query.limit,
            sales: listing.items,
            server_total: listing.total,
        })
    }

    /// Move a sale to another status
    pub async fn update_status(&self, sale: &Sale, next: SaleStatus) -> PosResult<Sale> {
        if !sale.status.can_transition_to(next) {
            return Err(PosError::InvalidTransition {
                from: sale.status,
                to: next,
            });
        }
        let updated = guard(
            self.session.as_ref(),
            self.api.update_sale_status(&sale.id, next).await,
        )?;
        tracing::info!(sale_id = %sale.id, from = %sale.status, to = %next, "Sale status changed");
        Ok(updated)
    }

    /// Products for the counter's search box
    pub async fn search_products(&self, query: &str) -> PosResult<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        guard(self.session.as_ref(), self.api.search_products(query).await)
    }
}
