//! Customer search and cache
//!
//! The remote API owns customer records. The service keeps a read-through
//! copy of the full list for instant search at the counter and refreshes
//! single entries after each sale.

use std::sync::Arc;

use cemac_client::CustomerApi;
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use tokio::sync::RwLock;

use crate::error::{PosError, PosResult};
use crate::session::{SessionGuard, guard};
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, non_blank, validate_email, validate_optional_text, validate_phone,
    validate_required_text,
};

fn validate_contact(email: &Option<String>, phone: &Option<String>) -> PosResult<()> {
    if let Some(email) = non_blank(email) {
        validate_email(email)?;
    }
    if let Some(phone) = non_blank(phone) {
        validate_phone(phone)?;
    }
    Ok(())
}

/// Validate a new customer before it is sent
pub fn validate_new_customer(input: &CustomerCreate) -> PosResult<()> {
    validate_required_text(&input.first_name, "Nombre", MAX_NAME_LEN)?;
    validate_required_text(&input.last_name, "Apellido", MAX_NAME_LEN)?;
    validate_optional_text(&input.notes, "Notas", MAX_NOTE_LEN)?;
    validate_contact(&input.email, &input.phone)
}

fn validate_customer_update(input: &CustomerUpdate) -> PosResult<()> {
    if let Some(first) = &input.first_name {
        validate_required_text(first, "Nombre", MAX_NAME_LEN)?;
    }
    if let Some(last) = &input.last_name {
        validate_required_text(last, "Apellido", MAX_NAME_LEN)?;
    }
    validate_optional_text(&input.notes, "Notas", MAX_NOTE_LEN)?;
    validate_contact(&input.email, &input.phone)
}

/// Name or phone contains the query, ignoring case
fn matches_query(customer: &Customer, query: &str) -> bool {
    customer.full_name().to_lowercase().contains(query)
        || customer
            .phone
            .as_deref()
            .is_some_and(|p| p.to_lowercase().contains(query))
}

pub struct CustomerService {
    api: Arc<dyn CustomerApi>,
    session: Arc<dyn SessionGuard>,
    cache: RwLock<Vec<Customer>>,
}

impl CustomerService {
    pub fn new(api: Arc<dyn CustomerApi>, session: Arc<dyn SessionGuard>) -> Self {
        Self {
            api,
            session,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Fetch every customer into the cache
    pub async fn load_all(&self) -> PosResult<Vec<Customer>> {
        let customers = guard(self.session.as_ref(), self.api.list_customers().await)?;
        tracing::debug!(count = customers.len(), "Customers loaded");
        *self.cache.write().await = customers.clone();
        Ok(customers)
    }

    /// Search by name or phone
    ///
    /// Uses the cache when it holds anything, the server otherwise.
    pub async fn search(&self, query: &str) -> PosResult<Vec<Customer>> {
        let query = query.trim().to_lowercase();
        {
            let cache = self.cache.read().await;
            if !cache.is_empty() {
                return Ok(cache
                    .iter()
                    .filter(|c| query.is_empty() || matches_query(c, &query))
                    .cloned()
                    .collect());
            }
        }
        if query.is_empty() {
            return Ok(Vec::new());
        }
        guard(self.session.as_ref(), self.api.search_customers(&query).await)
    }

    /// Customer to associate with the sale; cache first, server otherwise
    pub async fn select(&self, id: &str) -> PosResult<Customer> {
        if let Some(customer) = self.get_cached(id).await {
            return Ok(customer);
        }
        self.refresh(id).await
    }

    pub async fn get_cached(&self, id: &str) -> Option<Customer> {
        self.cache.read().await.iter().find(|c| c.id == id).cloned()
    }

    pub async fn cached(&self) -> Vec<Customer> {
        self.cache.read().await.clone()
    }

    /// Re-fetch one customer (updated purchase stats) into the cache
    pub async fn refresh(&self, id: &str) -> PosResult<Customer> {
        let customer = guard(self.session.as_ref(), self.api.get_customer(id).await)?;
        self.upsert(customer.clone()).await;
        Ok(customer)
    }

    pub async fn create(&self, input: CustomerCreate) -> PosResult<Customer> {
        validate_new_customer(&input)?;
        let customer = guard(self.session.as_ref(), self.api.create_customer(&input).await)?;
        tracing::info!(customer_id = %customer.id, "Customer created");
        self.upsert(customer.clone()).await;
        Ok(customer)
    }

    pub async fn update(&self, id: &str, input: CustomerUpdate) -> PosResult<Customer> {
        validate_customer_update(&input)?;
        let customer = guard(self.session.as_ref(), self.api.update_customer(id, &input).await)?;
        self.upsert(customer.clone()).await;
        Ok(customer)
    }

    pub async fn delete(&self, id: &str) -> PosResult<()> {
        if id.trim().is_empty() {
            return Err(PosError::validation("Cliente inválido"));
        }
        guard(self.session.as_ref(), self.api.delete_customer(id).await)?;
        self.cache.write().await.retain(|c| c.id != id);
        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    async fn upsert(&self, customer: Customer) {
        let mut cache = self.cache.write().await;
        match cache.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => *existing = customer,
            None => cache.push(customer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(first: &str, last: &str) -> CustomerCreate {
        CustomerCreate {
            first_name: first.into(),
            last_name: last.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_customer_validation() {
        assert!(validate_new_customer(&input("Ana", "López")).is_ok());
        assert!(validate_new_customer(&input("", "López")).is_err());
        assert!(validate_new_customer(&input("Ana", " ")).is_err());

        let mut bad_email = input("Ana", "López");
        bad_email.email = Some("ana@".into());
        assert!(validate_new_customer(&bad_email).is_err());

        // blank optional fields are ignored
        let mut blank = input("Ana", "López");
        blank.email = Some("  ".into());
        blank.phone = Some(String::new());
        assert!(validate_new_customer(&blank).is_ok());

        let mut bad_phone = input("Ana", "López");
        bad_phone.phone = Some("12ab".into());
        assert!(validate_new_customer(&bad_phone).is_err());
    }

    #[test]
    fn test_update_validation_only_checks_present_fields() {
        assert!(validate_customer_update(&CustomerUpdate::default()).is_ok());
        let update = CustomerUpdate {
            first_name: Some(" ".into()),
            ..Default::default()
        };
        assert!(validate_customer_update(&update).is_err());
    }
}
