//! In-progress sale
//!
//! The cart lives only in memory. Quantities stay within `[1, max_quantity]`
//! where `max_quantity` is the product's stock when it was added; a line at
//! quantity 1 is removed, never decremented.

use serde::{Deserialize, Serialize};
use shared::models::{Customer, Product, SaleLine};

use crate::error::{PosError, PosResult};
use crate::pricing::{Percent, SaleTotals, compute_totals};

/// Tax applied to new carts unless configured otherwise
pub const DEFAULT_IVA: f64 = 16.0;

/// Customer name used when the sale has no customer
pub const WALK_IN_CUSTOMER: &str = "Cliente general";

/// Line of the in-progress sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: f64,
    pub max_quantity: u32,
}

impl CartLineItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLineItem>,
    discount: Percent,
    iva: Percent,
    default_iva: Percent,
    customer: Option<Customer>,
    customer_name: Option<String>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Percent::new(DEFAULT_IVA).unwrap_or(Percent::ZERO))
    }
}

impl Cart {
    /// Empty cart with the given default tax rate
    pub fn new(default_iva: Percent) -> Self {
        Self {
            lines: Vec::new(),
            discount: Percent::ZERO,
            iva: default_iva,
            default_iva,
            customer: None,
            customer_name: None,
        }
    }

    // ========== Lines ==========

    /// Add one unit of a product
    ///
    /// An existing line is incremented; at `max_quantity` the call fails and
    /// the cart is unchanged.
    pub fn select_product(&mut self, product: &Product) -> PosResult<()> {
        if let Some(index) = self.lines.iter().position(|l| l.product_id == product.id) {
            return self.increase_quantity(index);
        }

        let max_quantity = u32::try_from(product.available_stock()).unwrap_or(u32::MAX);
        if max_quantity == 0 {
            return Err(PosError::OutOfStock(product.name.clone()));
        }

        self.lines.push(CartLineItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: 1,
            price: product.price,
            max_quantity,
        });
        tracing::debug!(product_id = %product.id, "Product added to cart");
        Ok(())
    }

    pub fn increase_quantity(&mut self, index: usize) -> PosResult<()> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(PosError::InvalidLine(index))?;
        if line.quantity >= line.max_quantity {
            return Err(PosError::StockExceeded {
                product: line.product_name.clone(),
                max: line.max_quantity,
            });
        }
        line.quantity += 1;
        Ok(())
    }

    /// Decrement a line; at quantity 1 nothing happens
    pub fn decrease_quantity(&mut self, index: usize) -> PosResult<()> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(PosError::InvalidLine(index))?;
        if line.quantity > 1 {
            line.quantity -= 1;
        }
        Ok(())
    }

    pub fn remove_product(&mut self, index: usize) -> PosResult<CartLineItem> {
        if index >= self.lines.len() {
            return Err(PosError::InvalidLine(index));
        }
        Ok(self.lines.remove(index))
    }

    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units across all lines
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    // ========== Rates ==========

    pub fn set_discount(&mut self, value: f64) -> PosResult<()> {
        self.discount = Percent::new(value)?;
        Ok(())
    }

    pub fn set_iva(&mut self, value: f64) -> PosResult<()> {
        self.iva = Percent::new(value)?;
        Ok(())
    }

    pub fn discount(&self) -> Percent {
        self.discount
    }

    pub fn iva(&self) -> Percent {
        self.iva
    }

    // ========== Customer ==========

    /// Associate a registered customer; replaces any typed name
    pub fn set_customer(&mut self, customer: Customer) {
        self.customer_name = None;
        self.customer = Some(customer);
    }

    /// Free-text customer name for walk-in sales
    pub fn set_customer_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.customer_name = if name.trim().is_empty() {
            None
        } else {
            Some(name.trim().to_string())
        };
    }

    pub fn clear_customer(&mut self) {
        self.customer = None;
        self.customer_name = None;
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer.as_ref().map(|c| c.id.as_str())
    }

    /// Name printed on the sale: selected customer, typed name, or the walk-in default
    pub fn customer_display_name(&self) -> String {
        if let Some(customer) = &self.customer {
            let name = customer.full_name();
            if !name.is_empty() {
                return name;
            }
        }
        self.customer_name
            .clone()
            .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string())
    }

    // ========== Totals ==========

    pub fn totals(&self) -> SaleTotals {
        compute_totals(
            self.lines.iter().map(|l| (l.price, l.quantity)),
            self.discount,
            self.iva,
        )
    }

    pub fn to_sale_lines(&self) -> Vec<SaleLine> {
        self.lines
            .iter()
            .map(|l| SaleLine {
                product_id: l.product_id.clone(),
                product_name: l.product_name.clone(),
                quantity: l.quantity,
                price: l.price,
            })
            .collect()
    }

    /// Clear lines and rates after a sale
    pub fn reset(&mut self, keep_customer: bool) {
        self.lines.clear();
        self.discount = Percent::ZERO;
        self.iva = self.default_iva;
        if !keep_customer {
            self.clear_customer();
        }
    }
}
