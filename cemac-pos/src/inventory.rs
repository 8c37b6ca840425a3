//! Products and catalog (categories, brands, suppliers)

use std::sync::Arc;

use cemac_client::{CatalogApi, InventoryApi};
use shared::models::{
    Brand, BrandInput, Category, CategoryCreate, CategoryUpdate, Product, ProductCreate,
    ProductUpdate, Supplier, SupplierInput,
};

use crate::error::{PosError, PosResult};
use crate::session::{SessionGuard, guard};
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, non_blank, validate_email, validate_optional_text, validate_phone,
    validate_required_text,
};

fn validate_price(price: f64, field: &str) -> PosResult<()> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(PosError::validation(format!("{field} debe ser un número positivo")))
    }
}

fn validate_stock(stock: i64) -> PosResult<()> {
    if stock < 0 {
        return Err(PosError::validation("El stock no puede ser negativo"));
    }
    Ok(())
}

pub fn validate_product(input: &ProductCreate) -> PosResult<()> {
    validate_required_text(&input.name, "Nombre", MAX_NAME_LEN)?;
    validate_optional_text(&input.description, "Descripción", MAX_NOTE_LEN)?;
    validate_price(input.price, "El precio")?;
    if let Some(cost) = input.cost {
        validate_price(cost, "El costo")?;
    }
    validate_stock(input.stock)?;
    if let Some(min) = input.min_stock {
        validate_stock(min)?;
    }
    Ok(())
}

fn validate_product_update(input: &ProductUpdate) -> PosResult<()> {
    if let Some(name) = &input.name {
        validate_required_text(name, "Nombre", MAX_NAME_LEN)?;
    }
    validate_optional_text(&input.description, "Descripción", MAX_NOTE_LEN)?;
    if let Some(price) = input.price {
        validate_price(price, "El precio")?;
    }
    if let Some(cost) = input.cost {
        validate_price(cost, "El costo")?;
    }
    if let Some(stock) = input.stock {
        validate_stock(stock)?;
    }
    Ok(())
}

fn validate_supplier(input: &SupplierInput) -> PosResult<()> {
    validate_required_text(&input.name, "Nombre", MAX_NAME_LEN)?;
    if let Some(email) = non_blank(&input.email) {
        validate_email(email)?;
    }
    if let Some(phone) = non_blank(&input.phone) {
        validate_phone(phone)?;
    }
    Ok(())
}

/// Products whose stock is known and at or below `threshold`, lowest first
pub fn low_stock(products: &[Product], threshold: i64) -> Vec<&Product> {
    let mut low: Vec<&Product> = products
        .iter()
        .filter(|p| p.stock.is_some_and(|s| s <= threshold))
        .collect();
    low.sort_by_key(|p| p.stock);
    low
}

/// Stock valued at sale price (cost when `at_cost` and known)
pub fn inventory_value(products: &[Product], at_cost: bool) -> f64 {
    products
        .iter()
        .map(|p| {
            let unit = if at_cost { p.cost.unwrap_or(p.price) } else { p.price };
            unit * p.available_stock() as f64
        })
        .sum()
}

pub struct InventoryService {
    inventory: Arc<dyn InventoryApi>,
    catalog: Arc<dyn CatalogApi>,
    session: Arc<dyn SessionGuard>,
}

impl InventoryService {
    pub fn new(
        inventory: Arc<dyn InventoryApi>,
        catalog: Arc<dyn CatalogApi>,
        session: Arc<dyn SessionGuard>,
    ) -> Self {
        Self {
            inventory,
            catalog,
            session,
        }
    }

    fn guard<T>(&self, result: cemac_client::ClientResult<T>) -> PosResult<T> {
        guard(self.session.as_ref(), result)
    }

    // ========== Products ==========

    pub async fn list_products(&self) -> PosResult<Vec<Product>> {
        self.guard(self.inventory.list_products().await)
    }

    pub async fn create_product(&self, input: ProductCreate) -> PosResult<Product> {
        validate_product(&input)?;
        let product = self.guard(self.inventory.create_product(&input).await)?;
        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: &str, input: ProductUpdate) -> PosResult<Product> {
        validate_product_update(&input)?;
        self.guard(self.inventory.update_product(id, &input).await)
    }

    pub async fn delete_product(&self, id: &str) -> PosResult<()> {
        self.guard(self.inventory.delete_product(id).await)?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    // ========== Categories ==========

    pub async fn list_categories(&self) -> PosResult<Vec<Category>> {
        self.guard(self.catalog.list_categories().await)
    }

    pub async fn create_category(&self, input: CategoryCreate) -> PosResult<Category> {
        validate_required_text(&input.name, "Nombre", MAX_NAME_LEN)?;
        validate_optional_text(&input.description, "Descripción", MAX_NOTE_LEN)?;
        self.guard(self.catalog.create_category(&input).await)
    }

    pub async fn update_category(&self, id: &str, input: CategoryUpdate) -> PosResult<Category> {
        if let Some(name) = &input.name {
            validate_required_text(name, "Nombre", MAX_NAME_LEN)?;
        }
        validate_optional_text(&input.description, "Descripción", MAX_NOTE_LEN)?;
        self.guard(self.catalog.update_category(id, &input).await)
    }

    pub async fn delete_category(&self, id: &str) -> PosResult<()> {
        self.guard(self.catalog.delete_category(id).await)
    }

    // ========== Brands ==========

    pub async fn list_brands(&self) -> PosResult<Vec<Brand>> {
        self.guard(self.catalog.list_brands().await)
    }

    pub async fn create_brand(&self, input: BrandInput) -> PosResult<Brand> {
        validate_required_text(&input.name, "Nombre", MAX_NAME_LEN)?;
        self.guard(self.catalog.create_brand(&input).await)
    }

    pub async fn update_brand(&self, id: &str, input: BrandInput) -> PosResult<Brand> {
        validate_required_text(&input.name, "Nombre", MAX_NAME_LEN)?;
        self.guard(self.catalog.update_brand(id, &input).await)
    }

    pub async fn delete_brand(&self, id: &str) -> PosResult<()> {
        self.guard(self.catalog.delete_brand(id).await)
    }

    // ========== Suppliers ==========

    pub async fn list_suppliers(&self) -> PosResult<Vec<Supplier>> {
        self.guard(self.catalog.list_suppliers().await)
    }

    pub async fn create_supplier(&self, input: SupplierInput) -> PosResult<Supplier> {
        validate_supplier(&input)?;
        self.guard(self.catalog.create_supplier(&input).await)
    }

    pub async fn update_supplier(&self, id: &str, input: SupplierInput) -> PosResult<Supplier> {
        validate_supplier(&input)?;
        self.guard(self.catalog.update_supplier(id, &input).await)
    }

    pub async fn delete_supplier(&self, id: &str) -> PosResult<()> {
        self.guard(self.catalog.delete_supplier(id).await)
    }

    /// Brands and suppliers for the product form, fetched together
    pub async fn load_brands_and_suppliers(&self) -> PosResult<(Vec<Brand>, Vec<Supplier>)> {
        let (brands, suppliers) =
            self.guard(tokio::try_join!(self.catalog.list_brands(), self.catalog.list_suppliers()))?;
        tracing::debug!(brands = brands.len(), suppliers = suppliers.len(), "Catalog loaded");
        Ok((brands, suppliers))
    }
}
