use sqlx::FromRow;

use super::category::ProductCategory;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image: Option<String>,
    pub order: i32,
    pub availability: bool,
    pub restaurant_id: i64,
    pub product_category_id: i64,
}

/// A product joined with its category, as loaded for the detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductWithCategory {
    pub product: Product,
    pub product_category: ProductCategory,
}
