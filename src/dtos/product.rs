use serde::Serialize;

use crate::models::category::ProductCategory;
use crate::models::product::ProductWithCategory;

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image: Option<String>,
    pub order: i32,
    pub availability: bool,
    pub restaurant_id: i64,
    pub product_category_id: i64,
    pub product_category: ProductCategory,
}

// Convert from Model to Response DTO
impl From<ProductWithCategory> for ProductResponse {
    fn from(ProductWithCategory { product, product_category }: ProductWithCategory) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image: product.image,
            order: product.order,
            availability: product.availability,
            restaurant_id: product.restaurant_id,
            product_category_id: product.product_category_id,
            product_category,
        }
    }
}
