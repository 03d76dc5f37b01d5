use super::RestaurantError;
use crate::dtos::product::ProductResponse;
use crate::dtos::restaurant::{RestaurantDetailResponse, RestaurantResponse};
use crate::models::restaurant::{NewRestaurant, RestaurantChanges, STATUSES};
use crate::repository::{DeleteOutcome, RestaurantDetailRecord, RestaurantStore};

fn validate_status(status: Option<&str>) -> Result<(), RestaurantError> {
    match status {
        Some(s) if !STATUSES.contains(&s) => Err(RestaurantError::Validation(format!(
            "status must be one of: {}",
            STATUSES.join(", ")
        ))),
        _ => Ok(()),
    }
}

fn require_text(field: &str, value: &str) -> Result<(), RestaurantError> {
    if value.trim().is_empty() {
        return Err(RestaurantError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate_costs(shipping_costs: Option<f64>, minutes: Option<f64>) -> Result<(), RestaurantError> {
    if shipping_costs.is_some_and(|c| c < 0.0) {
        return Err(RestaurantError::Validation(
            "shipping_costs cannot be negative".to_string(),
        ));
    }
    if minutes.is_some_and(|m| m < 0.0) {
        return Err(RestaurantError::Validation(
            "average_service_minutes cannot be negative".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_new(new: &NewRestaurant) -> Result<(), RestaurantError> {
    require_text("name", &new.name)?;
    require_text("address", &new.address)?;
    require_text("postal_code", &new.postal_code)?;
    validate_costs(Some(new.shipping_costs), new.average_service_minutes)?;
    validate_status(new.status.as_deref())
}

pub fn validate_changes(changes: &RestaurantChanges) -> Result<(), RestaurantError> {
    for (field, value) in [
        ("name", &changes.name),
        ("address", &changes.address),
        ("postal_code", &changes.postal_code),
    ] {
        if let Some(value) = value {
            require_text(field, value)?;
        }
    }
    validate_costs(changes.shipping_costs, changes.average_service_minutes.flatten())?;
    validate_status(changes.status.as_deref())
}

/// Shapes a detail record, products sorted by their `order` attribute.
pub fn detail_projection(record: RestaurantDetailRecord) -> RestaurantDetailResponse {
    let RestaurantDetailRecord {
        restaurant,
        restaurant_category,
        mut products,
    } = record;
    products.sort_by_key(|p| (p.product.order, p.product.id));

    RestaurantDetailResponse {
        restaurant: restaurant.into(),
        restaurant_category,
        products: products.into_iter().map(ProductResponse::from).collect(),
    }
}

pub struct RestaurantView<'a> {
    store: &'a dyn RestaurantStore,
}

impl<'a> RestaurantView<'a> {
    pub fn new(store: &'a dyn RestaurantStore) -> Self {
        Self { store }
    }

    pub async fn get_detail(&self, id: i64) -> Result<RestaurantDetailResponse, RestaurantError> {
        self.store
            .find_detail(id)
            .await?
            .map(detail_projection)
            .ok_or(RestaurantError::NotFound(id))
    }

    pub async fn create(
        &self,
        new: NewRestaurant,
        owner_id: i64,
    ) -> Result<RestaurantResponse, RestaurantError> {
        validate_new(&new)?;
        let restaurant = self.store.create(new, owner_id).await?;
        Ok(restaurant.into())
    }

    /// Applies a partial update and returns the refreshed detail view.
    pub async fn update(
        &self,
        id: i64,
        changes: RestaurantChanges,
    ) -> Result<RestaurantDetailResponse, RestaurantError> {
        validate_changes(&changes)?;
        self.store.update_fields(id, changes).await?;
        self.get_detail(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<DeleteOutcome, RestaurantError> {
        Ok(self.store.delete(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::NewProduct;
    use crate::repository::MemoryRestaurantStore;

    fn new_restaurant(category_id: i64) -> NewRestaurant {
        NewRestaurant {
            name: "La Tagliatella".to_string(),
            address: "Plaza Nueva 3".to_string(),
            postal_code: "41001".to_string(),
            shipping_costs: 1.5,
            restaurant_category_id: category_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn detail_lists_products_by_order() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Italian").await;
        let drinks = store.add_product_category("Drinks").await;
        let restaurant = store.create(new_restaurant(category.id), 3).await.unwrap();
        for (name, order) in [("Lemonade", 2), ("Water", 0), ("Beer", 1)] {
            store
                .add_product(NewProduct {
                    name: name.to_string(),
                    price: 2.0,
                    order,
                    restaurant_id: restaurant.id,
                    product_category_id: drinks.id,
                })
                .await
                .unwrap();
        }

        let detail = RestaurantView::new(&store).get_detail(restaurant.id).await.unwrap();

        let orders: Vec<i32> = detail.products.iter().map(|p| p.order).collect();
        let names: Vec<&str> = detail.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(names, vec!["Water", "Beer", "Lemonade"]);
        assert_eq!(detail.restaurant_category, category);
        assert!(detail.products.iter().all(|p| p.product_category == drinks));
    }

    #[tokio::test]
    async fn detail_of_missing_restaurant_is_not_found() {
        let store = MemoryRestaurantStore::new();

        let err = RestaurantView::new(&store).get_detail(5).await.unwrap_err();

        assert!(matches!(err, RestaurantError::NotFound(5)));
    }

    #[tokio::test]
    async fn update_returns_refreshed_detail() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Italian").await;
        let restaurant = store.create(new_restaurant(category.id), 3).await.unwrap();
        let view = RestaurantView::new(&store);

        let detail = view
            .update(
                restaurant.id,
                RestaurantChanges {
                    status: Some("online".to_string()),
                    shipping_costs: Some(0.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(detail.restaurant.status, "online");
        assert_eq!(detail.restaurant.shipping_costs, 0.0);
        assert_eq!(detail.restaurant.name, "La Tagliatella");
    }

    #[tokio::test]
    async fn update_of_missing_restaurant_is_not_found() {
        let store = MemoryRestaurantStore::new();

        let err = RestaurantView::new(&store)
            .update(77, RestaurantChanges::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RestaurantError::NotFound(77)));
    }

    #[tokio::test]
    async fn update_clears_nullable_fields_set_to_null() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Italian").await;
        let restaurant = store
            .create(
                NewRestaurant {
                    description: Some("Pasta fresca".to_string()),
                    phone: Some("954000000".to_string()),
                    ..new_restaurant(category.id)
                },
                3,
            )
            .await
            .unwrap();

        let detail = RestaurantView::new(&store)
            .update(
                restaurant.id,
                RestaurantChanges {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(detail.restaurant.description, None);
        assert_eq!(detail.restaurant.phone.as_deref(), Some("954000000"));
    }

    #[tokio::test]
    async fn update_rejects_unknown_status() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Italian").await;
        let restaurant = store.create(new_restaurant(category.id), 3).await.unwrap();

        let err = RestaurantView::new(&store)
            .update(
                restaurant.id,
                RestaurantChanges {
                    status: Some("busy".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RestaurantError::Validation(_)));
        assert_eq!(
            store.get_by_id(restaurant.id).await.unwrap().unwrap().status,
            "offline"
        );
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Italian").await;
        let restaurant = store.create(new_restaurant(category.id), 3).await.unwrap();
        let view = RestaurantView::new(&store);

        assert_eq!(view.delete(restaurant.id).await.unwrap(), DeleteOutcome::Removed);
        assert_eq!(view.delete(restaurant.id).await.unwrap(), DeleteOutcome::NoneRemoved);
    }

    #[test]
    fn validate_new_requires_name_and_non_negative_costs() {
        let mut new = new_restaurant(1);
        assert!(validate_new(&new).is_ok());

        new.name = "  ".to_string();
        assert!(matches!(validate_new(&new), Err(RestaurantError::Validation(_))));

        new.name = "Ok".to_string();
        new.shipping_costs = -1.0;
        assert!(matches!(validate_new(&new), Err(RestaurantError::Validation(_))));
    }
}
