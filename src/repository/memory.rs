use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    DeleteOutcome, RestaurantDetailRecord, RestaurantStore, RestaurantTx, RestaurantWithCategory,
    StoreError,
};
use crate::models::category::{ProductCategory, RestaurantCategory};
use crate::models::product::{Product, ProductWithCategory};
use crate::models::restaurant::{NewRestaurant, Restaurant, RestaurantChanges, DEFAULT_STATUS};

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    restaurant_categories: BTreeMap<i64, RestaurantCategory>,
    product_categories: BTreeMap<i64, ProductCategory>,
    restaurants: BTreeMap<i64, Restaurant>,
    products: BTreeMap<i64, Product>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn with_category(&self, restaurant: &Restaurant) -> Result<RestaurantWithCategory, StoreError> {
        let restaurant_category = self
            .restaurant_categories
            .get(&restaurant.restaurant_category_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::Constraint(format!(
                    "restaurant category {} does not exist",
                    restaurant.restaurant_category_id
                ))
            })?;
        Ok(RestaurantWithCategory {
            restaurant: restaurant.clone(),
            restaurant_category,
        })
    }

    fn require_restaurant_category(&self, id: i64) -> Result<(), StoreError> {
        if self.restaurant_categories.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::Constraint(format!(
                "restaurant category {id} does not exist"
            )))
        }
    }
}

/// Seed data for a product; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub order: i32,
    pub restaurant_id: i64,
    pub product_category_id: i64,
}

/// In-process store guarded by a single async mutex.
///
/// A transaction owns the lock until it is committed or dropped, so
/// transactions on this store are fully serialized.
#[derive(Clone, Default)]
pub struct MemoryRestaurantStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRestaurantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_restaurant_category(&self, name: &str) -> RestaurantCategory {
        let mut state = self.state.lock().await;
        let category = RestaurantCategory {
            id: state.next_id(),
            name: name.to_string(),
        };
        state
            .restaurant_categories
            .insert(category.id, category.clone());
        category
    }

    pub async fn add_product_category(&self, name: &str) -> ProductCategory {
        let mut state = self.state.lock().await;
        let category = ProductCategory {
            id: state.next_id(),
            name: name.to_string(),
        };
        state.product_categories.insert(category.id, category.clone());
        category
    }

    pub async fn add_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut state = self.state.lock().await;
        if !state.restaurants.contains_key(&new.restaurant_id) {
            return Err(StoreError::Constraint(format!(
                "restaurant {} does not exist",
                new.restaurant_id
            )));
        }
        if !state.product_categories.contains_key(&new.product_category_id) {
            return Err(StoreError::Constraint(format!(
                "product category {} does not exist",
                new.product_category_id
            )));
        }
        let product = Product {
            id: state.next_id(),
            name: new.name,
            description: None,
            price: new.price,
            image: None,
            order: new.order,
            availability: true,
            restaurant_id: new.restaurant_id,
            product_category_id: new.product_category_id,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    /// Snapshot of every restaurant row, in identifier order.
    pub async fn restaurants(&self) -> Vec<Restaurant> {
        self.state.lock().await.restaurants.values().cloned().collect()
    }
}

#[async_trait]
impl RestaurantStore for MemoryRestaurantStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Restaurant>, StoreError> {
        Ok(self.state.lock().await.restaurants.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<RestaurantWithCategory>, StoreError> {
        let state = self.state.lock().await;
        state
            .restaurants
            .values()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| state.with_category(r))
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<RestaurantWithCategory>, StoreError> {
        let state = self.state.lock().await;
        state
            .restaurants
            .values()
            .map(|r| state.with_category(r))
            .collect()
    }

    async fn find_detail(&self, id: i64) -> Result<Option<RestaurantDetailRecord>, StoreError> {
        let state = self.state.lock().await;
        let Some(restaurant) = state.restaurants.get(&id) else {
            return Ok(None);
        };
        let RestaurantWithCategory {
            restaurant,
            restaurant_category,
        } = state.with_category(restaurant)?;

        let products = state
            .products
            .values()
            .filter(|p| p.restaurant_id == id)
            .map(|p| {
                let product_category = state
                    .product_categories
                    .get(&p.product_category_id)
                    .cloned()
                    .ok_or_else(|| {
                        StoreError::Constraint(format!(
                            "product category {} does not exist",
                            p.product_category_id
                        ))
                    })?;
                Ok(ProductWithCategory {
                    product: p.clone(),
                    product_category,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Some(RestaurantDetailRecord {
            restaurant,
            restaurant_category,
            products,
        }))
    }

    async fn create(&self, new: NewRestaurant, owner_id: i64) -> Result<Restaurant, StoreError> {
        let mut state = self.state.lock().await;
        state.require_restaurant_category(new.restaurant_category_id)?;

        let now = Utc::now();
        let restaurant = Restaurant {
            id: state.next_id(),
            name: new.name,
            description: new.description,
            address: new.address,
            postal_code: new.postal_code,
            url: new.url,
            shipping_costs: new.shipping_costs,
            average_service_minutes: new.average_service_minutes,
            email: new.email,
            phone: new.phone,
            logo: new.logo,
            hero_image: new.hero_image,
            status: new.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            restaurant_category_id: new.restaurant_category_id,
            owner_id,
            pinned_at: new.pinned.then_some(now),
            created_at: now,
            updated_at: now,
        };
        state.restaurants.insert(restaurant.id, restaurant.clone());
        Ok(restaurant)
    }

    async fn update_fields(
        &self,
        id: i64,
        changes: RestaurantChanges,
    ) -> Result<Option<Restaurant>, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(category_id) = changes.restaurant_category_id {
            state.require_restaurant_category(category_id)?;
        }
        let Some(restaurant) = state.restaurants.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(restaurant);
        restaurant.updated_at = Utc::now();
        Ok(Some(restaurant.clone()))
    }

    async fn delete(&self, id: i64) -> Result<DeleteOutcome, StoreError> {
        let mut state = self.state.lock().await;
        if state.restaurants.remove(&id).is_none() {
            return Ok(DeleteOutcome::NoneRemoved);
        }
        state.products.retain(|_, p| p.restaurant_id != id);
        Ok(DeleteOutcome::Removed)
    }

    async fn begin(&self) -> Result<Box<dyn RestaurantTx>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(MemoryRestaurantTx {
            guard,
            staged: BTreeMap::new(),
        }))
    }
}

/// Writes are staged until commit; dropping the transaction discards them.
pub struct MemoryRestaurantTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: BTreeMap<i64, Restaurant>,
}

#[async_trait]
impl RestaurantTx for MemoryRestaurantTx {
    async fn get_by_id(&mut self, id: i64) -> Result<Option<Restaurant>, StoreError> {
        Ok(self
            .staged
            .get(&id)
            .or_else(|| self.guard.restaurants.get(&id))
            .cloned())
    }

    async fn set_pinned_at(
        &mut self,
        id: i64,
        value: Option<DateTime<Utc>>,
    ) -> Result<Option<Restaurant>, StoreError> {
        let Some(mut restaurant) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        restaurant.pinned_at = value;
        restaurant.updated_at = Utc::now();
        self.staged.insert(id, restaurant.clone());
        Ok(Some(restaurant))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryRestaurantTx { mut guard, staged } = *self;
        guard.restaurants.extend(staged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_restaurant(category_id: i64, pinned: bool) -> NewRestaurant {
        NewRestaurant {
            name: "Casa Felix".to_string(),
            address: "Calle Larios 1".to_string(),
            postal_code: "29005".to_string(),
            shipping_costs: 2.5,
            restaurant_category_id: category_id,
            pinned,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_sets_pinned_at_only_when_requested() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Tapas").await;

        let before = Utc::now();
        let pinned = store.create(new_restaurant(category.id, true), 7).await.unwrap();
        let unpinned = store.create(new_restaurant(category.id, false), 7).await.unwrap();

        let pinned_at = pinned.pinned_at.expect("pinned at creation");
        assert!(pinned_at >= before);
        assert_eq!(pinned_at, pinned.created_at);
        assert_eq!(unpinned.pinned_at, None);
        assert_eq!(pinned.owner_id, 7);
        assert_eq!(pinned.status, DEFAULT_STATUS);
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let store = MemoryRestaurantStore::new();

        let err = store.create(new_restaurant(42, false), 7).await.unwrap_err();

        assert!(matches!(err, StoreError::Constraint(_)));
        assert!(store.restaurants().await.is_empty());
    }

    #[tokio::test]
    async fn update_fields_leaves_pinned_at_alone() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Tapas").await;
        let created = store.create(new_restaurant(category.id, true), 7).await.unwrap();

        let updated = store
            .update_fields(
                created.id,
                RestaurantChanges {
                    name: Some("Casa Felix II".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Casa Felix II");
        assert_eq!(updated.pinned_at, created.pinned_at);
        assert_eq!(updated.address, created.address);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_staged_writes() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Tapas").await;
        let created = store.create(new_restaurant(category.id, false), 7).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            let staged = tx.set_pinned_at(created.id, Some(Utc::now())).await.unwrap();
            assert!(staged.unwrap().pinned_at.is_some());
            assert!(tx.get_by_id(created.id).await.unwrap().unwrap().pinned_at.is_some());
        }

        let stored = store.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.pinned_at, None);
    }

    #[tokio::test]
    async fn set_pinned_at_outside_a_transaction() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Tapas").await;
        let created = store.create(new_restaurant(category.id, false), 7).await.unwrap();
        let at = Utc::now();

        let written = store.set_pinned_at(created.id, Some(at)).await.unwrap();
        let missing = store.set_pinned_at(created.id + 100, Some(at)).await.unwrap();

        assert_eq!(written.unwrap().pinned_at, Some(at));
        assert!(missing.is_none());
        assert_eq!(
            store.get_by_id(created.id).await.unwrap().unwrap().pinned_at,
            Some(at)
        );
    }

    #[tokio::test]
    async fn delete_removes_products_with_the_restaurant() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Tapas").await;
        let product_category = store.add_product_category("Drinks").await;
        let created = store.create(new_restaurant(category.id, false), 7).await.unwrap();
        store
            .add_product(NewProduct {
                name: "Water".to_string(),
                price: 1.0,
                order: 0,
                restaurant_id: created.id,
                product_category_id: product_category.id,
            })
            .await
            .unwrap();

        assert_eq!(store.delete(created.id).await.unwrap(), DeleteOutcome::Removed);
        assert_eq!(store.delete(created.id).await.unwrap(), DeleteOutcome::NoneRemoved);
        assert!(store.find_detail(created.id).await.unwrap().is_none());
    }
}
