use chrono::{DateTime, Utc};

use super::RestaurantError;
use crate::models::restaurant::Restaurant;
use crate::repository::{RestaurantStore, RestaurantWithCategory};

/// Pin state after one toggle: unpinned becomes pinned at `now`, pinned becomes unpinned.
pub fn next_pinned_at(current: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match current {
        Some(_) => None,
        None => Some(now),
    }
}

/// Pinned restaurants first, earliest pin first; then unpinned ones in identifier order.
pub fn order_pinned_first(restaurants: Vec<RestaurantWithCategory>) -> Vec<RestaurantWithCategory> {
    let (mut pinned, mut unpinned): (Vec<_>, Vec<_>) = restaurants
        .into_iter()
        .partition(|r| r.restaurant.is_pinned());

    pinned.sort_by(|a, b| {
        a.restaurant
            .pinned_at
            .cmp(&b.restaurant.pinned_at)
            .then(a.restaurant.id.cmp(&b.restaurant.id))
    });
    unpinned.sort_by_key(|r| r.restaurant.id);

    pinned.extend(unpinned);
    pinned
}

pub struct PinToggleService<'a> {
    store: &'a dyn RestaurantStore,
}

impl<'a> PinToggleService<'a> {
    pub fn new(store: &'a dyn RestaurantStore) -> Self {
        Self { store }
    }

    /// Flips the pin state of one restaurant inside a single transaction.
    ///
    /// The current value is read inside the transaction, so two concurrent
    /// toggles serialize instead of both inverting the same stale value.
    /// Any early return drops the transaction, which rolls it back.
    pub async fn toggle_pin(&self, restaurant_id: i64) -> Result<Restaurant, RestaurantError> {
        let mut tx = self.store.begin().await?;

        let current = tx
            .get_by_id(restaurant_id)
            .await?
            .ok_or(RestaurantError::NotFound(restaurant_id))?;

        let pinned_at = next_pinned_at(current.pinned_at, Utc::now());
        let updated = tx
            .set_pinned_at(restaurant_id, pinned_at)
            .await?
            .ok_or(RestaurantError::NotFound(restaurant_id))?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn list_for_owner(
        &self,
        owner_id: i64,
    ) -> Result<Vec<RestaurantWithCategory>, RestaurantError> {
        let restaurants = self.store.list_by_owner(owner_id).await?;
        Ok(order_pinned_first(restaurants))
    }

    pub async fn list_public(&self) -> Result<Vec<RestaurantWithCategory>, RestaurantError> {
        let mut restaurants = self.store.list_all().await?;
        restaurants.sort_by(|a, b| {
            a.restaurant_category
                .name
                .cmp(&b.restaurant_category.name)
                .then(a.restaurant.id.cmp(&b.restaurant.id))
        });
        Ok(restaurants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::restaurant::NewRestaurant;
    use crate::repository::MemoryRestaurantStore;
    use chrono::Duration;

    async fn seed(
        store: &MemoryRestaurantStore,
        owner_id: i64,
        category_id: i64,
        name: &str,
    ) -> Restaurant {
        store
            .create(
                NewRestaurant {
                    name: name.to_string(),
                    address: "Avenida Reina Mercedes s/n".to_string(),
                    postal_code: "41012".to_string(),
                    restaurant_category_id: category_id,
                    ..Default::default()
                },
                owner_id,
            )
            .await
            .unwrap()
    }

    #[test]
    fn next_pinned_at_flips_between_null_and_now() {
        let now = Utc::now();
        let earlier = now - Duration::hours(3);

        assert_eq!(next_pinned_at(None, now), Some(now));
        assert_eq!(next_pinned_at(Some(earlier), now), None);
    }

    #[tokio::test]
    async fn toggle_twice_pins_then_unpins() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Burgers").await;
        let restaurant = seed(&store, 1, category.id, "100 Montaditos").await;
        let service = PinToggleService::new(&store);

        let before = Utc::now();
        let pinned = service.toggle_pin(restaurant.id).await.unwrap();
        let after = Utc::now();

        let pinned_at = pinned.pinned_at.expect("first toggle pins");
        assert!(pinned_at >= before && pinned_at <= after);
        assert_eq!(
            store.get_by_id(restaurant.id).await.unwrap().unwrap().pinned_at,
            Some(pinned_at)
        );

        let unpinned = service.toggle_pin(restaurant.id).await.unwrap();
        assert_eq!(unpinned.pinned_at, None);
        assert_eq!(
            store.get_by_id(restaurant.id).await.unwrap().unwrap().pinned_at,
            None
        );
    }

    #[tokio::test]
    async fn concurrent_toggles_do_not_lose_updates() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Burgers").await;
        let id = seed(&store, 1, category.id, "Goiko").await.id;

        let mut handles = Vec::new();
        for _ in 0..2 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                PinToggleService::new(&store).toggle_pin(id).await
            }));
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }

        // One toggle pinned, the other saw that commit and unpinned.
        assert_eq!(results.iter().filter(|r| r.pinned_at.is_some()).count(), 1);
        assert_eq!(
            store.get_by_id(id).await.unwrap().unwrap().pinned_at,
            None
        );
    }

    #[tokio::test]
    async fn even_number_of_concurrent_toggles_restores_state() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Burgers").await;
        let id = seed(&store, 1, category.id, "Goiko").await.id;

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { PinToggleService::new(&store).toggle_pin(id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(
            store.get_by_id(id).await.unwrap().unwrap().pinned_at,
            None
        );
    }

    #[tokio::test]
    async fn toggle_missing_restaurant_is_not_found_and_writes_nothing() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Burgers").await;
        seed(&store, 1, category.id, "Goiko").await;
        let snapshot = store.restaurants().await;

        let err = PinToggleService::new(&store).toggle_pin(999).await.unwrap_err();

        assert!(matches!(err, RestaurantError::NotFound(999)));
        assert_eq!(store.restaurants().await, snapshot);
    }

    #[tokio::test]
    async fn list_for_owner_puts_pinned_first_by_pin_time() {
        let store = MemoryRestaurantStore::new();
        let category = store.add_restaurant_category("Burgers").await;
        let a = seed(&store, 1, category.id, "A").await;
        let b = seed(&store, 1, category.id, "B").await;
        let c = seed(&store, 1, category.id, "C").await;
        let d = seed(&store, 1, category.id, "D").await;
        let other = seed(&store, 2, category.id, "Other").await;

        let now = Utc::now();
        store.set_pinned_at(c.id, Some(now - Duration::minutes(10))).await.unwrap();
        store.set_pinned_at(a.id, Some(now - Duration::minutes(5))).await.unwrap();
        store.set_pinned_at(other.id, Some(now - Duration::minutes(20))).await.unwrap();

        let listed = PinToggleService::new(&store).list_for_owner(1).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|r| r.restaurant.id).collect();

        assert_eq!(ids, vec![c.id, a.id, b.id, d.id]);
    }

    #[tokio::test]
    async fn list_public_orders_by_category_name() {
        let store = MemoryRestaurantStore::new();
        let pizza = store.add_restaurant_category("Pizza").await;
        let asian = store.add_restaurant_category("Asian").await;
        let first = seed(&store, 1, pizza.id, "Pizzeria").await;
        let second = seed(&store, 2, asian.id, "Wok").await;
        let third = seed(&store, 3, pizza.id, "Forno").await;

        let listed = PinToggleService::new(&store).list_public().await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|r| r.restaurant.id).collect();

        assert_eq!(ids, vec![second.id, first.id, third.id]);
    }
}
