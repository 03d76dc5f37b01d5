use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A stored restaurant row. `owner_id` never leaves the server; see `dtos::restaurant`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub postal_code: String,
    pub url: Option<String>,
    pub shipping_costs: f64,
    pub average_service_minutes: Option<f64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub hero_image: Option<String>,
    pub status: String,
    pub restaurant_category_id: i64,
    pub owner_id: i64,
    pub pinned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    pub fn is_pinned(&self) -> bool {
        self.pinned_at.is_some()
    }
}

pub const STATUSES: [&str; 4] = ["online", "offline", "closed", "temporarily closed"];
pub const DEFAULT_STATUS: &str = "offline";

/// Fields accepted when creating a restaurant. `pinned` only decides the initial `pinned_at`.
#[derive(Debug, Clone, Default)]
pub struct NewRestaurant {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub postal_code: String,
    pub url: Option<String>,
    pub shipping_costs: f64,
    pub average_service_minutes: Option<f64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub hero_image: Option<String>,
    pub status: Option<String>,
    pub restaurant_category_id: i64,
    pub pinned: bool,
}

/// Partial update. `None` leaves the column as it is; for nullable columns `Some(None)`
/// clears it. There is no `pinned_at` here.
#[derive(Debug, Clone, Default)]
pub struct RestaurantChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub url: Option<Option<String>>,
    pub shipping_costs: Option<f64>,
    pub average_service_minutes: Option<Option<f64>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub logo: Option<Option<String>>,
    pub hero_image: Option<Option<String>>,
    pub status: Option<String>,
    pub restaurant_category_id: Option<i64>,
}

impl RestaurantChanges {
    pub(crate) fn apply_to(self, restaurant: &mut Restaurant) {
        if let Some(name) = self.name {
            restaurant.name = name;
        }
        if let Some(description) = self.description {
            restaurant.description = description;
        }
        if let Some(address) = self.address {
            restaurant.address = address;
        }
        if let Some(postal_code) = self.postal_code {
            restaurant.postal_code = postal_code;
        }
        if let Some(url) = self.url {
            restaurant.url = url;
        }
        if let Some(shipping_costs) = self.shipping_costs {
            restaurant.shipping_costs = shipping_costs;
        }
        if let Some(minutes) = self.average_service_minutes {
            restaurant.average_service_minutes = minutes;
        }
        if let Some(email) = self.email {
            restaurant.email = email;
        }
        if let Some(phone) = self.phone {
            restaurant.phone = phone;
        }
        if let Some(logo) = self.logo {
            restaurant.logo = logo;
        }
        if let Some(hero_image) = self.hero_image {
            restaurant.hero_image = hero_image;
        }
        if let Some(status) = self.status {
            restaurant.status = status;
        }
        if let Some(category_id) = self.restaurant_category_id {
            restaurant.restaurant_category_id = category_id;
        }
    }
}
