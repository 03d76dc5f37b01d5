use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::product::ProductResponse;
use crate::models::category::RestaurantCategory;
use crate::models::restaurant::{NewRestaurant, Restaurant, RestaurantChanges};
use crate::repository::RestaurantWithCategory;

#[derive(Debug, Deserialize)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub postal_code: String,
    pub url: Option<String>,
    #[serde(default)]
    pub shipping_costs: f64,
    pub average_service_minutes: Option<f64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub hero_image: Option<String>,
    pub status: Option<String>,
    pub restaurant_category_id: i64,
    #[serde(default)]
    pub pinned: bool,
}

impl From<CreateRestaurantRequest> for NewRestaurant {
    fn from(req: CreateRestaurantRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            description: req.description,
            address: req.address.trim().to_string(),
            postal_code: req.postal_code.trim().to_string(),
            url: req.url,
            shipping_costs: req.shipping_costs,
            average_service_minutes: req.average_service_minutes,
            email: req.email,
            phone: req.phone,
            logo: req.logo,
            hero_image: req.hero_image,
            status: req.status,
            restaurant_category_id: req.restaurant_category_id,
            pinned: req.pinned,
        }
    }
}

// A present key becomes `Some`, so an explicit `null` is kept as `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update body. Pin fields are not accepted here; unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub url: Option<Option<String>>,
    pub shipping_costs: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub average_service_minutes: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub logo: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub hero_image: Option<Option<String>>,
    pub status: Option<String>,
    pub restaurant_category_id: Option<i64>,
}

impl From<UpdateRestaurantRequest> for RestaurantChanges {
    fn from(req: UpdateRestaurantRequest) -> Self {
        Self {
            name: req.name.map(|s| s.trim().to_string()),
            description: req.description,
            address: req.address.map(|s| s.trim().to_string()),
            postal_code: req.postal_code.map(|s| s.trim().to_string()),
            url: req.url,
            shipping_costs: req.shipping_costs,
            average_service_minutes: req.average_service_minutes,
            email: req.email,
            phone: req.phone,
            logo: req.logo,
            hero_image: req.hero_image,
            status: req.status,
            restaurant_category_id: req.restaurant_category_id,
        }
    }
}

/// Public shape of a restaurant. The owner identifier is not part of it.
#[derive(Debug, Serialize)]
pub struct RestaurantResponse {
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
    pub pinned: bool,
    pub pinned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Restaurant> for RestaurantResponse {
    fn from(r: Restaurant) -> Self {
        Self {
            pinned: r.is_pinned(),
            id: r.id,
            name: r.name,
            description: r.description,
            address: r.address,
            postal_code: r.postal_code,
            url: r.url,
            shipping_costs: r.shipping_costs,
            average_service_minutes: r.average_service_minutes,
            email: r.email,
            phone: r.phone,
            logo: r.logo,
            hero_image: r.hero_image,
            status: r.status,
            restaurant_category_id: r.restaurant_category_id,
            pinned_at: r.pinned_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RestaurantSummary {
    #[serde(flatten)]
    pub restaurant: RestaurantResponse,
    pub restaurant_category: RestaurantCategory,
}

impl From<RestaurantWithCategory> for RestaurantSummary {
    fn from(r: RestaurantWithCategory) -> Self {
        Self {
            restaurant: r.restaurant.into(),
            restaurant_category: r.restaurant_category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RestaurantDetailResponse {
    #[serde(flatten)]
    pub restaurant: RestaurantResponse,
    pub restaurant_category: RestaurantCategory,
    pub products: Vec<ProductResponse>,
}
