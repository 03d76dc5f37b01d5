use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument};

use crate::dtos::restaurant::{
    CreateRestaurantRequest, RestaurantDetailResponse, RestaurantResponse, RestaurantSummary,
    UpdateRestaurantRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::repository::{DeleteOutcome, RestaurantStore};
use crate::services::{PinToggleService, RestaurantView};
use crate::state::AppState;

fn require_owner_role(auth: &AuthContext) -> Result<(), AppError> {
    if !auth.is_owner() {
        return Err(AppError::forbidden("Only restaurant owners can do this"));
    }
    Ok(())
}

// owner_id is immutable, so this check may run outside the pin transaction.
async fn require_ownership(
    store: &dyn RestaurantStore,
    auth: &AuthContext,
    id: i64,
) -> Result<(), AppError> {
    require_owner_role(auth)?;
    let restaurant = store
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant not found"))?;
    if restaurant.owner_id != auth.user_id {
        return Err(AppError::forbidden("Not enough privileges. This entity does not belong to you"));
    }
    Ok(())
}

// GET /restaurants - Public listing ordered by category name
#[instrument(skip(state))]
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantSummary>>, AppError> {
    let restaurants = PinToggleService::new(state.store.as_ref()).list_public().await?;
    Ok(Json(restaurants.into_iter().map(RestaurantSummary::from).collect()))
}

// GET /users/myrestaurants - Pinned first, then the rest
#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn list_my_restaurants(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<RestaurantSummary>>, AppError> {
    require_owner_role(&auth)?;
    let restaurants = PinToggleService::new(state.store.as_ref())
        .list_for_owner(auth.user_id)
        .await?;
    Ok(Json(restaurants.into_iter().map(RestaurantSummary::from).collect()))
}

// POST /restaurants - Create a restaurant owned by the caller
#[instrument(skip(state, auth, req), fields(user_id = auth.user_id))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<RestaurantResponse>), AppError> {
    require_owner_role(&auth)?;
    let restaurant = RestaurantView::new(state.store.as_ref())
        .create(req.into(), auth.user_id)
        .await?;
    info!(restaurant_id = restaurant.id, pinned = restaurant.pinned, "Restaurant created");
    Ok((StatusCode::CREATED, Json(restaurant)))
}

// GET /restaurants/{id} - Detail with products and categories
#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RestaurantDetailResponse>, AppError> {
    let detail = RestaurantView::new(state.store.as_ref()).get_detail(id).await?;
    Ok(Json(detail))
}

// PUT /restaurants/{id} - Partial update, returns the refreshed detail
#[instrument(skip(state, auth, req), fields(user_id = auth.user_id))]
pub async fn update_restaurant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRestaurantRequest>,
) -> Result<Json<RestaurantDetailResponse>, AppError> {
    require_ownership(state.store.as_ref(), &auth, id).await?;
    let detail = RestaurantView::new(state.store.as_ref())
        .update(id, req.into())
        .await?;
    Ok(Json(detail))
}

// DELETE /restaurants/{id}
#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<String>, AppError> {
    require_ownership(state.store.as_ref(), &auth, id).await?;
    let message = match RestaurantView::new(state.store.as_ref()).delete(id).await? {
        DeleteOutcome::Removed => format!("Successfully deleted restaurant id.{id}"),
        DeleteOutcome::NoneRemoved => "Could not delete restaurant.".to_string(),
    };
    Ok(Json(message))
}

// PATCH /restaurants/{id}/pin - Toggle the pin
#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn toggle_pin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<RestaurantResponse>, AppError> {
    require_ownership(state.store.as_ref(), &auth, id).await?;
    let restaurant = PinToggleService::new(state.store.as_ref())
        .toggle_pin(id)
        .await?;
    Ok(Json(restaurant.into()))
}
