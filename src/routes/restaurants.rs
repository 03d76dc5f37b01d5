use axum::{
    routing::{get, patch, post, put},
    Router, middleware,
};
use crate::state::AppState;
use crate::handlers::restaurant::{
    create_restaurant, delete_restaurant, get_restaurant, list_my_restaurants, list_restaurants,
    toggle_pin, update_restaurant,
};
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    // Listing and detail are public
    let open_routes = Router::new()
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/{id}", get(get_restaurant));

    // Owners manage their own restaurants
    let protected_routes = Router::new()
        .route("/restaurants", post(create_restaurant))
        .route("/restaurants/{id}", put(update_restaurant).delete(delete_restaurant))
        .route("/restaurants/{id}/pin", patch(toggle_pin))
        .route("/users/myrestaurants", get(list_my_restaurants))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    open_routes.merge(protected_routes)
}
