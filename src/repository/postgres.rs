use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Error as SqlxError, FromRow, PgPool, Postgres, Transaction};

use super::{
    DeleteOutcome, RestaurantDetailRecord, RestaurantStore, RestaurantTx, RestaurantWithCategory,
    StoreError,
};
use crate::models::category::{ProductCategory, RestaurantCategory};
use crate::models::product::{Product, ProductWithCategory};
use crate::models::restaurant::{NewRestaurant, Restaurant, RestaurantChanges, DEFAULT_STATUS};

#[derive(FromRow)]
struct RestaurantCategoryRow {
    #[sqlx(flatten)]
    restaurant: Restaurant,
    category_name: String,
}

impl From<RestaurantCategoryRow> for RestaurantWithCategory {
    fn from(row: RestaurantCategoryRow) -> Self {
        let restaurant_category = RestaurantCategory {
            id: row.restaurant.restaurant_category_id,
            name: row.category_name,
        };
        Self {
            restaurant: row.restaurant,
            restaurant_category,
        }
    }
}

#[derive(FromRow)]
struct ProductCategoryRow {
    #[sqlx(flatten)]
    product: Product,
    product_category_name: String,
}

impl From<ProductCategoryRow> for ProductWithCategory {
    fn from(row: ProductCategoryRow) -> Self {
        let product_category = ProductCategory {
            id: row.product.product_category_id,
            name: row.product_category_name,
        };
        Self {
            product: row.product,
            product_category,
        }
    }
}

// Integrity violations (foreign key, unique, check) are reported as constraint errors.
fn map_constraint(err: SqlxError) -> StoreError {
    match err {
        SqlxError::Database(db_err)
            if matches!(db_err.code().as_deref(), Some("23503" | "23505" | "23514")) =>
        {
            StoreError::Constraint(db_err.message().to_string())
        }
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct PgRestaurantStore {
    pool: PgPool,
}

impl PgRestaurantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RestaurantStore for PgRestaurantStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Restaurant>, StoreError> {
        let restaurant = sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(restaurant)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<RestaurantWithCategory>, StoreError> {
        let rows = sqlx::query_as::<_, RestaurantCategoryRow>(
            "SELECT r.*, rc.name AS category_name
             FROM restaurants r
             JOIN restaurant_categories rc ON rc.id = r.restaurant_category_id
             WHERE r.owner_id = $1
             ORDER BY r.id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RestaurantWithCategory::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<RestaurantWithCategory>, StoreError> {
        let rows = sqlx::query_as::<_, RestaurantCategoryRow>(
            "SELECT r.*, rc.name AS category_name
             FROM restaurants r
             JOIN restaurant_categories rc ON rc.id = r.restaurant_category_id
             ORDER BY r.id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RestaurantWithCategory::from).collect())
    }

    async fn find_detail(&self, id: i64) -> Result<Option<RestaurantDetailRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let Some(row) = sqlx::query_as::<_, RestaurantCategoryRow>(
            "SELECT r.*, rc.name AS category_name
             FROM restaurants r
             JOIN restaurant_categories rc ON rc.id = r.restaurant_category_id
             WHERE r.id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        else {
            return Ok(None);
        };

        let products = sqlx::query_as::<_, ProductCategoryRow>(
            r#"SELECT p.id, p.name, p.description, p.price, p.image, p."order",
                      p.availability, p.restaurant_id, p.product_category_id,
                      pc.name AS product_category_name
               FROM products p
               JOIN product_categories pc ON pc.id = p.product_category_id
               WHERE p.restaurant_id = $1"#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        let RestaurantWithCategory {
            restaurant,
            restaurant_category,
        } = row.into();

        Ok(Some(RestaurantDetailRecord {
            restaurant,
            restaurant_category,
            products: products.into_iter().map(ProductWithCategory::from).collect(),
        }))
    }

    async fn create(&self, new: NewRestaurant, owner_id: i64) -> Result<Restaurant, StoreError> {
        let now = Utc::now();
        let pinned_at = new.pinned.then_some(now);

        sqlx::query_as::<_, Restaurant>(
            "INSERT INTO restaurants (
                name, description, address, postal_code, url, shipping_costs,
                average_service_minutes, email, phone, logo, hero_image, status,
                restaurant_category_id, owner_id, pinned_at, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
             RETURNING *",
        )
        .bind(new.name)
        .bind(new.description)
        .bind(new.address)
        .bind(new.postal_code)
        .bind(new.url)
        .bind(new.shipping_costs)
        .bind(new.average_service_minutes)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.logo)
        .bind(new.hero_image)
        .bind(new.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()))
        .bind(new.restaurant_category_id)
        .bind(owner_id)
        .bind(pinned_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_constraint)
    }

    async fn update_fields(
        &self,
        id: i64,
        changes: RestaurantChanges,
    ) -> Result<Option<Restaurant>, StoreError> {
        sqlx::query_as::<_, Restaurant>(
            "UPDATE restaurants SET
                name = COALESCE($1, name),
                description = CASE WHEN $2 THEN $3 ELSE description END,
                address = COALESCE($4, address),
                postal_code = COALESCE($5, postal_code),
                url = CASE WHEN $6 THEN $7 ELSE url END,
                shipping_costs = COALESCE($8, shipping_costs),
                average_service_minutes = CASE WHEN $9 THEN $10 ELSE average_service_minutes END,
                email = CASE WHEN $11 THEN $12 ELSE email END,
                phone = CASE WHEN $13 THEN $14 ELSE phone END,
                logo = CASE WHEN $15 THEN $16 ELSE logo END,
                hero_image = CASE WHEN $17 THEN $18 ELSE hero_image END,
                status = COALESCE($19, status),
                restaurant_category_id = COALESCE($20, restaurant_category_id),
                updated_at = NOW()
             WHERE id = $21
             RETURNING *",
        )
        .bind(changes.name)
        .bind(changes.description.is_some())
        .bind(changes.description.flatten())
        .bind(changes.address)
        .bind(changes.postal_code)
        .bind(changes.url.is_some())
        .bind(changes.url.flatten())
        .bind(changes.shipping_costs)
        .bind(changes.average_service_minutes.is_some())
        .bind(changes.average_service_minutes.flatten())
        .bind(changes.email.is_some())
        .bind(changes.email.flatten())
        .bind(changes.phone.is_some())
        .bind(changes.phone.flatten())
        .bind(changes.logo.is_some())
        .bind(changes.logo.flatten())
        .bind(changes.hero_image.is_some())
        .bind(changes.hero_image.flatten())
        .bind(changes.status)
        .bind(changes.restaurant_category_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_constraint)
    }

    async fn delete(&self, id: i64) -> Result<DeleteOutcome, StoreError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(if result.rows_affected() == 1 {
            DeleteOutcome::Removed
        } else {
            DeleteOutcome::NoneRemoved
        })
    }

    async fn begin(&self) -> Result<Box<dyn RestaurantTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgRestaurantTx { tx }))
    }
}

/// Wraps a sqlx transaction; sqlx rolls it back when dropped uncommitted.
pub struct PgRestaurantTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RestaurantTx for PgRestaurantTx {
    async fn get_by_id(&mut self, id: i64) -> Result<Option<Restaurant>, StoreError> {
        let restaurant =
            sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(restaurant)
    }

    async fn set_pinned_at(
        &mut self,
        id: i64,
        value: Option<DateTime<Utc>>,
    ) -> Result<Option<Restaurant>, StoreError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            "UPDATE restaurants SET pinned_at = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING *",
        )
        .bind(value)
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(restaurant)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
