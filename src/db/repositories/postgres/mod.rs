//! Postgres repository implementation using Diesel.
//!
//! Reads and writes the legacy LIVIO tables (`apartments_apartmentpost`,
//! `users_user`, `apartments_favoriteapartment`) and owns two tables of its
//! own (`api_university`, `api_listing_image`) whose migrations are embedded
//! and run at startup. The legacy tables are never migrated from here.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution (owned tables only)
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL`: Connection string (preferred)
//! - `DB_HOST`/`DB_PORT`/`DB_NAME`/`DB_USER`/`DB_PASSWORD`: discrete parts,
//!   composed into a Postgres URL when `DATABASE_URL` is absent
//! - `DB_ENGINE`: accepted for compatibility; only "postgres" is valid
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::collections::HashMap;
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    ErrorContext, FavoriteRepository, ImageRepository, ListingRepository, RepositoryError,
    RepositoryResult, UniversityRepository, UserRepository,
};
use crate::models::{
    Favorite, Listing, ListingImage, ListingUpdate, NewListing, NewUniversity, University, User,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// Accepts either `DATABASE_URL` or the discrete `DB_*` variables the
    /// previous deployment used (`DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`,
    /// `DB_PASSWORD`), composing them into a Postgres URL.
    pub fn from_env() -> Result<Self, String> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => Self::url_from_parts()?,
        };

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("PG_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            max_retries,
            retry_delay_ms,
        })
    }

    fn url_from_parts() -> Result<String, String> {
        if let Ok(engine) = std::env::var("DB_ENGINE") {
            if !matches!(engine.as_str(), "postgres" | "postgresql") {
                return Err(format!("Unsupported DB_ENGINE '{}': only postgres is supported", engine));
            }
        }
        let host = std::env::var("DB_HOST")
            .map_err(|_| "DATABASE_URL or DB_HOST must be set".to_string())?;
        let port = std::env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let name = std::env::var("DB_NAME").map_err(|_| "DB_NAME must be set".to_string())?;
        let user = std::env::var("DB_USER").map_err(|_| "DB_USER must be set".to_string())?;
        let password = std::env::var("DB_PASSWORD").unwrap_or_default();
        Ok(format!(
            "postgres://{}:{}@{}:{}/{}",
            user, password, host, port, name
        ))
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations for the owned
    /// tables.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        Ok(())
    }

    /// Execute a database operation with automatic retry for transient
    /// failures.
    ///
    /// Retries up to `max_retries` times when a retryable error occurs
    /// (connection errors, serialization failures), with exponential
    /// backoff between attempts.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error
                .unwrap_or_else(|| RepositoryError::internal("Max retries exceeded with no error captured")))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

#[async_trait]
impl ListingRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let result = self
            .with_conn(|conn| {
                sql_query("SELECT 1").execute(conn)?;
                Ok(())
            })
            .await;
        match result {
            Ok(()) => Ok(true),
            Err(RepositoryError::ConnectionError { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_active_listings(&self) -> RepositoryResult<Vec<Listing>> {
        self.with_conn(|conn| {
            let rows = apartments_apartmentpost::table
                .filter(apartments_apartmentpost::is_active.eq(true))
                .filter(apartments_apartmentpost::latitude.is_not_null())
                .filter(apartments_apartmentpost::longitude.is_not_null())
                .order(apartments_apartmentpost::created_at.desc())
                .select(ListingRow::as_select())
                .load::<ListingRow>(conn)?;
            Ok(rows.into_iter().map(Listing::from).collect())
        })
        .await
    }

    async fn get_listing(&self, id: i64) -> RepositoryResult<Listing> {
        self.with_conn(move |conn| {
            let row = apartments_apartmentpost::table
                .find(id)
                .select(ListingRow::as_select())
                .first::<ListingRow>(conn)
                .optional()?
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("Listing {} not found", id),
                        ErrorContext::new("get_listing")
                            .with_entity("listing")
                            .with_entity_id(id),
                    )
                })?;
            Ok(Listing::from(row))
        })
        .await
    }

    async fn create_listing(&self, new: NewListing) -> RepositoryResult<Listing> {
        self.with_conn(move |conn| {
            let row = diesel::insert_into(apartments_apartmentpost::table)
                .values(NewListingRow::from(new.clone()))
                .returning(ListingRow::as_returning())
                .get_result::<ListingRow>(conn)?;
            Ok(Listing::from(row))
        })
        .await
    }

    async fn update_listing(&self, id: i64, update: ListingUpdate) -> RepositoryResult<Listing> {
        if update.is_empty() {
            return self.get_listing(id).await;
        }
        self.with_conn(move |conn| {
            let row = diesel::update(apartments_apartmentpost::table.find(id))
                .set(ListingChangeset::from(update.clone()))
                .returning(ListingRow::as_returning())
                .get_result::<ListingRow>(conn)
                .optional()?
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("Listing {} not found", id),
                        ErrorContext::new("update_listing")
                            .with_entity("listing")
                            .with_entity_id(id),
                    )
                })?;
            Ok(Listing::from(row))
        })
        .await
    }

    async fn soft_delete_listing(&self, id: i64) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let affected = diesel::update(apartments_apartmentpost::table.find(id))
                .set((
                    apartments_apartmentpost::is_active.eq(false),
                    apartments_apartmentpost::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            if affected == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Listing {} not found", id),
                    ErrorContext::new("soft_delete_listing")
                        .with_entity("listing")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn list_listings_by_owner(&self, owner_id: i64) -> RepositoryResult<Vec<Listing>> {
        self.with_conn(move |conn| {
            let rows = apartments_apartmentpost::table
                .filter(apartments_apartmentpost::owner_id.eq(owner_id))
                .order(apartments_apartmentpost::created_at.desc())
                .select(ListingRow::as_select())
                .load::<ListingRow>(conn)?;
            Ok(rows.into_iter().map(Listing::from).collect())
        })
        .await
    }

    async fn listing_exists(&self, id: i64) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            let found: bool =
                diesel::select(exists(apartments_apartmentpost::table.find(id)))
                    .get_result(conn)?;
            Ok(found)
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn get_user(&self, id: i64) -> RepositoryResult<Option<User>> {
        self.with_conn(move |conn| {
            let row = users_user::table
                .find(id)
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()?;
            Ok(row.map(User::from))
        })
        .await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> RepositoryResult<HashMap<i64, User>> {
        let ids = ids.to_vec();
        self.with_conn(move |conn| {
            let rows = users_user::table
                .filter(users_user::id.eq_any(ids.clone()))
                .select(UserRow::as_select())
                .load::<UserRow>(conn)?;
            Ok(rows
                .into_iter()
                .map(|row| (row.id, User::from(row)))
                .collect())
        })
        .await
    }
}

#[async_trait]
impl UniversityRepository for PostgresRepository {
    async fn list_universities(&self) -> RepositoryResult<Vec<University>> {
        self.with_conn(|conn| {
            let rows = api_university::table
                .filter(api_university::is_active.eq(true))
                .order(api_university::name.asc())
                .select(UniversityRow::as_select())
                .load::<UniversityRow>(conn)?;
            Ok(rows.into_iter().map(University::from).collect())
        })
        .await
    }

    async fn create_university(
        &self,
        new: NewUniversity,
    ) -> RepositoryResult<Option<University>> {
        self.with_conn(move |conn| {
            let row = diesel::insert_into(api_university::table)
                .values(NewUniversityRow::from(new.clone()))
                .on_conflict(api_university::name)
                .do_nothing()
                .returning(UniversityRow::as_returning())
                .get_result::<UniversityRow>(conn)
                .optional()?;
            Ok(row.map(University::from))
        })
        .await
    }
}

#[async_trait]
impl FavoriteRepository for PostgresRepository {
    async fn list_favorites(&self, user_id: i64) -> RepositoryResult<Vec<Favorite>> {
        self.with_conn(move |conn| {
            let rows = apartments_favoriteapartment::table
                .filter(apartments_favoriteapartment::user_id.eq(user_id))
                .order(apartments_favoriteapartment::created_at.desc())
                .select(FavoriteRow::as_select())
                .load::<FavoriteRow>(conn)?;
            Ok(rows.into_iter().map(Favorite::from).collect())
        })
        .await
    }

    async fn create_favorite(&self, user_id: i64, listing_id: i64) -> RepositoryResult<Favorite> {
        self.with_conn(move |conn| {
            let listing_present: bool =
                diesel::select(exists(apartments_apartmentpost::table.find(listing_id)))
                    .get_result(conn)?;
            if !listing_present {
                return Err(RepositoryError::validation_with_context(
                    "Listing does not exist",
                    ErrorContext::new("create_favorite")
                        .with_entity("listing")
                        .with_entity_id(listing_id),
                ));
            }

            let already: bool = diesel::select(exists(
                apartments_favoriteapartment::table
                    .filter(apartments_favoriteapartment::user_id.eq(user_id))
                    .filter(apartments_favoriteapartment::apartment_id.eq(listing_id)),
            ))
            .get_result(conn)?;
            if already {
                return Err(RepositoryError::validation_with_context(
                    "Already in favorites",
                    ErrorContext::new("create_favorite")
                        .with_entity("favorite")
                        .with_details(format!("user_id={}, listing_id={}", user_id, listing_id)),
                ));
            }

            // The unique (user_id, apartment_id) constraint still backstops a
            // concurrent duplicate; the From impl maps it to ValidationError.
            let row = diesel::insert_into(apartments_favoriteapartment::table)
                .values(NewFavoriteRow {
                    user_id,
                    apartment_id: listing_id,
                    created_at: Utc::now(),
                })
                .returning(FavoriteRow::as_returning())
                .get_result::<FavoriteRow>(conn)?;
            Ok(Favorite::from(row))
        })
        .await
    }

    async fn delete_favorite(&self, id: i64) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let affected =
                diesel::delete(apartments_favoriteapartment::table.find(id)).execute(conn)?;
            if affected == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Favorite {} not found", id),
                    ErrorContext::new("delete_favorite")
                        .with_entity("favorite")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn favorite_exists(&self, user_id: i64, listing_id: i64) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            let found: bool = diesel::select(exists(
                apartments_favoriteapartment::table
                    .filter(apartments_favoriteapartment::user_id.eq(user_id))
                    .filter(apartments_favoriteapartment::apartment_id.eq(listing_id)),
            ))
            .get_result(conn)?;
            Ok(found)
        })
        .await
    }
}

#[async_trait]
impl ImageRepository for PostgresRepository {
    async fn list_images(&self, listing_id: i64) -> RepositoryResult<Vec<ListingImage>> {
        self.with_conn(move |conn| {
            let rows = api_listing_image::table
                .filter(api_listing_image::listing_id.eq(listing_id))
                .order((
                    api_listing_image::sort_order.asc(),
                    api_listing_image::created_at.asc(),
                ))
                .select(ImageRow::as_select())
                .load::<ImageRow>(conn)?;
            Ok(rows.into_iter().map(ListingImage::from).collect())
        })
        .await
    }

    async fn list_images_for_listings(
        &self,
        listing_ids: &[i64],
    ) -> RepositoryResult<HashMap<i64, Vec<ListingImage>>> {
        let listing_ids = listing_ids.to_vec();
        self.with_conn(move |conn| {
            let rows = api_listing_image::table
                .filter(api_listing_image::listing_id.eq_any(listing_ids.clone()))
                .order((
                    api_listing_image::sort_order.asc(),
                    api_listing_image::created_at.asc(),
                ))
                .select(ImageRow::as_select())
                .load::<ImageRow>(conn)?;
            let mut grouped: HashMap<i64, Vec<ListingImage>> = HashMap::new();
            for row in rows {
                grouped
                    .entry(row.listing_id)
                    .or_default()
                    .push(ListingImage::from(row));
            }
            Ok(grouped)
        })
        .await
    }

    async fn get_image(&self, id: i64) -> RepositoryResult<ListingImage> {
        self.with_conn(move |conn| {
            let row = api_listing_image::table
                .find(id)
                .select(ImageRow::as_select())
                .first::<ImageRow>(conn)
                .optional()?
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("Image {} not found", id),
                        ErrorContext::new("get_image")
                            .with_entity("image")
                            .with_entity_id(id),
                    )
                })?;
            Ok(ListingImage::from(row))
        })
        .await
    }

    async fn create_image(
        &self,
        listing_id: i64,
        image_url: String,
        label: Option<String>,
    ) -> RepositoryResult<ListingImage> {
        self.with_conn(move |conn| {
            // Order = count of existing images for the listing at insert
            // time. Gaps from deletions are not reused by renumbering, but a
            // later insert may land on a freed value; both match the legacy
            // behavior.
            let current: i64 = api_listing_image::table
                .filter(api_listing_image::listing_id.eq(listing_id))
                .count()
                .get_result(conn)?;
            let row = diesel::insert_into(api_listing_image::table)
                .values(NewImageRow {
                    listing_id,
                    image_url: image_url.clone(),
                    label: label.clone(),
                    sort_order: current as i32,
                })
                .returning(ImageRow::as_returning())
                .get_result::<ImageRow>(conn)?;
            Ok(ListingImage::from(row))
        })
        .await
    }

    async fn delete_image(&self, id: i64) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let affected = diesel::delete(api_listing_image::table.find(id)).execute(conn)?;
            if affected == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Image {} not found", id),
                    ErrorContext::new("delete_image")
                        .with_entity("image")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}
