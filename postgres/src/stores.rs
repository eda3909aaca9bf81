//! `PgStores`: the production implementation of the Carebook store traits.

use carebook_core::error::StoreError;
use carebook_core::store::{BookingStore, ProviderStore, SlotStore, StoreFuture};
use carebook_core::types::{
    Booking, BookingId, BookingStatus, Provider, ProviderId, SessionKind, Slot, SlotId,
    SlotStatus, UserId,
};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// `PostgreSQL`-backed implementation of all three store traits.
///
/// Wraps one connection pool; cheap to clone.
#[derive(Clone)]
pub struct PgStores {
    pool: PgPool,
}

impl PgStores {
    /// Create stores over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a new pool and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(db_err)?;
        Ok(Self::new(pool))
    }

    /// Run the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Cheap connectivity check for readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the round trip fails.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Access the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn row_to_slot(row: &sqlx::postgres::PgRow) -> Result<Slot, StoreError> {
    let kind: String = row.try_get("kind").map_err(db_err)?;
    let status: String = row.try_get("status").map_err(db_err)?;
    let booked_by: Option<String> = row.try_get("booked_by").map_err(db_err)?;

    Ok(Slot {
        id: SlotId::from_uuid(row.try_get("id").map_err(db_err)?),
        provider_id: ProviderId::from_uuid(row.try_get("provider_id").map_err(db_err)?),
        start_at: row.try_get("start_at").map_err(db_err)?,
        end_at: row.try_get("end_at").map_err(db_err)?,
        kind: SessionKind::parse(&kind)?,
        status: SlotStatus::parse(&status)?,
        booked_by: booked_by.and_then(UserId::new),
        booked_at: row.try_get("booked_at").map_err(db_err)?,
    })
}

fn row_to_booking(row: &sqlx::postgres::PgRow) -> Result<Booking, StoreError> {
    let kind: String = row.try_get("kind").map_err(db_err)?;
    let status: String = row.try_get("status").map_err(db_err)?;
    let user_id: String = row.try_get("user_id").map_err(db_err)?;

    Ok(Booking {
        id: BookingId::from_uuid(row.try_get("id").map_err(db_err)?),
        user_id: UserId::new(user_id)
            .ok_or_else(|| StoreError::Database("empty user_id in bookings row".to_string()))?,
        provider_id: ProviderId::from_uuid(row.try_get("provider_id").map_err(db_err)?),
        slot_id: SlotId::from_uuid(row.try_get("slot_id").map_err(db_err)?),
        start_at: row.try_get("start_at").map_err(db_err)?,
        end_at: row.try_get("end_at").map_err(db_err)?,
        kind: SessionKind::parse(&kind)?,
        status: BookingStatus::parse(&status)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn row_to_provider(row: &sqlx::postgres::PgRow) -> Result<Provider, StoreError> {
    Ok(Provider {
        id: ProviderId::from_uuid(row.try_get("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        title: row.try_get("title").map_err(db_err)?,
        category: row.try_get("category").map_err(db_err)?,
        specialties: row.try_get("specialties").map_err(db_err)?,
        experience_years: row.try_get("experience_years").map_err(db_err)?,
        rating: row.try_get("rating").map_err(db_err)?,
        review_count: row.try_get("review_count").map_err(db_err)?,
        fee: row.try_get("fee").map_err(db_err)?,
        languages: row.try_get("languages").map_err(db_err)?,
        bio: row.try_get("bio").map_err(db_err)?,
        education: row.try_get("education").map_err(db_err)?,
        current_work: row.try_get("current_work").map_err(db_err)?,
        image: row.try_get("image").map_err(db_err)?,
        verified: row.try_get("verified").map_err(db_err)?,
    })
}

impl SlotStore for PgStores {
    fn insert_if_absent(&self, slot: Slot) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                INSERT INTO slots (id, provider_id, start_at, end_at, kind, status, booked_by, booked_at)
                VALUES ($1, $2, $3, $4, $5, $6, NULL, NULL)
                ON CONFLICT (provider_id, start_at) DO NOTHING
                ",
            )
            .bind(*slot.id.as_uuid())
            .bind(*slot.provider_id.as_uuid())
            .bind(slot.start_at)
            .bind(slot.end_at)
            .bind(slot.kind.as_str())
            .bind(slot.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

            Ok(result.rows_affected() == 1)
        })
    }

    fn count_in_window(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let (count,): (i64,) = sqlx::query_as(
                r"
                SELECT COUNT(*)
                FROM slots
                WHERE start_at >= $1 AND start_at < $2
                ",
            )
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

            // COUNT(*) is never negative
            #[allow(clippy::cast_sign_loss)]
            let count = count as u64;
            Ok(count)
        })
    }

    fn available_for_provider(
        &self,
        provider_id: ProviderId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreFuture<'_, Vec<Slot>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT id, provider_id, start_at, end_at, kind, status, booked_by, booked_at
                FROM slots
                WHERE provider_id = $1 AND status = 'available'
                  AND start_at >= $2 AND start_at < $3
                ORDER BY start_at ASC
                ",
            )
            .bind(*provider_id.as_uuid())
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            rows.iter().map(row_to_slot).collect()
        })
    }

    fn claim(
        &self,
        slot_id: SlotId,
        provider_id: ProviderId,
        user_id: UserId,
        kind: SessionKind,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Option<Slot>> {
        Box::pin(async move {
            // The entire claim decision and mutation is this one statement;
            // concurrent claimers are serialized by the row lock and at most
            // one matches status = 'available'.
            let row = sqlx::query(
                r"
                UPDATE slots
                SET status = 'booked', booked_by = $3, booked_at = $4, kind = $5
                WHERE id = $1 AND provider_id = $2 AND status = 'available'
                RETURNING id, provider_id, start_at, end_at, kind, status, booked_by, booked_at
                ",
            )
            .bind(*slot_id.as_uuid())
            .bind(*provider_id.as_uuid())
            .bind(user_id.as_str())
            .bind(now)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

            match row {
                Some(row) => {
                    metrics::counter!("carebook.slots.claimed").increment(1);
                    tracing::debug!(%slot_id, %provider_id, "slot claimed");
                    Ok(Some(row_to_slot(&row)?))
                }
                None => Ok(None),
            }
        })
    }

    fn release_claim(&self, slot_id: SlotId, user_id: UserId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                UPDATE slots
                SET status = 'available', booked_by = NULL, booked_at = NULL
                WHERE id = $1 AND status = 'booked' AND booked_by = $2
                ",
            )
            .bind(*slot_id.as_uuid())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

            let released = result.rows_affected() == 1;
            if released {
                metrics::counter!("carebook.slots.released").increment(1);
                tracing::debug!(%slot_id, "slot claim released");
            }
            Ok(released)
        })
    }

    fn get(&self, slot_id: SlotId) -> StoreFuture<'_, Option<Slot>> {
        Box::pin(async move {
            let row = sqlx::query(
                r"
                SELECT id, provider_id, start_at, end_at, kind, status, booked_by, booked_at
                FROM slots
                WHERE id = $1
                ",
            )
            .bind(*slot_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

            row.as_ref().map(row_to_slot).transpose()
        })
    }
}

impl BookingStore for PgStores {
    fn insert(&self, booking: Booking) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                INSERT INTO bookings (id, user_id, provider_id, slot_id, start_at, end_at, kind, status, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(*booking.id.as_uuid())
            .bind(booking.user_id.as_str())
            .bind(*booking.provider_id.as_uuid())
            .bind(*booking.slot_id.as_uuid())
            .bind(booking.start_at)
            .bind(booking.end_at)
            .bind(booking.kind.as_str())
            .bind(booking.status.as_str())
            .bind(booking.created_at)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => Ok(()),
                Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                    Err(StoreError::DuplicateBooking {
                        slot_id: booking.slot_id,
                    })
                }
                Err(e) => Err(db_err(e)),
            }
        })
    }

    fn booked_for_user(&self, user_id: UserId, limit: u32) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT id, user_id, provider_id, slot_id, start_at, end_at, kind, status, created_at
                FROM bookings
                WHERE user_id = $1 AND status = 'booked'
                ORDER BY start_at ASC
                LIMIT $2
                ",
            )
            .bind(user_id.as_str())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            rows.iter().map(row_to_booking).collect()
        })
    }
}

impl ProviderStore for PgStores {
    fn insert_if_absent(&self, provider: Provider) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                INSERT INTO providers (
                    id, name, title, category, specialties, experience_years,
                    rating, review_count, fee, languages, bio, education,
                    current_work, image, verified
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                ON CONFLICT (name) DO NOTHING
                ",
            )
            .bind(*provider.id.as_uuid())
            .bind(&provider.name)
            .bind(&provider.title)
            .bind(&provider.category)
            .bind(&provider.specialties)
            .bind(provider.experience_years)
            .bind(provider.rating)
            .bind(provider.review_count)
            .bind(provider.fee)
            .bind(&provider.languages)
            .bind(&provider.bio)
            .bind(&provider.education)
            .bind(&provider.current_work)
            .bind(&provider.image)
            .bind(provider.verified)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

            Ok(result.rows_affected() == 1)
        })
    }

    fn count(&self) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM providers")
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;

            // COUNT(*) is never negative
            #[allow(clippy::cast_sign_loss)]
            let count = count as u64;
            Ok(count)
        })
    }

    fn list(&self, category: Option<String>) -> StoreFuture<'_, Vec<Provider>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT id, name, title, category, specialties, experience_years,
                       rating, review_count, fee, languages, bio, education,
                       current_work, image, verified
                FROM providers
                WHERE $1::TEXT IS NULL OR category = $1
                ORDER BY name ASC
                ",
            )
            .bind(category)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            rows.iter().map(row_to_provider).collect()
        })
    }

    fn get(&self, id: ProviderId) -> StoreFuture<'_, Option<Provider>> {
        Box::pin(async move {
            let row = sqlx::query(
                r"
                SELECT id, name, title, category, specialties, experience_years,
                       rating, review_count, fee, languages, bio, education,
                       current_work, image, verified
                FROM providers
                WHERE id = $1
                ",
            )
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

            row.as_ref().map(row_to_provider).transpose()
        })
    }

    fn get_many(&self, ids: Vec<ProviderId>) -> StoreFuture<'_, Vec<Provider>> {
        Box::pin(async move {
            let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
            let rows = sqlx::query(
                r"
                SELECT id, name, title, category, specialties, experience_years,
                       rating, review_count, fee, languages, bio, education,
                       current_work, image, verified
                FROM providers
                WHERE id = ANY($1)
                ",
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            rows.iter().map(row_to_provider).collect()
        })
    }
}
