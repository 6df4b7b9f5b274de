//! SeaORM implementation of BookingRepository
//!
//! `insert` and `update` hold the repository write lock across the overlap
//! query and the write, both inside one transaction. Two callers racing for
//! the same slot are serialised: the loser sees the winner's row and gets
//! `AlreadyBooked`. Without the lock, SQLite answers the lost race with
//! "database is locked" and PostgreSQL under READ COMMITTED commits both.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{Booking, BookingRepository, DomainError, DomainResult, LifecycleTag};
use crate::infrastructure::database::entities::booking;
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
    /// Held from the overlap check until commit
    write_lock: Mutex<()>,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            write_lock: Mutex::new(()),
        }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    let attendee_count = u32::try_from(m.attendee_count).map_err(|_| {
        DomainError::Internal(format!(
            "booking {} has negative attendee_count {}",
            m.id, m.attendee_count
        ))
    })?;
    let tag = match m.tag.as_deref() {
        None => None,
        Some(raw) => Some(LifecycleTag::parse(raw).ok_or_else(|| {
            DomainError::Internal(format!("booking {} has unknown tag {raw}", m.id))
        })?),
    };

    Ok(Booking {
        id: m.id,
        code: m.code,
        start_time: m.start_time,
        attendee_count,
        finish_time: m.finish_time,
        created_at: m.created_at,
        member_id: m.member_id,
        room_id: m.room_id,
        tag,
    })
}

fn domain_to_active(b: &Booking) -> DomainResult<booking::ActiveModel> {
    let attendee_count = i32::try_from(b.attendee_count)
        .map_err(|_| DomainError::Validation("attendee_count is too large".into()))?;

    Ok(booking::ActiveModel {
        id: Set(b.id.clone()),
        code: Set(b.code.clone()),
        start_time: Set(b.start_time),
        finish_time: Set(b.finish_time),
        attendee_count: Set(attendee_count),
        created_at: Set(b.created_at),
        member_id: Set(b.member_id.clone()),
        room_id: Set(b.room_id.clone()),
        tag: Set(b.tag.map(|t| t.as_str().to_string())),
    })
}

fn models_to_domain(models: Vec<booking::Model>) -> DomainResult<Vec<Booking>> {
    models.into_iter().map(model_to_domain).collect()
}

fn not_cancelled() -> Condition {
    Condition::any()
        .add(booking::Column::Tag.is_null())
        .add(booking::Column::Tag.ne(LifecycleTag::Cancelled.as_str()))
}

fn overlap_filter(
    room_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_id: Option<&str>,
) -> Condition {
    let mut cond = Condition::all()
        .add(booking::Column::RoomId.eq(room_id))
        .add(booking::Column::StartTime.lt(end))
        .add(booking::Column::FinishTime.gt(start))
        .add(not_cancelled());
    if let Some(id) = exclude_id {
        cond = cond.add(booking::Column::Id.ne(id));
    }
    cond
}

async fn overlapping<C: ConnectionTrait>(
    conn: &C,
    room_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_id: Option<&str>,
) -> DomainResult<Vec<Booking>> {
    let models = booking::Entity::find()
        .filter(overlap_filter(room_id, start, end, exclude_id))
        .order_by_asc(booking::Column::StartTime)
        .all(conn)
        .await?;
    models_to_domain(models)
}

async fn ensure_free<C: ConnectionTrait>(conn: &C, b: &Booking) -> DomainResult<()> {
    let Some((start, end)) = b.interval() else {
        return Ok(());
    };
    let clash = overlapping(conn, &b.room_id, start, end, Some(&b.id)).await?;
    if let Some(other) = clash.first() {
        return Err(DomainError::AlreadyBooked(format!(
            "room {} is taken by booking {}",
            b.room_id, other.id
        )));
    }
    Ok(())
}

async fn page_of(
    db: &DatabaseConnection,
    query: Select<booking::Entity>,
    page: PaginationParams,
) -> DomainResult<PaginatedResult<Booking>> {
    let paginator = query
        .order_by_desc(booking::Column::StartTime)
        .order_by_asc(booking::Column::Id)
        .paginate(db, page.limit);

    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(page.page - 1).await?;
    Ok(PaginatedResult::new(
        models_to_domain(models)?,
        total,
        page.page,
        page.limit,
    ))
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        booking::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn insert(&self, b: &Booking) -> DomainResult<()> {
        debug!(booking_id = %b.id, room_id = %b.room_id, "Inserting booking");

        let model = domain_to_active(b)?;
        let _guard = self.write_lock.lock().await;
        let txn = self.db.begin().await?;
        ensure_free(&txn, b).await?;
        booking::Entity::insert(model)
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn update(&self, b: &Booking) -> DomainResult<()> {
        debug!(booking_id = %b.id, tag = ?b.tag, "Updating booking");

        let model = domain_to_active(b)?;
        let _guard = self.write_lock.lock().await;
        let txn = self.db.begin().await?;
        let existing = booking::Entity::find_by_id(b.id.clone()).one(&txn).await?;
        if existing.is_none() {
            return Err(DomainError::booking_not_found(&b.id));
        }
        ensure_free(&txn, b).await?;
        model.update(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn find_overlapping(
        &self,
        room_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> DomainResult<Vec<Booking>> {
        overlapping(&self.db, room_id, start, end, exclude_id).await
    }

    async fn find_starting_at(&self, start: DateTime<Utc>) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::StartTime.eq(start))
            .filter(not_cancelled())
            .all(&self.db)
            .await?;
        models_to_domain(models)
    }

    async fn list_for_member(
        &self,
        member_id: &str,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Booking>> {
        let query = booking::Entity::find().filter(booking::Column::MemberId.eq(member_id));
        page_of(&self.db, query, page).await
    }

    async fn list_all(&self, page: PaginationParams) -> DomainResult<PaginatedResult<Booking>> {
        page_of(&self.db, booking::Entity::find(), page).await
    }

    async fn list_for_room_between(
        &self,
        room_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::RoomId.eq(room_id))
            .filter(booking::Column::StartTime.gte(from))
            .filter(booking::Column::StartTime.lt(to))
            .order_by_asc(booking::Column::StartTime)
            .all(&self.db)
            .await?;
        models_to_domain(models)
    }
}
