use anyhow::{Context as _, anyhow};
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, SqlErr,
    sea_query::{Expr, OnConflict},
};

use reserva_bookings_schema::{bookings, customers, feedback_sessions, notification_log};
use reserva_domain::booking::{BookingStatus, MessageKind};
use reserva_domain::id::{BookingCode, ChannelId};
use reserva_domain::phone::CanonicalPhone;
use reserva_domain::rating::Rating;

use crate::domain::repository::{
    BookingRepository, CustomerRepository, FeedbackSessionRepository, NotificationLogRepository,
};
use crate::domain::types::{
    Booking, Customer, FeedbackSession, LinkWrite, NewBooking, NotificationLogEntry,
};
use crate::error::BookingsServiceError;

/// PostgreSQL-backed record store.
#[derive(Clone)]
pub struct DbBookingStore {
    pub db: DatabaseConnection,
}

impl DbBookingStore {
    pub async fn ping(&self) -> bool {
        self.db.ping().await.is_ok()
    }
}

// ── Customer repository ──────────────────────────────────────────────────────

impl CustomerRepository for DbBookingStore {
    async fn ensure(&self, channel_id: ChannelId) -> Result<Customer, BookingsServiceError> {
        customers::Entity::insert(customers::ActiveModel {
            channel_id: Set(channel_id.0),
            phone: Set(None),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(customers::Column::ChannelId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("insert customer")?;
        self.find_by_channel(channel_id)
            .await?
            .ok_or_else(|| anyhow!("customer {channel_id} missing after insert").into())
    }

    async fn find_by_channel(
        &self,
        channel_id: ChannelId,
    ) -> Result<Option<Customer>, BookingsServiceError> {
        let model = customers::Entity::find_by_id(channel_id.0)
            .one(&self.db)
            .await
            .context("find customer by channel id")?;
        Ok(model.map(customer_from_model))
    }

    async fn find_by_phone(
        &self,
        phone: &CanonicalPhone,
    ) -> Result<Option<Customer>, BookingsServiceError> {
        let model = customers::Entity::find()
            .filter(customers::Column::Phone.eq(phone.as_str()))
            .one(&self.db)
            .await
            .context("find customer by phone")?;
        Ok(model.map(customer_from_model))
    }

    async fn update_phone(
        &self,
        channel_id: ChannelId,
        phone: &CanonicalPhone,
    ) -> Result<(), BookingsServiceError> {
        let result = customers::Entity::update_many()
            .col_expr(customers::Column::Phone, Expr::value(phone.as_str()))
            .filter(customers::Column::ChannelId.eq(channel_id.0))
            .exec(&self.db)
            .await;
        match result {
            Ok(res) if res.rows_affected == 0 => Err(BookingsServiceError::CustomerNotFound),
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(BookingsServiceError::PhoneTaken),
            Err(e) => Err(anyhow::Error::new(e).context("update customer phone").into()),
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn customer_from_model(model: customers::Model) -> Customer {
    Customer {
        channel_id: ChannelId(model.channel_id),
        phone: model.phone.map(CanonicalPhone::from_canonical),
        created_at: model.created_at,
    }
}

// ── Booking repository ───────────────────────────────────────────────────────

impl BookingRepository for DbBookingStore {
    async fn upsert_by_code(
        &self,
        booking: &NewBooking,
    ) -> Result<(Booking, bool), BookingsServiceError> {
        let now = Utc::now();
        let rows = bookings::Entity::insert(bookings::ActiveModel {
            code: Set(booking.code.as_str().to_owned()),
            customer_id: Set(None),
            service: Set(booking.service.clone()),
            client_name: Set(booking.client_name.clone()),
            client_phone: Set(booking.client_phone.as_ref().map(|p| p.as_str().to_owned())),
            starts_at: Set(booking.starts_at),
            duration_minutes: Set(booking.duration_minutes),
            status: Set(booking.status.as_str().to_owned()),
            rating: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .on_conflict(
            OnConflict::column(bookings::Column::Code)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("upsert booking")?;
        let stored = self
            .get_by_code(&booking.code)
            .await?
            .ok_or_else(|| anyhow!("booking {} missing after upsert", booking.code))?;
        Ok((stored, rows > 0))
    }

    async fn get_by_code(
        &self,
        code: &BookingCode,
    ) -> Result<Option<Booking>, BookingsServiceError> {
        let model = bookings::Entity::find_by_id(code.as_str())
            .one(&self.db)
            .await
            .context("find booking by code")?;
        Ok(model.map(booking_from_model).transpose()?)
    }

    async fn update_status(
        &self,
        code: &BookingCode,
        to: BookingStatus,
    ) -> Result<bool, BookingsServiceError> {
        let res = bookings::Entity::update_many()
            .col_expr(bookings::Column::Status, Expr::value(to.as_str()))
            .col_expr(bookings::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(bookings::Column::Code.eq(code.as_str()))
            .filter(bookings::Column::Status.eq(BookingStatus::Active.as_str()))
            .exec(&self.db)
            .await
            .context("update booking status")?;
        Ok(res.rows_affected > 0)
    }

    async fn link_to_customer(
        &self,
        code: &BookingCode,
        customer: ChannelId,
    ) -> Result<LinkWrite, BookingsServiceError> {
        let res = bookings::Entity::update_many()
            .col_expr(bookings::Column::CustomerId, Expr::value(customer.0))
            .col_expr(bookings::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(bookings::Column::Code.eq(code.as_str()))
            .filter(bookings::Column::CustomerId.is_null())
            .exec(&self.db)
            .await
            .context("link booking to customer")?;
        if res.rows_affected > 0 {
            return Ok(LinkWrite::Linked);
        }
        match self.get_by_code(code).await? {
            None => Ok(LinkWrite::Missing),
            Some(Booking {
                customer_id: Some(owner),
                ..
            }) => Ok(LinkWrite::Existing(owner)),
            Some(_) => Err(anyhow!("link of booking {code} was not applied").into()),
        }
    }

    async fn set_rating(
        &self,
        code: &BookingCode,
        rating: Rating,
    ) -> Result<bool, BookingsServiceError> {
        let res = bookings::Entity::update_many()
            .col_expr(bookings::Column::Rating, Expr::value(i16::from(rating.value())))
            .col_expr(bookings::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(bookings::Column::Code.eq(code.as_str()))
            .filter(bookings::Column::Rating.is_null())
            .exec(&self.db)
            .await
            .context("set booking rating")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_by_customer(
        &self,
        customer: ChannelId,
        active_only: bool,
    ) -> Result<Vec<Booking>, BookingsServiceError> {
        let mut query =
            bookings::Entity::find().filter(bookings::Column::CustomerId.eq(customer.0));
        if active_only {
            query = query.filter(bookings::Column::Status.eq(BookingStatus::Active.as_str()));
        }
        let models = query
            .order_by_asc(bookings::Column::StartsAt)
            .all(&self.db)
            .await
            .context("list bookings by customer")?;
        bookings_from_models(models)
    }

    async fn list_unlinked_by_phone(
        &self,
        phone: &CanonicalPhone,
    ) -> Result<Vec<Booking>, BookingsServiceError> {
        let models = bookings::Entity::find()
            .filter(bookings::Column::ClientPhone.eq(phone.as_str()))
            .filter(bookings::Column::CustomerId.is_null())
            .filter(bookings::Column::Status.eq(BookingStatus::Active.as_str()))
            .order_by_asc(bookings::Column::StartsAt)
            .all(&self.db)
            .await
            .context("list unlinked bookings by phone")?;
        bookings_from_models(models)
    }

    async fn list_schedulable(&self) -> Result<Vec<Booking>, BookingsServiceError> {
        let models = bookings::Entity::find()
            .filter(bookings::Column::Status.eq(BookingStatus::Active.as_str()))
            .filter(bookings::Column::CustomerId.is_not_null())
            .order_by_asc(bookings::Column::StartsAt)
            .all(&self.db)
            .await
            .context("list schedulable bookings")?;
        bookings_from_models(models)
    }
}

fn booking_from_model(model: bookings::Model) -> anyhow::Result<Booking> {
    let code = BookingCode::new(&model.code).ok_or_else(|| anyhow!("blank booking code"))?;
    let status = BookingStatus::from_str_opt(&model.status)
        .ok_or_else(|| anyhow!("booking {code} has unknown status {:?}", model.status))?;
    let rating = model
        .rating
        .map(|r| Rating::new(i64::from(r)))
        .transpose()
        .with_context(|| format!("booking {code} has invalid rating"))?;
    Ok(Booking {
        code,
        customer_id: model.customer_id.map(ChannelId),
        service: model.service,
        client_name: model.client_name,
        client_phone: model.client_phone.map(CanonicalPhone::from_canonical),
        starts_at: model.starts_at,
        duration_minutes: model.duration_minutes,
        status,
        rating,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn bookings_from_models(
    models: Vec<bookings::Model>,
) -> Result<Vec<Booking>, BookingsServiceError> {
    Ok(models
        .into_iter()
        .map(booking_from_model)
        .collect::<anyhow::Result<Vec<_>>>()?)
}

// ── Notification log repository ──────────────────────────────────────────────

impl NotificationLogRepository for DbBookingStore {
    async fn append(&self, entry: &NotificationLogEntry) -> Result<(), BookingsServiceError> {
        notification_log::Entity::insert(notification_log::ActiveModel {
            id: Set(entry.id),
            customer_id: Set(entry.customer_id.0),
            booking_code: Set(entry.booking_code.as_ref().map(|c| c.as_str().to_owned())),
            kind: Set(entry.kind.as_str().to_owned()),
            sent_at: Set(entry.sent_at),
        })
        .exec_without_returning(&self.db)
        .await
        .context("append notification log")?;
        Ok(())
    }

    async fn latest_for(
        &self,
        customer: ChannelId,
        kind: MessageKind,
    ) -> Result<Option<NotificationLogEntry>, BookingsServiceError> {
        let model = notification_log::Entity::find()
            .filter(notification_log::Column::CustomerId.eq(customer.0))
            .filter(notification_log::Column::Kind.eq(kind.as_str()))
            .order_by_desc(notification_log::Column::SentAt)
            .one(&self.db)
            .await
            .context("find latest notification")?;
        Ok(model.map(log_entry_from_model).transpose()?)
    }

    async fn exists(
        &self,
        code: &BookingCode,
        kind: MessageKind,
    ) -> Result<bool, BookingsServiceError> {
        let model = notification_log::Entity::find()
            .filter(notification_log::Column::BookingCode.eq(code.as_str()))
            .filter(notification_log::Column::Kind.eq(kind.as_str()))
            .one(&self.db)
            .await
            .context("check notification log")?;
        Ok(model.is_some())
    }
}

fn log_entry_from_model(model: notification_log::Model) -> anyhow::Result<NotificationLogEntry> {
    let kind = MessageKind::from_str_opt(&model.kind)
        .ok_or_else(|| anyhow!("unknown notification kind {:?}", model.kind))?;
    Ok(NotificationLogEntry {
        id: model.id,
        customer_id: ChannelId(model.customer_id),
        booking_code: model.booking_code.and_then(BookingCode::new),
        kind,
        sent_at: model.sent_at,
    })
}

// ── Feedback session repository ──────────────────────────────────────────────

impl FeedbackSessionRepository for DbBookingStore {
    async fn put(&self, session: &FeedbackSession) -> Result<(), BookingsServiceError> {
        feedback_sessions::Entity::insert(feedback_sessions::ActiveModel {
            customer_id: Set(session.customer_id.0),
            booking_code: Set(session.booking_code.as_str().to_owned()),
            created_at: Set(session.created_at),
        })
        .on_conflict(
            OnConflict::column(feedback_sessions::Column::CustomerId)
                .update_columns([
                    feedback_sessions::Column::BookingCode,
                    feedback_sessions::Column::CreatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("put feedback session")?;
        Ok(())
    }

    async fn get(
        &self,
        customer: ChannelId,
    ) -> Result<Option<FeedbackSession>, BookingsServiceError> {
        let model = feedback_sessions::Entity::find_by_id(customer.0)
            .one(&self.db)
            .await
            .context("get feedback session")?;
        Ok(model.and_then(|m| {
            Some(FeedbackSession {
                customer_id: ChannelId(m.customer_id),
                booking_code: BookingCode::new(m.booking_code)?,
                created_at: m.created_at,
            })
        }))
    }

    async fn clear(&self, customer: ChannelId) -> Result<(), BookingsServiceError> {
        feedback_sessions::Entity::delete_by_id(customer.0)
            .exec(&self.db)
            .await
            .context("clear feedback session")?;
        Ok(())
    }
}
