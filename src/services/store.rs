//! The persistence contract the booking workflow is written against.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::models::booking::{BookingReceipt, ClearedBookings, NewBooking};
use crate::models::movie::Showtime;
use crate::models::seat::{SeatLabel, SeatingPlan};
use crate::models::user::Session;
use crate::services::booking_service::BookingService;
use crate::services::showtime_service::ShowtimeService;
use crate::utils::error::AppResult;

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn list_dates(&self, movie_id: i64) -> AppResult<Vec<NaiveDate>>;

    /// Showtimes on `date`, ordered by start time.
    async fn list_showtimes(&self, movie_id: i64, date: NaiveDate) -> AppResult<Vec<Showtime>>;

    async fn list_taken_seats(&self, showtime_id: i64) -> AppResult<Vec<SeatLabel>>;

    /// All-or-nothing. A seat already claimed for the showtime is `SeatConflict`.
    async fn create_booking(&self, booking: NewBooking) -> AppResult<BookingReceipt>;

    async fn delete_all_bookings(&self, session: &Session) -> AppResult<ClearedBookings>;
}

/// SQL-backed store used by the server and the demo.
#[derive(Clone)]
pub struct CinemaStore {
    showtimes: ShowtimeService,
    bookings: BookingService,
}

impl CinemaStore {
    pub fn new(pool: SqlitePool) -> Self {
        CinemaStore::with_plan(pool, SeatingPlan::default())
    }

    /// Bookings are checked against `plan` before anything is written.
    pub fn with_plan(pool: SqlitePool, plan: SeatingPlan) -> Self {
        CinemaStore {
            showtimes: ShowtimeService::new(pool.clone()),
            bookings: BookingService::with_plan(pool, plan),
        }
    }

    pub fn showtimes(&self) -> &ShowtimeService {
        &self.showtimes
    }

    pub fn bookings(&self) -> &BookingService {
        &self.bookings
    }
}

#[async_trait]
impl BookingStore for CinemaStore {
    async fn list_dates(&self, movie_id: i64) -> AppResult<Vec<NaiveDate>> {
        self.showtimes.list_dates(movie_id).await
    }

    async fn list_showtimes(&self, movie_id: i64, date: NaiveDate) -> AppResult<Vec<Showtime>> {
        self.showtimes.list_showtimes(movie_id, date).await
    }

    async fn list_taken_seats(&self, showtime_id: i64) -> AppResult<Vec<SeatLabel>> {
        self.showtimes.list_taken_seats(showtime_id).await
    }

    async fn create_booking(&self, booking: NewBooking) -> AppResult<BookingReceipt> {
        self.bookings.create_booking(booking).await
    }

    async fn delete_all_bookings(&self, session: &Session) -> AppResult<ClearedBookings> {
        self.bookings.delete_all_bookings(session).await
    }
}

#[async_trait]
impl<S: BookingStore + ?Sized> BookingStore for Arc<S> {
    async fn list_dates(&self, movie_id: i64) -> AppResult<Vec<NaiveDate>> {
        (**self).list_dates(movie_id).await
    }

    async fn list_showtimes(&self, movie_id: i64, date: NaiveDate) -> AppResult<Vec<Showtime>> {
        (**self).list_showtimes(movie_id, date).await
    }

    async fn list_taken_seats(&self, showtime_id: i64) -> AppResult<Vec<SeatLabel>> {
        (**self).list_taken_seats(showtime_id).await
    }

    async fn create_booking(&self, booking: NewBooking) -> AppResult<BookingReceipt> {
        (**self).create_booking(booking).await
    }

    async fn delete_all_bookings(&self, session: &Session) -> AppResult<ClearedBookings> {
        (**self).delete_all_bookings(session).await
    }
}
