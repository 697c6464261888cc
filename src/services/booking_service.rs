use crate::models::booking::{
    BookingHistoryDetail, BookingHistoryResponse, BookingReceipt, ClearedBookings, NewBooking,
};
use crate::models::seat::{SeatLabel, SeatingPlan};
use crate::models::user::{Role, Session};
use crate::utils::error::{AppError, AppResult};
use crate::utils::money;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    booking_id: i64,
    reference: String,
    movie_title: String,
    room_id: i64,
    start_time: NaiveDateTime,
    total_cents: i64,
    booked_at: NaiveDateTime,
    seats: Option<String>,
}

#[derive(Clone)]
pub struct BookingService {
    pool: SqlitePool,
    plan: SeatingPlan,
}

impl BookingService {
    pub fn new(pool: SqlitePool) -> Self {
        BookingService::with_plan(pool, SeatingPlan::default())
    }

    pub fn with_plan(pool: SqlitePool, plan: SeatingPlan) -> Self {
        BookingService { pool, plan }
    }

    /// Writes the booking and all of its seats as one unit.
    ///
    /// The `UNIQUE (showtime_id, seat_label)` constraint on `booked_seats` is
    /// what decides a race between two buyers: the loser's insert fails, its
    /// transaction rolls back and nothing it wrote survives.
    pub async fn create_booking(&self, booking: NewBooking) -> AppResult<BookingReceipt> {
        if booking.seats.is_empty() {
            return Err(AppError::ValidationError("Select at least one seat".into()));
        }
        let mut seats = booking.seats.clone();
        seats.sort();
        seats.dedup();
        if seats.len() != booking.seats.len() {
            return Err(AppError::ValidationError("A seat was requested twice".into()));
        }
        if let Some(seat) = seats.iter().find(|seat| !self.plan.contains(seat)) {
            return Err(AppError::ValidationError(format!("Seat {} is not in this hall", seat)));
        }

        let total_cents = money::to_cents(booking.total)?;
        let reference = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;

        // Writing first means SQLite takes the write lock before reading anything
        let inserted = sqlx::query(
            r#"
            INSERT INTO bookings (user_id, showtime_id, total_cents, reference)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.showtime_id)
        .bind(total_cents)
        .bind(reference.to_string())
        .execute(&mut *tx)
        .await;

        let booking_id = match inserted {
            Ok(result) => result.last_insert_rowid(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                let _ = tx.rollback().await;
                return Err(AppError::NotFound("Showtime or user not found".into()));
            }
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(e.into());
            }
        };

        for seat in &seats {
            let claimed = sqlx::query(
                r#"
                INSERT INTO booked_seats (booking_id, showtime_id, seat_label)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(booking_id)
            .bind(booking.showtime_id)
            .bind(seat.to_string())
            .execute(&mut *tx)
            .await;

            match claimed {
                Ok(_) => {}
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    warn!(
                        showtime_id = booking.showtime_id,
                        seat = %seat,
                        "Seat already taken, rolling back booking"
                    );
                    let _ = tx.rollback().await;
                    return Err(AppError::SeatConflict(format!(
                        "Seat {} has just been taken by someone else",
                        seat
                    )));
                }
                Err(e) => {
                    let _ = tx.rollback().await;
                    return Err(e.into());
                }
            }
        }

        tx.commit().await?;

        info!(
            booking_id,
            user_id = booking.user_id,
            showtime_id = booking.showtime_id,
            seats = seats.len(),
            "Booking confirmed"
        );

        Ok(BookingReceipt {
            booking_id,
            reference,
        })
    }

    /// Admin maintenance: removes every booking and frees every seat.
    pub async fn delete_all_bookings(&self, session: &Session) -> AppResult<ClearedBookings> {
        match session.role() {
            Role::Admin => {}
            Role::Guest | Role::Member => {
                return Err(AppError::Forbidden("Only administrators can clear bookings".into()));
            }
        }

        let mut tx = self.pool.begin().await?;

        let seats_released = sqlx::query("DELETE FROM booked_seats")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let bookings_deleted = sqlx::query("DELETE FROM bookings")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        warn!(
            admin = session.username(),
            bookings_deleted, seats_released, "All bookings cleared"
        );

        Ok(ClearedBookings {
            bookings_deleted,
            seats_released,
        })
    }

    pub async fn get_history(&self, user_id: i64) -> AppResult<BookingHistoryResponse> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT
                b.id AS booking_id,
                b.reference,
                m.title AS movie_title,
                s.room_id,
                s.start_time,
                b.total_cents,
                b.created_at AS booked_at,
                GROUP_CONCAT(bs.seat_label) AS seats
            FROM bookings b
            INNER JOIN showtimes s ON s.id = b.showtime_id
            INNER JOIN movies m ON m.id = s.movie_id
            LEFT JOIN booked_seats bs ON bs.booking_id = b.id
            WHERE b.user_id = ?
            GROUP BY b.id
            ORDER BY b.created_at DESC, b.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let bookings = rows
            .into_iter()
            .map(|row| {
                let reference = Uuid::parse_str(&row.reference).map_err(|e| {
                    AppError::DatabaseError(format!("bad booking reference '{}': {e}", row.reference))
                })?;
                Ok(BookingHistoryDetail {
                    booking_id: row.booking_id,
                    reference,
                    movie_title: row.movie_title,
                    room_id: row.room_id,
                    start_time: row.start_time,
                    seats: sorted_seats(row.seats.as_deref()),
                    total: money::from_cents(row.total_cents),
                    booked_at: row.booked_at,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(BookingHistoryResponse { bookings })
    }
}

// GROUP_CONCAT gives no ordering guarantee
fn sorted_seats(concatenated: Option<&str>) -> Vec<String> {
    let mut seats: Vec<SeatLabel> = concatenated
        .unwrap_or_default()
        .split(',')
        .filter_map(|raw| raw.parse().ok())
        .collect();
    seats.sort();
    seats.into_iter().map(|seat| seat.to_string()).collect()
}
