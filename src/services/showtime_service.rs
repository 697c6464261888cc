use crate::models::movie::{Movie, Showtime};
use crate::models::seat::SeatLabel;
use crate::utils::error::{AppError, AppResult};
use crate::utils::money;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;
use tracing::{debug, warn};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ShowtimeRow {
    pub id: i64,
    pub movie_id: i64,
    pub room_id: i64,
    pub start_time: NaiveDateTime,
    pub price_cents: i64,
}

impl From<ShowtimeRow> for Showtime {
    fn from(row: ShowtimeRow) -> Self {
        Showtime {
            id: row.id,
            movie_id: row.movie_id,
            room_id: row.room_id,
            start_time: row.start_time,
            price: money::from_cents(row.price_cents),
        }
    }
}

#[derive(Clone)]
pub struct ShowtimeService {
    pool: SqlitePool,
}

impl ShowtimeService {
    pub fn new(pool: SqlitePool) -> Self {
        ShowtimeService { pool }
    }

    pub async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, genre, duration_minutes, description, poster_link
            FROM movies
            ORDER BY title, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(movies)
    }

    pub async fn get_movie(&self, movie_id: i64) -> AppResult<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, genre, duration_minutes, description, poster_link
            FROM movies
            WHERE id = ?
            "#,
        )
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found".into()))
    }

    // Distinct calendar days with at least one screening, earliest first
    pub async fn list_dates(&self, movie_id: i64) -> AppResult<Vec<NaiveDate>> {
        let rows: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT date(start_time) AS show_date
            FROM showtimes
            WHERE movie_id = ?
            ORDER BY show_date
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|e| AppError::DatabaseError(format!("bad showtime date '{raw}': {e}")))
            })
            .collect()
    }

    pub async fn list_showtimes(&self, movie_id: i64, date: NaiveDate) -> AppResult<Vec<Showtime>> {
        let rows = sqlx::query_as::<_, ShowtimeRow>(
            r#"
            SELECT id, movie_id, room_id, start_time, price_cents
            FROM showtimes
            WHERE movie_id = ? AND date(start_time) = ?
            ORDER BY start_time ASC, id ASC
            "#,
        )
        .bind(movie_id)
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_all(&self.pool)
        .await?;

        debug!(movie_id, %date, count = rows.len(), "Loaded showtimes");
        Ok(rows.into_iter().map(Showtime::from).collect())
    }

    pub async fn get_showtime(&self, showtime_id: i64) -> AppResult<Showtime> {
        sqlx::query_as::<_, ShowtimeRow>(
            r#"
            SELECT id, movie_id, room_id, start_time, price_cents
            FROM showtimes
            WHERE id = ?
            "#,
        )
        .bind(showtime_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Showtime::from)
        .ok_or_else(|| AppError::NotFound("Showtime not found".into()))
    }

    // Seats claimed by any booking for this showtime
    pub async fn list_taken_seats(&self, showtime_id: i64) -> AppResult<Vec<SeatLabel>> {
        let labels: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT bs.seat_label
            FROM booked_seats bs
            INNER JOIN bookings b ON b.id = bs.booking_id
            WHERE b.showtime_id = ?
            "#,
        )
        .bind(showtime_id)
        .fetch_all(&self.pool)
        .await?;

        let mut taken: Vec<SeatLabel> = labels
            .iter()
            .filter_map(|raw| match raw.parse() {
                Ok(label) => Some(label),
                Err(e) => {
                    warn!(showtime_id, "Ignoring stored seat: {}", e);
                    None
                }
            })
            .collect();
        taken.sort();
        Ok(taken)
    }
}
