use crate::models::movie::{Movie, NewMovie, NewShowtime, Showtime};
use crate::services::showtime_service::ShowtimeService;
use crate::utils::error::{AppError, AppResult};
use crate::utils::money;
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::info;

const DAYS_PER_BLOCK: usize = 30;
const ROOMS: usize = 10;

/// Catalogue maintenance used by administrators and seeding.
#[derive(Clone)]
pub struct ScheduleService {
    pool: SqlitePool,
    showtime_service: ShowtimeService,
}

impl ScheduleService {
    pub fn new(pool: SqlitePool) -> Self {
        ScheduleService {
            showtime_service: ShowtimeService::new(pool.clone()),
            pool,
        }
    }

    pub async fn add_movie(&self, movie: NewMovie) -> AppResult<Movie> {
        if movie.title.trim().is_empty() {
            return Err(AppError::ValidationError("Movie title is required".into()));
        }
        if movie.duration_minutes <= 0 {
            return Err(AppError::ValidationError("Duration must be positive".into()));
        }

        let id = sqlx::query(
            r#"
            INSERT INTO movies (title, genre, duration_minutes, description, poster_link)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(movie.title.trim())
        .bind(&movie.genre)
        .bind(movie.duration_minutes)
        .bind(&movie.description)
        .bind(&movie.poster_link)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(movie_id = id, title = %movie.title, "Movie added");
        self.showtime_service.get_movie(id).await
    }

    pub async fn add_showtime(&self, showtime: NewShowtime) -> AppResult<Showtime> {
        // Checked after rounding, so a sub-cent price cannot land as zero
        let price_cents = money::to_cents(showtime.price)?;
        if price_cents <= 0 {
            return Err(AppError::ValidationError("Price must be at least one cent".into()));
        }
        // Surfaces NotFound before the insert trips the foreign key
        self.showtime_service.get_movie(showtime.movie_id).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO showtimes (movie_id, room_id, start_time, price_cents)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(showtime.movie_id)
        .bind(showtime.room_id)
        .bind(showtime.start_time)
        .bind(price_cents)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.showtime_service.get_showtime(id).await
    }

    /// Replaces every showtime that nobody has booked with a fresh schedule.
    pub async fn seed_schedule<R>(&self, start: NaiveDate, months: u32, rng: &mut R) -> AppResult<usize>
    where
        R: Rng + Send + ?Sized,
    {
        let movie_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM movies ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let schedule = generate_schedule(&movie_ids, start, months, rng);

        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM showtimes WHERE id NOT IN (SELECT DISTINCT showtime_id FROM bookings)",
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for showtime in &schedule {
            let price_cents = money::to_cents(showtime.price)?;
            sqlx::query(
                r#"
                INSERT INTO showtimes (movie_id, room_id, start_time, price_cents)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(showtime.movie_id)
            .bind(showtime.room_id)
            .bind(showtime.start_time)
            .bind(price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            removed,
            created = schedule.len(),
            movies = movie_ids.len(),
            months,
            "Schedule seeded"
        );
        Ok(schedule.len())
    }
}

/// One screening per movie per 30-day block.
///
/// Within a block the movies are shuffled and spread one per day (wrapping
/// after 30), across ten rooms, starting on the hour between 10:00 and 20:00,
/// priced between 12.00 and 22.00.
pub fn generate_schedule<R>(movie_ids: &[i64], start: NaiveDate, months: u32, rng: &mut R) -> Vec<NewShowtime>
where
    R: Rng + ?Sized,
{
    let mut order = movie_ids.to_vec();
    let mut schedule = Vec::with_capacity(order.len() * months as usize);

    for month in 0..months {
        let block_start = start + Duration::days(i64::from(month) * DAYS_PER_BLOCK as i64);
        order.shuffle(rng);

        for (i, movie_id) in order.iter().enumerate() {
            let day = block_start + Duration::days((i % DAYS_PER_BLOCK) as i64);
            let hour: u32 = rng.gen_range(10..=20);
            let Some(start_time) = day.and_hms_opt(hour, 0, 0) else {
                continue;
            };
            let cents: i64 = rng.gen_range(1200..=2200);

            schedule.push(NewShowtime {
                movie_id: *movie_id,
                room_id: ((i % ROOMS) + 1) as i64,
                start_time,
                price: money::from_cents(cents),
            });
        }
    }

    schedule
}
