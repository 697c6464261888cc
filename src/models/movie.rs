use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, JsonSchema)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub genre: String,
    pub duration_minutes: i64,
    pub description: String,
    pub poster_link: Option<String>,
}

/// One screening as the booking screens see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Showtime {
    pub id: i64,
    pub movie_id: i64,
    pub room_id: i64,
    pub start_time: NaiveDateTime,
    #[schemars(with = "String")]
    pub price: Decimal,
}

impl Showtime {
    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    /// Label used in time pickers, e.g. `Room 3 @ 18:00 ($15.00)`.
    pub fn display_label(&self) -> String {
        format!(
            "Room {} @ {} (${:.2})",
            self.room_id,
            self.start_time.format("%H:%M"),
            self.price
        )
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewMovie {
    pub title: String,
    pub genre: String,
    pub duration_minutes: i64,
    pub description: String,
    pub poster_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewShowtime {
    pub movie_id: i64,
    pub room_id: i64,
    pub start_time: NaiveDateTime,
    #[schemars(with = "String")]
    pub price: Decimal,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MovieListResponse {
    pub movies: Vec<Movie>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ShowDatesResponse {
    pub movie_id: i64,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ShowtimeListResponse {
    pub movie_id: i64,
    pub date: NaiveDate,
    pub showtimes: Vec<Showtime>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScheduleSeedRequest {
    pub start_date: NaiveDate,
    pub months: u32,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ScheduleSeedResponse {
    pub showtimes_created: usize,
}
