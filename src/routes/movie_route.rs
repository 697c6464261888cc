use chrono::NaiveDate;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::models::movie::{MovieListResponse, ShowDatesResponse, ShowtimeListResponse};
use crate::models::seat::{Availability, QuoteRequest, QuoteResponse, SeatMapResponse};
use crate::services::seat_service::SeatService;
use crate::services::store::CinemaStore;
use crate::utils::error::AppError;

/// List every movie on the catalogue
#[openapi(tag = "Movies")]
#[get("/movies")]
pub async fn list_movies(store: &State<CinemaStore>) -> Result<Json<MovieListResponse>, AppError> {
    let movies = store.showtimes().list_movies().await?;
    Ok(Json(MovieListResponse { movies }))
}

/// Days on which a movie is screened
#[openapi(tag = "Movies")]
#[get("/movies/<movie_id>/dates")]
pub async fn list_show_dates(
    movie_id: i64,
    store: &State<CinemaStore>,
) -> Result<Json<ShowDatesResponse>, AppError> {
    store.showtimes().get_movie(movie_id).await?;
    let dates = store.showtimes().list_dates(movie_id).await?;
    Ok(Json(ShowDatesResponse { movie_id, dates }))
}

/// Screenings of a movie on one day
#[openapi(tag = "Movies")]
#[get("/movies/<movie_id>/showtimes?<date>")]
pub async fn list_showtimes(
    movie_id: i64,
    date: String,
    store: &State<CinemaStore>,
) -> Result<Json<ShowtimeListResponse>, AppError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Invalid date format, expected YYYY-MM-DD".into()))?;

    let showtimes = store.showtimes().list_showtimes(movie_id, date).await?;
    Ok(Json(ShowtimeListResponse {
        movie_id,
        date,
        showtimes,
    }))
}

/// Seat map for a showtime with per-seat prices
#[openapi(tag = "Seats")]
#[get("/showtimes/<showtime_id>/seats")]
pub async fn get_seat_map(
    showtime_id: i64,
    store: &State<CinemaStore>,
    seat_service: &State<SeatService>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let showtime = store.showtimes().get_showtime(showtime_id).await?;

    match seat_service.resolve(store.inner(), showtime.id).await {
        Availability::Resolved(map) => Ok(Json(seat_service.seat_map_response(&showtime, &map))),
        Availability::Unknown => Err(AppError::ConnectionUnavailable(
            "Seat availability is unknown".into(),
        )),
    }
}

/// Price a set of seats without booking them
#[openapi(tag = "Seats")]
#[post("/showtimes/<showtime_id>/quote", format = "json", data = "<request>")]
pub async fn quote_seats(
    showtime_id: i64,
    request: Json<QuoteRequest>,
    store: &State<CinemaStore>,
    seat_service: &State<SeatService>,
) -> Result<Json<QuoteResponse>, AppError> {
    let showtime = store.showtimes().get_showtime(showtime_id).await?;
    let quote = seat_service.quote(&showtime, &request.seats)?;
    Ok(Json(quote))
}
