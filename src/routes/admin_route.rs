use rand::rngs::StdRng;
use rand::SeedableRng;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::models::booking::ClearedBookings;
use crate::models::movie::{
    Movie, NewMovie, NewShowtime, ScheduleSeedRequest, ScheduleSeedResponse, Showtime,
};
use crate::models::user::Session;
use crate::services::schedule_service::ScheduleService;
use crate::services::store::{BookingStore, CinemaStore};
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt::AuthenticatedUser;

const MAX_SEED_MONTHS: u32 = 24;

fn require_admin(auth: &AuthenticatedUser) -> AppResult<Session> {
    let session = auth.session();
    if !session.is_admin() {
        return Err(AppError::Forbidden("Administrator access required".into()));
    }
    Ok(session)
}

/// Add a movie to the catalogue
#[openapi(tag = "Admin")]
#[post("/admin/movies", format = "json", data = "<request>")]
pub async fn add_movie(
    request: Json<NewMovie>,
    auth: AuthenticatedUser,
    schedule_service: &State<ScheduleService>,
) -> Result<Json<Movie>, AppError> {
    require_admin(&auth)?;
    let movie = schedule_service.add_movie(request.into_inner()).await?;
    Ok(Json(movie))
}

/// Add a single showtime
#[openapi(tag = "Admin")]
#[post("/admin/showtimes", format = "json", data = "<request>")]
pub async fn add_showtime(
    request: Json<NewShowtime>,
    auth: AuthenticatedUser,
    schedule_service: &State<ScheduleService>,
) -> Result<Json<Showtime>, AppError> {
    require_admin(&auth)?;
    let showtime = schedule_service.add_showtime(request.into_inner()).await?;
    Ok(Json(showtime))
}

/// Regenerate the schedule for every movie
#[openapi(tag = "Admin")]
#[post("/admin/schedule", format = "json", data = "<request>")]
pub async fn seed_schedule(
    request: Json<ScheduleSeedRequest>,
    auth: AuthenticatedUser,
    schedule_service: &State<ScheduleService>,
) -> Result<Json<ScheduleSeedResponse>, AppError> {
    require_admin(&auth)?;
    let request = request.into_inner();
    if request.months == 0 || request.months > MAX_SEED_MONTHS {
        return Err(AppError::ValidationError(format!(
            "Months must be between 1 and {}",
            MAX_SEED_MONTHS
        )));
    }

    let mut rng = StdRng::from_entropy();
    let showtimes_created = schedule_service
        .seed_schedule(request.start_date, request.months, &mut rng)
        .await?;
    Ok(Json(ScheduleSeedResponse { showtimes_created }))
}

/// Delete every booking and free every seat
#[openapi(tag = "Admin")]
#[delete("/admin/bookings")]
pub async fn clear_bookings(
    auth: AuthenticatedUser,
    store: &State<CinemaStore>,
) -> Result<Json<ClearedBookings>, AppError> {
    let session = require_admin(&auth)?;
    let cleared = store.delete_all_bookings(&session).await?;
    Ok(Json(cleared))
}
