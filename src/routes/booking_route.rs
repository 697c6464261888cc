use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::models::booking::{BookingHistoryResponse, BookingRequest, BookingResponse};
use crate::services::seat_service::SeatService;
use crate::services::store::CinemaStore;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedUser;
use crate::workflow::{BookingWorkflow, ConfirmOutcome, RecordingPresenter};

/// Book seats for a showtime and receive the ticket
#[openapi(tag = "Bookings")]
#[post("/bookings", format = "json", data = "<request>")]
pub async fn book_seats(
    request: Json<BookingRequest>,
    auth: AuthenticatedUser,
    store: &State<CinemaStore>,
    seat_service: &State<SeatService>,
) -> Result<Json<BookingResponse>, AppError> {
    let request = request.into_inner();
    let plan = seat_service.plan().clone();
    let seats = plan
        .parse_selection(&request.seats)
        .map_err(AppError::ValidationError)?;
    if seats.is_empty() {
        return Err(AppError::ValidationError("Select at least one seat".into()));
    }

    let showtime = store.showtimes().get_showtime(request.showtime_id).await?;
    let movie = store.showtimes().get_movie(showtime.movie_id).await?;

    let mut workflow = BookingWorkflow::new(
        store.inner().clone(),
        RecordingPresenter::new(),
        auth.session(),
        movie,
        plan,
    );
    workflow.select_date(showtime.date()).await?;
    workflow.select_time(showtime.id).await?;

    for seat in seats {
        workflow.toggle_seat(seat)?;
    }

    match workflow.confirm().await? {
        ConfirmOutcome::Ticketed(ticket) => Ok(Json(BookingResponse {
            qr_payload: ticket.qr_payload(),
            ticket,
        })),
        ConfirmOutcome::LoginRequired => Err(AppError::AuthError("Please log in to book".into())),
    }
}

/// Tickets booked by the current user, newest first
#[openapi(tag = "Bookings")]
#[get("/bookings")]
pub async fn booking_history(
    auth: AuthenticatedUser,
    store: &State<CinemaStore>,
) -> Result<Json<BookingHistoryResponse>, AppError> {
    let history = store.bookings().get_history(auth.user_id).await?;
    Ok(Json(history))
}
