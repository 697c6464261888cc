use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::routes::{admin_route, booking_route, movie_route, user_route};
use crate::services::schedule_service::ScheduleService;
use crate::services::seat_service::SeatService;
use crate::services::store::CinemaStore;
use crate::services::user_service::UserService;

fn swagger_ui() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/api/openapi.json".to_string(),
        ..Default::default()
    }
}

/// Assembles the API over an already-migrated pool.
pub fn build_rocket(pool: SqlitePool, config: &Config) -> Rocket<Build> {
    rocket::build()
        .manage(UserService::with_cost(pool.clone(), config.auth.bcrypt_cost))
        .manage(ScheduleService::new(pool.clone()))
        .manage(CinemaStore::with_plan(pool, config.seating.clone()))
        .manage(SeatService::new(config.seating.clone()))
        .manage(config.auth.clone())
        .mount(
            "/api",
            openapi_get_routes![
                user_route::register,
                user_route::login,
                movie_route::list_movies,
                movie_route::list_show_dates,
                movie_route::list_showtimes,
                movie_route::get_seat_map,
                movie_route::quote_seats,
                booking_route::book_seats,
                booking_route::booking_history,
                admin_route::add_movie,
                admin_route::add_showtime,
                admin_route::seed_schedule,
                admin_route::clear_bookings,
            ],
        )
        .mount("/swagger", make_swagger_ui(&swagger_ui()))
        .attach(AdHoc::on_response("CORS", |_, res| {
            Box::pin(async move {
                res.set_header(rocket::http::Header::new(
                    "Access-Control-Allow-Origin",
                    "*",
                ));
            })
        }))
}
