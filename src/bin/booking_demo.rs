//! Books two seats end to end against the configured database.
//!
//! Seeds a movie and a month of showtimes when the catalogue is empty, then
//! walks one booking workflow from the date picker to a ticket.
//!
//! ```bash
//! DATABASE_URL=sqlite://demo.db cargo run --bin booking_demo
//! ```

use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinema_booking::config::Config;
use cinema_booking::db::Database;
use cinema_booking::models::movie::NewMovie;
use cinema_booking::models::seat::SeatLabel;
use cinema_booking::models::user::{Role, Session, UserRegistrationRequest};
use cinema_booking::services::schedule_service::ScheduleService;
use cinema_booking::services::store::CinemaStore;
use cinema_booking::services::user_service::UserService;
use cinema_booking::utils::error::AppError;
use cinema_booking::workflow::{BookingWorkflow, ConfirmOutcome, TracingPresenter};

const DEMO_USER: &str = "demo_member";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = Database::new(&config.database.url, config.database.max_connections).await?;
    db.run_migrations().await?;
    let pool = db.get_pool().clone();

    let store = CinemaStore::with_plan(pool.clone(), config.seating.clone());
    let schedule = ScheduleService::new(pool.clone());

    let mut movies = store.showtimes().list_movies().await?;
    if movies.is_empty() {
        info!("Empty catalogue, seeding a demo movie");
        schedule
            .add_movie(NewMovie {
                title: "The Rust Belt".to_string(),
                genre: "Documentary".to_string(),
                duration_minutes: 95,
                description: "Borrowing, lifetimes and the people who love them.".to_string(),
                poster_link: None,
            })
            .await?;
        let mut rng = StdRng::from_entropy();
        schedule
            .seed_schedule(Local::now().date_naive(), 1, &mut rng)
            .await?;
        movies = store.showtimes().list_movies().await?;
    }
    let movie = movies
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("No movies to book".into()))?;

    let users = UserService::with_cost(pool, config.auth.bcrypt_cost);
    let user_id = match users.find_by_username(DEMO_USER).await? {
        Some(user) => user.id,
        None => {
            users
                .register_user(UserRegistrationRequest {
                    username: DEMO_USER.to_string(),
                    password: "DemoPass123".to_string(),
                    first_name: "Demo".to_string(),
                    last_name: "Member".to_string(),
                })
                .await?
        }
    };

    let mut workflow = BookingWorkflow::new(
        store,
        TracingPresenter,
        Session::authenticated(user_id, DEMO_USER, Role::Member),
        movie,
        config.seating.clone(),
    );

    let date = workflow
        .load_dates()
        .await?
        .first()
        .copied()
        .ok_or_else(|| AppError::NotFound("Movie has no showtimes".into()))?;
    let showtime_id = workflow
        .select_date(date)
        .await?
        .first()
        .map(|showtime| showtime.id)
        .ok_or_else(|| AppError::NotFound("No showtimes on that date".into()))?;
    workflow.select_time(showtime_id).await?;

    let picks: Vec<SeatLabel> = workflow
        .availability()
        .and_then(|availability| availability.seat_map())
        .map(|map| {
            map.iter()
                .filter(|(label, _)| map.is_available(label))
                .map(|(label, _)| *label)
                .take(2)
                .collect()
        })
        .unwrap_or_default();
    if picks.is_empty() {
        return Err(AppError::NotFound("No free seats left for this showtime".into()).into());
    }
    for seat in picks {
        workflow.toggle_seat(seat)?;
    }

    match workflow.confirm().await? {
        ConfirmOutcome::Ticketed(ticket) => {
            println!("Ticket {} for {}", ticket.reference, ticket.movie_title);
            println!(
                "  {} {} room {} seats {}",
                ticket.date,
                ticket.time.format("%H:%M"),
                ticket.room_id,
                ticket.seats.join(", ")
            );
            println!("  total ${:.2}", ticket.total);
            println!("  QR: {}", ticket.qr_payload());
        }
        ConfirmOutcome::LoginRequired => println!("Login required before booking"),
    }

    Ok(())
}
