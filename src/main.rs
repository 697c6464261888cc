use cinema_booking::config::Config;
use cinema_booking::db::Database;
use cinema_booking::server::build_rocket;
use cinema_booking::services::user_service::UserService;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.require_jwt_secret()?;

    // Connect to the database
    let db = Database::new(&config.database.url, config.database.max_connections).await?;
    db.run_migrations().await?;

    if let Some(admin) = &config.admin {
        UserService::with_cost(db.get_pool().clone(), config.auth.bcrypt_cost)
            .ensure_admin(&admin.username, &admin.password)
            .await?;
    }

    info!(
        rows = config.seating.rows,
        columns = config.seating.columns,
        "Starting cinema booking API"
    );

    let _ = build_rocket(db.get_pool().clone(), &config).launch().await?;
    Ok(())
}
