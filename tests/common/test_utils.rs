#![allow(dead_code)]

use cinema_booking::db::Database;
use cinema_booking::utils::error::AppError;
use once_cell::sync::Lazy;
use sqlx::sqlite::SqlitePool as Pool;
use std::path::PathBuf;
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("cinema_booking=debug"))
        .with_test_writer()
        .try_init();
});

/// A throwaway SQLite file with the schema applied. Each test gets its own.
#[derive(Debug)]
pub struct TestDb {
    pub pool: Pool,
    path: PathBuf,
}

impl TestDb {
    pub async fn new() -> Result<Self, AppError> {
        Lazy::force(&TRACING);

        let path = std::env::temp_dir().join(format!("cinema_test_{}.db", Uuid::new_v4()));
        let url = format!("sqlite://{}", path.display());

        let db = Database::new(&url, 5).await?;
        db.run_migrations()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(TestDb {
            pool: db.get_pool().clone(),
            path,
        })
    }

    // Close the pool and remove the database with its WAL files
    pub async fn cleanup(self) {
        self.pool.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    pub async fn insert_movie(&self, title: &str) -> Result<i64, AppError> {
        let id = sqlx::query(
            r#"
            INSERT INTO movies (title, genre, duration_minutes, description)
            VALUES (?, 'Drama', 120, 'Test movie')
            "#,
        )
        .bind(title)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// `start_time` as `YYYY-MM-DD HH:MM:SS`.
    pub async fn insert_showtime(
        &self,
        movie_id: i64,
        room_id: i64,
        start_time: &str,
        price_cents: i64,
    ) -> Result<i64, AppError> {
        let id = sqlx::query(
            r#"
            INSERT INTO showtimes (movie_id, room_id, start_time, price_cents)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(movie_id)
        .bind(room_id)
        .bind(start_time)
        .bind(price_cents)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    // Members created here cannot log in; use UserService for that
    pub async fn insert_member(&self, username: &str) -> Result<i64, AppError> {
        let id = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, role)
            VALUES (?, 'not-a-hash', 'Test', 'Member', 'member')
            "#,
        )
        .bind(username)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn count(&self, table: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
