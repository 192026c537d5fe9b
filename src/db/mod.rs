pub mod archive;
pub mod daily;
pub mod templates;

use std::str::FromStr;

use sqlx::query::Query;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Database, Sqlite, SqlitePool};

use crate::error::AppError;
use crate::models::PeriodFields;

pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(db: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(db).await?;
    Ok(())
}

type SqliteQuery<'q> = Query<'q, Sqlite, <Sqlite as Database>::Arguments<'q>>;

/// Binds the shared period columns in table order:
/// name, instructor_id, instructor_name, room, start_time, end_time, branch,
/// batch, semester.
fn bind_fields<'q>(query: SqliteQuery<'q>, fields: &'q PeriodFields) -> SqliteQuery<'q> {
    query
        .bind(&fields.name)
        .bind(&fields.instructor_id)
        .bind(&fields.instructor_name)
        .bind(&fields.room)
        .bind(&fields.start_time)
        .bind(&fields.end_time)
        .bind(&fields.branch)
        .bind(&fields.batch)
        .bind(fields.semester)
}
