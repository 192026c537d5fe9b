use chrono::NaiveDate;
use sqlx::{Executor, Sqlite};

use super::bind_fields;
use crate::models::ArchivedPeriod;

pub async fn fetch_for_date<'e, E>(
    db: E,
    date: NaiveDate,
    branch: Option<&str>,
    semester: Option<i32>,
) -> Result<Vec<ArchivedPeriod>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, ArchivedPeriod>(
        r#"
        SELECT * FROM archived_periods
        WHERE date = ?1
          AND (?2 IS NULL OR branch = ?2)
          AND (?3 IS NULL OR semester = ?3)
        ORDER BY start_time, name
        "#,
    )
    .bind(date)
    .bind(branch)
    .bind(semester)
    .fetch_all(db)
    .await
}

pub async fn count_all<'e, E>(db: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM archived_periods")
        .fetch_one(db)
        .await
}

pub async fn insert<'e, E>(db: E, period: &ArchivedPeriod) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = sqlx::query(
        r#"
        INSERT INTO archived_periods
            (id, name, instructor_id, instructor_name, room, start_time, end_time,
            branch, batch, semester, is_cancelled, updated_by, date, archived_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&period.id);

    bind_fields(query, &period.fields)
        .bind(period.is_cancelled)
        .bind(&period.updated_by)
        .bind(period.date)
        .bind(&period.archived_at)
        .execute(db)
        .await?;

    Ok(())
}

/// Removes the snapshot for one calendar date so it can be rewritten.
pub async fn delete_for_date<'e, E>(db: E, date: NaiveDate) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM archived_periods WHERE date = ?")
        .bind(date)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
