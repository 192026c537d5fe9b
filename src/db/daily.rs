use sqlx::{Executor, Sqlite};

use super::bind_fields;
use crate::models::DailyPeriod;

pub async fn fetch_all<'e, E>(db: E) -> Result<Vec<DailyPeriod>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, DailyPeriod>(
        "SELECT * FROM daily_periods ORDER BY branch, semester, start_time, name",
    )
    .fetch_all(db)
    .await
}

/// Rows matching the optional branch and semester filters.
pub async fn fetch_filtered<'e, E>(
    db: E,
    branch: Option<&str>,
    semester: Option<i32>,
) -> Result<Vec<DailyPeriod>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, DailyPeriod>(
        r#"
        SELECT * FROM daily_periods
        WHERE (?1 IS NULL OR branch = ?1)
          AND (?2 IS NULL OR semester = ?2)
        ORDER BY start_time, name
        "#,
    )
    .bind(branch)
    .bind(semester)
    .fetch_all(db)
    .await
}

pub async fn find_by_id<'e, E>(db: E, id: &str) -> Result<Option<DailyPeriod>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, DailyPeriod>("SELECT * FROM daily_periods WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert<'e, E>(db: E, period: &DailyPeriod) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = sqlx::query(
        r#"
        INSERT INTO daily_periods
            (id, name, instructor_id, instructor_name, room, start_time, end_time,
            branch, batch, semester, is_cancelled, updated_by, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&period.id);

    bind_fields(query, &period.fields)
        .bind(period.is_cancelled)
        .bind(&period.updated_by)
        .bind(&period.updated_at)
        .execute(db)
        .await?;

    Ok(())
}

pub async fn update<'e, E>(db: E, period: &DailyPeriod) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = sqlx::query(
        r#"
        UPDATE daily_periods
        SET name = ?1,
            instructor_id = ?2,
            instructor_name = ?3,
            room = ?4,
            start_time = ?5,
            end_time = ?6,
            branch = ?7,
            batch = ?8,
            semester = ?9,
            is_cancelled = ?10,
            updated_by = ?11,
            updated_at = ?12
        WHERE id = ?13
        "#,
    );

    let result = bind_fields(query, &period.fields)
        .bind(period.is_cancelled)
        .bind(&period.updated_by)
        .bind(&period.updated_at)
        .bind(&period.id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Empties the whole store, across every branch and semester.
pub async fn delete_all<'e, E>(db: E) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM daily_periods").execute(db).await?;
    Ok(result.rows_affected())
}
