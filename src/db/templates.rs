use sqlx::{Executor, Sqlite};

use super::bind_fields;
use crate::models::{TemplatePeriod, Weekday};

pub async fn fetch_filtered<'e, E>(
    db: E,
    weekday: Option<Weekday>,
    branch: Option<&str>,
    semester: Option<i32>,
) -> Result<Vec<TemplatePeriod>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, TemplatePeriod>(
        r#"
        SELECT * FROM template_periods
        WHERE (?1 IS NULL OR weekday = ?1)
          AND (?2 IS NULL OR branch = ?2)
          AND (?3 IS NULL OR semester = ?3)
        ORDER BY weekday, branch, semester, start_time, name
        "#,
    )
    .bind(weekday.map(|day| day.as_str()))
    .bind(branch)
    .bind(semester)
    .fetch_all(db)
    .await
}

pub async fn find_by_id<'e, E>(db: E, id: &str) -> Result<Option<TemplatePeriod>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, TemplatePeriod>("SELECT * FROM template_periods WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert<'e, E>(db: E, period: &TemplatePeriod) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = sqlx::query(
        r#"
        INSERT INTO template_periods
            (id, name, instructor_id, instructor_name, room, start_time, end_time,
            branch, batch, semester, weekday)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&period.id);

    bind_fields(query, &period.fields)
        .bind(period.weekday.as_str())
        .execute(db)
        .await?;

    Ok(())
}

pub async fn update<'e, E>(db: E, period: &TemplatePeriod) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = sqlx::query(
        r#"
        UPDATE template_periods
        SET name = ?1,
            instructor_id = ?2,
            instructor_name = ?3,
            room = ?4,
            start_time = ?5,
            end_time = ?6,
            branch = ?7,
            batch = ?8,
            semester = ?9,
            weekday = ?10
        WHERE id = ?11
        "#,
    );

    let result = bind_fields(query, &period.fields)
        .bind(period.weekday.as_str())
        .bind(&period.id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn delete<'e, E>(db: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM template_periods WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
