// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use common::{NewTask, Task, TaskStatus};
use sqlx::{Sqlite, SqlitePool, migrate::MigrateDatabase};
use tracing::{debug, info};

/// Establishes the database connection pool.
/// If the database does not exist, it creates it.
/// It also ensures the `tasks` table has the correct schema.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    create_tasks_table(&pool).await?;

    info!("'tasks' table is ready.");

    Ok(pool)
}

/// Creates the `tasks` table if it is missing. The attachment lives inline
/// as a BLOB column next to its metadata; it is null for tasks without one.
pub async fn create_tasks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'TODO',
            deadline TIMESTAMP NOT NULL,
            created_on TIMESTAMP NOT NULL,
            file_data BLOB NULL,
            file_content_type TEXT NULL,
            file_name TEXT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'tasks' table")?;

    Ok(())
}

/// Retrieves all tasks, most recently created first.
pub async fn list_tasks_from_db(pool: &SqlitePool) -> Result<Vec<Task>> {
    let tasks =
        sqlx::query_as::<_, Task>("SELECT * FROM tasks ORDER BY created_on DESC, id DESC;")
            .fetch_all(pool)
            .await
            .context("Failed to retrieve tasks from DB")?;

    Ok(tasks)
}

/// Retrieves a single task by its ID, or `None` if no row matches.
pub async fn get_task_from_db(pool: &SqlitePool, task_id: i64) -> Result<Option<Task>> {
    let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
        .bind(task_id)
        .fetch_optional(pool)
        .await
        .context(format!("Failed to retrieve task with ID: {}", task_id))?;

    Ok(task)
}

/// Inserts a new task into the database. New tasks always start as TODO.
pub async fn insert_task_in_db(pool: &SqlitePool, payload: NewTask) -> Result<Task> {
    debug!(
        "Insert values: title={}, deadline={}, created_on={}, has_file={}",
        payload.title,
        payload.deadline,
        payload.created_on,
        payload.file.is_some()
    );

    let (file_data, file_content_type, file_name) = match payload.file {
        Some(file) => (
            Some(file.data),
            Some(file.content_type),
            Some(file.filename),
        ),
        None => (None, None, None),
    };

    let id = sqlx::query(
        "INSERT INTO tasks (title, description, status, deadline, created_on, file_data, file_content_type, file_name) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(TaskStatus::Todo)
    .bind(payload.deadline)
    .bind(payload.created_on)
    .bind(&file_data)
    .bind(&file_content_type)
    .bind(&file_name)
    .execute(pool)
    .await
    .context("Failed to insert task into DB")?
    .last_insert_rowid();

    let new_task = Task {
        id,
        title: payload.title,
        description: payload.description,
        status: TaskStatus::Todo,
        deadline: payload.deadline,
        created_on: payload.created_on,
        file_data,
        file_content_type,
        file_name,
    };

    Ok(new_task)
}

/// Persists every mutable column of `task`. `created_on` is written back
/// unchanged; the service never touches it after creation.
pub async fn update_task_in_db(pool: &SqlitePool, task: &Task) -> Result<()> {
    debug!("Updating task with ID: {}", task.id);

    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, status = ?, deadline = ?, created_on = ?, file_data = ?, file_content_type = ?, file_name = ? WHERE id = ?"
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status)
    .bind(task.deadline)
    .bind(task.created_on)
    .bind(&task.file_data)
    .bind(&task.file_content_type)
    .bind(&task.file_name)
    .bind(task.id)
    .execute(pool)
    .await
    .context(format!("Failed to update task with ID: {}", task.id))?;

    Ok(())
}

/// Permanently deletes a task from the database.
/// Returns true if a row was removed, false if no task with the given ID was found.
#[allow(clippy::uninlined_format_args)]
pub async fn delete_task_from_db(pool: &SqlitePool, task_id: i64) -> Result<bool> {
    debug!("Attempting to delete task with ID: {}", task_id);
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id)
        .execute(pool)
        .await
        .context(format!("Failed to delete task with ID: {}", task_id))?;

    let rows_affected = result.rows_affected();
    info!("Deleted {} rows for task ID: {}", rows_affected, task_id);

    Ok(rows_affected > 0)
}

/// Inserts the sample task on a fresh database so the UI has something to
/// show on first run. Returns true if the seed row was written.
pub async fn seed_sample_task(pool: &SqlitePool) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(pool)
        .await
        .context("Failed to count tasks")?;

    if count > 0 {
        return Ok(false);
    }

    let created_on = Utc
        .with_ymd_and_hms(2024, 8, 16, 0, 0, 0)
        .single()
        .context("Invalid seed creation date")?;
    let deadline = Utc
        .with_ymd_and_hms(2024, 8, 19, 0, 0, 0)
        .single()
        .context("Invalid seed deadline")?;

    insert_task_in_db(
        pool,
        NewTask {
            title: "Study TypeScript".to_string(),
            description: "Read the documentation and make notes.".to_string(),
            deadline,
            created_on,
            file: None,
        },
    )
    .await?;

    info!("Sample task seeded.");
    Ok(true)
}
