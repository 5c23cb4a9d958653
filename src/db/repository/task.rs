use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_task(conn: &Connection, task: &TaskRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO tasks (id, project_id, title, status, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            task.id,
            task.project_id,
            task.title,
            task.status.as_str(),
            task.completed_at,
        ],
    )?;
    Ok(())
}

/// Completed tasks for a project, oldest completion first.
pub fn list_completed_tasks(
    conn: &Connection,
    project_id: &str,
) -> Result<Vec<TaskRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, title, status, completed_at
         FROM tasks WHERE project_id = ?1 AND status = 'completed'
         ORDER BY completed_at ASC, title ASC"
    )?;

    let rows = stmt.query_map(params![project_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<DateTime<Utc>>>(4)?,
        ))
    })?;

    let mut tasks = Vec::new();
    for row in rows {
        let (id, project_id, title, status, completed_at) = row?;
        tasks.push(TaskRecord {
            id,
            project_id,
            title,
            status: TaskStatus::from_str(&status)?,
            completed_at,
        });
    }
    Ok(tasks)
}
