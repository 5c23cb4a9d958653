use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::FieldChangeNote;

/// Appends a field-change note. Notes are never updated afterwards.
pub fn insert_field_change_note(
    conn: &Connection,
    project_id: &str,
    note: &str,
) -> Result<FieldChangeNote, DatabaseError> {
    let record = FieldChangeNote {
        id: Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        note: note.to_string(),
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO field_change_notes (id, project_id, note, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![record.id, record.project_id, record.note, record.created_at],
    )?;
    Ok(record)
}

pub fn list_field_change_notes(
    conn: &Connection,
    project_id: &str,
) -> Result<Vec<FieldChangeNote>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, note, created_at FROM field_change_notes
         WHERE project_id = ?1 ORDER BY created_at ASC, rowid ASC"
    )?;
    let rows = stmt.query_map(params![project_id], |row| {
        Ok(FieldChangeNote {
            id: row.get(0)?,
            project_id: row.get(1)?,
            note: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_project;
    use crate::db::sqlite::open_memory_database;
    use crate::models::ProjectRecord;

    #[test]
    fn notes_append_in_order() {
        let conn = open_memory_database().unwrap();
        insert_project(&conn, &ProjectRecord::new("proj-1")).unwrap();
        insert_field_change_note(&conn, "proj-1", "Moved water heater to garage").unwrap();
        insert_field_change_note(&conn, "proj-1", "Added attic vent").unwrap();

        let notes = list_field_change_notes(&conn, "proj-1").unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].note, "Moved water heater to garage");
        assert_eq!(notes[1].note, "Added attic vent");
    }

    #[test]
    fn notes_scoped_to_project() {
        let conn = open_memory_database().unwrap();
        insert_project(&conn, &ProjectRecord::new("proj-1")).unwrap();
        insert_project(&conn, &ProjectRecord::new("proj-2")).unwrap();
        insert_field_change_note(&conn, "proj-2", "Other project").unwrap();

        assert!(list_field_change_notes(&conn, "proj-1").unwrap().is_empty());
    }
}
