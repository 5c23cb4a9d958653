use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_project(conn: &Connection, project: &ProjectRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO projects (id, project_number, address, owner_name, jurisdiction,
         permit_number, contractor, scope_of_work, customer_number, certification_type,
         certification_generated_at, certification_file_key, certification_file_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            project.id,
            project.project_number,
            project.address,
            project.owner_name,
            project.jurisdiction,
            project.permit_number,
            project.contractor,
            project.scope_of_work,
            project.customer_number,
            project.certification_type.map(|t| t.as_str()),
            project.certification_generated_at,
            project.certification_file_key,
            project.certification_file_url,
        ],
    )?;
    Ok(())
}

pub fn get_project(conn: &Connection, id: &str) -> Result<Option<ProjectRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_number, address, owner_name, jurisdiction, permit_number,
         contractor, scope_of_work, customer_number, certification_type,
         certification_generated_at, certification_file_key, certification_file_url
         FROM projects WHERE id = ?1"
    )?;

    let result = stmt.query_row(params![id], |row| {
        Ok(ProjectRow {
            id: row.get(0)?,
            project_number: row.get(1)?,
            address: row.get(2)?,
            owner_name: row.get(3)?,
            jurisdiction: row.get(4)?,
            permit_number: row.get(5)?,
            contractor: row.get(6)?,
            scope_of_work: row.get(7)?,
            customer_number: row.get(8)?,
            certification_type: row.get(9)?,
            certification_generated_at: row.get(10)?,
            certification_file_key: row.get(11)?,
            certification_file_url: row.get(12)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(project_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Overwrites the project's certification fields with the latest artifact.
pub fn update_project_certification(
    conn: &Connection,
    project_id: &str,
    stamp: &CertificationStamp,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE projects SET certification_type = ?2, certification_generated_at = ?3,
         certification_file_key = ?4, certification_file_url = ?5
         WHERE id = ?1",
        params![
            project_id,
            stamp.certification_type.as_str(),
            stamp.generated_at,
            stamp.file_key,
            stamp.file_url,
        ],
    )?;

    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Project".into(),
            id: project_id.into(),
        });
    }
    Ok(())
}

struct ProjectRow {
    id: String,
    project_number: Option<String>,
    address: Option<String>,
    owner_name: Option<String>,
    jurisdiction: Option<String>,
    permit_number: Option<String>,
    contractor: Option<String>,
    scope_of_work: Option<String>,
    customer_number: Option<String>,
    certification_type: Option<String>,
    certification_generated_at: Option<DateTime<Utc>>,
    certification_file_key: Option<String>,
    certification_file_url: Option<String>,
}

fn project_from_row(row: ProjectRow) -> Result<ProjectRecord, DatabaseError> {
    Ok(ProjectRecord {
        id: row.id,
        project_number: row.project_number,
        address: row.address,
        owner_name: row.owner_name,
        jurisdiction: row.jurisdiction,
        permit_number: row.permit_number,
        contractor: row.contractor,
        scope_of_work: row.scope_of_work,
        customer_number: row.customer_number,
        certification_type: row
            .certification_type
            .as_deref()
            .map(CertificationType::from_str)
            .transpose()?,
        certification_generated_at: row.certification_generated_at,
        certification_file_key: row.certification_file_key,
        certification_file_url: row.certification_file_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn sample_project() -> ProjectRecord {
        ProjectRecord {
            project_number: Some("P-2041".into()),
            address: Some("418 Willow Creek Rd".into()),
            owner_name: Some("Dana Whitfield".into()),
            jurisdiction: Some("Marion County".into()),
            ..ProjectRecord::new("proj-1")
        }
    }

    #[test]
    fn insert_and_get_project() {
        let conn = open_memory_database().unwrap();
        insert_project(&conn, &sample_project()).unwrap();

        let loaded = get_project(&conn, "proj-1").unwrap().unwrap();
        assert_eq!(loaded, sample_project());
    }

    #[test]
    fn get_missing_project_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_project(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn certification_fields_overwritten() {
        let conn = open_memory_database().unwrap();
        insert_project(&conn, &sample_project()).unwrap();

        let first = CertificationStamp {
            certification_type: CertificationType::AsPermitted,
            generated_at: Utc::now(),
            file_key: "certifications/as_permitted/a_v1.pdf".into(),
            file_url: "https://files.test/a_v1.pdf".into(),
        };
        update_project_certification(&conn, "proj-1", &first).unwrap();

        let second = CertificationStamp {
            certification_type: CertificationType::AsBuilt,
            file_key: "certifications/as_built/a_v1.pdf".into(),
            file_url: "https://files.test/b_v1.pdf".into(),
            ..first
        };
        update_project_certification(&conn, "proj-1", &second).unwrap();

        let loaded = get_project(&conn, "proj-1").unwrap().unwrap();
        assert_eq!(loaded.certification_type, Some(CertificationType::AsBuilt));
        assert_eq!(loaded.certification_file_url.as_deref(), Some("https://files.test/b_v1.pdf"));
        assert!(loaded.certification_generated_at.is_some());
    }

    #[test]
    fn update_missing_project_is_not_found() {
        let conn = open_memory_database().unwrap();
        let stamp = CertificationStamp {
            certification_type: CertificationType::AsPermitted,
            generated_at: Utc::now(),
            file_key: "k".into(),
            file_url: "u".into(),
        };
        let err = update_project_certification(&conn, "ghost", &stamp).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
