use rusqlite::{params, params_from_iter, Connection};

use crate::db::DatabaseError;
use crate::models::ProductRecord;

pub fn insert_product(conn: &Connection, product: &ProductRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO products (id, name, manufacturer, approval_number) VALUES (?1, ?2, ?3, ?4)",
        params![product.id, product.name, product.manufacturer, product.approval_number],
    )?;
    Ok(())
}

/// Catalog entries for the given ids. Unknown ids are simply absent.
pub fn get_products_by_ids(
    conn: &Connection,
    ids: &[String],
) -> Result<Vec<ProductRecord>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT id, name, manufacturer, approval_number FROM products
         WHERE id IN ({placeholders}) ORDER BY name ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
        Ok(ProductRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            manufacturer: row.get(2)?,
            approval_number: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn lookup_skips_unknown_ids() {
        let conn = open_memory_database().unwrap();
        insert_product(&conn, &ProductRecord {
            id: "prd-1".into(),
            name: "Andersen 400 Series".into(),
            manufacturer: Some("Andersen".into()),
            approval_number: None,
        }).unwrap();

        let found = get_products_by_ids(&conn, &["prd-1".into(), "prd-404".into()]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Andersen 400 Series");
    }

    #[test]
    fn empty_lookup_skips_query() {
        let conn = open_memory_database().unwrap();
        assert!(get_products_by_ids(&conn, &[]).unwrap().is_empty());
    }
}
