//! Category lookup
//!
//! Statement labels are free text; they resolve case-insensitively against
//! the categories table, with unmatched labels falling back to `Other`.

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Category;

impl Database {
    /// Resolve a free-text category label to a category id.
    ///
    /// The match is case-insensitive. A missing or unmatched label resolves
    /// to the seeded `Other` category.
    pub fn resolve_category(&self, label: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;

        if let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT id FROM categories WHERE name = ? COLLATE NOCASE",
                    params![label],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(id) = found {
                return Ok(id);
            }
        }

        conn.query_row(
            "SELECT id FROM categories WHERE name = 'Other'",
            [],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| Error::NotFound("fallback category 'Other'".to_string()))
    }

    /// List all categories
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, created_at FROM categories ORDER BY name")?;

        let categories = stmt
            .query_map([], |row| {
                let created_at: String = row.get(2)?;
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&created_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }
}
