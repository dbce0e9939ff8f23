//! Category and insurance-provider database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{AdminCounts, Category, InsuranceProvider};

impl Database {
    // =========================================================================
    // Categories
    // =========================================================================

    /// Insert a new category.
    pub fn insert_category(&self, category: &Category) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO categories (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                category.id,
                category.name,
                category.description,
                category.created_at
            ],
        )?;
        tracing::debug!(category_id = %category.id, "category inserted");
        Ok(())
    }

    /// Rename or re-describe a category.
    pub fn update_category(&self, category: &Category) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE categories SET name = ?2, description = ?3 WHERE id = ?1",
            params![category.id, category.name, category.description],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a category by ID.
    pub fn get_category(&self, id: &str) -> DbResult<Option<Category>> {
        self.conn
            .query_row(
                "SELECT id, name, description, created_at FROM categories WHERE id = ?",
                [id],
                category_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all categories by name.
    pub fn list_categories(&self) -> DbResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description, created_at FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], category_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a category. Fails while patients are assigned to it.
    pub fn delete_category(&self, id: &str) -> DbResult<bool> {
        let assigned: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM patients WHERE category_id = ?",
            [id],
            |row| row.get(0),
        )?;
        if assigned > 0 {
            return Err(DbError::Constraint(format!(
                "category {} is assigned to {} patient(s)",
                id, assigned
            )));
        }

        let rows_affected = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    // =========================================================================
    // Insurance providers
    // =========================================================================

    /// Insert a new insurance provider.
    pub fn insert_insurance_provider(&self, provider: &InsuranceProvider) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO insurance_providers (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                provider.id,
                provider.name,
                provider.description,
                provider.created_at
            ],
        )?;
        tracing::debug!(provider_id = %provider.id, "insurance provider inserted");
        Ok(())
    }

    /// Rename or re-describe an insurance provider.
    pub fn update_insurance_provider(&self, provider: &InsuranceProvider) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE insurance_providers SET name = ?2, description = ?3 WHERE id = ?1",
            params![provider.id, provider.name, provider.description],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get an insurance provider by ID.
    pub fn get_insurance_provider(&self, id: &str) -> DbResult<Option<InsuranceProvider>> {
        self.conn
            .query_row(
                "SELECT id, name, description, created_at FROM insurance_providers WHERE id = ?",
                [id],
                provider_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all insurance providers by name.
    pub fn list_insurance_providers(&self) -> DbResult<Vec<InsuranceProvider>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at FROM insurance_providers ORDER BY name",
        )?;
        let rows = stmt.query_map([], provider_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete an insurance provider. Fails while patients are covered by it.
    pub fn delete_insurance_provider(&self, id: &str) -> DbResult<bool> {
        let assigned: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM patients WHERE insurance_provider_id = ?",
            [id],
            |row| row.get(0),
        )?;
        if assigned > 0 {
            return Err(DbError::Constraint(format!(
                "insurance provider {} covers {} patient(s)",
                id, assigned
            )));
        }

        let rows_affected = self
            .conn
            .execute("DELETE FROM insurance_providers WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Record counts for the administration dashboard.
    pub fn admin_counts(&self) -> DbResult<AdminCounts> {
        self.conn
            .query_row(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM insurance_providers),
                    (SELECT COUNT(*) FROM categories),
                    (SELECT COUNT(*) FROM patients)
                "#,
                [],
                |row| {
                    Ok(AdminCounts {
                        insurance_providers: row.get(0)?,
                        categories: row.get(1)?,
                        patients: row.get(2)?,
                    })
                },
            )
            .map_err(Into::into)
    }
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn provider_from_row(row: &Row<'_>) -> rusqlite::Result<InsuranceProvider> {
    Ok(InsuranceProvider {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_category_crud() {
        let db = setup_db();

        let mut category = Category::new("Deportivo".into(), None);
        db.insert_category(&category).unwrap();

        category.description = Some("Lesiones deportivas".into());
        assert!(db.update_category(&category).unwrap());

        let retrieved = db.get_category(&category.id).unwrap().unwrap();
        assert_eq!(retrieved.description, Some("Lesiones deportivas".into()));

        assert!(db.delete_category(&category.id).unwrap());
        assert!(db.get_category(&category.id).unwrap().is_none());
    }

    #[test]
    fn test_list_categories_sorted() {
        let db = setup_db();
        db.insert_category(&Category::new("Post-quirúrgico".into(), None))
            .unwrap();
        db.insert_category(&Category::new("Deportivo".into(), None))
            .unwrap();

        let names: Vec<String> = db
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Deportivo", "Post-quirúrgico"]);
    }

    #[test]
    fn test_delete_category_in_use_fails() {
        let db = setup_db();
        let category = Category::new("Deportivo".into(), None);
        db.insert_category(&category).unwrap();

        let mut patient = Patient::new("Ana".into(), 10);
        patient.category_id = Some(category.id.clone());
        db.insert_patient(&patient).unwrap();

        let result = db.delete_category(&category.id);
        assert!(matches!(result, Err(DbError::Constraint(_))));
        assert!(db.get_category(&category.id).unwrap().is_some());
    }

    #[test]
    fn test_delete_provider_in_use_fails() {
        let db = setup_db();
        let provider = InsuranceProvider::new("OSDE".into(), None);
        db.insert_insurance_provider(&provider).unwrap();

        let patient = Patient::new("Ana".into(), 10).insured_by(provider.id.clone());
        db.insert_patient(&patient).unwrap();

        let result = db.delete_insurance_provider(&provider.id);
        assert!(matches!(result, Err(DbError::Constraint(_))));

        db.delete_patient(&patient.id).unwrap();
        assert!(db.delete_insurance_provider(&provider.id).unwrap());
    }

    #[test]
    fn test_admin_counts() {
        let db = setup_db();
        db.insert_insurance_provider(&InsuranceProvider::new("OSDE".into(), None))
            .unwrap();
        db.insert_category(&Category::new("Deportivo".into(), None))
            .unwrap();
        db.insert_category(&Category::new("Adulto mayor".into(), None))
            .unwrap();
        db.insert_patient(&Patient::new("Ana".into(), 10)).unwrap();

        let counts = db.admin_counts().unwrap();
        assert_eq!(
            counts,
            AdminCounts {
                insurance_providers: 1,
                categories: 2,
                patients: 1,
            }
        );
    }
}
