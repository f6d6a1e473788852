use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{generate_id, Collection, Document, FieldMap, Id};
use crate::store::traits::{DocumentPatch, DocumentStore, Predicate};

/// PostgreSQL-backed document store: one JSONB row per document, keyed by
/// (collection, id). Per-row statements are atomic; nothing here spans rows.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the documents table and its ownership index if they are
    /// missing. Idempotent, runs at startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create documents table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_owner_idx \
             ON documents (collection, (data ->> 'userId'))",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create ownership index")?;

        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

enum Arg {
    Text(String),
    Json(Value),
}

/// Render a predicate as a WHERE fragment, pushing bind arguments. `$1` is
/// reserved for the collection by the caller.
fn predicate_sql(predicate: &Predicate, args: &mut Vec<Arg>) -> String {
    match predicate {
        Predicate::All => "TRUE".to_string(),
        Predicate::FieldEq { field, value } => {
            args.push(Arg::Text(field.clone()));
            let field_n = args.len() + 1;
            args.push(Arg::Json(value.clone()));
            let value_n = args.len() + 1;
            format!("data -> ${field_n} = ${value_n}")
        }
        Predicate::FieldIn { field, values } => {
            args.push(Arg::Text(field.clone()));
            let field_n = args.len() + 1;
            args.push(Arg::Json(Value::Array(values.clone())));
            let values_n = args.len() + 1;
            // jsonb containment: the candidate array contains the field value
            format!("data ? ${field_n}::text AND ${values_n} @> (data -> ${field_n})")
        }
        Predicate::RefEq { field, target } => {
            args.push(Arg::Text(field.clone()));
            let field_n = args.len() + 1;
            args.push(Arg::Json(target.to_value()));
            let value_n = args.len() + 1;
            format!("data -> ${field_n} = ${value_n}")
        }
        Predicate::And(predicates) => {
            if predicates.is_empty() {
                return "TRUE".to_string();
            }
            let clauses: Vec<String> = predicates
                .iter()
                .map(|p| predicate_sql(p, args))
                .collect();
            format!("({})", clauses.join(" AND "))
        }
    }
}

fn row_to_document(collection: Collection, row: &sqlx::postgres::PgRow) -> Result<Document> {
    let id: String = row.get("id");
    let data: Value = row.get("data");
    let Value::Object(data) = data else {
        anyhow::bail!("document {}/{} holds non-object data", collection, id);
    };
    Ok(Document::new(collection, id, data))
}

#[async_trait::async_trait]
impl DocumentStore for PostgresStore {
    async fn create(&self, collection: Collection, data: FieldMap) -> Result<Id> {
        let id = generate_id();
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection.name())
            .bind(&id)
            .bind(Value::Object(data))
            .execute(&self.pool)
            .await
            .context("Failed to insert document")?;
        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &Id) -> Result<Option<Document>> {
        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.name())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch document")?;

        row.map(|row| row_to_document(collection, &row)).transpose()
    }

    async fn query(&self, collection: Collection, predicate: &Predicate) -> Result<Vec<Document>> {
        let mut args = Vec::new();
        let clause = predicate_sql(predicate, &mut args);
        let sql = format!(
            "SELECT id, data FROM documents WHERE collection = $1 AND {clause} ORDER BY id"
        );

        let mut query = sqlx::query(&sql).bind(collection.name());
        for arg in args {
            query = match arg {
                Arg::Text(text) => query.bind(text),
                Arg::Json(json) => query.bind(json),
            };
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to query documents")?;
        rows.iter()
            .map(|row| row_to_document(collection, row))
            .collect()
    }

    async fn update(&self, collection: Collection, id: &Id, patch: DocumentPatch) -> Result<bool> {
        // Read-modify-write; the patch semantics live in DocumentPatch so the
        // memory and Postgres adapters cannot drift. Not atomic across the
        // read and the write.
        let Some(document) = self.get(collection, id).await? else {
            return Ok(false);
        };
        let mut data = document.data;
        patch.apply(&mut data);

        let result =
            sqlx::query("UPDATE documents SET data = $3 WHERE collection = $1 AND id = $2")
                .bind(collection.name())
                .bind(id)
                .bind(Value::Object(data))
                .execute(&self.pool)
                .await
                .context("Failed to update document")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: Collection, id: &Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.name())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete document")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocRef;

    #[test]
    fn predicate_sql_numbers_binds_after_the_reserved_ones() {
        let mut args = Vec::new();
        let sql = predicate_sql(
            &Predicate::And(vec![
                Predicate::ref_eq("contentImage", DocRef::new(Collection::ContentImages, "c1")),
                Predicate::ref_eq("styleImage", DocRef::new(Collection::StyleImages, "s1")),
            ]),
            &mut args,
        );
        assert_eq!(sql, "(data -> $2 = $3 AND data -> $4 = $5)");
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn all_predicate_needs_no_binds() {
        let mut args = Vec::new();
        assert_eq!(predicate_sql(&Predicate::All, &mut args), "TRUE");
        assert!(args.is_empty());
    }
}
