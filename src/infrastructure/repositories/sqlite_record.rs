use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::record::{
    Record, RecordId, RecordReadRepository, RecordType, RecordWriteRepository, SlugLookup,
    SuffixIndex, parse_suffix, validate_identifier,
};
use crate::domain::slug::{Constraint, Scope, SlugClaim};
use crate::infrastructure::repositories::error::map_sqlx;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::sync::Arc;

const RETURNING: &str = " RETURNING id, record_type, lineage, fields";

/// Records live in one `records` table; fields are a JSON document queried
/// through `json_extract`.
#[derive(Clone)]
pub struct SqliteRecordRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteRecordRepository {
    #[must_use]
    pub const fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RecordRow {
    id: i64,
    record_type: String,
    lineage: String,
    fields: String,
}

#[allow(clippy::needless_pass_by_value)]
fn corrupt(err: serde_json::Error) -> DomainError {
    DomainError::Persistence(format!("corrupt record row: {err}"))
}

impl TryFrom<RecordRow> for Record {
    type Error = DomainError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let lineage: Vec<String> = serde_json::from_str(&row.lineage).map_err(corrupt)?;
        let fields: Map<String, Value> = serde_json::from_str(&row.fields).map_err(corrupt)?;
        Ok(Self {
            id: Some(RecordId::new(row.id)?),
            record_type: RecordType::from_parts(row.record_type, lineage)?,
            fields,
        })
    }
}

fn json_path(field: &str) -> DomainResult<String> {
    validate_identifier("field", field)?;
    Ok(format!("$.\"{field}\""))
}

/// Name `json_type` reports for a value of this shape.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(true) => "true",
        Value::Bool(false) => "false",
        Value::Number(n) if n.as_i64().is_some() => "integer",
        Value::Number(_) => "real",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn push_field(builder: &mut QueryBuilder<'_, Sqlite>, field: &str) -> DomainResult<()> {
    builder.push("json_extract(fields, ");
    builder.push_bind(json_path(field)?);
    builder.push(")");
    Ok(())
}

fn push_text_field(builder: &mut QueryBuilder<'_, Sqlite>, field: &str) -> DomainResult<()> {
    builder.push("CAST(");
    push_field(builder, field)?;
    builder.push(" AS TEXT)");
    Ok(())
}

fn push_constraint(builder: &mut QueryBuilder<'_, Sqlite>, constraint: &Constraint) -> DomainResult<()> {
    match constraint {
        Constraint::Eq(field, Value::Null) | Constraint::IsNull(field) => {
            push_field(builder, field)?;
            builder.push(" IS NULL");
        }
        Constraint::NotNull(field) => {
            push_field(builder, field)?;
            builder.push(" IS NOT NULL");
        }
        Constraint::Eq(field, value) => {
            // Type is compared too, so `true` never equals `1` and `1.0` never equals `1`.
            builder.push("(json_type(fields, ");
            builder.push_bind(json_path(field)?);
            builder.push(") = ");
            builder.push_bind(json_type_name(value));
            match value {
                Value::Bool(_) | Value::Null => {}
                Value::Number(n) => {
                    builder.push(" AND ");
                    push_field(builder, field)?;
                    builder.push(" = ");
                    if let Some(i) = n.as_i64() {
                        builder.push_bind(i);
                    } else {
                        builder.push_bind(n.as_f64().unwrap_or(f64::NAN));
                    }
                }
                Value::String(s) => {
                    builder.push(" AND ");
                    push_field(builder, field)?;
                    builder.push(" = ");
                    builder.push_bind(s.clone());
                }
                Value::Array(_) | Value::Object(_) => {
                    builder.push(" AND ");
                    push_field(builder, field)?;
                    builder.push(" = json(");
                    builder.push_bind(value.to_string());
                    builder.push(")");
                }
            }
            builder.push(")");
        }
        Constraint::All(inner) if inner.is_empty() => {
            builder.push("1 = 1");
        }
        Constraint::All(inner) => {
            builder.push("(");
            for (i, c) in inner.iter().enumerate() {
                if i > 0 {
                    builder.push(" AND ");
                }
                push_constraint(builder, c)?;
            }
            builder.push(")");
        }
    }
    Ok(())
}

fn push_scope(builder: &mut QueryBuilder<'_, Sqlite>, scope: &Scope) -> DomainResult<()> {
    builder.push("root_type = ");
    builder.push_bind(scope.root.clone());
    builder.push(" AND ");
    push_constraint(builder, &scope.constraint)
}

async fn slug_exists(
    conn: &mut SqliteConnection,
    scope: &Scope,
    field: &str,
    value: &str,
    excluding: Option<RecordId>,
) -> DomainResult<bool> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT EXISTS (SELECT 1 FROM records WHERE ");
    push_scope(&mut builder, scope)?;
    builder.push(" AND ");
    push_text_field(&mut builder, field)?;
    builder.push(" = ");
    builder.push_bind(value.to_string());
    if let Some(id) = excluding {
        builder.push(" AND id <> ");
        builder.push_bind(i64::from(id));
    }
    builder.push(")");

    let found: i64 = builder
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await
        .map_err(map_sqlx)?;
    Ok(found != 0)
}

async fn ensure_claim(
    conn: &mut SqliteConnection,
    claim: Option<&SlugClaim>,
    own: Option<RecordId>,
) -> DomainResult<()> {
    let Some(claim) = claim else {
        return Ok(());
    };
    if slug_exists(conn, &claim.scope, &claim.field, &claim.slug, own).await? {
        return Err(DomainError::Conflict(format!(
            "slug `{}` already taken in {}",
            claim.slug, claim.scope
        )));
    }
    Ok(())
}

fn encode_fields(fields: &Map<String, Value>) -> DomainResult<String> {
    serde_json::to_string(fields).map_err(|e| DomainError::Validation(e.to_string()))
}

#[async_trait]
impl RecordReadRepository for SqliteRecordRepository {
    async fn find_by_id(&self, id: RecordId) -> DomainResult<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, record_type, lineage, fields FROM records WHERE id = ?",
        )
        .bind(i64::from(id))
        .fetch_optional(&*self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(Record::try_from).transpose()
    }
}

#[async_trait]
impl RecordWriteRepository for SqliteRecordRepository {
    async fn insert(&self, record: Record, claim: Option<SlugClaim>) -> DomainResult<Record> {
        let lineage = serde_json::to_string(record.record_type.lineage())
            .map_err(|e| DomainError::Validation(e.to_string()))?;
        let fields = encode_fields(&record.fields)?;

        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
        ensure_claim(&mut tx, claim.as_ref(), None).await?;

        let row = sqlx::query_as::<_, RecordRow>(&format!(
            "INSERT INTO records (record_type, root_type, lineage, fields) VALUES (?, ?, ?, ?){RETURNING}"
        ))
        .bind(record.record_type.name())
        .bind(record.record_type.root())
        .bind(lineage)
        .bind(fields)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;
        Record::try_from(row)
    }

    async fn update(&self, record: Record, claim: Option<SlugClaim>) -> DomainResult<Record> {
        let id = record
            .id
            .ok_or_else(|| DomainError::Validation("cannot update an unsaved record".into()))?;
        let fields = encode_fields(&record.fields)?;

        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
        ensure_claim(&mut tx, claim.as_ref(), Some(id)).await?;

        let row = sqlx::query_as::<_, RecordRow>(&format!(
            "UPDATE records SET fields = ? WHERE id = ?{RETURNING}"
        ))
        .bind(fields)
        .bind(i64::from(id))
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| DomainError::NotFound(format!("record {id} not found")))?;

        tx.commit().await.map_err(map_sqlx)?;
        Record::try_from(row)
    }

    async fn delete(&self, id: RecordId) -> DomainResult<()> {
        sqlx::query("DELETE FROM records WHERE id = ?")
            .bind(i64::from(id))
            .execute(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}

#[async_trait]
impl SlugLookup for SqliteRecordRepository {
    async fn exists(
        &self,
        scope: &Scope,
        field: &str,
        value: &str,
        excluding: Option<RecordId>,
    ) -> DomainResult<bool> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx)?;
        slug_exists(&mut conn, scope, field, value, excluding).await
    }

    async fn max_suffix(&self, scope: &Scope, field: &str, base: &str) -> DomainResult<SuffixIndex> {
        let prefix = format!("{base}-");
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
        push_text_field(&mut builder, field)?;
        builder.push(" FROM records WHERE ");
        push_scope(&mut builder, scope)?;
        builder.push(" AND substr(");
        push_text_field(&mut builder, field)?;
        builder.push(", 1, ");
        let prefix_len = i64::try_from(prefix.chars().count())
            .map_err(|_| DomainError::Validation("slug is too long".into()))?;
        builder.push_bind(prefix_len);
        builder.push(") = ");
        builder.push_bind(prefix);

        let slugs: Vec<Option<String>> = builder
            .build_query_scalar()
            .fetch_all(&*self.pool)
            .await
            .map_err(map_sqlx)?;

        let max = slugs
            .iter()
            .flatten()
            .filter_map(|slug| parse_suffix(base, slug))
            .max();
        Ok(max.map_or(SuffixIndex::Empty, SuffixIndex::Max))
    }
}
