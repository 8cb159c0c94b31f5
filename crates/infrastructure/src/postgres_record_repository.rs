use async_trait::async_trait;
use backoffice_application::RecordRepository;
use backoffice_core::{AppError, AppResult};
use backoffice_domain::{AdminRecord, Criteria, Predicate, ResourceKey, SortDirection};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

/// PostgreSQL-backed record repository for one resource.
///
/// All resources share the `admin_records` table; records are JSONB
/// documents keyed by `(resource, id)`.
#[derive(Clone)]
pub struct PostgresRecordRepository {
    pool: PgPool,
    resource: ResourceKey,
    soft_delete: bool,
}

impl PostgresRecordRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool, resource: ResourceKey, soft_delete: bool) -> Self {
        Self {
            pool,
            resource,
            soft_delete,
        }
    }

    fn select_where<'a>(&self, select: &str, criteria: &'a Criteria) -> QueryBuilder<'a, Postgres> {
        let mut builder: QueryBuilder<'a, Postgres> = QueryBuilder::new(select);
        builder.push(" FROM admin_records WHERE resource = ");
        builder.push_bind(self.resource.as_str());

        for predicate in criteria.predicates() {
            builder.push(" AND ");
            push_predicate(&mut builder, predicate);
        }

        builder
    }
}

#[derive(Debug, FromRow)]
struct RecordRow {
    id: String,
    data: Value,
}

impl RecordRow {
    fn into_record(self) -> AppResult<AdminRecord> {
        let Value::Object(fields) = self.data else {
            return Err(AppError::Internal(format!(
                "record '{}' is not stored as a JSON object",
                self.id
            )));
        };

        AdminRecord::new(self.id, fields)
    }
}

#[async_trait]
impl RecordRepository for PostgresRecordRepository {
    fn supports_soft_delete(&self) -> bool {
        self.soft_delete
    }

    async fn matching(&self, criteria: &Criteria) -> AppResult<Vec<AdminRecord>> {
        let mut builder = self.select_where("SELECT id, data", criteria);

        builder.push(" ORDER BY ");
        for directive in criteria.sort() {
            builder.push("data -> ");
            builder.push_bind(directive.field.as_str());
            match directive.direction {
                SortDirection::Asc => builder.push(" ASC NULLS LAST, "),
                SortDirection::Desc => builder.push(" DESC NULLS FIRST, "),
            };
        }
        builder.push("seq ASC");

        if let Some(limit) = criteria.limit() {
            builder.push(" LIMIT ");
            builder.push_bind(to_sql_integer(limit, "limit")?);
        }
        if let Some(offset) = criteria.offset() {
            builder.push(" OFFSET ");
            builder.push_bind(to_sql_integer(offset, "offset")?);
        }

        let rows = builder
            .build_query_as::<RecordRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to query records of resource '{}': {error}",
                    self.resource
                ))
            })?;

        rows.into_iter().map(RecordRow::into_record).collect()
    }

    async fn count(&self, criteria: &Criteria) -> AppResult<usize> {
        let mut builder = self.select_where("SELECT COUNT(*)", criteria);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to count records of resource '{}': {error}",
                    self.resource
                ))
            })?;

        usize::try_from(count)
            .map_err(|error| AppError::Internal(format!("invalid record count: {error}")))
    }

    async fn find(&self, id: &str) -> AppResult<Option<AdminRecord>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, data
            FROM admin_records
            WHERE resource = $1 AND id = $2
            "#,
        )
        .bind(self.resource.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find record '{id}' of resource '{}': {error}",
                self.resource
            ))
        })?;

        row.map(RecordRow::into_record).transpose()
    }

    async fn save(&self, record: AdminRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_records (resource, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (resource, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(self.resource.as_str())
        .bind(record.id())
        .bind(record.to_value())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save record '{}' of resource '{}': {error}",
                record.id(),
                self.resource
            ))
        })?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM admin_records
            WHERE resource = $1 AND id = $2
            "#,
        )
        .bind(self.resource.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete record '{id}' of resource '{}': {error}",
                self.resource
            ))
        })?;

        Ok(())
    }
}

fn to_sql_integer(value: usize, name: &str) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|error| AppError::Validation(format!("invalid record query {name}: {error}")))
}

fn push_predicate<'a>(builder: &mut QueryBuilder<'a, Postgres>, predicate: &'a Predicate) {
    match predicate {
        Predicate::IsNull { field } => push_is_null(builder, field),
        Predicate::Contains { field, value } => {
            builder.push("data ->> ");
            builder.push_bind(field.as_str());
            builder.push(" ILIKE ");
            builder.push_bind(format!("%{}%", escape_like(value)));
        }
        Predicate::Equals { field, value } if value.is_null() => push_is_null(builder, field),
        Predicate::Equals { field, value } => {
            builder.push("data -> ");
            builder.push_bind(field.as_str());
            builder.push(" = ");
            builder.push_bind(value.clone());
        }
        Predicate::NotEquals { field, value } if value.is_null() => {
            builder.push("NOT ");
            push_is_null(builder, field);
        }
        Predicate::NotEquals { field, value } => {
            builder.push("data -> ");
            builder.push_bind(field.as_str());
            builder.push(" IS DISTINCT FROM ");
            builder.push_bind(value.clone());
        }
        Predicate::All(predicates) => push_group(builder, predicates, " AND ", "TRUE"),
        Predicate::Any(predicates) => push_group(builder, predicates, " OR ", "FALSE"),
    }
}

fn push_is_null<'a>(builder: &mut QueryBuilder<'a, Postgres>, field: &'a str) {
    builder.push("COALESCE(data -> ");
    builder.push_bind(field);
    builder.push(", 'null'::jsonb) = 'null'::jsonb");
}

fn push_group<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    predicates: &'a [Predicate],
    separator: &str,
    empty: &str,
) {
    if predicates.is_empty() {
        builder.push(empty);
        return;
    }

    builder.push('(');
    for (index, predicate) in predicates.iter().enumerate() {
        if index > 0 {
            builder.push(separator);
        }
        push_predicate(builder, predicate);
    }
    builder.push(')');
}

/// Escapes `ILIKE` wildcards so the term is matched literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}
