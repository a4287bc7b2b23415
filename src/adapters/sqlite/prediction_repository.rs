//! SQLite implementation of the PredictionRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{PredictionFactors, PredictionKind, PredictionRecord, Resolution, UpdateLogEntry};
use crate::domain::ports::{PredictionFilters, PredictionRepository, StoreStats};

#[derive(Clone)]
pub struct SqlitePredictionRepository {
    pool: SqlitePool,
}

impl SqlitePredictionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PredictionRepository for SqlitePredictionRepository {
    async fn upsert(&self, record: &PredictionRecord) -> DomainResult<()> {
        let factors_json = serde_json::to_string(&record.factors)?;
        let resolution_json = record
            .resolution
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let log_json = serde_json::to_string(&record.update_log)?;

        sqlx::query(
            r#"INSERT INTO predictions (id, kind, factors, confidence, league,
               created_at, synced, resolved, resolution, update_log)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   kind = excluded.kind,
                   factors = excluded.factors,
                   confidence = excluded.confidence,
                   league = excluded.league,
                   synced = excluded.synced,
                   resolved = excluded.resolved,
                   resolution = excluded.resolution,
                   update_log = excluded.update_log"#,
        )
        .bind(record.id.to_string())
        .bind(record.kind().as_str())
        .bind(&factors_json)
        .bind(record.confidence)
        .bind(&record.league)
        .bind(record.created_at.to_rfc3339())
        .bind(record.synced)
        .bind(record.resolved)
        .bind(&resolution_json)
        .bind(&log_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<PredictionRecord>> {
        let row: Option<PredictionRow> = sqlx::query_as("SELECT * FROM predictions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_recent(&self, filters: PredictionFilters) -> DomainResult<Vec<PredictionRecord>> {
        let mut query = String::from("SELECT * FROM predictions WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(kind) = &filters.kind {
            query.push_str(" AND kind = ?");
            bindings.push(kind.as_str().to_string());
        }
        if let Some(league) = &filters.league {
            query.push_str(" AND league = ?");
            bindings.push(league.clone());
        }
        if let Some(resolved) = filters.resolved {
            query.push_str(" AND resolved = ?");
            bindings.push(i64::from(resolved).to_string());
        }
        if let Some(synced) = filters.synced {
            query.push_str(" AND synced = ?");
            bindings.push(i64::from(synced).to_string());
        }

        query.push_str(" ORDER BY created_at DESC");

        if let Some(limit) = filters.limit {
            query.push_str(" LIMIT ?");
            bindings.push(limit.to_string());
        }

        let mut q = sqlx::query_as::<_, PredictionRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<PredictionRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_unsynced(&self) -> DomainResult<Vec<PredictionRecord>> {
        // Oldest first so the push pass replays creations in order.
        let rows: Vec<PredictionRow> = sqlx::query_as(
            "SELECT * FROM predictions WHERE synced = 0 ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM predictions WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::PredictionNotFound(id));
        }

        Ok(())
    }

    async fn clear_all(&self) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM predictions")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self, filters: PredictionFilters) -> DomainResult<u64> {
        let mut query = String::from("SELECT COUNT(*) FROM predictions WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(kind) = &filters.kind {
            query.push_str(" AND kind = ?");
            bindings.push(kind.as_str().to_string());
        }
        if let Some(league) = &filters.league {
            query.push_str(" AND league = ?");
            bindings.push(league.clone());
        }
        if let Some(resolved) = filters.resolved {
            query.push_str(" AND resolved = ?");
            bindings.push(i64::from(resolved).to_string());
        }
        if let Some(synced) = filters.synced {
            query.push_str(" AND synced = ?");
            bindings.push(i64::from(synced).to_string());
        }

        let mut q = sqlx::query_as::<_, (i64,)>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let (count,) = q.fetch_one(&self.pool).await?;
        Ok(count as u64)
    }

    async fn stats(&self) -> DomainResult<StoreStats> {
        let (total, singles, unsynced, resolved, correct): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"SELECT
                       COUNT(*),
                       COALESCE(SUM(kind = 'single'), 0),
                       COALESCE(SUM(synced = 0), 0),
                       COALESCE(SUM(resolved = 1), 0),
                       COALESCE(SUM(resolved = 1 AND json_extract(resolution, '$.correct')), 0)
                   FROM predictions"#,
            )
            .fetch_one(&self.pool)
            .await?;

        let by_league: Vec<(String, i64)> = sqlx::query_as(
            r#"SELECT league, COUNT(*) FROM predictions
               WHERE league IS NOT NULL
               GROUP BY league
               ORDER BY COUNT(*) DESC, league ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(StoreStats {
            total: total as u64,
            singles: singles as u64,
            multis: (total - singles) as u64,
            unsynced: unsynced as u64,
            resolved: resolved as u64,
            correct: correct as u64,
            by_league: by_league
                .into_iter()
                .map(|(league, count)| (league, count as u64))
                .collect(),
        })
    }
}

#[derive(sqlx::FromRow)]
struct PredictionRow {
    id: String,
    kind: String,
    factors: String,
    confidence: f64,
    league: Option<String>,
    created_at: String,
    synced: bool,
    resolved: bool,
    resolution: Option<String>,
    update_log: String,
}

impl TryFrom<PredictionRow> for PredictionRecord {
    type Error = DomainError;

    fn try_from(row: PredictionRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;

        let factors: PredictionFactors = serde_json::from_str(&row.factors)?;

        // The kind column is derived from the factors payload on write;
        // a mismatch means the row was tampered with outside the store.
        if PredictionKind::from_str(&row.kind) != Some(factors.kind()) {
            return Err(DomainError::SerializationError(format!(
                "kind column '{}' does not match factors payload",
                row.kind
            )));
        }

        let created_at = chrono::DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?
            .with_timezone(&chrono::Utc);

        let resolution: Option<Resolution> = row
            .resolution
            .map(|s| serde_json::from_str(&s))
            .transpose()?;

        let update_log: Vec<UpdateLogEntry> = serde_json::from_str(&row.update_log)?;

        Ok(PredictionRecord {
            id,
            factors,
            confidence: row.confidence,
            league: row.league,
            created_at,
            synced: row.synced,
            resolved: row.resolved,
            resolution,
            update_log,
        })
    }
}
