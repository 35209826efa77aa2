use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{from_millis, to_i64, to_millis, to_u64},
};
use crate::models::StepSample;

fn row_to_sample(row: &Row) -> Result<StepSample> {
    let start_ms: i64 = row.get("start_ms")?;
    let end_ms: i64 = row.get("end_ms")?;
    let count: i64 = row.get("count")?;

    Ok(StepSample {
        id: row.get("id")?,
        start: from_millis(start_ms, "start_ms")?,
        end: from_millis(end_ms, "end_ms")?,
        count: to_u64(count, "count")?,
        source: row.get("source")?,
    })
}

impl Database {
    /// Inserts samples in one transaction. Samples whose id already exists are
    /// skipped; returns how many rows were written.
    pub async fn insert_samples(&self, samples: Vec<StepSample>) -> Result<usize> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let created_at = Utc::now().to_rfc3339();
            let mut inserted = 0;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR IGNORE INTO step_samples (id, start_ms, end_ms, count, source, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for sample in &samples {
                    inserted += stmt
                        .execute(params![
                            sample.id,
                            to_millis(sample.start),
                            to_millis(sample.end),
                            to_i64(sample.count)?,
                            sample.source,
                            created_at,
                        ])
                        .with_context(|| format!("failed to insert sample {}", sample.id))?;
                }
            }
            tx.commit().context("failed to commit sample import")?;
            Ok(inserted)
        })
        .await
    }

    /// Sum of samples starting in `[start, end)`, or `None` when there are none.
    pub async fn sum_samples(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<u64>> {
        self.execute(move |conn| {
            let (rows, total): (i64, Option<i64>) = conn.query_row(
                "SELECT COUNT(*), SUM(count) FROM step_samples
                 WHERE start_ms >= ?1 AND start_ms < ?2",
                params![to_millis(start), to_millis(end)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            if rows == 0 {
                return Ok(None);
            }
            total.map(|value| to_u64(value, "sum")).transpose()
        })
        .await
    }

    pub async fn list_samples(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StepSample>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, start_ms, end_ms, count, source FROM step_samples
                 WHERE start_ms >= ?1 AND start_ms < ?2
                 ORDER BY start_ms ASC",
            )?;

            let mut rows = stmt.query(params![to_millis(start), to_millis(end)])?;
            let mut samples = Vec::new();
            while let Some(row) = rows.next()? {
                samples.push(row_to_sample(row)?);
            }
            Ok(samples)
        })
        .await
    }
}
