use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::db::{
    connection::Database,
    helpers::{parse_authorization, parse_datetime},
};
use crate::health::SampleType;
use crate::models::AuthorizationState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRecord {
    pub sample_type: String,
    pub status: AuthorizationState,
    pub decided_at: DateTime<Utc>,
}

impl Database {
    pub async fn get_authorization(
        &self,
        sample_type: SampleType,
    ) -> Result<Option<AuthorizationRecord>> {
        self.execute(move |conn| {
            let row = conn
                .query_row(
                    "SELECT sample_type, status, decided_at FROM authorizations
                     WHERE sample_type = ?1",
                    params![sample_type.identifier()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    },
                )
                .optional()?;

            let Some((sample_type, status, decided_at)) = row else {
                return Ok(None);
            };

            Ok(Some(AuthorizationRecord {
                sample_type,
                status: parse_authorization(&status)?,
                decided_at: parse_datetime(&decided_at, "decided_at")?,
            }))
        })
        .await
    }

    pub async fn set_authorization(
        &self,
        sample_type: SampleType,
        status: AuthorizationState,
    ) -> Result<()> {
        if status == AuthorizationState::Unrequested {
            return Err(anyhow!("cannot persist an unrequested authorization"));
        }

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO authorizations (sample_type, status, decided_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(sample_type) DO UPDATE SET
                    status = excluded.status,
                    decided_at = excluded.decided_at",
                params![
                    sample_type.identifier(),
                    status.as_str(),
                    Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }
}
