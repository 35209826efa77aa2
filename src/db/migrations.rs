use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Ordered schema scripts. Index `n` upgrades a database from version `n`
/// to `n + 1`.
const MIGRATIONS: &[(&str, &str)] = &[
    ("schema_v1.sql", include_str!("schemas/schema_v1.sql")),
    ("schema_v2.sql", include_str!("schemas/schema_v2.sql")),
];

fn latest_version() -> i32 {
    MIGRATIONS.len() as i32
}

fn schema_version(conn: &Connection) -> Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")
}

/// Brings the schema up to date. Each pending script and its version bump
/// commit together, so an interrupted upgrade resumes where it stopped.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let current = schema_version(conn)?;
    let latest = latest_version();

    if current > latest {
        bail!("sample database is at schema {current}, newer than supported {latest}");
    }

    for (index, (name, script)) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let target = index as i32 + 1;
        let tx = conn
            .transaction()
            .with_context(|| format!("failed to begin migration to version {target}"))?;
        tx.execute_batch(script)
            .with_context(|| format!("failed to execute {name}"))?;
        tx.pragma_update(None, "user_version", target)
            .context("failed to update user_version pragma")?;
        tx.commit()
            .with_context(|| format!("failed to commit migration to version {target}"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrates_fresh_database_to_latest() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());

        // Running again is a no-op.
        run_migrations(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn resumes_from_partial_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(MIGRATIONS[0].1).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();

        run_migrations(&mut conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'authorizations'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn rejects_newer_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", latest_version() + 1)
            .unwrap();
        assert!(run_migrations(&mut conn).is_err());
    }
}
