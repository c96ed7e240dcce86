//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs are stored as strings; enums as strings
//! with ASSERT constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

const SCHEMA_V1: &str = "\
-- Users
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE option<string>;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD cli_token ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_cli_token ON TABLE user COLUMNS cli_token;

-- Lessons
DEFINE TABLE lesson SCHEMAFULL;
DEFINE FIELD title ON TABLE lesson TYPE string;
DEFINE FIELD description ON TABLE lesson TYPE option<string>;
DEFINE FIELD sort_order ON TABLE lesson TYPE int DEFAULT 0;
DEFINE FIELD chat_url ON TABLE lesson TYPE option<string>;
DEFINE FIELD created_at ON TABLE lesson TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE lesson TYPE datetime DEFAULT time::now();

-- Submissions: one row per (user, challenge)
DEFINE TABLE submission SCHEMAFULL;
DEFINE FIELD user_id ON TABLE submission TYPE string;
DEFINE FIELD lesson_id ON TABLE submission TYPE string;
DEFINE FIELD challenge_id ON TABLE submission TYPE string;
DEFINE FIELD diff ON TABLE submission TYPE string;
DEFINE FIELD status ON TABLE submission TYPE string \
    ASSERT $value IN ['Open', 'Passed', 'NeedMoreWork'];
DEFINE FIELD created_at ON TABLE submission TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE submission TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_submission_user_challenge ON TABLE submission \
    COLUMNS user_id, challenge_id UNIQUE;
DEFINE INDEX idx_submission_lesson ON TABLE submission COLUMNS lesson_id;

-- Per-(user, lesson) progress
DEFINE TABLE user_lesson SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_lesson TYPE string;
DEFINE FIELD lesson_id ON TABLE user_lesson TYPE string;
DEFINE FIELD is_passed ON TABLE user_lesson TYPE bool DEFAULT false;
DEFINE FIELD is_teaching ON TABLE user_lesson TYPE bool DEFAULT false;
DEFINE FIELD is_enrolled ON TABLE user_lesson TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE user_lesson TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user_lesson TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_user_lesson_user_lesson ON TABLE user_lesson \
    COLUMNS user_id, lesson_id UNIQUE;
";

/// Run all pending schema migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "could not record v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
