//! Database schema definitions
//!
//! This module contains the SQL schema for the crawl-audit task database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per provider task
CREATE TABLE IF NOT EXISTS crawl_tasks (
    task_id TEXT PRIMARY KEY,
    target TEXT,
    status TEXT NOT NULL,
    started_at TEXT,
    estimated_duration_secs INTEGER,
    completed_at TEXT,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_tasks_status ON crawl_tasks(status);

-- At most one report per task
CREATE TABLE IF NOT EXISTS crawl_reports (
    task_id TEXT PRIMARY KEY,
    website_id TEXT NOT NULL,
    analysis_type TEXT NOT NULL,
    report_json TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_reports_website ON crawl_reports(website_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
