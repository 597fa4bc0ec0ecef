//! Database schema definitions
//!
//! This module contains the SQL schema of a per-site frontier store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Store identity (site, creation time, schema version)
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Named partitions, in creation order
CREATE TABLE IF NOT EXISTS partitions (
    name TEXT PRIMARY KEY,
    position INTEGER NOT NULL
);

-- Rows of every partition. Leading rows up to the header count are
-- captions; data rows follow. The weight column is untyped so caption
-- text and numbers can share it.
CREATE TABLE IF NOT EXISTS partition_rows (
    partition TEXT NOT NULL REFERENCES partitions(name),
    row_index INTEGER NOT NULL,
    url TEXT,
    title TEXT,
    date TEXT,
    weight,
    notes TEXT,
    PRIMARY KEY (partition, row_index)
);
"#;

/// Column captions written into the header of every partition
pub const COLUMN_CAPTIONS: [&str; 5] = ["Url", "Title", "Date", "Weight", "Notes"];

/// Row (1-based) of the header that carries the column captions
pub const CAPTION_ROW: u32 = 2;

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

/// Gets the current schema version
pub fn get_schema_version() -> u32 {
    1
}
