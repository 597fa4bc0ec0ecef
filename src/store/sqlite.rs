//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the PartitionStore trait.
//! Each crawled site gets its own database file.

use crate::link::{RawRow, WeightedLink};
use crate::store::schema::{get_schema_version, initialize_schema, CAPTION_ROW, COLUMN_CAPTIONS};
use crate::store::traits::{Partition, PartitionStore, StoreError, StoreResult, StoredPartitions};
use crate::store::StoreLayout;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// File extension of per-site store files
pub const STORE_FILE_EXT: &str = "sqlite";

enum Location {
    Directory(PathBuf),
    Memory,
}

/// SQLite storage backend for one site
///
/// Writes are collected in an open transaction that `flush` commits, so a
/// crash between two flushes loses at most the writes since the last flush.
pub struct SqliteStore {
    location: Location,
    layout: StoreLayout,
    conn: Option<Connection>,
    site: Option<String>,
    config_hash: Option<String>,
}

impl SqliteStore {
    /// Creates a store rooted at `base_path`
    ///
    /// Nothing touches the disk until `open` or `create` is called; the site
    /// file is `<base_path>/<site>.sqlite`.
    pub fn new(base_path: impl Into<PathBuf>, layout: StoreLayout) -> Self {
        Self {
            location: Location::Directory(base_path.into()),
            layout,
            conn: None,
            site: None,
            config_hash: None,
        }
    }

    /// Creates a store that lives only in memory (for testing)
    pub fn in_memory(layout: StoreLayout) -> Self {
        Self {
            location: Location::Memory,
            layout,
            conn: None,
            site: None,
            config_hash: None,
        }
    }

    /// Records the hash of the configuration the crawl runs with
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Returns the database file path of a site under `base_path`
    pub fn store_path(base_path: &Path, site: &str) -> PathBuf {
        base_path.join(format!("{}.{}", site, STORE_FILE_EXT))
    }

    /// Returns the site this store has been opened or created for
    pub fn site(&self) -> Option<&str> {
        self.site.as_deref()
    }

    /// Opens the connection for `site`
    ///
    /// Returns false when the backing file does not exist and `create` is not set.
    fn connect(&mut self, site: &str, create: bool) -> StoreResult<bool> {
        if let Some(current) = &self.site {
            if current != site {
                return Err(StoreError::SiteMismatch {
                    expected: site.to_string(),
                    found: current.clone(),
                });
            }
        }

        if self.conn.is_some() {
            return Ok(true);
        }

        let conn = match &self.location {
            Location::Memory => {
                let conn = Connection::open_in_memory()?;
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                conn
            }
            Location::Directory(dir) => {
                let path = Self::store_path(dir, site);
                if !create && !path.exists() {
                    return Ok(false);
                }
                let conn = Connection::open(&path)?;
                conn.execute_batch(
                    "
                    PRAGMA journal_mode = WAL;
                    PRAGMA synchronous = FULL;
                    PRAGMA foreign_keys = ON;
                ",
                )?;
                tracing::debug!("Opened store file {}", path.display());
                conn
            }
        };

        initialize_schema(&conn)?;
        self.conn = Some(conn);
        Ok(true)
    }

    /// Returns the connection of a store that has been opened or created
    fn ready(&self) -> StoreResult<&Connection> {
        match (&self.conn, &self.site) {
            (Some(conn), Some(_)) => Ok(conn),
            _ => Err(StoreError::NotCreated),
        }
    }

    /// Checks that every partition of the layout exists in the store
    fn check_partitions(&self, conn: &Connection) -> StoreResult<()> {
        for partition in Partition::ALL {
            let name = self.layout.name(partition);
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM partitions WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            if count == 0 {
                return Err(StoreError::UnknownPartition(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Starts the write transaction if none is open
fn begin(conn: &Connection) -> StoreResult<()> {
    if conn.is_autocommit() {
        conn.execute_batch("BEGIN IMMEDIATE")?;
    }
    Ok(())
}

/// Returns the index of the first free row after the header and existing data
fn next_row_index(conn: &Connection, name: &str, header_rows: u32) -> StoreResult<i64> {
    let last: Option<i64> = conn.query_row(
        "SELECT MAX(row_index) FROM partition_rows WHERE partition = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(last.unwrap_or(0).max(i64::from(header_rows)) + 1)
}

fn insert_rows(
    conn: &Connection,
    name: &str,
    start: i64,
    links: &[WeightedLink],
) -> StoreResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO partition_rows (partition, row_index, url, title, date, weight, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    for (offset, link) in (0_i64..).zip(links) {
        let row = link.to_row();
        stmt.execute(params![
            name,
            start + offset,
            row.url,
            row.title,
            row.date,
            row.weight,
            row.notes,
        ])?;
    }

    Ok(())
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

fn value_to_weight(value: Value) -> Option<f64> {
    match value {
        Value::Real(f) => Some(f),
        Value::Integer(i) => Some(i as f64),
        Value::Text(text) => text.trim().parse().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

/// Loads the data rows of a partition in stored order
fn load_partition(conn: &Connection, name: &str, header_rows: u32) -> StoreResult<Vec<WeightedLink>> {
    let mut stmt = conn.prepare(
        "SELECT row_index, url, title, date, weight, notes FROM partition_rows
         WHERE partition = ?1 AND row_index > ?2 ORDER BY row_index",
    )?;

    let rows = stmt
        .query_map(params![name, header_rows], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                RawRow {
                    url: value_to_text(row.get(1)?),
                    title: value_to_text(row.get(2)?),
                    date: value_to_text(row.get(3)?),
                    weight: value_to_weight(row.get(4)?),
                    notes: value_to_text(row.get(5)?),
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut links = Vec::with_capacity(rows.len());
    for (row_index, raw) in rows {
        match WeightedLink::from_row(raw) {
            Some(link) => links.push(link),
            None => tracing::debug!("Skipping row {} of '{}': no URL", row_index, name),
        }
    }

    Ok(links)
}

impl PartitionStore for SqliteStore {
    fn open(&mut self, site: &str) -> StoreResult<Option<StoredPartitions>> {
        if !self.connect(site, false)? {
            return Ok(None);
        }

        let conn = self.conn.as_ref().ok_or(StoreError::NotCreated)?;
        let recorded: Option<String> = conn
            .query_row("SELECT value FROM meta WHERE key = 'site'", [], |row| {
                row.get(0)
            })
            .optional()?;

        let recorded = match recorded {
            Some(recorded) => recorded,
            None => return Ok(None),
        };
        if recorded != site {
            return Err(StoreError::SiteMismatch {
                expected: site.to_string(),
                found: recorded,
            });
        }

        self.check_partitions(conn)?;

        if let Some(hash) = &self.config_hash {
            let previous: Option<String> = conn
                .query_row("SELECT value FROM meta WHERE key = 'config_hash'", [], |row| {
                    row.get(0)
                })
                .optional()?;
            if previous.as_deref() != Some(hash.as_str()) {
                tracing::info!("Configuration changed since the last run of {}", site);
                conn.execute(
                    "INSERT OR REPLACE INTO meta (key, value) VALUES ('config_hash', ?1)",
                    params![hash],
                )?;
            }
        }

        let header_rows = self.layout.header_rows;
        let load = |partition| load_partition(conn, self.layout.name(partition), header_rows);
        let partitions = StoredPartitions {
            to_crawl: load(Partition::ToCrawl)?,
            crawled: load(Partition::Crawled)?,
            ignore_rules: load(Partition::IgnoreRules)?,
            ignored: load(Partition::Ignored)?,
        };

        self.site = Some(site.to_string());
        Ok(Some(partitions))
    }

    fn create(&mut self, site: &str) -> StoreResult<()> {
        if let Location::Directory(dir) = &self.location {
            std::fs::create_dir_all(dir)?;
        }
        self.connect(site, true)?;

        let conn = self.conn.as_ref().ok_or(StoreError::NotCreated)?;
        begin(conn)?;

        let now = Utc::now().to_rfc3339();
        let version = get_schema_version().to_string();
        for (key, value) in [
            ("site", site),
            ("created_at", now.as_str()),
            ("schema_version", version.as_str()),
        ] {
            conn.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        if let Some(hash) = &self.config_hash {
            conn.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES ('config_hash', ?1)",
                params![hash],
            )?;
        }

        for (position, partition) in (0_i64..).zip(Partition::ALL) {
            let name = self.layout.name(partition);
            conn.execute(
                "INSERT OR IGNORE INTO partitions (name, position) VALUES (?1, ?2)",
                params![name, position],
            )?;

            for row_index in 1..=self.layout.header_rows {
                let captions: [Option<&str>; 5] = if row_index == CAPTION_ROW {
                    COLUMN_CAPTIONS.map(Some)
                } else {
                    [None; 5]
                };
                conn.execute(
                    "INSERT OR REPLACE INTO partition_rows
                     (partition, row_index, url, title, date, weight, notes)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        name,
                        row_index,
                        captions[0],
                        captions[1],
                        captions[2],
                        captions[3],
                        captions[4],
                    ],
                )?;
            }
        }

        self.site = Some(site.to_string());
        tracing::info!("Created frontier store for site {}", site);
        self.flush()
    }

    fn write_append(&mut self, partition: Partition, links: &[WeightedLink]) -> StoreResult<()> {
        if links.is_empty() {
            return Ok(());
        }

        let conn = self.ready()?;
        begin(conn)?;

        let name = self.layout.name(partition);
        let start = next_row_index(conn, name, self.layout.header_rows)?;
        insert_rows(conn, name, start, links)?;

        tracing::trace!("Appended {} rows to '{}'", links.len(), name);
        Ok(())
    }

    fn write_replace(&mut self, partition: Partition, links: &[WeightedLink]) -> StoreResult<()> {
        let conn = self.ready()?;
        begin(conn)?;

        let name = self.layout.name(partition);
        let header_rows = self.layout.header_rows;
        conn.execute(
            "DELETE FROM partition_rows WHERE partition = ?1 AND row_index > ?2",
            params![name, header_rows],
        )?;
        insert_rows(conn, name, i64::from(header_rows) + 1, links)?;

        tracing::trace!("Replaced '{}' with {} rows", name, links.len());
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        if let Some(conn) = &self.conn {
            if !conn.is_autocommit() {
                conn.execute_batch("COMMIT")?;
            }
        }
        Ok(())
    }

    fn partition_len(&self, partition: Partition) -> StoreResult<u64> {
        let conn = self.ready()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM partition_rows WHERE partition = ?1 AND row_index > ?2",
            params![self.layout.name(partition), self.layout.header_rows],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
