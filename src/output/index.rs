//! SQLite search index sink
//!
//! Every crawled page is upserted into a `pages` table keyed by the URL hash,
//! so re-indexing a page replaces its row.

use crate::output::traits::{OutputResult, PageSink, ProcessedPage};
use crate::url::url_hash;
use rusqlite::{params, Connection};
use std::path::Path;

const INDEX_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL
);
"#;

/// A page matching a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: u32,
    pub url: String,
    pub title: String,
}

/// Search index backed by SQLite
pub struct SearchIndex {
    conn: Connection,
}

impl SearchIndex {
    /// Opens or creates the index database at `path`
    pub fn open(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::with_connection(conn)
    }

    /// Creates an index that lives only in memory (for testing)
    pub fn in_memory() -> OutputResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> OutputResult<Self> {
        conn.execute_batch(INDEX_SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Inserts or replaces the entry of a page
    pub fn index(&self, url: &str, title: &str, body: &str) -> OutputResult<u32> {
        let id = url_hash(url);
        self.conn.execute(
            "INSERT OR REPLACE INTO pages (id, url, title, body) VALUES (?1, ?2, ?3, ?4)",
            params![id, url, title, body],
        )?;
        tracing::debug!("Indexed {} as {}", url, id);
        Ok(id)
    }

    /// Finds pages whose title or body contains `term`
    ///
    /// Title matches rank first.
    pub fn search(&self, term: &str, limit: usize) -> OutputResult<Vec<SearchHit>> {
        let pattern = format!("%{}%", escape_like(term));
        let mut stmt = self.conn.prepare(
            "SELECT id, url, title FROM pages
             WHERE title LIKE ?1 ESCAPE '\\' OR body LIKE ?1 ESCAPE '\\'
             ORDER BY (title LIKE ?1 ESCAPE '\\') DESC, url
             LIMIT ?2",
        )?;

        let hits = stmt
            .query_map(params![pattern, limit as i64], |row| {
                Ok(SearchHit {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    title: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hits)
    }

    /// Number of indexed pages
    pub fn len(&self) -> OutputResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn is_empty(&self) -> OutputResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl PageSink for SearchIndex {
    fn name(&self) -> &'static str {
        "search index"
    }

    fn record_page(&mut self, page: &ProcessedPage<'_>) -> OutputResult<()> {
        self.index(page.url, page.title, page.body).map(|_| ())
    }
}
