use std::path::Path;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use crate::model::ParsedContent;

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pages (
            id          INTEGER PRIMARY KEY,
            slug        TEXT UNIQUE NOT NULL,
            html        TEXT NOT NULL,
            imported_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS parsed_pages (
            id           INTEGER PRIMARY KEY,
            page_id      INTEGER UNIQUE NOT NULL REFERENCES pages(id),
            slug         TEXT NOT NULL,
            content      TEXT NOT NULL,
            sections     INTEGER NOT NULL,
            faqs         INTEGER NOT NULL,
            quick_links  INTEGER NOT NULL,
            processed_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_parsed_slug ON parsed_pages(slug);
        ",
    )?;
    Ok(())
}

// ── Content table ──

/// Insert or replace a page blob. A replaced blob drops its stale parse.
pub fn import_page(conn: &Connection, slug: &str, html: &str) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    let id: i64 = tx.query_row(
        "INSERT INTO pages (slug, html) VALUES (?1, ?2)
         ON CONFLICT(slug) DO UPDATE SET html = excluded.html, imported_at = datetime('now')
         RETURNING id",
        rusqlite::params![slug, html],
        |row| row.get(0),
    )?;
    tx.execute("DELETE FROM parsed_pages WHERE page_id = ?1", [id])?;
    tx.commit()?;
    Ok(id)
}

pub struct RawPage {
    pub id: i64,
    pub slug: String,
    pub html: String,
}

pub fn fetch_unprocessed(conn: &Connection, limit: Option<usize>) -> Result<Vec<RawPage>> {
    let sql = format!(
        "SELECT p.id, p.slug, p.html
         FROM pages p
         LEFT JOIN parsed_pages pp ON pp.page_id = p.id
         WHERE pp.page_id IS NULL
         ORDER BY p.id{}",
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RawPage {
                id: row.get(0)?,
                slug: row.get(1)?,
                html: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Parsed output ──

pub struct ParsedRow {
    pub page_id: i64,
    pub slug: String,
    pub content: ParsedContent,
}

pub fn save_parsed(conn: &Connection, rows: &[ParsedRow]) -> Result<()> {
    let processed_at = chrono::Utc::now().to_rfc3339();
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO parsed_pages
             (page_id, slug, content, sections, faqs, quick_links, processed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for r in rows {
            let json = serde_json::to_string(&r.content)?;
            stmt.execute(rusqlite::params![
                r.page_id,
                r.slug,
                json,
                r.content.sections.len(),
                r.content.faqs.len(),
                r.content.quick_links.len(),
                processed_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn fetch_parsed(conn: &Connection, slug: &str) -> Result<Option<ParsedContent>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT content FROM parsed_pages WHERE slug = ?1",
            [slug],
            |row| row.get(0),
        )
        .optional()?;
    match json {
        Some(j) => Ok(Some(serde_json::from_str(&j)?)),
        None => Ok(None),
    }
}

pub struct Stats {
    pub pages: i64,
    pub processed: i64,
    pub sections: i64,
    pub faqs: i64,
    pub quick_links: i64,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let pages = conn.query_row("SELECT COUNT(*) FROM pages", [], |r| r.get(0))?;
    let (processed, sections, faqs, quick_links) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(sections), 0), COALESCE(SUM(faqs), 0),
                COALESCE(SUM(quick_links), 0)
         FROM parsed_pages",
        [],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
    )?;
    Ok(Stats {
        pages,
        processed,
        sections,
        faqs,
        quick_links,
    })
}
