//! SQLite document sink
//!
//! This module stores the assembled document relationally: sections,
//! their elements, table cells and list items. Everything is written inside a
//! single transaction that is committed by `finalize`, so an interrupted
//! crawl leaves no partial document behind.

use crate::output::schema::initialize_schema;
use crate::output::traits::{DocumentSink, OutputError, OutputResult};
use crate::page::ContentElement;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// Sink that writes the document into a SQLite database
pub struct SqliteSink {
    conn: Connection,
    next_position: i64,
    finalized: bool,
}

impl SqliteSink {
    /// Opens (or creates) the database at `path` and starts the document
    /// transaction
    pub fn new(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> OutputResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> OutputResult<Self> {
        initialize_schema(&conn)?;

        let next_position: i64 =
            conn.query_row("SELECT COALESCE(MAX(position), -1) + 1 FROM sections", [], |row| {
                row.get(0)
            })?;

        conn.execute_batch("BEGIN")?;

        Ok(Self {
            conn,
            next_position,
            finalized: false,
        })
    }

    fn insert_section(
        &mut self,
        title: &str,
        page_url: Option<&str>,
        elements: &[ContentElement],
    ) -> OutputResult<()> {
        if self.finalized {
            return Err(OutputError::AlreadyFinalized);
        }

        self.conn.execute(
            "INSERT INTO sections (position, title, page_url, appended_at) VALUES (?1, ?2, ?3, ?4)",
            params![self.next_position, title, page_url, Utc::now().to_rfc3339()],
        )?;
        let section_id = self.conn.last_insert_rowid();
        self.next_position += 1;

        for (position, element) in elements.iter().enumerate() {
            self.insert_element(section_id, position as i64, element)?;
        }

        Ok(())
    }

    fn insert_element(
        &self,
        section_id: i64,
        position: i64,
        element: &ContentElement,
    ) -> OutputResult<()> {
        let (text, level, ordered) = match element {
            ContentElement::Heading { text, level } => (Some(text.as_str()), Some(*level), None),
            ContentElement::Paragraph { text } => (Some(text.as_str()), None, None),
            ContentElement::Table { .. } => (None, None, None),
            ContentElement::List { ordered, .. } => (None, None, Some(*ordered)),
        };

        self.conn.execute(
            "INSERT INTO elements (section_id, position, kind, text, level, ordered)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![section_id, position, element.kind(), text, level, ordered],
        )?;
        let element_id = self.conn.last_insert_rowid();

        match element {
            ContentElement::Table { rows } => {
                let mut stmt = self.conn.prepare_cached(
                    "INSERT INTO table_cells (element_id, row_index, col_index, text)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for (row_index, row) in rows.iter().enumerate() {
                    for (col_index, cell) in row.iter().enumerate() {
                        stmt.execute(params![
                            element_id,
                            row_index as i64,
                            col_index as i64,
                            cell
                        ])?;
                    }
                }
            }
            ContentElement::List { items, .. } => {
                let mut stmt = self.conn.prepare_cached(
                    "INSERT INTO list_items (element_id, position, text) VALUES (?1, ?2, ?3)",
                )?;
                for (position, item) in items.iter().enumerate() {
                    stmt.execute(params![element_id, position as i64, item])?;
                }
            }
            _ => {}
        }

        Ok(())
    }
}

impl DocumentSink for SqliteSink {
    fn append_section(&mut self, title: &str, elements: &[ContentElement]) -> OutputResult<()> {
        self.insert_section(title, None, elements)
    }

    fn append(&mut self, page_url: &str, elements: &[ContentElement]) -> OutputResult<()> {
        self.insert_section(&format!("Page: {}", page_url), Some(page_url), elements)
    }

    fn finalize(&mut self) -> OutputResult<()> {
        if self.finalized {
            return Err(OutputError::AlreadyFinalized);
        }

        self.conn.execute_batch("COMMIT")?;
        self.finalized = true;

        tracing::info!("Document committed ({} sections)", self.next_position);
        Ok(())
    }
}
