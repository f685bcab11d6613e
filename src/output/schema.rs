//! Database schema for the SQLite document sink

/// SQL schema for the document database
pub const SCHEMA_SQL: &str = r#"
-- One row per appended section (header, footer or page)
CREATE TABLE IF NOT EXISTS sections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    position INTEGER NOT NULL,
    title TEXT NOT NULL,
    page_url TEXT,
    appended_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sections_position ON sections(position);

-- Content elements in document order within their section
CREATE TABLE IF NOT EXISTS elements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    section_id INTEGER NOT NULL REFERENCES sections(id),
    position INTEGER NOT NULL,
    kind TEXT NOT NULL,
    text TEXT,
    level INTEGER,
    ordered INTEGER
);

CREATE INDEX IF NOT EXISTS idx_elements_section ON elements(section_id);

-- Table grids, one row per cell
CREATE TABLE IF NOT EXISTS table_cells (
    element_id INTEGER NOT NULL REFERENCES elements(id),
    row_index INTEGER NOT NULL,
    col_index INTEGER NOT NULL,
    text TEXT NOT NULL,
    PRIMARY KEY (element_id, row_index, col_index)
);

-- List items in source order
CREATE TABLE IF NOT EXISTS list_items (
    element_id INTEGER NOT NULL REFERENCES elements(id),
    position INTEGER NOT NULL,
    text TEXT NOT NULL,
    PRIMARY KEY (element_id, position)
);
"#;

/// Initializes the database schema
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
