//! Markdown document sink
//!
//! This module renders crawled content as one Markdown document: a top-level
//! heading per section, content headings, paragraphs, pipe tables and
//! bullet/numbered lists, with a horizontal rule closing every section.

use crate::output::traits::{DocumentSink, OutputError, OutputResult};
use crate::page::ContentElement;
use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sink that accumulates Markdown in memory and writes it on finalize
pub struct MarkdownSink {
    path: PathBuf,
    document: String,
    finalized: bool,
}

impl MarkdownSink {
    /// Creates a sink that will write to `path`
    ///
    /// Nothing touches the filesystem until [`DocumentSink::finalize`].
    pub fn new(path: &Path) -> Self {
        let mut document = String::new();
        document.push_str(&format!(
            "_Generated by site-scribe on {}_\n\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));

        Self {
            path: path.to_path_buf(),
            document,
            finalized: false,
        }
    }

    /// The document rendered so far
    pub fn document(&self) -> &str {
        &self.document
    }
}

impl DocumentSink for MarkdownSink {
    fn append_section(&mut self, title: &str, elements: &[ContentElement]) -> OutputResult<()> {
        if self.finalized {
            return Err(OutputError::AlreadyFinalized);
        }

        self.document.push_str(&format!("# {}\n\n", escape_inline(title)));
        for element in elements {
            format_element(&mut self.document, element);
        }
        self.document.push_str("---\n\n");

        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        if self.finalized {
            return Err(OutputError::AlreadyFinalized);
        }

        let mut file = File::create(&self.path)?;
        file.write_all(self.document.as_bytes())?;
        file.flush()?;
        self.finalized = true;

        tracing::info!("Document written to {}", self.path.display());
        Ok(())
    }
}

/// Formats one content element as Markdown
///
/// Content headings sit one level below the section title, so a page's
/// `<h1>` becomes `##`.
pub fn format_element(md: &mut String, element: &ContentElement) {
    match element {
        ContentElement::Heading { text, level } => {
            let hashes = "#".repeat(usize::from(*level) + 1);
            md.push_str(&format!("{} {}\n\n", hashes, escape_inline(text)));
        }
        ContentElement::Paragraph { text } => {
            md.push_str(&format!("{}\n\n", escape_inline(text)));
        }
        ContentElement::Table { rows } => {
            format_table(md, rows);
        }
        ContentElement::List { items, ordered } => {
            for (i, item) in items.iter().enumerate() {
                if *ordered {
                    md.push_str(&format!("{}. {}\n", i + 1, escape_inline(item)));
                } else {
                    md.push_str(&format!("- {}\n", escape_inline(item)));
                }
            }
            md.push('\n');
        }
    }
}

/// Formats a grid as a pipe table, the first row acting as the header
fn format_table(md: &mut String, rows: &[Vec<String>]) {
    let Some(header) = rows.first() else {
        return;
    };

    let row_line = |cells: &[String]| {
        let cells: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
        format!("| {} |\n", cells.join(" | "))
    };

    md.push_str(&row_line(header.as_slice()));
    md.push_str(&format!("|{}\n", "---|".repeat(header.len())));
    for row in &rows[1..] {
        md.push_str(&row_line(row.as_slice()));
    }
    md.push('\n');
}

/// Keeps extracted text on one line and stops a leading block marker
/// (`#`, `>`, `-`, `+`, `*`, `=`, `1.`, `1)`) from restructuring the document
fn escape_inline(text: &str) -> String {
    let line = text.replace(['\n', '\r'], " ");

    if line.starts_with(['#', '>', '-', '+', '*', '=']) {
        return format!("\\{}", line);
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && line[digits..].starts_with(['.', ')']) {
        return format!("{}\\{}", &line[..digits], &line[digits..]);
    }

    line
}

fn escape_cell(text: &str) -> String {
    escape_inline(text).replace('|', "\\|")
}
