/// Highest heading level emitted; deeper headings are clamped to it
pub const MAX_HEADING_LEVEL: u8 = 4;

/// One typed unit of extracted page structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentElement {
    /// A heading, `level` in `1..=MAX_HEADING_LEVEL`
    Heading { text: String, level: u8 },

    /// A paragraph with non-empty text
    Paragraph { text: String },

    /// A rectangular grid of cell texts; short source rows are padded with
    /// empty strings
    Table { rows: Vec<Vec<String>> },

    /// List item texts in source order
    List { items: Vec<String>, ordered: bool },
}

impl ContentElement {
    /// Creates a heading, clamping the level into `1..=MAX_HEADING_LEVEL`
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self::Heading {
            text: text.into(),
            level: level.clamp(1, MAX_HEADING_LEVEL),
        }
    }

    /// Creates a paragraph, or `None` if the text is blank
    pub fn paragraph(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::Paragraph {
                text: trimmed.to_string(),
            })
        }
    }

    /// Short lowercase name of the element kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Heading { .. } => "heading",
            Self::Paragraph { .. } => "paragraph",
            Self::Table { .. } => "table",
            Self::List { .. } => "list",
        }
    }
}
