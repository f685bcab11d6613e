//! HTML content extractor
//!
//! This module turns a page's markup into:
//! - An ordered sequence of typed content elements (headings, paragraphs,
//!   tables, lists)
//! - The set of same-domain links to follow
//! - Optionally, the site header and footer text
//!
//! Links are collected from the markup before navigation landmarks are
//! removed, so menu links keep the crawl connected while menu text stays out
//! of the document.

use crate::page::{ContentElement, MAX_HEADING_LEVEL};
use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Tags that start a content element
const CONTENT_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "table", "ul", "ol"];

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Content elements in document order
    pub elements: Vec<ContentElement>,

    /// Normalized same-domain links
    pub links: BTreeSet<Url>,
}

/// Header and footer text of a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteChrome {
    /// Stripped strings of the first `<header>`, navigation excluded
    pub header: Vec<String>,

    /// Stripped strings of the first `<footer>`
    pub footer: Vec<String>,
}

impl SiteChrome {
    /// Header strings as paragraphs
    pub fn header_elements(&self) -> Vec<ContentElement> {
        self.header
            .iter()
            .filter_map(|text| ContentElement::paragraph(text.as_str()))
            .collect()
    }

    /// Footer strings as paragraphs
    pub fn footer_elements(&self) -> Vec<ContentElement> {
        self.footer
            .iter()
            .filter_map(|text| ContentElement::paragraph(text.as_str()))
            .collect()
    }
}

/// Extracts content and links relative to a fixed base URL
#[derive(Debug, Clone)]
pub struct Extractor {
    base: Url,
}

impl Extractor {
    /// Creates an extractor whose same-domain filter is `base`'s authority
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Extracts content elements and links from a page
    ///
    /// # Arguments
    ///
    /// * `html` - The page markup
    /// * `page_url` - The URL the markup was fetched from, used to resolve
    ///   relative links
    ///
    /// # Example
    ///
    /// ```
    /// use site_scribe::crawler::Extractor;
    /// use url::Url;
    ///
    /// let base = Url::parse("http://ex.com/").unwrap();
    /// let extractor = Extractor::new(base.clone());
    /// let page = extractor.extract(r#"<body><h1>Hi</h1><a href="/b">b</a></body>"#, &base);
    /// assert_eq!(page.elements.len(), 1);
    /// assert_eq!(page.links.len(), 1);
    /// ```
    pub fn extract(&self, html: &str, page_url: &Url) -> Extraction {
        let mut document = Html::parse_document(html);

        let links = self.extract_links(&document, page_url);
        remove_navigation(&mut document);
        let elements = extract_elements(&document, page_url);

        Extraction { elements, links }
    }

    /// Extracts a page's content and its header/footer in one parse
    pub fn extract_with_chrome(&self, html: &str, page_url: &Url) -> (Extraction, SiteChrome) {
        let mut document = Html::parse_document(html);

        let links = self.extract_links(&document, page_url);
        // The footer keeps its navigation text, the header does not
        let footer = first_stripped_strings(&document, "footer");
        remove_navigation(&mut document);
        let chrome = SiteChrome {
            header: first_stripped_strings(&document, "header"),
            footer,
        };
        let elements = extract_elements(&document, page_url);

        (Extraction { elements, links }, chrome)
    }

    /// Collects every followable same-domain link from `<a href>` tags
    fn extract_links(&self, document: &Html, page_url: &Url) -> BTreeSet<Url> {
        let mut links = BTreeSet::new();

        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in document.select(&a_selector) {
                if let Some(href) = element.value().attr("href") {
                    match resolve_link(href, page_url, &self.base) {
                        Some(link) => {
                            links.insert(link);
                        }
                        None => tracing::trace!("Skipping link {:?} on {}", href, page_url),
                    }
                }
            }
        }

        links
    }
}

/// Detaches every `<nav>` subtree from the document
fn remove_navigation(document: &mut Html) {
    let Ok(nav_selector) = Selector::parse("nav") else {
        return;
    };

    let nav_ids: Vec<_> = document.select(&nav_selector).map(|nav| nav.id()).collect();
    for id in nav_ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Walks the body in document order and emits content elements
///
/// Once an element is taken as a content root its subtree is consumed: the
/// walk never descends into it, so nested content tags (a paragraph inside a
/// table cell, a list inside a list) are only represented by their outermost
/// content ancestor.
fn extract_elements(document: &Html, page_url: &Url) -> Vec<ContentElement> {
    let mut elements = Vec::new();

    let Some(body) = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
    else {
        return elements;
    };

    let mut stack: Vec<ElementRef> = child_elements(body).rev().collect();

    while let Some(element) = stack.pop() {
        let name = element.value().name();

        if CONTENT_TAGS.contains(&name) {
            if let Some(content) = extract_element(element, page_url) {
                elements.push(content);
            }
            continue;
        }

        stack.extend(child_elements(element).rev());
    }

    elements
}

/// Converts one content root into an element, or `None` when it is skipped
fn extract_element(element: ElementRef, page_url: &Url) -> Option<ContentElement> {
    match element.value().name() {
        "p" => ContentElement::paragraph(element_text(element)),
        "table" => {
            let table = extract_table(element);
            if table.is_none() {
                tracing::debug!("Skipping table without cells on {}", page_url);
            }
            table
        }
        "ul" => extract_list(element, false),
        "ol" => extract_list(element, true),
        name => {
            let Some(level) = heading_level(name) else {
                tracing::debug!("Skipping malformed heading <{}> on {}", name, page_url);
                return None;
            };
            let text = element_text(element);
            if text.is_empty() {
                return None;
            }
            Some(ContentElement::heading(text, level))
        }
    }
}

/// Parses the level out of a heading tag name, clamped to the maximum level
///
/// Returns `None` for anything that is not `h` followed by a level `1..=6`.
pub fn heading_level(name: &str) -> Option<u8> {
    let level: u8 = name.strip_prefix('h')?.parse().ok()?;
    if (1..=6).contains(&level) {
        Some(level.min(MAX_HEADING_LEVEL))
    } else {
        None
    }
}

/// Builds a rectangular table grid
///
/// Every `<tr>` becomes a row. The column count is the largest number of
/// `<td>`/`<th>` cells in any row; shorter rows are padded with empty cells.
/// A table with no cells at all yields `None`.
fn extract_table(table: ElementRef) -> Option<ContentElement> {
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("td, th").ok()?;

    let source_rows: Vec<Vec<String>> = table
        .select(&row_selector)
        .map(|row| row.select(&cell_selector).map(element_text).collect())
        .collect();

    let max_cols = source_rows.iter().map(Vec::len).max().unwrap_or(0);
    if max_cols == 0 {
        return None;
    }

    let rows = source_rows
        .into_iter()
        .map(|cells| {
            let mut row = vec![String::new(); max_cols];
            for (slot, cell) in row.iter_mut().zip(cells) {
                *slot = cell;
            }
            row
        })
        .collect();

    Some(ContentElement::Table { rows })
}

/// Collects the direct `<li>` children of a list, in source order
fn extract_list(list: ElementRef, ordered: bool) -> Option<ContentElement> {
    let items: Vec<String> = child_elements(list)
        .filter(|child| child.value().name() == "li")
        .map(element_text)
        .collect();

    if items.is_empty() {
        return None;
    }

    Some(ContentElement::List { items, ordered })
}

/// Captures header and footer text
fn first_stripped_strings(document: &Html, tag: &str) -> Vec<String> {
    Selector::parse(tag)
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .map(|element| {
            element
                .text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Element children of a node, in document order
fn child_elements<'a>(element: ElementRef<'a>) -> impl DoubleEndedIterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Descendant text with whitespace runs collapsed and ends trimmed
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
