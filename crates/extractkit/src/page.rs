//! Page-level bulk extractors
//!
//! Deterministic helpers that walk a whole document rather than resolving a
//! single field: links, images, and tabular data. Relative URLs are joined
//! against the content's own URL.

use crate::types::{RawContent, Record, Value};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

/// One anchor extracted from a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Link text, trimmed
    pub text: String,
    /// Absolute URL
    pub url: String,
}

/// One image extracted from a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    /// Absolute source URL
    pub src: String,
    /// Alt text, empty when absent
    pub alt: String,
    /// Title attribute, empty when absent
    pub title: String,
}

/// Extract every anchor that carries an href
///
/// Anchors whose href cannot be resolved to an absolute URL are skipped.
pub fn links(content: &RawContent) -> Vec<Link> {
    let document = Html::parse_document(&content.body);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base = Url::parse(&content.url).ok();

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let url = absolutize(base.as_ref(), href)?;
            Some(Link {
                text: element.text().collect::<String>().trim().to_string(),
                url,
            })
        })
        .collect()
}

/// Extract every image that carries a src
pub fn images(content: &RawContent) -> Vec<Image> {
    let document = Html::parse_document(&content.body);
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };
    let base = Url::parse(&content.url).ok();

    document
        .select(&selector)
        .filter_map(|element| {
            let src = element.value().attr("src")?;
            let src = absolutize(base.as_ref(), src)?;
            Some(Image {
                src,
                alt: element.value().attr("alt").unwrap_or_default().to_string(),
                title: element.value().attr("title").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Extract the first table matching the selector as ordered records
///
/// Column names come from the `thead` cells; columns beyond the header get
/// positional `column_{i}` names. Returns `None` when no table matches.
pub fn table(content: &RawContent, table_selector: &str) -> Option<Vec<Record>> {
    let document = Html::parse_document(&content.body);
    let selector = Selector::parse(table_selector).ok()?;
    let table = document.select(&selector).next()?;

    let header_selector = Selector::parse("thead th, thead td").ok()?;
    let headers: Vec<String> = table.select(&header_selector).map(cell_text).collect();

    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("td, th").ok()?;

    let mut records = Vec::new();
    for row in table.select(&row_selector) {
        if inside_thead(&row) {
            continue;
        }
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        let mut record = Record::new();
        for (i, cell) in cells.into_iter().enumerate() {
            let name = headers
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("column_{i}"));
            record.insert(name, Value::String(cell));
        }
        records.push(record);
    }

    Some(records)
}

fn cell_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn inside_thead(row: &ElementRef<'_>) -> bool {
    row.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|element| element.name() == "thead")
    })
}

fn absolutize(base: Option<&Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(|url| url.to_string()),
        None => Url::parse(href).ok().map(|url| url.to_string()),
    }
}
