//! Selector resolution engine
//!
//! Resolves a [`FieldLocator`] against parsed content: candidate rules are
//! tried in declared order and the first rule matching a non-empty node
//! wins. Absence is a normal, representable outcome: `None`, never an
//! error. An invalid selector in a rule is treated as a non-match so a bad
//! candidate cannot poison the rest of the chain.

use crate::types::{FieldLocator, LocatorRule, RawContent};
use scraper::{Html, Selector};

/// Resolves locators against one parsed document
///
/// Parses the document once on construction; prefer this over the free
/// [`resolve`] function when resolving several fields against the same
/// content.
pub struct Resolver {
    document: Html,
}

impl Resolver {
    /// Parse the content's body
    pub fn new(content: &RawContent) -> Self {
        Self {
            document: Html::parse_document(&content.body),
        }
    }

    /// Resolve a locator to the first matching non-empty text
    ///
    /// Pure function of the parsed document and the locator: identical
    /// inputs always produce identical output.
    pub fn resolve(&self, locator: &FieldLocator) -> Option<String> {
        locator.rules().iter().find_map(|rule| self.apply(rule))
    }

    fn apply(&self, rule: &LocatorRule) -> Option<String> {
        match rule {
            LocatorRule::Text { selector } => {
                let selector = Selector::parse(selector).ok()?;
                self.document.select(&selector).find_map(|element| {
                    let text = element.text().collect::<String>().trim().to_string();
                    (!text.is_empty()).then_some(text)
                })
            }
            LocatorRule::Attr { selector, attr } => {
                let selector = Selector::parse(selector).ok()?;
                self.document.select(&selector).find_map(|element| {
                    element
                        .value()
                        .attr(attr)
                        .map(str::trim)
                        .filter(|value| !value.is_empty())
                        .map(String::from)
                })
            }
        }
    }
}

/// Resolve a single locator against content
pub fn resolve(content: &RawContent, locator: &FieldLocator) -> Option<String> {
    Resolver::new(content).resolve(locator)
}
