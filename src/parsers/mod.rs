pub mod diagnostics;
pub mod html;
pub mod reviews;

#[cfg(test)]
mod tests;

use scraper::Html;

/// Unparsed body of one review page
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// 1-based page index the body was fetched for
    pub page: u32,
    pub body: String,
}

impl RawDocument {
    pub fn new(page: u32, body: String) -> Self {
        Self { page, body }
    }

    /// Parse the body into a navigable document tree
    pub fn parse(&self) -> Html {
        let doc = Html::parse_document(&self.body);
        if !doc.errors.is_empty() {
            ::log::trace!(
                "Page {} parsed with {} recoverable HTML errors",
                self.page,
                doc.errors.len()
            );
        }
        doc
    }
}
