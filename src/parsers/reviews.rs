//! Review extraction from a parsed page.
//!
//! The review site's markup changes often, so both container discovery and
//! field extraction run a cascade: the most specific selector first, then
//! looser structural or substring matches. Nothing here fails on missing
//! markup; absent fields come back as `None`.

use crate::config::SelectorConfig;
use crate::error::Result;
use crate::parsers::html::{class_contains, compile, element_text, nearest_ancestor, sample};
use crate::results::ReviewRecord;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Characters of markup logged when a page yields no containers
const SAMPLE_CHARS: usize = 1000;

/// Container discovery strategies, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStrategy {
    /// `div` carrying the card wrapper class
    PrimaryClass,
    /// Parent `div` of each inner card header
    InnerHeaderParent,
    /// Nearest "card" `div` above each marked `<time>`
    DateMarkerAncestor,
}

impl ContainerStrategy {
    pub const CASCADE: [ContainerStrategy; 3] = [
        ContainerStrategy::PrimaryClass,
        ContainerStrategy::InnerHeaderParent,
        ContainerStrategy::DateMarkerAncestor,
    ];
}

/// Outcome of running the extractor over one page
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    /// Strategy that produced the containers, if any did
    pub strategy: Option<ContainerStrategy>,
    pub records: Vec<ReviewRecord>,
    pub missing_dates: usize,
    pub missing_texts: usize,
    /// Leading markup of the page, kept when no strategy found containers
    pub markup_sample: Option<String>,
}

/// Compiled selectors for the container and field cascades
#[derive(Debug, Clone)]
pub struct ReviewExtractor {
    card: Selector,
    inner_header: Selector,
    marked_time: Selector,
    any_time: Selector,
    text_exact: Selector,
    text_marked: Selector,
    text_partial: Selector,
    card_ancestor_marker: String,
}

impl ReviewExtractor {
    pub fn new(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            card: compile(&format!("div.{}", config.card_class))?,
            inner_header: compile(&format!(
                r#"div[class*="{}"]"#,
                config.inner_header_marker
            ))?,
            marked_time: compile(&format!(r#"time[{}="true"]"#, config.date_marker_attr))?,
            any_time: compile("time[datetime]")?,
            text_exact: compile(&format!(r#"p[class="{}"]"#, config.text_class))?,
            text_marked: compile(&format!(r#"p[{}="true"]"#, config.text_marker_attr))?,
            text_partial: compile(&format!(r#"p[class*="{}"]"#, config.text_class_marker))?,
            card_ancestor_marker: config.card_ancestor_marker.clone(),
        })
    }

    /// Extract every review on a page
    pub fn extract(&self, doc: &Html, page: u32) -> PageExtraction {
        let Some((strategy, containers)) = self.find_containers(doc) else {
            let markup = sample(doc, SAMPLE_CHARS);
            ::log::warn!("Could not find review cards with any selector on page {}", page);
            ::log::warn!("Sample of HTML received:\n{}", markup);
            return PageExtraction {
                markup_sample: Some(markup),
                ..PageExtraction::default()
            };
        };

        ::log::info!(
            "Found {} reviews on page {} ({:?})",
            containers.len(),
            page,
            strategy
        );

        let mut extraction = PageExtraction {
            strategy: Some(strategy),
            ..PageExtraction::default()
        };

        for container in containers {
            let date = self.extract_date(container);
            if date.is_none() {
                ::log::warn!("Could not find date element on page {}", page);
                extraction.missing_dates += 1;
            }

            let text = self.extract_text(container);
            if text.is_none() {
                ::log::warn!(
                    "Could not find review text with any of the selectors on page {}",
                    page
                );
                extraction.missing_texts += 1;
            }

            extraction.records.push(ReviewRecord::new(date, text));
        }

        extraction
    }

    /// Run the container cascade; first strategy with results wins
    pub fn find_containers<'a>(
        &self,
        doc: &'a Html,
    ) -> Option<(ContainerStrategy, Vec<ElementRef<'a>>)> {
        ContainerStrategy::CASCADE.into_iter().find_map(|strategy| {
            let containers = self.run_strategy(strategy, doc);
            if containers.is_empty() {
                ::log::debug!("Container strategy {:?} matched nothing", strategy);
                None
            } else {
                Some((strategy, containers))
            }
        })
    }

    /// Containers found by a single strategy, in document order without duplicates
    pub fn run_strategy<'a>(&self, strategy: ContainerStrategy, doc: &'a Html) -> Vec<ElementRef<'a>> {
        match strategy {
            ContainerStrategy::PrimaryClass => doc.select(&self.card).collect(),
            ContainerStrategy::InnerHeaderParent => dedup(
                doc.select(&self.inner_header)
                    .filter_map(|header| nearest_ancestor(header, "div", |_| true)),
            ),
            ContainerStrategy::DateMarkerAncestor => {
                let marker = self.card_ancestor_marker.as_str();
                dedup(doc.select(&self.marked_time).filter_map(|time| {
                    nearest_ancestor(time, "div", |div| class_contains(div, marker, true))
                }))
            }
        }
    }

    /// Marked `<time>` first, then any `<time>` with a `datetime` attribute
    pub fn extract_date(&self, container: ElementRef<'_>) -> Option<String> {
        container
            .select(&self.marked_time)
            .next()
            .and_then(|time| time.value().attr("datetime"))
            .or_else(|| {
                container
                    .select(&self.any_time)
                    .next()
                    .and_then(|time| time.value().attr("datetime"))
            })
            .map(str::to_string)
    }

    /// Exact class, then marker attribute, then class substring
    pub fn extract_text(&self, container: ElementRef<'_>) -> Option<String> {
        [&self.text_exact, &self.text_marked, &self.text_partial]
            .into_iter()
            .find_map(|selector| container.select(selector).next())
            .map(element_text)
    }
}

fn dedup<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Vec<ElementRef<'a>> {
    let mut seen = HashSet::new();
    elements.filter(|el| seen.insert(el.id())).collect()
}
