// Re-export modules
pub mod analysis;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod parsers;
pub mod results;
pub mod sink;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ScraperConfig;
pub use crawlers::ReviewScraper;
pub use error::{Error, Result};
pub use results::{ReviewRecord, ReviewRow, ReviewTable, ScrapeReport};
pub use sink::CorpusWriter;

use std::path::Path;

/// Builder for a review scrape of one company
pub struct Harvest {
    config: ScraperConfig,
}

impl Harvest {
    /// Create a new builder for the given company slug
    pub fn new(company: &str) -> Self {
        Self {
            config: ScraperConfig::new(company),
        }
    }

    /// Start from a configuration loaded from a JSON file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            config: ScraperConfig::from_file(path)?,
        })
    }

    /// Start from an existing configuration
    pub fn with_config(config: ScraperConfig) -> Self {
        Self { config }
    }

    /// Override the company slug
    pub fn with_company(mut self, company: &str) -> Self {
        self.config.company = company.to_string();
        self
    }

    /// Set the number of pages to fetch
    pub fn with_pages(mut self, pages: u32) -> Self {
        self.config.pages = pages;
        self
    }

    /// Skip certificate verification for every request
    pub fn with_bypass_ssl(mut self, bypass: bool) -> Self {
        self.config.bypass_ssl = bypass;
        self
    }

    /// Allow or forbid the unverified retry after a failed verified request
    pub fn with_insecure_fallback(mut self, fallback: bool) -> Self {
        self.config.insecure_fallback = fallback;
        self
    }

    /// Save raw pages and log structure diagnostics
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetch every page and return the coerced review table
    pub async fn run(self) -> Result<(ReviewTable, ScrapeReport)> {
        let scraper = ReviewScraper::from_config(&self.config)?;
        Ok(scraper.scrape().await)
    }
}
