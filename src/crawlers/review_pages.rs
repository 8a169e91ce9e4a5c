use crate::config::ScraperConfig;
use crate::crawlers::crawler::PageSource;
use crate::crawlers::fetcher::Fetcher;
use crate::error::{Error, Result};
use crate::parsers::diagnostics;
use crate::parsers::reviews::{PageExtraction, ReviewExtractor};
use crate::parsers::RawDocument;
use crate::results::{ReviewRecord, ReviewTable, ScrapeReport};
use crate::utils::sample_delay;
use std::path::PathBuf;

/// Sequential page-by-page review scraper.
///
/// One page is fetched, parsed and extracted before the next is requested.
/// No per-page failure stops the run.
pub struct ReviewScraper<S: PageSource = Fetcher> {
    source: S,
    extractor: ReviewExtractor,
    pages: u32,
    delay_min_secs: f64,
    delay_max_secs: f64,
    debug_dir: Option<PathBuf>,
}

impl ReviewScraper<Fetcher> {
    /// Scraper backed by the HTTP fetcher
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Self::with_source(Fetcher::new(config)?, config)
    }
}

impl<S: PageSource> ReviewScraper<S> {
    /// Scraper reading pages from an arbitrary source
    pub fn with_source(source: S, config: &ScraperConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            extractor: ReviewExtractor::new(&config.selectors)?,
            pages: config.pages,
            delay_min_secs: config.delay_min_secs,
            delay_max_secs: config.delay_max_secs,
            debug_dir: config.debug.then(|| config.debug_dir.clone()),
        })
    }

    /// Scrape all pages and build the review table
    pub async fn scrape(&self) -> (ReviewTable, ScrapeReport) {
        let (records, report) = self.collect_records().await;
        (ReviewTable::from_records(records), report)
    }

    /// Scrape all pages, returning raw records in page order
    pub async fn collect_records(&self) -> (Vec<ReviewRecord>, ScrapeReport) {
        let mut records = Vec::new();
        let mut report = ScrapeReport::default();

        for page in 1..=self.pages {
            ::log::info!("Scraping page {}...", page);
            report.pages_attempted += 1;

            match self.source.fetch_page(page).await {
                Ok(raw) => {
                    report.pages_ok += 1;
                    let extraction = self.process_page(&raw);
                    if extraction.strategy.is_none() {
                        report.pages_without_containers += 1;
                    }
                    report.missing_dates += extraction.missing_dates;
                    report.missing_texts += extraction.missing_texts;
                    records.extend(extraction.records);
                }
                Err(Error::Status(code)) => {
                    ::log::warn!("Failed to retrieve page {}. Status code: {}", page, code);
                    report.pages_bad_status += 1;
                }
                Err(e) => {
                    ::log::error!("Error scraping page {}: {}", page, e);
                    report.pages_transport_error += 1;
                }
            }

            let delay = sample_delay(self.delay_min_secs, self.delay_max_secs);
            ::log::info!(
                "Waiting {:.2} seconds before next request...",
                delay.as_secs_f64()
            );
            tokio::time::sleep(delay).await;
        }

        report.records = records.len();
        ::log::info!(
            "Scraped {} records from {} of {} pages",
            report.records,
            report.pages_ok,
            report.pages_attempted
        );
        (records, report)
    }

    /// Parse and extract one page; the document never lives across an await
    fn process_page(&self, raw: &RawDocument) -> PageExtraction {
        let doc = raw.parse();

        if let Some(dir) = &self.debug_dir {
            if let Err(e) = diagnostics::dump_page(raw, &doc, dir) {
                ::log::warn!("Could not save debug output for page {}: {}", raw.page, e);
            }
        }

        self.extractor.extract(&doc, raw.page)
    }
}
