pub mod crawler;
pub mod fetcher;
pub mod review_pages;

#[cfg(test)]
mod tests;

pub use crawler::PageSource;
pub use fetcher::{Fetcher, PageRequest};
pub use review_pages::ReviewScraper;
