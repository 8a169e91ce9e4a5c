use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Longest pause allowed between two page requests
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Configuration for the review page scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Company slug as it appears in the review site URL (e.g. `support.microsoft.com`)
    pub company: String,

    /// Number of pages to fetch, starting at page 1
    #[serde(default = "default_pages")]
    pub pages: u32,

    /// URL template; `{company}` and `{page}` are substituted per request
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Fixed request headers
    #[serde(default)]
    pub headers: RequestHeaders,

    /// Skip certificate verification entirely
    #[serde(default)]
    pub bypass_ssl: bool,

    /// Retry once without verification when the verified request fails
    #[serde(default = "default_insecure_fallback")]
    pub insecure_fallback: bool,

    /// Extra PEM bundle trusted in addition to the built-in roots
    #[serde(default)]
    pub ca_bundle: Option<PathBuf>,

    /// Optional per-request timeout; unset means wait forever
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Lower bound of the delay between page requests
    #[serde(default = "default_delay_min")]
    pub delay_min_secs: f64,

    /// Upper bound of the delay between page requests
    #[serde(default = "default_delay_max")]
    pub delay_max_secs: f64,

    /// Save raw pages and log structure diagnostics
    #[serde(default)]
    pub debug: bool,

    /// Directory receiving `trustpilot_page_<N>.html` in debug mode
    #[serde(default = "default_debug_dir")]
    pub debug_dir: PathBuf,

    /// Class names and marker attributes used by the extractor
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Header set sent with every page request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestHeaders {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub referer: String,
}

impl Default for RequestHeaders {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: "https://www.google.com/".to_string(),
        }
    }
}

/// Markup hooks for the container and field cascades.
///
/// The review site ships hashed class names that change between deploys,
/// so every hook can be overridden from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Exact class token of the review card wrapper
    pub card_class: String,
    /// Substring of the class of the card's inner header
    pub inner_header_marker: String,
    /// Substring an ancestor's class must contain to count as a card (case-insensitive)
    pub card_ancestor_marker: String,
    /// Boolean marker attribute on the review's `<time>` element
    pub date_marker_attr: String,
    /// Full class attribute of the review text paragraph
    pub text_class: String,
    /// Boolean marker attribute on the review text paragraph
    pub text_marker_attr: String,
    /// Substring of the class of the review text paragraph
    pub text_class_marker: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card_class: "styles_cardWrapper__LcCPA".to_string(),
            inner_header_marker: "styles_reviewCardInnerHeader".to_string(),
            card_ancestor_marker: "card".to_string(),
            date_marker_attr: "data-service-review-date-time-ago".to_string(),
            text_class: "typography_body-l__v5JLj typography_appearance-default__t8iAq"
                .to_string(),
            text_marker_attr: "data-service-review-text-typography".to_string(),
            text_class_marker: "typography_body-l__v5JLj".to_string(),
        }
    }
}

/// Configuration for the completion-API analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; never read from the environment inside the library
    #[serde(skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Client named in the analyst system prompt
    #[serde(default = "default_client_name")]
    pub client_name: String,
}

/// Default number of pages
fn default_pages() -> u32 {
    3
}

fn default_url_template() -> String {
    "https://www.trustpilot.com/review/{company}?page={page}".to_string()
}

fn default_insecure_fallback() -> bool {
    true
}

fn default_delay_min() -> f64 {
    2.0
}

fn default_delay_max() -> f64 {
    5.0
}

fn default_debug_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_client_name() -> String {
    "Amazon".to_string()
}

impl ScraperConfig {
    /// Create a new configuration with default values
    pub fn new(company: &str) -> Self {
        Self {
            company: company.to_string(),
            pages: default_pages(),
            url_template: default_url_template(),
            headers: RequestHeaders::default(),
            bypass_ssl: false,
            insecure_fallback: default_insecure_fallback(),
            ca_bundle: None,
            request_timeout_secs: None,
            delay_min_secs: default_delay_min(),
            delay_max_secs: default_delay_max(),
            debug: false,
            debug_dir: default_debug_dir(),
            selectors: SelectorConfig::default(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.url_template.contains("{page}") {
            return Err(Error::Config(format!(
                "url_template '{}' has no {{page}} placeholder",
                self.url_template
            )));
        }
        let (min, max) = (self.delay_min_secs, self.delay_max_secs);
        if !(0.0..=MAX_DELAY_SECS).contains(&min) || !(min..=MAX_DELAY_SECS).contains(&max) {
            return Err(Error::Config(format!(
                "invalid delay range {}..{}",
                self.delay_min_secs, self.delay_max_secs
            )));
        }
        Ok(())
    }
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            client_name: default_client_name(),
        }
    }
}
