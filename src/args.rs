use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "review-harvest")]
#[command(about = "Scrape customer reviews and analyse their sentiment")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape review pages into a corpus folder
    Scrape(ScrapeArgs),

    /// Annotate a review CSV using a chat-completion API
    AnalyzeLlm(LlmArgs),

    /// Score a review CSV with the built-in sentiment lexicon
    AnalyzeLexicon(LexiconArgs),
}

#[derive(clap::Args, Debug)]
pub struct ScrapeArgs {
    /// Company slug as it appears in the review URL [default: support.microsoft.com]
    #[arg(short, long)]
    pub company: Option<String>,

    /// Folder name for the corpus output
    #[arg(short, long, default_value = "microsoft_support")]
    pub name: String,

    /// Number of pages to scrape
    #[arg(short, long)]
    pub pages: Option<u32>,

    /// Disable certificate verification
    #[arg(long)]
    pub bypass_ssl: bool,

    /// Do not retry without verification after a failed request
    #[arg(long)]
    pub no_insecure_fallback: bool,

    /// Save raw pages and log their structure
    #[arg(short, long)]
    pub debug: bool,

    /// Root directory for corpus folders
    #[arg(short, long, default_value = "Corpus")]
    pub output: PathBuf,

    /// JSON configuration file (CLI flags take precedence)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct LlmArgs {
    /// Input CSV
    #[arg(short, long)]
    pub input: PathBuf,

    /// Column holding the review text
    #[arg(long, default_value = "Review Text")]
    pub column: String,

    /// Output CSV
    #[arg(short, long, default_value = "Data/output/agentic_analyzed_reviews.csv")]
    pub output: PathBuf,

    #[arg(long, default_value = "gpt-4")]
    pub model: String,

    /// Client named in the analyst prompt
    #[arg(long, default_value = "Amazon")]
    pub client: String,

    #[arg(long, default_value_t = 0.2)]
    pub temperature: f32,

    /// Override the API base URL
    #[arg(long)]
    pub api_base: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct LexiconArgs {
    /// Input CSV
    #[arg(short, long)]
    pub input: PathBuf,

    /// Column holding the review text
    #[arg(long, default_value = "Review Text")]
    pub column: String,

    /// Output CSV
    #[arg(short, long, default_value = "analyzed_reviews.csv")]
    pub output: PathBuf,

    /// Number of frequent terms to list
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}
