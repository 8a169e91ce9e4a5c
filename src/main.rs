use clap::Parser;
use review_harvest::analysis::{lexicon, llm};
use review_harvest::config::LlmConfig;
use review_harvest::{CorpusWriter, Harvest, ReviewTable};

mod args;
use args::{Args, Command, LexiconArgs, LlmArgs, ScrapeArgs};

const DEFAULT_COMPANY: &str = "support.microsoft.com";

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command-line arguments
    let args = Args::parse();

    let result = match args.command {
        Command::Scrape(scrape_args) => scrape(scrape_args).await,
        Command::AnalyzeLlm(llm_args) => analyze_llm(llm_args).await,
        Command::AnalyzeLexicon(lexicon_args) => analyze_lexicon(lexicon_args),
    };

    if let Err(e) = result {
        ::log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn scrape(args: ScrapeArgs) -> review_harvest::Result<()> {
    let mut harvest = match &args.config {
        Some(path) => Harvest::from_config_file(path)?,
        None => Harvest::new(DEFAULT_COMPANY),
    };
    if let Some(company) = &args.company {
        harvest = harvest.with_company(company);
    }
    if let Some(pages) = args.pages {
        harvest = harvest.with_pages(pages);
    }
    if args.bypass_ssl {
        harvest = harvest.with_bypass_ssl(true);
    }
    if args.no_insecure_fallback {
        harvest = harvest.with_insecure_fallback(false);
    }
    if args.debug {
        harvest = harvest.with_debug(true);
    }

    println!(
        "Starting to scrape Trustpilot reviews for {}...",
        harvest.config().company
    );
    let start_time = std::time::Instant::now();
    let (table, report) = harvest.run().await?;

    println!(
        "\nSuccessfully scraped {} reviews in {:.2} seconds.",
        table.len(),
        start_time.elapsed().as_secs_f64()
    );
    ::log::debug!("{:?}", report);

    if table.is_empty() {
        println!("\nNo reviews were scraped. Check the debug HTML files to analyze the page structure.");
        return Ok(());
    }

    println!("\nSample of the data:");
    print_sample(&table);

    let summary = CorpusWriter::new(&args.output).write(&table, &args.name)?;
    println!(
        "\nScraping and saving to {} complete! ({} review files)",
        summary.folder.display(),
        summary.review_files.len()
    );
    Ok(())
}

fn print_sample(table: &ReviewTable) {
    println!("{:<4} {:<20} Review Text", "", "Date");
    for (i, row) in table.head(5).iter().enumerate() {
        let date = row
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "NaT".to_string());
        let text: String = row.text.as_deref().unwrap_or("None").chars().take(60).collect();
        println!("{:<4} {:<20} {}", i, date, text);
    }
}

async fn analyze_llm(args: LlmArgs) -> review_harvest::Result<()> {
    let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
        review_harvest::Error::Config("OPENAI_API_KEY is not set".to_string())
    })?;

    let mut config = LlmConfig::new(api_key);
    config.model = args.model;
    config.client_name = args.client;
    config.temperature = args.temperature;
    if let Some(api_base) = args.api_base {
        config.api_base = api_base;
    }

    let analyzer = llm::LlmAnalyzer::new(config);
    let analyzed = llm::analyze_csv(&analyzer, &args.input, &args.column, &args.output).await?;
    println!(
        "Analysis complete. {} reviews sent for analysis. Output saved to '{}'.",
        analyzed,
        args.output.display()
    );
    Ok(())
}

fn analyze_lexicon(args: LexiconArgs) -> review_harvest::Result<()> {
    let report = lexicon::analyze_csv(&args.input, &args.column, &args.output, args.top)?;

    println!("\nSentiment Distribution:");
    for (label, count) in &report.distribution {
        println!("{:<10} {}", label.to_string(), count);
    }

    println!("\nTop {} Terms Overall:", args.top);
    for (term, count) in &report.top_overall {
        println!("{}: {}", term, count);
    }

    for (label, terms) in &report.top_by_label {
        println!("\nTop {} Terms in {} Reviews:", args.top, label);
        for (term, count) in terms {
            println!("{}: {}", term, count);
        }
    }

    println!(
        "\nAnalysis complete! {} rows saved to '{}'",
        report.rows,
        args.output.display()
    );
    Ok(())
}
