use crate::analysis::CsvTable;
use crate::config::LlmConfig;
use crate::error::{Error, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Sentiment, summary and follow-up questions for one review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInsight {
    pub sentiment: String,
    pub summary: String,
    pub followup: String,
}

impl ReviewInsight {
    /// Placeholder for rows without review text
    pub fn missing() -> Self {
        Self {
            sentiment: "missing".to_string(),
            summary: "No review text provided".to_string(),
            followup: String::new(),
        }
    }

    /// Placeholder recorded when the completion call fails
    pub fn failed(error: &Error) -> Self {
        Self {
            sentiment: "error".to_string(),
            summary: format!("Processing error: {}", error),
            followup: String::new(),
        }
    }

    /// Split a three-line reply into its fields.
    ///
    /// Line 1 keeps the text after its last `:`, lines 2 and 3 the text
    /// after their first `:`. Lines without a colon give `unknown` / empty.
    pub fn from_reply(reply: &str) -> Self {
        let lines: Vec<&str> = reply.trim().split('\n').collect();

        let sentiment = lines
            .first()
            .filter(|line| line.contains(':'))
            .and_then(|line| line.rsplit(':').next())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let after_first_colon = |i: usize| {
            lines
                .get(i)
                .and_then(|line| line.split_once(':'))
                .map(|(_, rest)| rest.trim().to_string())
                .unwrap_or_default()
        };

        Self {
            sentiment,
            summary: after_first_colon(1),
            followup: after_first_colon(2),
        }
    }
}

/// Analyst system prompt naming the client
pub fn system_prompt(client_name: &str) -> String {
    format!(
        "You are a commercially aware customer service analyst for a retail execution consultant and their client {} looking out for opportunities to delight and retain clients or find new opportunities.",
        client_name
    )
}

pub fn user_prompt(review: &str) -> String {
    format!(
        "Review: \"{}\"\n\n1. What's the overall sentiment? (positive, neutral, negative)\n2. Summarize this message in three sentences giving a potential action\n3. What questions you'd follow up to give a better service or solution",
        review
    )
}

/// Sends reviews to a chat-completion endpoint one at a time
pub struct LlmAnalyzer {
    client: Client<OpenAIConfig>,
    config: LlmConfig,
}

impl LlmAnalyzer {
    pub fn new(config: LlmConfig) -> Self {
        let openai = OpenAIConfig::new()
            .with_api_key(config.api_key.clone())
            .with_api_base(config.api_base.clone());
        Self {
            client: Client::with_config(openai),
            config,
        }
    }

    /// Raw reply text for one review
    pub async fn complete(&self, review: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.config.model.as_str())
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt(&self.config.client_name))
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt(review))
                    .build()?
                    .into(),
            ])
            .temperature(self.config.temperature)
            .build()?;

        let response = self.client.chat().create(request).await?;
        ::log::debug!("Completion {} used model {}", response.id, response.model);

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(Error::EmptyCompletion)
    }

    /// Insight for one review; failures become an `error` row, never an `Err`
    pub async fn analyze_review(&self, review: &str) -> ReviewInsight {
        match self.complete(review).await {
            Ok(reply) => ReviewInsight::from_reply(&reply),
            Err(e) => {
                ::log::error!("Error processing review: {}", e);
                ReviewInsight::failed(&e)
            }
        }
    }
}

/// Annotate every row of `input` and write the result to `output`.
///
/// Returns the number of rows sent to the API.
pub async fn analyze_csv(
    analyzer: &LlmAnalyzer,
    input: &Path,
    column: &str,
    output: &Path,
) -> Result<usize> {
    let mut table = CsvTable::read(input)?;
    let index = table.column_index(column)?;
    ::log::info!("Loaded {} reviews from {}", table.rows.len(), input.display());

    let progress = progress_bar(table.rows.len() as u64);
    let mut insights = Vec::with_capacity(table.rows.len());
    let mut analyzed = 0;

    let reviews: Vec<Option<String>> = table
        .column_values(index)
        .map(|value| value.map(str::to_string))
        .collect();

    for review in reviews {
        let insight = match review {
            Some(text) => {
                analyzed += 1;
                analyzer.analyze_review(&text).await
            }
            None => ReviewInsight::missing(),
        };
        insights.push(insight);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let (mut sentiments, mut summaries, mut followups) = (Vec::new(), Vec::new(), Vec::new());
    for insight in insights {
        sentiments.push(insight.sentiment);
        summaries.push(insight.summary);
        followups.push(insight.followup);
    }
    table.push_column("sentiment", sentiments);
    table.push_column("summary", summaries);
    table.push_column("followup", followups);

    table.write(output)?;
    ::log::info!("Analysis complete. Output saved to '{}'", output.display());

    Ok(analyzed)
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}
