use crate::error::Result;
use crate::parsers::html::compile;
use crate::parsers::RawDocument;
use scraper::Html;
use std::fs;
use std::path::{Path, PathBuf};

/// What the debug dump found on a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStructure {
    pub time_elements: usize,
    pub first_time_element: Option<String>,
    pub candidate_containers: usize,
    /// Class attributes of the first three candidate containers
    pub candidate_classes: Vec<String>,
}

/// Summarise the parts of a page the extractor cares about
pub fn page_structure(doc: &Html) -> Result<PageStructure> {
    let time = compile("time")?;
    let div = compile("div[class]")?;

    let times: Vec<_> = doc.select(&time).collect();
    let candidates: Vec<_> = doc
        .select(&div)
        .filter(|el| {
            let class = el.value().attr("class").unwrap_or_default().to_lowercase();
            class.contains("card") || class.contains("review")
        })
        .collect();

    Ok(PageStructure {
        time_elements: times.len(),
        first_time_element: times.first().map(|el| el.html()),
        candidate_containers: candidates.len(),
        candidate_classes: candidates
            .iter()
            .take(3)
            .filter_map(|el| el.value().attr("class").map(str::to_string))
            .collect(),
    })
}

/// Save the raw page and log its structure summary
pub fn dump_page(raw: &RawDocument, doc: &Html, debug_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(debug_dir)?;
    let path = debug_dir.join(format!("trustpilot_page_{}.html", raw.page));
    fs::write(&path, &raw.body)?;
    ::log::info!("Saved page {} HTML to {} for debugging", raw.page, path.display());

    let structure = page_structure(doc)?;
    ::log::info!("Found {} time elements", structure.time_elements);
    if let Some(sample) = &structure.first_time_element {
        ::log::info!("Sample time element: {}", sample);
    }
    ::log::info!(
        "Found {} potential review containers",
        structure.candidate_containers
    );
    for (i, class) in structure.candidate_classes.iter().enumerate() {
        ::log::info!("Container {}: {}", i + 1, class);
    }

    Ok(path)
}
