use crate::error::Result;
use crate::results::{ReviewRow, ReviewTable};
use crate::utils::sanitize_filename;
use csv::{QuoteStyle, WriterBuilder};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Where a corpus export ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusSummary {
    pub folder: PathBuf,
    pub csv_path: PathBuf,
    pub review_files: Vec<PathBuf>,
}

/// Writes a review table into `<root>/<company>/`
pub struct CorpusWriter {
    root: PathBuf,
}

impl CorpusWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write one text file per review with text, plus the combined CSV.
    ///
    /// Rerunning with the same table overwrites every file.
    pub fn write(&self, table: &ReviewTable, company_name: &str) -> Result<CorpusSummary> {
        let company_name = sanitize_filename(company_name);
        let folder = self.root.join(&company_name);
        fs::create_dir_all(&folder)?;

        let mut review_files = Vec::new();
        for (index, row) in table.rows().iter().enumerate() {
            if let Some(path) = write_review_file(&folder, index + 1, row)? {
                ::log::info!("Saved review to {}", path.display());
                review_files.push(path);
            }
        }

        let csv_path = folder.join(format!("{}_reviews.csv", company_name));
        write_combined_csv(&csv_path, table)?;
        ::log::info!("Saved combined reviews to {}", csv_path.display());

        Ok(CorpusSummary {
            folder,
            csv_path,
            review_files,
        })
    }
}

/// `review_<position>_<date>.txt`; nothing is written for rows without text
fn write_review_file(folder: &Path, position: usize, row: &ReviewRow) -> Result<Option<PathBuf>> {
    let Some(text) = &row.text else {
        return Ok(None);
    };

    let path = folder.join(format!("review_{}_{}.txt", position, row.date_slug()));
    let mut file = File::create(&path)?;
    write!(file, "Date: {}\n\n{}", row.date_display(), text)?;
    Ok(Some(path))
}

/// Every field quoted, UTF-8 with a BOM so spreadsheet tools keep non-ASCII text
pub fn write_combined_csv(path: &Path, table: &ReviewTable) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(file);

    let date_format = if table.dates_are_day_only() {
        "%Y-%m-%d"
    } else {
        "%Y-%m-%d %H:%M:%S"
    };

    wtr.write_record(["Date", "Review Text"])?;
    for row in table.rows() {
        let date = row
            .date
            .map(|d| d.format(date_format).to_string())
            .unwrap_or_default();
        wtr.write_record([date.as_str(), row.text.as_deref().unwrap_or_default()])?;
    }
    wtr.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use crate::parsers::RawDocument;
    use crate::parsers::reviews::ReviewExtractor;
    use crate::results::ReviewRecord;

    fn read_csv(path: &Path) -> Vec<Vec<String>> {
        let contents = fs::read_to_string(path).unwrap();
        let contents = contents.strip_prefix('\u{feff}').expect("missing BOM");
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(contents.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_single_review_export() {
        let dir = tempfile::tempdir().unwrap();
        let table = ReviewTable::from_records(vec![ReviewRecord::new(
            Some("2024-01-15".into()),
            Some("Great service".into()),
        )]);

        let summary = CorpusWriter::new(dir.path()).write(&table, "acme").unwrap();

        let review = dir.path().join("acme").join("review_1_2024-01-15.txt");
        assert_eq!(summary.review_files, vec![review.clone()]);
        assert_eq!(
            fs::read_to_string(review).unwrap(),
            "Date: 2024-01-15 00:00:00\n\nGreat service"
        );

        assert_eq!(summary.csv_path, dir.path().join("acme").join("acme_reviews.csv"));
        let raw = fs::read_to_string(&summary.csv_path).unwrap();
        assert!(raw.starts_with("\u{feff}\"Date\",\"Review Text\""));
        assert_eq!(
            read_csv(&summary.csv_path),
            vec![
                vec!["Date".to_string(), "Review Text".to_string()],
                vec!["2024-01-15".to_string(), "Great service".to_string()],
            ]
        );
    }

    #[test]
    fn test_unknown_date_and_missing_text() {
        let dir = tempfile::tempdir().unwrap();
        let table = ReviewTable::from_records(vec![
            ReviewRecord::new(Some("2024-02-01T12:30:00Z".into()), None),
            ReviewRecord::new(None, Some("ok".into())),
        ]);

        let summary = CorpusWriter::new(dir.path()).write(&table, "acme").unwrap();

        // the dated row has no text, so only the second row gets a file
        assert_eq!(
            summary.review_files,
            vec![dir.path().join("acme").join("review_2_unknown_date.txt")]
        );
        assert!(!dir.path().join("acme").join("review_1_2024-02-01.txt").exists());
        assert_eq!(
            fs::read_to_string(&summary.review_files[0]).unwrap(),
            "Date: unknown\n\nok"
        );

        let rows = read_csv(&summary.csv_path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["2024-02-01 12:30:00".to_string(), String::new()]);
        assert_eq!(rows[2], vec![String::new(), "ok".to_string()]);
        let raw = fs::read_to_string(&summary.csv_path).unwrap();
        assert!(raw.contains("\"\",\"ok\""));
    }

    #[test]
    fn test_text_with_delimiters_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let text = "Slow, \"careless\"\nand rude. Ünïcödé ✓";
        let html = format!(
            r#"<div class="styles_cardWrapper__LcCPA">
                 <time datetime="2024-03-03" data-service-review-date-time-ago="true"></time>
                 <p data-service-review-text-typography="true">
                 {}
                 </p>
               </div>"#,
            text
        );
        let doc = RawDocument::new(1, html).parse();
        let extraction = ReviewExtractor::new(&SelectorConfig::default())
            .unwrap()
            .extract(&doc, 1);
        let table = ReviewTable::from_records(extraction.records);

        let summary = CorpusWriter::new(dir.path()).write(&table, "acme").unwrap();

        let rows = read_csv(&summary.csv_path);
        assert_eq!(rows[1], vec!["2024-03-03".to_string(), text.to_string()]);
        assert_eq!(
            fs::read_to_string(&summary.review_files[0]).unwrap(),
            format!("Date: 2024-03-03 00:00:00\n\n{}", text)
        );
    }

    #[test]
    fn test_rewrite_overwrites_instead_of_duplicating() {
        let dir = tempfile::tempdir().unwrap();
        let table = ReviewTable::from_records(vec![
            ReviewRecord::new(Some("2024-01-15".into()), Some("a".into())),
            ReviewRecord::new(Some("2024-01-16".into()), Some("b".into())),
        ]);
        let writer = CorpusWriter::new(dir.path());

        let first = writer.write(&table, "acme").unwrap();
        let first_csv = fs::read(&first.csv_path).unwrap();
        let second = writer.write(&table, "acme").unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&second.csv_path).unwrap(), first_csv);
        assert_eq!(read_csv(&second.csv_path).len(), 3);
        assert_eq!(fs::read_dir(&second.folder).unwrap().count(), 3);
    }
}
