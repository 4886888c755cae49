//! Batch reports in JSON or JSON Lines.
//!
//! JSON reports are a single object holding the metrics summary and every
//! result. JSONL reports stream one tagged record per line, results first and
//! the summary last, so a report can be tailed while it is written.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::engine::MetricsSummary;
use crate::types::ConversionResult;

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One JSON document
    #[default]
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl ReportFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }

    /// Pick the format from a report file's extension; JSON unless it is
    /// `.jsonl` or `.ndjson`.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
            .unwrap_or_default()
    }
}

/// A JSONL line: `{"type":"result",...}` or `{"type":"summary",...}`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReportRecord<'a> {
    Result(&'a ConversionResult),
    Summary(&'a MetricsSummary),
}

#[derive(Debug, Serialize)]
struct BatchReport<'a> {
    version: &'static str,
    summary: &'a MetricsSummary,
    results: &'a [ConversionResult],
}

/// Serializes batch outcomes to a writer.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    records_written: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W, format: ReportFormat) -> Self {
        Self {
            writer,
            format,
            records_written: 0,
        }
    }

    /// Write a complete report.
    pub fn write_report(
        &mut self,
        summary: &MetricsSummary,
        results: &[ConversionResult],
    ) -> io::Result<()> {
        match self.format {
            ReportFormat::Json => {
                let report = BatchReport {
                    version: crate::VERSION,
                    summary,
                    results,
                };
                serde_json::to_writer_pretty(&mut self.writer, &report).map_err(io::Error::other)?;
                writeln!(self.writer)?;
                self.records_written += results.len();
            }
            ReportFormat::JsonLines => {
                for result in results {
                    self.write_record(&ReportRecord::Result(result))?;
                }
                self.write_record(&ReportRecord::Summary(summary))?;
            }
        }
        Ok(())
    }

    /// Write one JSONL record.
    pub fn write_record(&mut self, record: &ReportRecord<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
        writeln!(self.writer)?;
        if matches!(record, ReportRecord::Result(_)) {
            self.records_written += 1;
        }
        Ok(())
    }

    /// Number of results written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Write a report file, choosing the format from its extension.
pub fn save_report(
    path: &Path,
    summary: &MetricsSummary,
    results: &[ConversionResult],
) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = ReportWriter::new(BufWriter::new(file), ReportFormat::from_path(path));
    writer.write_report(summary, results)?;
    writer.flush()?;
    tracing::info!("Report written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConversionStatus;
    use std::path::PathBuf;

    fn results() -> Vec<ConversionResult> {
        let mut done = ConversionResult::pending(Path::new("in/a.nef"), Path::new("out/a.jpg"));
        done.status = ConversionStatus::Completed;
        let mut failed = ConversionResult::pending(Path::new("in/b.nef"), Path::new("out/b.jpg"));
        failed.status = ConversionStatus::Failed;
        failed.error_message = Some("Decode error for in/b.nef: truncated".into());
        vec![done, failed]
    }

    fn summary() -> MetricsSummary {
        MetricsSummary {
            total_files: 2,
            completed: 1,
            failed: 1,
            success_rate: 50.0,
            ..MetricsSummary::default()
        }
    }

    #[test]
    fn test_json_report() {
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, ReportFormat::Json);
        writer.write_report(&summary(), &results()).unwrap();
        assert_eq!(writer.records_written(), 2);

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["summary"]["completed"], 1);
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(value["results"][1]["status"], "failed");
        assert_eq!(value["version"], crate::VERSION);
    }

    #[test]
    fn test_jsonl_report_ends_with_summary() {
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, ReportFormat::JsonLines);
        writer.write_report(&summary(), &results()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "result");
        assert_eq!(lines[0]["input_path"], "in/a.nef");
        assert_eq!(lines[2]["type"], "summary");
        assert_eq!(lines[2]["total_files"], 2);
    }

    #[test]
    fn test_format_parse_and_from_path() {
        assert_eq!(ReportFormat::parse("JSONL"), Some(ReportFormat::JsonLines));
        assert_eq!(ReportFormat::parse("csv"), None);
        assert_eq!(
            ReportFormat::from_path(Path::new("run.ndjson")),
            ReportFormat::JsonLines
        );
        assert_eq!(ReportFormat::from_path(Path::new("run.json")), ReportFormat::Json);
        assert_eq!(ReportFormat::from_path(Path::new("report")), ReportFormat::Json);
    }

    #[test]
    fn test_save_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("report.jsonl");

        save_report(&path, &summary(), &results()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
