//! Sentence table I/O.

use crate::engine::{ClusteringError, ClusteringResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// One row of the raw sentence table. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub sentence_id: u64,
    pub sentence_text: String,
    #[serde(default)]
    pub source_pdf: String,
    #[serde(default)]
    pub source_url: String,
}

/// One row of the clustered table, in output column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusteredSentence {
    pub sentence_id: u64,
    pub sentence_text: String,
    pub cluster_id: i64,
    pub source_pdf: String,
    pub source_url: String,
}

impl ClusteredSentence {
    pub fn new(record: &SentenceRecord, cluster_id: i64) -> Self {
        Self {
            sentence_id: record.sentence_id,
            sentence_text: record.sentence_text.clone(),
            cluster_id,
            source_pdf: record.source_pdf.clone(),
            source_url: record.source_url.clone(),
        }
    }
}

/// Column order of the clustered table.
pub const CLUSTERED_COLUMNS: [&str; 5] = [
    "sentence_id",
    "sentence_text",
    "cluster_id",
    "source_pdf",
    "source_url",
];

/// Read every row of a sentence table with a header line.
pub fn read_sentences(path: impl AsRef<Path>) -> ClusteringResult<Vec<SentenceRecord>> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let records = reader
        .deserialize()
        .collect::<Result<Vec<SentenceRecord>, csv::Error>>()?;
    debug!(path = %path.display(), rows = records.len(), "Read sentence table");
    Ok(records)
}

/// Write `records` with their `labels`, creating parent directories.
pub fn write_clustered(
    path: impl AsRef<Path>,
    records: &[SentenceRecord],
    labels: &[i64],
) -> ClusteringResult<()> {
    if records.len() != labels.len() {
        return Err(ClusteringError::invalid_input(format!(
            "{} labels for {} sentences",
            labels.len(),
            records.len()
        )));
    }

    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(CLUSTERED_COLUMNS)?;
    for (record, &label) in records.iter().zip(labels) {
        writer.serialize(ClusteredSentence::new(record, label))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a clustered table back.
pub fn read_clustered(path: impl AsRef<Path>) -> ClusteringResult<Vec<ClusteredSentence>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<ClusteredSentence>, csv::Error>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: u64, text: &str) -> SentenceRecord {
        SentenceRecord {
            sentence_id: id,
            sentence_text: text.to_string(),
            source_pdf: "report.pdf".to_string(),
            source_url: "https://example.org/report.pdf".to_string(),
        }
    }

    #[test]
    fn test_read_ignores_extra_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(
            &path,
            "sentence_id,sentence_text,source_pdf,source_url,page\n\
             0,\"Water, sanitation and hygiene.\",a.pdf,http://a,3\n\
             1,Second sentence.,b.pdf,,7\n",
        )
        .unwrap();

        let rows = read_sentences(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sentence_text, "Water, sanitation and hygiene.");
        assert_eq!(rows[1].source_url, "");
    }

    #[test]
    fn test_write_column_order_and_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/clustered.csv");
        let records = vec![record(4, "alpha"), record(9, "beta")];

        write_clustered(&path, &records, &[2, -1]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "sentence_id,sentence_text,cluster_id,source_pdf,source_url"
        );

        let back = read_clustered(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].cluster_id, 2);
        assert_eq!(back[1].cluster_id, -1);
        assert_eq!(back[1].sentence_id, 9);
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        write_clustered(&path, &[], &[]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{}\n", CLUSTERED_COLUMNS.join(",")));
        assert!(read_clustered(&path).unwrap().is_empty());
    }

    #[test]
    fn test_label_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let err = write_clustered(&path, &[record(0, "a")], &[0, 1]).unwrap_err();
        assert!(matches!(err, ClusteringError::InvalidInput { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_sentences(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, ClusteringError::Io(_)));
    }
}
