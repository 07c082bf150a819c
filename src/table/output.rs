use crate::error::OutputError;
use crate::parser::Judgment;
use crate::rubric::CRITERIA;
use csv::{ReaderBuilder, StringRecord, Writer, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

const BOM: &str = "\u{feff}";

/// Append-only result table. Every append is flushed and synced before returning.
pub struct OutputTable {
    writer: Writer<File>,
    rows_written: usize,
}

/// Input headers followed by one column per criterion
pub fn output_header(input_headers: &[String]) -> Vec<String> {
    input_headers
        .iter()
        .cloned()
        .chain(CRITERIA.iter().map(|c| c.to_string()))
        .collect()
}

impl OutputTable {
    /// Truncate `path` and write the header
    pub fn create(path: &Path, header: &[String], write_bom: bool) -> Result<Self, OutputError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(OutputError::CreateDir)?;
        }

        let mut file = File::create(path).map_err(|e| OutputError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        if write_bom {
            file.write_all(BOM.as_bytes())
                .map_err(OutputError::Write)?;
        }

        let mut table = Self {
            writer: WriterBuilder::new().from_writer(file),
            rows_written: 0,
        };
        table.writer.write_record(header)?;
        table.sync()?;
        Ok(table)
    }

    /// Reopen a previous run's output for appending.
    /// Returns `None` when there is nothing to resume.
    pub fn resume(path: &Path, header: &[String]) -> Result<Option<Self>, OutputError> {
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
        let existing: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches(BOM).to_string())
            .collect();
        if existing.is_empty() {
            return Ok(None);
        }
        if existing != header {
            return Err(OutputError::HeaderMismatch(path.to_path_buf()));
        }

        let mut rows_written = 0;
        for record in reader.records() {
            record?;
            rows_written += 1;
        }

        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| OutputError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Some(Self {
            writer: WriterBuilder::new().from_writer(file),
            rows_written,
        }))
    }

    /// Write one batch: each record's fields followed by its judgment, by position
    pub fn append_batch(
        &mut self,
        records: &[StringRecord],
        judgments: &[Judgment],
    ) -> Result<(), OutputError> {
        debug_assert_eq!(records.len(), judgments.len());

        for (record, judgment) in records.iter().zip(judgments) {
            let mut row: Vec<&str> = record.iter().collect();
            for cell in judgment.cells() {
                row.push(cell);
            }
            self.writer.write_record(&row)?;
        }
        self.sync()?;
        self.rows_written += records.len();
        Ok(())
    }

    /// Data rows in the file, including those from a resumed run
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    fn sync(&mut self) -> Result<(), OutputError> {
        self.writer.flush().map_err(OutputError::Write)?;
        self.writer.get_ref().sync_all().map_err(OutputError::Sync)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Mark;
    use tempfile::tempdir;

    fn header() -> Vec<String> {
        output_header(&["id".to_string(), "message".to_string()])
    }

    fn records(ids: &[&str]) -> Vec<StringRecord> {
        ids.iter()
            .map(|id| StringRecord::from(vec![*id, "hello, there"]))
            .collect()
    }

    fn read_rows(path: &Path) -> Vec<StringRecord> {
        ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .unwrap()
            .records()
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn test_header_appends_criteria() {
        let header = header();
        assert_eq!(header.len(), 2 + CRITERIA.len());
        assert_eq!(header[2], "Greeting & Introduction");
        assert_eq!(header.last().unwrap(), "Follow-up Provided");
    }

    #[test]
    fn test_create_truncates_and_writes_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale,content\n1,2\n").unwrap();

        let table = OutputTable::create(&path, &header(), true).unwrap();
        assert_eq!(table.rows_written(), 0);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(BOM));
        assert!(content.contains("id,message,Greeting & Introduction"));
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_append_batches_without_repeating_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut table = OutputTable::create(&path, &header(), false).unwrap();

        let judged = Judgment::empty().with_mark("Empathy", Mark::Present);
        table
            .append_batch(&records(&["1", "2"]), &[judged.clone(), Judgment::empty()])
            .unwrap();
        table
            .append_batch(&records(&["3"]), &[Judgment::empty()])
            .unwrap();
        assert_eq!(table.rows_written(), 3);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("Greeting & Introduction").count(), 1);

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get(1), Some("hello, there"));
        assert_eq!(rows[0].get(4), Some("1"));
        assert_eq!(rows[1].get(4), Some(""));
        assert!(rows.iter().all(|r| r.len() == 2 + CRITERIA.len()));
    }

    #[test]
    fn test_resume_counts_existing_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        {
            let mut table = OutputTable::create(&path, &header(), true).unwrap();
            table
                .append_batch(&records(&["1", "2"]), &[Judgment::empty(), Judgment::empty()])
                .unwrap();
        }

        let mut table = OutputTable::resume(&path, &header()).unwrap().unwrap();
        assert_eq!(table.rows_written(), 2);
        table
            .append_batch(&records(&["3"]), &[Judgment::empty()])
            .unwrap();
        assert_eq!(table.rows_written(), 3);

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].get(0), Some("3"));
    }

    #[test]
    fn test_resume_missing_file() {
        let dir = tempdir().unwrap();
        assert!(OutputTable::resume(&dir.path().join("none.csv"), &header())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_resume_rejects_other_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "other,columns\n").unwrap();
        assert!(matches!(
            OutputTable::resume(&path, &header()),
            Err(OutputError::HeaderMismatch(_))
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_disk_full_is_a_write_error() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        assert!(matches!(
            OutputTable::create(full, &header(), true),
            Err(OutputError::Write(_))
        ));
        assert!(matches!(
            OutputTable::create(full, &header(), false),
            Err(OutputError::Write(_))
        ));
    }
}
