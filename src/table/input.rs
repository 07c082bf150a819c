use crate::error::InputError;
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::ops::Range;
use std::path::Path;

/// Column names tried in order when no text column is configured
pub const PREFERRED_TEXT_COLUMNS: [&str; 4] = ["message", "conversation", "chat", "text"];

/// The input CSV, held in memory. Row position is record identity.
#[derive(Debug, Clone)]
pub struct InputTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl InputTable {
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let file = std::fs::File::open(path).map_err(|e| InputError::Read {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        Self::from_reader(file, path)
    }

    /// `origin` is only used in error messages
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, InputError> {
        let read_err = |source: csv::Error| InputError::Read {
            path: origin.to_path_buf(),
            source,
        };

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(InputError::NoColumns(origin.to_path_buf()));
        }

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Trimmed dialogue text for the rows in `range`
    pub fn texts(&self, range: Range<usize>, column: usize) -> Vec<String> {
        self.rows[range]
            .iter()
            .map(|row| row.get(column).unwrap_or("").trim().to_string())
            .collect()
    }
}

/// Pick the column holding the dialogue.
/// An explicit name must exist; otherwise the first preferred name present wins,
/// falling back to the first column.
pub fn select_text_column(headers: &[String], explicit: Option<&str>) -> Result<usize, InputError> {
    if let Some(name) = explicit {
        return headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| InputError::UnknownColumn(name.to_string()));
    }

    if headers.is_empty() {
        return Err(InputError::UnknownColumn(String::new()));
    }

    Ok(PREFERRED_TEXT_COLUMNS
        .iter()
        .find_map(|preferred| headers.iter().position(|h| h == preferred))
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> InputTable {
        InputTable::from_reader(csv.as_bytes(), Path::new("test.csv")).unwrap()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_rows_and_headers() {
        let t = table("id,message\n1,\"Hello, I need help\"\n2,  Thanks  \n");
        assert_eq!(t.headers(), &["id", "message"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.texts(0..2, 1), vec!["Hello, I need help", "Thanks"]);
        // Passthrough fields are untouched
        assert_eq!(t.rows()[1].get(1), Some("  Thanks  "));
    }

    #[test]
    fn test_bom_is_stripped_from_first_header() {
        let t = table("\u{feff}message,agent\nhi,bob\n");
        assert_eq!(t.headers()[0], "message");
    }

    #[test]
    fn test_header_only_input() {
        let t = table("message\n");
        assert!(t.is_empty());
    }

    #[test]
    fn test_empty_input_has_no_columns() {
        let err = InputTable::from_reader("".as_bytes(), Path::new("empty.csv")).unwrap_err();
        assert!(matches!(err, InputError::NoColumns(_)));
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = InputTable::from_reader("a,b\n1,2,3\n".as_bytes(), Path::new("bad.csv"))
            .unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
    }

    #[test]
    fn test_select_preferred_column() {
        assert_eq!(
            select_text_column(&headers(&["id", "chat", "conversation"]), None).unwrap(),
            2
        );
        assert_eq!(
            select_text_column(&headers(&["text", "message"]), None).unwrap(),
            1
        );
        assert_eq!(
            select_text_column(&headers(&["id", "chat"]), None).unwrap(),
            1
        );
    }

    #[test]
    fn test_select_falls_back_to_first_column() {
        assert_eq!(
            select_text_column(&headers(&["transcript", "agent"]), None).unwrap(),
            0
        );
        // Exact, case-sensitive match only
        assert_eq!(
            select_text_column(&headers(&["id", "Message"]), None).unwrap(),
            0
        );
    }

    #[test]
    fn test_select_explicit_column() {
        let cols = headers(&["id", "message", "transcript"]);
        assert_eq!(select_text_column(&cols, Some("transcript")).unwrap(), 2);
        assert!(matches!(
            select_text_column(&cols, Some("body")),
            Err(InputError::UnknownColumn(name)) if name == "body"
        ));
    }
}
