//! Roster ingestion: decoding uploads into rows, proposing a column mapping and
//! normalizing rows into the canonical participant set.

pub mod mapping;
pub mod normalize;
pub mod reader;

/// One input record: an ordered association from column header to cell text.
///
/// Rows are associative from here on. A column the row does not carry reads as
/// an empty string, so downstream code never branches on absence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    /// Builds a row from `headers` and positional `values`. Missing trailing
    /// values become empty strings and surplus values are dropped. When a
    /// header repeats, the later column wins.
    pub fn from_positional<S: AsRef<str>>(headers: &[String], values: &[S]) -> Self {
        let mut row = RawRow::default();
        for (idx, header) in headers.iter().enumerate() {
            let value = values.get(idx).map(|v| v.as_ref()).unwrap_or("");
            row.insert(header.clone(), value.to_string());
        }
        row
    }

    pub fn insert(&mut self, column: String, value: String) {
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Cell text for `column`, or `""` when the row has no such column.
    pub fn get(&self, column: &str) -> &str {
        self.cells
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    #[cfg(test)]
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// A decoded upload: the header row plus every data row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Keeps the first occurrence of each non-empty header name.
pub(crate) fn dedup_headers(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for header in raw {
        if !header.is_empty() && !headers.contains(&header) {
            headers.push(header);
        }
    }
    headers
}
