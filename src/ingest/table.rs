//! Tabular input and column resolution
//!
//! Column names are matched case-insensitively, after trimming, against a
//! static alias table per input kind. Resolution happens once against the
//! header, before any row is looked at.

use crate::ValidationError;
use std::io::Read;
use std::path::Path;

/// A canonical field and the header names accepted for it
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

/// Columns of a press-release upload, in structural check order
pub const PRESS_RELEASE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        field: "url",
        aliases: &["url", "link"],
        required: true,
    },
    ColumnSpec {
        field: "title",
        aliases: &["title"],
        required: true,
    },
    ColumnSpec {
        field: "date",
        aliases: &["date", "press_ts"],
        required: true,
    },
    ColumnSpec {
        field: "ticker",
        aliases: &["ticker", "symbol"],
        required: false,
    },
];

/// Columns of a company upload
pub const COMPANY_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        field: "ticker",
        aliases: &["ticker", "symbol"],
        required: true,
    },
    ColumnSpec {
        field: "name",
        aliases: &["name", "company"],
        required: true,
    },
    ColumnSpec {
        field: "sector",
        aliases: &["sector"],
        required: false,
    },
];

/// An in-memory table: a header row plus data rows of cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Reads a CSV document with a header row
    ///
    /// A leading UTF-8 byte order mark is ignored and short rows are
    /// accepted; missing cells read as empty.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()?
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

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, csv::Error> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Header positions resolved for one alias table
#[derive(Debug, Clone)]
pub struct ColumnMap {
    positions: Vec<(&'static str, Option<usize>)>,
}

impl ColumnMap {
    /// Resolves every column of `specs` against `headers`
    ///
    /// Aliases are tried in order; the first matching header wins.
    ///
    /// # Errors
    ///
    /// `ValidationError::MissingColumn` for the first required column, in
    /// `specs` order, that no header matches.
    pub fn resolve(headers: &[String], specs: &[ColumnSpec]) -> Result<Self, ValidationError> {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let mut positions = Vec::with_capacity(specs.len());
        for spec in specs {
            let position = spec
                .aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias));

            if position.is_none() && spec.required {
                return Err(ValidationError::MissingColumn {
                    field: spec.field,
                    aliases: spec.aliases,
                });
            }
            positions.push((spec.field, position));
        }

        Ok(Self { positions })
    }

    /// Whether `field` was found in the header
    pub fn has(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// The trimmed cell for `field`, empty when the column or cell is absent
    pub fn cell<'r>(&self, row: &'r [String], field: &str) -> &'r str {
        self.position(field)
            .and_then(|i| row.get(i))
            .map(|c| c.trim())
            .unwrap_or("")
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.positions
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, p)| *p)
    }
}
