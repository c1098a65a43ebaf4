//! MEDLINE record parsing and flattening
//!
//! EFetch with `rettype=medline` returns plain-text records: a four-column
//! field code, a `- ` separator, and a value, with continuation lines
//! indented by six spaces and records separated by blank lines. Repeated
//! field codes (authors, MeSH headings) accumulate into lists.
//!
//! Flattening reduces each record to one string per field for the
//! line-oriented entry dump: list values are pipe-joined, field codes
//! colliding with reserved downstream tokens are dropped outright, and a
//! locally unique sequential identifier is assigned in processing order.
//! That identifier orders the local store only; it is not stable across
//! runs.

use std::fmt;

/// Delimiter used when joining list-valued fields
const LIST_DELIMITER: &str = "|";

/// Field codes dropped during flattening
pub const RESERVED_FIELDS: &[&str] = &["IS"];

/// One parsed MEDLINE record: ordered field code to value-list mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedlineRecord {
    fields: Vec<(String, Vec<String>)>,
}

impl MedlineRecord {
    /// All values recorded for a field code
    pub fn get(&self, tag: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, values)| values.as_slice())
    }

    /// First value recorded for a field code
    pub fn first(&self, tag: &str) -> Option<&str> {
        self.get(tag).and_then(|values| values.first()).map(String::as_str)
    }

    /// The record's PMID, when present
    pub fn pmid(&self) -> Option<&str> {
        self.first("PMID")
    }

    /// The record's PMC identifier with the `PMC` prefix trimmed
    pub fn pmc_id(&self) -> Option<&str> {
        self.first("PMC")
            .map(|id| id.strip_prefix("PMC").unwrap_or(id))
    }

    /// Ordered field codes and their values
    pub fn fields(&self) -> &[(String, Vec<String>)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn push_value(&mut self, tag: &str, value: &str) {
        match self.fields.iter_mut().find(|(name, _)| name == tag) {
            Some((_, values)) => values.push(value.to_string()),
            None => self
                .fields
                .push((tag.to_string(), vec![value.to_string()])),
        }
    }

    fn append_continuation(&mut self, text: &str) {
        if let Some((_, values)) = self.fields.last_mut() {
            if let Some(last) = values.last_mut() {
                last.push(' ');
                last.push_str(text);
            }
        }
    }
}

/// Parse MEDLINE-format text into records
///
/// Tolerates leading noise lines before the first field code and extra
/// blank lines between records.
pub fn parse_medline(text: &str) -> Vec<MedlineRecord> {
    let mut records = Vec::new();
    let mut current = MedlineRecord::default();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some((tag, value)) = split_field_line(line) {
            current.push_value(tag, value);
        } else if line.starts_with(' ') && !current.is_empty() {
            current.append_continuation(line.trim());
        }
        // Anything else is noise outside a record and is skipped
    }

    if !current.is_empty() {
        records.push(current);
    }

    records
}

/// Split a `TAG - value` line into its code and value
fn split_field_line(line: &str) -> Option<(&str, &str)> {
    if line.len() < 6 || line.starts_with(' ') || !line.is_char_boundary(6) {
        return None;
    }
    let (head, value) = line.split_at(6);
    if !head.ends_with("- ") {
        return None;
    }
    let tag = head[..4].trim();
    if tag.is_empty() {
        return None;
    }
    Some((tag, value.trim()))
}

/// A flattened record with its local sequential identifier
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    /// Sequential id assigned in processing order
    pub id: usize,
    fields: Vec<(String, String)>,
}

impl FlatRecord {
    /// The flattened value for a field code
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, value)| value.as_str())
    }

    /// Ordered field codes and flattened values
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl fmt::Display for FlatRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id={}", self.id)?;
        for (tag, value) in &self.fields {
            write!(f, "\t{}={}", tag, value)?;
        }
        Ok(())
    }
}

/// Flattens records and hands out sequential local identifiers
#[derive(Debug, Default)]
pub struct Flattener {
    next_id: usize,
}

impl Flattener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten one record: join list values, drop reserved field codes,
    /// assign the next sequential id
    pub fn flatten(&mut self, record: &MedlineRecord) -> FlatRecord {
        let fields = record
            .fields()
            .iter()
            .filter(|(tag, _)| !RESERVED_FIELDS.contains(&tag.as_str()))
            .map(|(tag, values)| (tag.clone(), values.join(LIST_DELIMITER)))
            .collect();

        let id = self.next_id;
        self.next_id += 1;
        FlatRecord { id, fields }
    }
}
