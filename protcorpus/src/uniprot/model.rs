//! Typed deserialization of UniProtKB entry XML
//!
//! Only the parts of the schema needed for alias extraction are modeled:
//! accessions, entry names, protein name groups, and gene names. The
//! `fullName` element appears both as plain text and with evidence
//! attributes; [`TextValue`] absorbs both shapes through `$text`.

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::{CorpusError, Result};

/// A `<uniprot>` document: zero or more entries
#[derive(Debug, Deserialize)]
pub struct UniProtEntrySet {
    #[serde(rename = "entry", default)]
    pub entries: Vec<UniProtEntry>,
}

/// One UniProtKB entry
#[derive(Debug, Deserialize)]
pub struct UniProtEntry {
    /// Accession codes, primary first
    #[serde(rename = "accession", default)]
    pub accessions: Vec<String>,
    /// Entry names (e.g. `BRCA1_HUMAN`)
    #[serde(rename = "name", default)]
    pub names: Vec<String>,
    /// Protein name groups
    #[serde(default)]
    pub protein: ProteinNames,
    /// Gene elements with their name synonyms
    #[serde(rename = "gene", default)]
    pub genes: Vec<Gene>,
}

/// The `<protein>` block: recommended, submitted, and alternative names
#[derive(Debug, Default, Deserialize)]
pub struct ProteinNames {
    #[serde(rename = "recommendedName")]
    pub recommended: Option<NameGroup>,
    #[serde(rename = "submittedName", default)]
    pub submitted: Vec<NameGroup>,
    #[serde(rename = "alternativeName", default)]
    pub alternative: Vec<NameGroup>,
}

/// A name group holding an optional full name and short names
#[derive(Debug, Default, Deserialize)]
pub struct NameGroup {
    #[serde(rename = "fullName")]
    pub full_name: Option<TextValue>,
    #[serde(rename = "shortName", default)]
    pub short_names: Vec<TextValue>,
}

impl NameGroup {
    /// The group's full name text, when present and non-empty
    pub fn full_name_text(&self) -> Option<&str> {
        self.full_name
            .as_ref()
            .map(|name| name.value.trim())
            .filter(|text| !text.is_empty())
    }

    /// The group's first short name, when present and non-empty
    pub fn first_short_name(&self) -> Option<&str> {
        self.short_names
            .first()
            .map(|name| name.value.trim())
            .filter(|text| !text.is_empty())
    }
}

/// A `<gene>` element
#[derive(Debug, Default, Deserialize)]
pub struct Gene {
    #[serde(rename = "name", default)]
    pub names: Vec<GeneName>,
}

/// A gene name with its type attribute (`primary`, `synonym`, ...)
#[derive(Debug, Default, Deserialize)]
pub struct GeneName {
    #[serde(rename = "@type", default)]
    pub kind: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// Element text, with or without attributes on the element
#[derive(Debug, Default, Deserialize)]
pub struct TextValue {
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// Parse a UniProtKB XML document into typed entries
pub fn parse_entry_set(xml: &str) -> Result<UniProtEntrySet> {
    from_str(xml)
        .map_err(|e| CorpusError::XmlError(format!("Failed to deserialize UniProt XML: {}", e)))
}
