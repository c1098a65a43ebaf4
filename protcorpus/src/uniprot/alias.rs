//! Alias extraction from UniProtKB entries
//!
//! One protein entry is reduced to an ordered alias list: accession codes,
//! the primary entry name, the canonical protein name, alternative names,
//! and gene-name synonyms. The canonical name is resolved by an ordered
//! list of extraction strategies so the fallback precedence is explicit
//! rather than buried in error handling.

use super::model::{ProteinNames, UniProtEntry};

/// Placeholder name filtered from every alias set (case-insensitive)
const PLACEHOLDER_ALIAS: &str = "uncharacterized protein";

/// Canonical protein name strategies, tried in priority order:
/// the recommended full name, then the first submitted full name. Both
/// plain-text and attribute-carrying `fullName` shapes resolve through
/// the same decoder, so the degenerate bare-string form needs no third
/// accessor of its own.
const PRIMARY_NAME_STRATEGIES: &[fn(&ProteinNames) -> Option<String>] =
    &[recommended_full_name, submitted_full_name];

fn recommended_full_name(protein: &ProteinNames) -> Option<String> {
    protein
        .recommended
        .as_ref()
        .and_then(|group| group.full_name_text())
        .map(str::to_string)
}

fn submitted_full_name(protein: &ProteinNames) -> Option<String> {
    protein
        .submitted
        .iter()
        .find_map(|group| group.full_name_text())
        .map(str::to_string)
}

/// A deduplicated, order-preserving alias list for one protein
///
/// # Example
///
/// ```
/// use protcorpus::uniprot::{parse_entry_set, AliasSet};
///
/// let xml = r#"<uniprot><entry>
///   <accession>P12345</accession>
///   <name>TEST_HUMAN</name>
///   <protein><recommendedName><fullName>Test protein</fullName></recommendedName></protein>
/// </entry></uniprot>"#;
/// let set = parse_entry_set(xml).unwrap();
/// let aliases = AliasSet::from_entry(&set.entries[0]);
/// assert_eq!(aliases.to_line(), "p12345|test_human|test_protein");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasSet {
    aliases: Vec<String>,
}

impl AliasSet {
    /// Build the alias set for one entry
    ///
    /// Union, in order: accession codes, the primary entry name, the
    /// canonical protein name, every alternative full name (or the first
    /// alternative short name when the full name is absent), and every
    /// name of the first gene element. First-seen order wins on
    /// duplicates; the "uncharacterized protein" placeholder is dropped.
    pub fn from_entry(entry: &UniProtEntry) -> Self {
        let mut set = Self::default();

        for accession in &entry.accessions {
            set.push(accession);
        }
        if let Some(name) = entry.names.first() {
            set.push(name);
        }

        if let Some(primary) = PRIMARY_NAME_STRATEGIES
            .iter()
            .find_map(|strategy| strategy(&entry.protein))
        {
            set.push(&primary);
        }

        for group in &entry.protein.alternative {
            if let Some(full) = group.full_name_text() {
                set.push(full);
            } else if let Some(short) = group.first_short_name() {
                set.push(short);
            }
        }

        if let Some(gene) = entry.genes.first() {
            for name in &gene.names {
                let value = name.value.trim();
                if !value.is_empty() {
                    set.push(value);
                }
            }
        }

        set
    }

    /// The aliases in first-seen order
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Render as one output line: lower-cased, spaces replaced with
    /// underscores, pipe-joined
    pub fn to_line(&self) -> String {
        self.aliases.join("|").replace(' ', "_").to_lowercase()
    }

    fn push(&mut self, alias: &str) {
        let alias = alias.trim();
        if alias.is_empty() || alias.eq_ignore_ascii_case(PLACEHOLDER_ALIAS) {
            return;
        }
        if !self.aliases.iter().any(|existing| existing == alias) {
            self.aliases.push(alias.to_string());
        }
    }
}
