//! Merging independently fetched XML documents under one root
//!
//! Batched exports arrive as complete documents, each with its own XML
//! declaration, doctype, and root element. Concatenating them verbatim
//! produces a multi-rooted file that no downstream parser accepts. The
//! merger streams each fragment through a quick-xml event pipeline: the
//! first fragment's root start tag is kept (attributes included), every
//! other root tag is suppressed, declarations and doctypes are stripped,
//! configured boilerplate children (BioC `source`/`date`/`key`, UniProt
//! `copyright`) are dropped, and a single closing root tag is written at
//! the end.
//!
//! The root tag is parameterized per calling context: `collection` for
//! BioC annotation sets, `pmc-articleset` for PMC full texts, `uniprot`
//! for UniProtKB entry sets.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::error::{CorpusError, Result};

/// Streaming merger for same-schema XML fragments
///
/// # Example
///
/// ```
/// use protcorpus::xml_merge::XmlMerger;
///
/// let merger = XmlMerger::new("collection").drop_child("source");
/// let merged = merger
///     .merge(&[
///         r#"<?xml version="1.0"?><collection><source>PubTator</source><document>a</document></collection>"#,
///         r#"<?xml version="1.0"?><collection><source>PubTator</source><document>b</document></collection>"#,
///     ])
///     .unwrap();
/// assert_eq!(merged.matches("<collection").count(), 1);
/// assert_eq!(merged.matches("</collection>").count(), 1);
/// assert!(!merged.contains("<?xml"));
/// ```
#[derive(Debug, Clone)]
pub struct XmlMerger {
    root_tag: String,
    drop_children: Vec<String>,
}

impl XmlMerger {
    /// Create a merger expecting fragments rooted at `root_tag`
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self {
            root_tag: root_tag.into(),
            drop_children: Vec::new(),
        }
    }

    /// Drop every direct child element named `name` from all fragments
    ///
    /// Only direct children of the root are dropped; deeper elements with
    /// the same name are preserved.
    pub fn drop_child(mut self, name: impl Into<String>) -> Self {
        self.drop_children.push(name.into());
        self
    }

    /// Merger for BioC collections as exported by PubTator Central
    pub fn bioc_collection() -> Self {
        Self::new("collection")
            .drop_child("source")
            .drop_child("date")
            .drop_child("key")
    }

    /// Merger for PMC article sets
    pub fn pmc_articleset() -> Self {
        Self::new("pmc-articleset")
    }

    /// Merger for UniProtKB entry sets
    pub fn uniprot_entryset() -> Self {
        Self::new("uniprot").drop_child("copyright")
    }

    /// Merge fragments into a single well-formed document
    ///
    /// Fails with [`CorpusError::XmlError`] if a fragment is malformed, is
    /// not rooted at the expected tag, or if no fragments were supplied.
    pub fn merge<S: AsRef<str>>(&self, fragments: &[S]) -> Result<String> {
        if fragments.is_empty() {
            return Err(CorpusError::XmlError(format!(
                "no fragments to merge under <{}>",
                self.root_tag
            )));
        }

        let mut writer = Writer::new(Vec::new());
        let mut root_written = false;

        for (index, fragment) in fragments.iter().enumerate() {
            debug!(fragment = index, root = %self.root_tag, "Merging fragment");
            self.append_fragment(fragment.as_ref(), &mut writer, &mut root_written)
                .map_err(|err| {
                    CorpusError::XmlError(format!("fragment {}: {}", index, err))
                })?;
        }

        if !root_written {
            return Err(CorpusError::XmlError(format!(
                "no <{}> root found in any fragment",
                self.root_tag
            )));
        }

        writer
            .write_event(Event::End(BytesEnd::new(self.root_tag.as_str())))
            .map_err(|e| CorpusError::XmlError(e.to_string()))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| CorpusError::XmlError(e.to_string()))
    }

    fn append_fragment(
        &self,
        fragment: &str,
        writer: &mut Writer<Vec<u8>>,
        root_written: &mut bool,
    ) -> std::result::Result<(), String> {
        let mut reader = Reader::from_str(fragment);
        let mut depth = 0usize;

        loop {
            match reader.read_event().map_err(|e| e.to_string())? {
                // Preamble lines never reach the output
                Event::Decl(_) | Event::DocType(_) => {}
                Event::PI(_) => {}
                Event::Start(start) => {
                    if depth == 0 {
                        if !self.is_root(&start) {
                            return Err(format!(
                                "expected root <{}>, found <{}>",
                                self.root_tag,
                                String::from_utf8_lossy(start.name().as_ref())
                            ));
                        }
                        if !*root_written {
                            writer
                                .write_event(Event::Start(start.borrow()))
                                .map_err(|e| e.to_string())?;
                            *root_written = true;
                        }
                        depth += 1;
                    } else if depth == 1 && self.is_dropped_child(&start) {
                        let end = start.to_end().into_owned();
                        reader.read_to_end(end.name()).map_err(|e| e.to_string())?;
                    } else {
                        writer
                            .write_event(Event::Start(start.borrow()))
                            .map_err(|e| e.to_string())?;
                        depth += 1;
                    }
                }
                Event::End(end) => {
                    depth = depth.saturating_sub(1);
                    if depth > 0 {
                        writer
                            .write_event(Event::End(end))
                            .map_err(|e| e.to_string())?;
                    }
                }
                Event::Empty(empty) => {
                    if depth == 0 {
                        // Degenerate fragment: root with no children
                        if !self.is_root(&empty) {
                            return Err(format!(
                                "expected root <{}>, found <{}/>",
                                self.root_tag,
                                String::from_utf8_lossy(empty.name().as_ref())
                            ));
                        }
                        if !*root_written {
                            writer
                                .write_event(Event::Start(empty.borrow()))
                                .map_err(|e| e.to_string())?;
                            *root_written = true;
                        }
                    } else if !(depth == 1 && self.is_dropped_child(&empty)) {
                        writer
                            .write_event(Event::Empty(empty))
                            .map_err(|e| e.to_string())?;
                    }
                }
                Event::Text(text) => {
                    if depth > 0 {
                        writer
                            .write_event(Event::Text(text))
                            .map_err(|e| e.to_string())?;
                    }
                }
                Event::CData(cdata) => {
                    if depth > 0 {
                        writer
                            .write_event(Event::CData(cdata))
                            .map_err(|e| e.to_string())?;
                    }
                }
                Event::Comment(comment) => {
                    if depth > 0 {
                        writer
                            .write_event(Event::Comment(comment))
                            .map_err(|e| e.to_string())?;
                    }
                }
                Event::Eof => break,
            }
        }

        if depth != 0 {
            return Err("unclosed element before end of fragment".to_string());
        }

        Ok(())
    }

    fn is_root(&self, tag: &BytesStart) -> bool {
        tag.name().as_ref() == self.root_tag.as_bytes()
    }

    fn is_dropped_child(&self, tag: &BytesStart) -> bool {
        let name = tag.name();
        self.drop_children
            .iter()
            .any(|dropped| dropped.as_bytes() == name.as_ref())
    }
}
