//! Structural processing of merged PMC article sets
//!
//! After the per-page fragments are merged under one `pmc-articleset`
//! root, the set is scanned once to digest each article: its PMID, title,
//! abstract, and whether a `<body>` with full text is present. The digest
//! backs the full-text-presence report, the PMID-to-body JSON export, and
//! the PubMed-style conversion. A parse failure here is a structural
//! error, reported distinctly from any network failure, and callers skip
//! the dependent computation rather than aborting the run.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{CorpusError, Result};

/// Digest of one `<article>` in a merged article set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleDigest {
    /// PMID from the front matter, when present
    pub pmid: Option<String>,
    /// Article title from the front matter
    pub title: Option<String>,
    /// Concatenated abstract text
    pub abstract_text: Option<String>,
    /// Whether the article carries a `<body>` element
    pub has_body: bool,
    /// Concatenated body text, for full-text enrichment
    pub body_text: String,
}

/// Article and full-text counts for one merged set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullTextStats {
    /// Articles in the set
    pub articles: usize,
    /// Articles with full body text
    pub with_body: usize,
}

/// Scan a merged `pmc-articleset` document into per-article digests
pub fn scan_articles(xml: &str) -> Result<Vec<ArticleDigest>> {
    let mut reader = Reader::from_str(xml);
    let mut digests = Vec::new();
    let mut current: Option<ArticleDigest> = None;
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut capture_pmid = false;

    loop {
        match reader
            .read_event()
            .map_err(|e| CorpusError::XmlError(format!("malformed article set: {}", e)))?
        {
            Event::Start(start) => {
                let name = start.name().as_ref().to_vec();
                if name == b"article" && current.is_none() {
                    current = Some(ArticleDigest::default());
                } else if let Some(digest) = current.as_mut() {
                    if name == b"body" {
                        digest.has_body = true;
                    } else if name == b"article-id" && in_front_matter(&stack) {
                        capture_pmid = digest.pmid.is_none() && is_pmid_id(&start);
                    }
                }
                stack.push(name);
            }
            Event::End(_) => {
                let name = stack.pop();
                capture_pmid = false;
                if name.as_deref() == Some(b"article".as_ref()) {
                    if let Some(digest) = current.take() {
                        digests.push(digest);
                    }
                }
            }
            Event::Empty(_) => {}
            Event::Text(text) => {
                let Some(digest) = current.as_mut() else {
                    continue;
                };
                let value = text
                    .unescape()
                    .map_err(|e| CorpusError::XmlError(e.to_string()))?;
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }

                if capture_pmid {
                    digest.pmid = Some(value.to_string());
                } else if in_element(&stack, b"body") {
                    if !digest.body_text.is_empty() {
                        digest.body_text.push(' ');
                    }
                    digest.body_text.push_str(value);
                } else if in_element(&stack, b"abstract") {
                    let abstract_text = digest.abstract_text.get_or_insert_with(String::new);
                    if !abstract_text.is_empty() {
                        abstract_text.push(' ');
                    }
                    abstract_text.push_str(value);
                } else if stack.last().map(Vec::as_slice) == Some(b"article-title")
                    && !in_element(&stack, b"ref-list")
                    && digest.title.is_none()
                {
                    digest.title = Some(value.to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(digests)
}

/// Count articles and those carrying full body text
pub fn survey_articles(xml: &str) -> Result<FullTextStats> {
    let digests = scan_articles(xml)?;
    Ok(FullTextStats {
        articles: digests.len(),
        with_body: digests.iter().filter(|d| d.has_body).count(),
    })
}

/// Project a merged article set onto PubMed-style XML
///
/// Carries the front matter only (PMID, title, abstract); body text is
/// not retained in the converted file.
pub fn convert_to_pubmed_style(xml: &str) -> Result<String> {
    let digests = scan_articles(xml)?;
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let write = |w: &mut Writer<Vec<u8>>, event: Event| {
        w.write_event(event)
            .map_err(|e| CorpusError::XmlError(e.to_string()))
    };

    write(&mut writer, Event::Start(BytesStart::new("PubmedArticleSet")))?;
    for digest in &digests {
        write(&mut writer, Event::Start(BytesStart::new("PubmedArticle")))?;
        if let Some(pmid) = &digest.pmid {
            write(&mut writer, Event::Start(BytesStart::new("PMID")))?;
            write(&mut writer, Event::Text(BytesText::new(pmid)))?;
            write(&mut writer, Event::End(BytesEnd::new("PMID")))?;
        }
        if let Some(title) = &digest.title {
            write(&mut writer, Event::Start(BytesStart::new("ArticleTitle")))?;
            write(&mut writer, Event::Text(BytesText::new(title)))?;
            write(
                &mut writer,
                Event::End(BytesEnd::new("ArticleTitle")),
            )?;
        }
        if let Some(abstract_text) = &digest.abstract_text {
            write(&mut writer, Event::Start(BytesStart::new("Abstract")))?;
            write(&mut writer, Event::Text(BytesText::new(abstract_text)))?;
            write(&mut writer, Event::End(BytesEnd::new("Abstract")))?;
        }
        write(
            &mut writer,
            Event::End(BytesEnd::new("PubmedArticle")),
        )?;
    }
    write(
        &mut writer,
        Event::End(BytesEnd::new("PubmedArticleSet")),
    )?;

    String::from_utf8(writer.into_inner()).map_err(|e| CorpusError::XmlError(e.to_string()))
}

fn in_front_matter(stack: &[Vec<u8>]) -> bool {
    stack.iter().any(|name| name.as_slice() == b"front")
}

fn in_element(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.iter().any(|entry| entry.as_slice() == name)
}

fn is_pmid_id(start: &BytesStart) -> bool {
    start.attributes().flatten().any(|attr| {
        attr.key.as_ref() == b"pub-id-type" && attr.value.as_ref() == b"pmid"
    })
}
