//! # protcorpus
//!
//! A Rust client for building protein-mention literature corpora from the
//! NCBI E-utilities, PubTator Central, and UniProtKB.
//!
//! The crate retrieves PubMed abstracts and PMC full texts for a search
//! term, exports gene annotations, and reduces UniProtKB entries to
//! protein alias lists. Everything a run produces lands in one query
//! directory; paginated and batched retrieval keeps partial results on
//! failure instead of discarding them.
//!
//! ## Quick start
//!
//! ```no_run
//! use protcorpus::config::ClientConfig;
//! use protcorpus::pipeline::{AutoConfirm, Pipeline, PipelineOptions};
//! use protcorpus::query::Query;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let query = Query::new("BRCA1 AND DNA repair")?;
//!     let pipeline = Pipeline::new(ClientConfig::new(), PipelineOptions::default());
//!     let report = pipeline.run(&query, &mut AutoConfirm).await?;
//!     println!("{} PMIDs in {}", report.pmid_count, report.query_dir.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Rate limiting
//!
//! Requests respect the NCBI guidelines automatically: 3 requests per
//! second without an API key, 10 with one. See
//! [`ClientConfig`](config::ClientConfig) for identification parameters.

pub mod batch;
pub mod config;
pub mod entrez;
pub mod error;
pub mod fetch;
pub mod medline;
pub mod pipeline;
pub mod pmc;
pub mod process;
pub mod pubtator;
pub mod query;
pub mod rate_limit;
pub mod uniprot;
pub mod xml_merge;

pub use config::ClientConfig;
pub use error::{CorpusError, Result};
pub use pipeline::{Pipeline, PipelineOptions, PipelineReport};
pub use query::Query;
