//! UniProtKB entry retrieval and alias extraction

mod alias;
mod client;
mod model;

pub use alias::AliasSet;
pub use client::UniProtClient;
pub use model::{parse_entry_set, NameGroup, ProteinNames, UniProtEntry, UniProtEntrySet};
