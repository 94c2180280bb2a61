//! Proposal hashes of feed actions.
//!
//! Votes reference a proposal by the hash of the action that opened it, so a
//! feed author needs these to write the votes that follow.

use std::path::Path;

use serde::Serialize;
use synergy_types::Hash;

use crate::commands::replay::{parse_feed, FeedLine};
use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Debug, Clone, Serialize)]
pub struct HashedLine {
    pub line: usize,
    pub kind: String,
    pub hash: Hash,
}

pub fn hash_feed(feed: &[FeedLine]) -> CliResult<Vec<HashedLine>> {
    feed.iter()
        .map(|entry| {
            Ok(HashedLine {
                line: entry.line,
                kind: entry.action.kind().to_string(),
                hash: entry.action.hashed()?,
            })
        })
        .collect()
}

pub fn execute(feed: &Path, output: OutputFormat) -> CliResult<()> {
    let contents = std::fs::read_to_string(feed)?;
    let hashed = hash_feed(&parse_feed(&contents)?)?;
    match output {
        OutputFormat::Text => {
            for entry in &hashed {
                println!("{:>5}  {:<20} {}", entry.line, entry.kind, entry.hash.to_hex());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hashed)?),
    }
    Ok(())
}
