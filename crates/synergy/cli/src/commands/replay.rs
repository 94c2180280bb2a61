//! Replay a JSON-lines action feed against a fresh ledger.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use synergy_state::{JournalEntry, ProposalKind, Replayer, State};
use synergy_types::actions::Signin;
use synergy_types::{Action, Epoch};
use tracing::{debug, info};

use crate::config::ReplayConfig;
use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;

/// One decoded feed line
#[derive(Debug, Clone)]
pub struct FeedLine {
    /// 1-based line number in the source file
    pub line: usize,
    pub action: Action,
}

/// Decode a feed. Blank lines and lines starting with `#` are skipped.
pub fn parse_feed(contents: &str) -> CliResult<Vec<FeedLine>> {
    let mut feed = Vec::new();
    for (index, raw) in contents.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let action = serde_json::from_str(trimmed).map_err(|source| CliError::Feed {
            line: index + 1,
            source,
        })?;
        feed.push(FeedLine {
            line: index + 1,
            action,
        });
    }
    Ok(feed)
}

/// Fresh state with the configured genesis members signed in at epoch zero.
pub fn genesis(config: &ReplayConfig) -> CliResult<State> {
    let mut state = State::genesis(config.engine.clone());
    for member in &config.members {
        state.signin(Signin {
            epoch: 0,
            author: member.token,
            reasons: String::new(),
            handle: member.handle.clone(),
        })?;
    }
    debug!(members = config.members.len(), "Genesis members signed in");
    Ok(state)
}

/// A feed action the state machine refused
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub line: usize,
    pub kind: String,
    pub reason: String,
}

/// What the ledger looks like after a replay
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub epoch: Epoch,
    pub applied: usize,
    pub members: usize,
    pub collectives: usize,
    pub boards: usize,
    pub drafts: usize,
    pub events: usize,
    pub pending: BTreeMap<ProposalKind, usize>,
    pub rejected: Vec<Rejection>,
}

impl Summary {
    fn of(state: &State, applied: usize, rejected: Vec<Rejection>) -> Self {
        let mut pending = BTreeMap::new();
        for (_, proposal) in state.registry().iter() {
            *pending.entry(proposal.kind()).or_insert(0) += 1;
        }
        Self {
            epoch: state.epoch(),
            applied,
            members: state.members().count(),
            collectives: state.collectives().count(),
            boards: state.boards().count(),
            drafts: state.drafts().count(),
            events: state.events().count(),
            pending,
            rejected,
        }
    }

    pub fn pending_total(&self) -> usize {
        self.pending.values().sum()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Epoch:       {}", self.epoch)?;
        writeln!(f, "Applied:     {}", self.applied)?;
        writeln!(f, "Rejected:    {}", self.rejected.len())?;
        writeln!(f, "Members:     {}", self.members)?;
        writeln!(f, "Collectives: {}", self.collectives)?;
        writeln!(f, "Boards:      {}", self.boards)?;
        writeln!(f, "Drafts:      {}", self.drafts)?;
        writeln!(f, "Events:      {}", self.events)?;
        writeln!(f, "Pending:     {}", self.pending_total())?;
        for (kind, count) in &self.pending {
            writeln!(f, "  {kind:?}: {count}")?;
        }
        for rejection in &self.rejected {
            writeln!(
                f,
                "  line {} ({}): {}",
                rejection.line, rejection.kind, rejection.reason
            )?;
        }
        Ok(())
    }
}

/// Outcome of [`replay`]: the summary and the final state.
#[derive(Debug)]
pub struct Outcome {
    pub summary: Summary,
    pub state: State,
}

impl Outcome {
    pub fn journal(&self) -> &[JournalEntry] {
        self.state.journal()
    }
}

/// Replay `feed` on top of the configured genesis.
pub fn replay(config: &ReplayConfig, feed: Vec<FeedLine>) -> CliResult<Outcome> {
    let mut replayer = Replayer::new(genesis(config)?);
    let lines: Vec<(usize, String)> = feed
        .iter()
        .map(|entry| (entry.line, entry.action.kind().to_string()))
        .collect();
    let report = replayer.replay(feed.into_iter().map(|entry| entry.action))?;

    let rejected = report
        .rejected
        .into_iter()
        .map(|(position, err)| {
            let (line, kind) = lines
                .get(position)
                .cloned()
                .unwrap_or((position + 1, String::new()));
            Rejection {
                line,
                kind,
                reason: err.to_string(),
            }
        })
        .collect();

    let state = replayer.into_state();
    let summary = Summary::of(&state, report.applied, rejected);
    info!(
        applied = summary.applied,
        rejected = summary.rejected.len(),
        pending = summary.pending_total(),
        "Replay finished"
    );
    Ok(Outcome { summary, state })
}

/// Read, replay and print.
pub fn execute(
    config: &ReplayConfig,
    feed: &Path,
    journal: bool,
    output: OutputFormat,
) -> CliResult<()> {
    let contents = std::fs::read_to_string(feed)?;
    let outcome = replay(config, parse_feed(&contents)?)?;

    match output {
        OutputFormat::Text => {
            if journal {
                for entry in outcome.journal() {
                    println!("{}", serde_json::to_string(entry)?);
                }
            }
            print!("{}", outcome.summary);
        }
        OutputFormat::Json => {
            if journal {
                let value = serde_json::json!({
                    "summary": outcome.summary,
                    "journal": outcome.journal(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
            }
        }
    }
    Ok(())
}
