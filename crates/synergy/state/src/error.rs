//! Error types for the state machine

use synergy_consensus::VoteError;
use synergy_types::{Epoch, Hash, Token, TypesError};

/// Errors returned by state handlers. Every variant is raised before any
/// mutation, so a failed action leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("Not a synergy member: {0}")]
    NotMember(Token),

    #[error("Member already registered: {0}")]
    MemberAlreadyExists(Token),

    #[error("Handle already taken: {0}")]
    HandleTaken(String),

    #[error("Collective not found: {0}")]
    CollectiveNotFound(String),

    #[error("Collective already exists: {0}")]
    CollectiveAlreadyExists(String),

    #[error("{member} is not a member of collective {collective}")]
    NotCollectiveMember { collective: String, member: Token },

    #[error("{member} is already a member of collective {collective}")]
    AlreadyCollectiveMember { collective: String, member: Token },

    #[error("Invalid majority: {0} (must be within 0..=100)")]
    InvalidMajority(u32),

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Board already exists: {0}")]
    BoardAlreadyExists(String),

    #[error("{editor} is not an editor of board {board}")]
    NotEditor { board: String, editor: Token },

    #[error("{editor} is already an editor of board {board}")]
    AlreadyEditor { board: String, editor: Token },

    #[error("Draft {draft} already pinned on board {board}")]
    AlreadyPinned { board: String, draft: Hash },

    #[error("Draft {draft} not pinned on board {board}")]
    NotPinned { board: String, draft: Hash },

    #[error("Draft not found: {0}")]
    DraftNotFound(Hash),

    #[error("Draft already submitted: {0}")]
    AlreadyDrafted(Hash),

    #[error("{author} is not an author of draft {draft}")]
    NotAuthor { draft: Hash, author: Token },

    #[error("Edit already submitted: {0}")]
    AlreadyEdited(Hash),

    #[error("Media not found: {0}")]
    MediaNotFound(Hash),

    #[error("Media already assembled: {0}")]
    MediaAlreadyExists(Hash),

    #[error("Media hash mismatch: declared {declared}, assembled {assembled}")]
    MediaHashMismatch { declared: Hash, assembled: Hash },

    #[error("Invalid media part {part} of {of}")]
    InvalidMediaPart { part: u8, of: u8 },

    #[error("Event not found: {0}")]
    EventNotFound(Hash),

    #[error("Event is not live: {0}")]
    EventNotLive(Hash),

    #[error("Event ends before it starts")]
    InvalidEventSchedule,

    #[error("{manager} is not a manager of event {event}")]
    NotManager { event: Hash, manager: Token },

    #[error("{member} already checked in to event {event}")]
    AlreadyCheckedIn { event: Hash, member: Token },

    #[error("{member} has not checked in to event {event}")]
    NotCheckedIn { event: Hash, member: Token },

    #[error("{member} was already greeted at event {event}")]
    AlreadyGreeted { event: Hash, member: Token },

    #[error("Draft already released: {0}")]
    AlreadyReleased(Hash),

    #[error("Release not found: {0}")]
    ReleaseNotFound(Hash),

    #[error("Release {release} already stamped by {collective}")]
    AlreadyStamped { release: Hash, collective: String },

    #[error("Invalid reaction {reaction}, only {count} kinds exist")]
    InvalidReaction { reaction: u8, count: u8 },

    #[error("Proposal not found: {0}")]
    ProposalNotFound(Hash),

    #[error("Proposal already pending: {0}")]
    ProposalAlreadyExists(Hash),

    #[error("Epoch regression: at {current}, received {received}")]
    EpochRegression { current: Epoch, received: Epoch },

    #[error("Rejected vote: {0}")]
    Vote(#[from] VoteError),

    #[error("Types error: {0}")]
    Types(#[from] TypesError),
}

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;
