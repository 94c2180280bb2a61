//! Decoded inbound actions.
//!
//! Wire decoding and signature checks happen upstream; these are the parsed
//! values the state machine consumes. Every action carries the epoch it was
//! sequenced at and its author token. An action's canonical hash (see
//! [`Instruction::hashed`]) is the identity of the proposal it opens, when it
//! opens one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::hash::{Epoch, Hash, Token};
use crate::policy::Policy;
use crate::vote::Vote;

const ACTION_DOMAIN: &[u8] = b"synergy-action-v1:";

/// Discriminant of every action kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Vote,
    CreateCollective,
    UpdateCollective,
    RequestMembership,
    RemoveMember,
    Draft,
    Edit,
    MultipartMedia,
    CreateBoard,
    UpdateBoard,
    Pin,
    BoardEditor,
    ReleaseDraft,
    ImprintStamp,
    React,
    Signin,
    CreateEvent,
    CancelEvent,
    UpdateEvent,
    CheckinEvent,
    AcceptCheckinEvent,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Vote => "vote",
            ActionKind::CreateCollective => "create_collective",
            ActionKind::UpdateCollective => "update_collective",
            ActionKind::RequestMembership => "request_membership",
            ActionKind::RemoveMember => "remove_member",
            ActionKind::Draft => "draft",
            ActionKind::Edit => "edit",
            ActionKind::MultipartMedia => "multipart_media",
            ActionKind::CreateBoard => "create_board",
            ActionKind::UpdateBoard => "update_board",
            ActionKind::Pin => "pin",
            ActionKind::BoardEditor => "board_editor",
            ActionKind::ReleaseDraft => "release_draft",
            ActionKind::ImprintStamp => "imprint_stamp",
            ActionKind::React => "react",
            ActionKind::Signin => "signin",
            ActionKind::CreateEvent => "create_event",
            ActionKind::CancelEvent => "cancel_event",
            ActionKind::UpdateEvent => "update_event",
            ActionKind::CheckinEvent => "checkin_event",
            ActionKind::AcceptCheckinEvent => "accept_checkin_event",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common surface of every decoded action.
pub trait Instruction: Serialize {
    const KIND: ActionKind;

    fn epoch(&self) -> Epoch;

    fn author(&self) -> Token;

    /// Canonical hash: BLAKE3 over a domain tag, the kind and the JSON
    /// encoding of the action.
    fn hashed(&self) -> Result<Hash, TypesError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ACTION_DOMAIN);
        hasher.update(Self::KIND.as_str().as_bytes());
        hasher.update(b":");
        serde_json::to_writer(&mut hasher, self)?;
        Ok(hasher.finalize().into())
    }
}

/// Register a new synergy member under a unique handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signin {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub handle: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCollective {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub name: String,
    pub description: String,
    pub policy: Policy,
}

/// Change a collective's description and/or policy. A policy change is
/// decided by supermajority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCollective {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub on_behalf_of: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub policy: Option<Policy>,
}

/// `include = true` asks to join; `include = false` leaves immediately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMembership {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub collective: String,
    pub include: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveMember {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub on_behalf_of: String,
    pub member: Token,
}

/// Submit a draft whose content was already assembled as media.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    #[serde(default)]
    pub on_behalf_of: Option<String>,
    #[serde(default)]
    pub co_authors: Vec<Token>,
    /// Majority among co-authors; unanimity when absent
    #[serde(default)]
    pub policy: Option<Policy>,
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub content_type: String,
    pub content_hash: Hash,
    #[serde(default)]
    pub previous_draft: Option<Hash>,
    #[serde(default)]
    pub references: Vec<Hash>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    #[serde(default)]
    pub on_behalf_of: Option<String>,
    #[serde(default)]
    pub co_authors: Vec<Token>,
    pub edited_draft: Hash,
    pub content_type: String,
    pub content_hash: Hash,
}

/// One part of a (possibly multi-part) media upload. `hash` is the hash of
/// the whole assembled content, not of this part.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipartMedia {
    pub epoch: Epoch,
    pub author: Token,
    pub hash: Hash,
    pub part: u8,
    pub of: u8,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBoard {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub on_behalf_of: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub pin_majority: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBoard {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub board: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub pin_majority: Option<u8>,
}

/// Pin (`pin = true`) or unpin a draft on a board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub board: String,
    pub draft: Hash,
    pub pin: bool,
}

/// Insert (`insert = true`) or remove a board editor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEditor {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub board: String,
    pub editor: Token,
    pub insert: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDraft {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub content_hash: Hash,
}

/// Endorse a released draft on behalf of a reputation collective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprintStamp {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub on_behalf_of: String,
    /// Draft hash of the release being stamped
    pub hash: Hash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct React {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    #[serde(default)]
    pub on_behalf_of: Option<String>,
    pub hash: Hash,
    pub reaction: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEvent {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub on_behalf_of: String,
    pub start_at: DateTime<Utc>,
    pub estimated_end: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub venue: String,
    pub open: bool,
    pub public: bool,
    /// Empty means any member of the owning collective may manage
    #[serde(default)]
    pub managers: Vec<Token>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelEvent {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub hash: Hash,
}

/// Partial patch of a live event; only present fields apply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub event_hash: Hash,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub open: Option<bool>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub managers: Option<Vec<Token>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinEvent {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub event_hash: Hash,
}

/// A manager's greeting to a checked-in member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptCheckinEvent {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub event_hash: Hash,
    pub checked_in: Token,
    #[serde(default)]
    pub secret_key: Vec<u8>,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub private_content: Vec<u8>,
}

macro_rules! instruction {
    ($($ty:ident => $kind:ident),* $(,)?) => {
        $(
            impl Instruction for $ty {
                const KIND: ActionKind = ActionKind::$kind;

                fn epoch(&self) -> Epoch {
                    self.epoch
                }

                fn author(&self) -> Token {
                    self.author
                }
            }
        )*

        /// Tagged union of every decoded action.
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(tag = "kind", rename_all = "snake_case")]
        pub enum Action {
            $($kind($ty),)*
        }

        impl Action {
            pub fn kind(&self) -> ActionKind {
                match self {
                    $(Action::$kind(_) => ActionKind::$kind,)*
                }
            }

            pub fn epoch(&self) -> Epoch {
                match self {
                    $(Action::$kind(action) => action.epoch,)*
                }
            }

            pub fn author(&self) -> Token {
                match self {
                    $(Action::$kind(action) => action.author,)*
                }
            }

            pub fn hashed(&self) -> Result<Hash, TypesError> {
                match self {
                    $(Action::$kind(action) => action.hashed(),)*
                }
            }
        }

        $(
            impl From<$ty> for Action {
                fn from(action: $ty) -> Self {
                    Action::$kind(action)
                }
            }
        )*
    };
}

instruction! {
    Vote => Vote,
    CreateCollective => CreateCollective,
    UpdateCollective => UpdateCollective,
    RequestMembership => RequestMembership,
    RemoveMember => RemoveMember,
    Draft => Draft,
    Edit => Edit,
    MultipartMedia => MultipartMedia,
    CreateBoard => CreateBoard,
    UpdateBoard => UpdateBoard,
    Pin => Pin,
    BoardEditor => BoardEditor,
    ReleaseDraft => ReleaseDraft,
    ImprintStamp => ImprintStamp,
    React => React,
    Signin => Signin,
    CreateEvent => CreateEvent,
    CancelEvent => CancelEvent,
    UpdateEvent => UpdateEvent,
    CheckinEvent => CheckinEvent,
    AcceptCheckinEvent => AcceptCheckinEvent,
}
