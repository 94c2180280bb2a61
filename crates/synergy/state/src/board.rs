//! Boards: curated, ordered lists of pinned drafts owned by a collective.
//!
//! Creating or updating a board and changing its editors are decided by the
//! owning collective. Pinning and unpinning are decided by the board's
//! editors. Pin and editor proposals are identified by a hash of the
//! intended mutation itself, so each distinct mutation has its own identity.

use serde::{Deserialize, Serialize};
use synergy_consensus::{AdhocGroup, Collective, Consensual};
use synergy_types::actions::{self, BoardEditor, CreateBoard, Instruction, UpdateBoard};
use synergy_types::{Epoch, Hash, Token, Vote, MAX_PERCENTAGE};
use tracing::info;

use crate::error::{StateError, StateResult};
use crate::journal::StateEvent;
use crate::registry::{gated, Gate};
use crate::state::State;

const PIN_DOMAIN: &[u8] = b"synergy-pin-v1:";
const EDITOR_DOMAIN: &[u8] = b"synergy-board-editor-v1:";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
    /// Owning collective
    pub collective: String,
    pub editors: AdhocGroup,
    pub pinned: Vec<Hash>,
}

impl Board {
    pub fn is_pinned(&self, draft: &Hash) -> bool {
        self.pinned.contains(draft)
    }

    /// The `n` earliest pins.
    pub fn first(&self, n: usize) -> &[Hash] {
        &self.pinned[..n.min(self.pinned.len())]
    }

    /// The `n` latest pins.
    pub fn last(&self, n: usize) -> &[Hash] {
        &self.pinned[self.pinned.len().saturating_sub(n)..]
    }
}

/// Identity of a pin (`pin = true`) or unpin proposal.
pub fn pin_hash(epoch: Epoch, draft: &Hash, board: &str, pin: bool) -> Hash {
    mutation_hash(PIN_DOMAIN, epoch, draft.as_bytes(), board, pin)
}

/// Identity of an editor insert (`insert = true`) or removal proposal.
pub fn editor_hash(epoch: Epoch, editor: &Token, board: &str, insert: bool) -> Hash {
    mutation_hash(EDITOR_DOMAIN, epoch, editor.as_bytes(), board, insert)
}

fn mutation_hash(domain: &[u8], epoch: Epoch, subject: &[u8; 32], board: &str, flag: bool) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain);
    hasher.update(&epoch.to_be_bytes());
    hasher.update(subject);
    hasher.update(&(board.len() as u64).to_be_bytes());
    hasher.update(board.as_bytes());
    hasher.update(&[flag as u8]);
    hasher.finalize().into()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingBoard {
    pub epoch: Epoch,
    pub board: Board,
    pub gate: Gate<Collective>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingBoardUpdate {
    pub epoch: Epoch,
    pub board: String,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub pin_majority: Option<u8>,
    pub gate: Gate<Collective>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingPin {
    pub epoch: Epoch,
    pub board: String,
    pub draft: Hash,
    pub pin: bool,
    pub gate: Gate<AdhocGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingBoardEditor {
    pub epoch: Epoch,
    pub board: String,
    pub editor: Token,
    pub insert: bool,
    pub gate: Gate<Collective>,
}

gated!(PendingBoard, PendingBoardUpdate, PendingPin, PendingBoardEditor);

/// A pin must target an unpinned draft, an unpin a pinned one.
fn pin_conflict(board: &Board, draft: Hash, pin: bool) -> StateResult<()> {
    match (pin, board.is_pinned(&draft)) {
        (true, true) => Err(StateError::AlreadyPinned {
            board: board.name.clone(),
            draft,
        }),
        (false, false) => Err(StateError::NotPinned {
            board: board.name.clone(),
            draft,
        }),
        _ => Ok(()),
    }
}

fn editor_conflict(board: &Board, editor: Token, insert: bool) -> StateResult<()> {
    match (insert, board.editors.is_member(&editor)) {
        (true, true) => Err(StateError::AlreadyEditor {
            board: board.name.clone(),
            editor,
        }),
        (false, false) => Err(StateError::NotEditor {
            board: board.name.clone(),
            editor,
        }),
        _ => Ok(()),
    }
}

pub(crate) fn check_majority(majority: u32) -> StateResult<()> {
    if majority > MAX_PERCENTAGE {
        return Err(StateError::InvalidMajority(majority));
    }
    Ok(())
}

impl State {
    pub fn create_board(&mut self, create: CreateBoard) -> StateResult<()> {
        if self.boards.contains_key(&create.name) {
            return Err(StateError::BoardAlreadyExists(create.name));
        }
        check_majority(u32::from(create.pin_majority))?;
        let hash = create.hashed()?;
        let photo = self.collective_member(&create.on_behalf_of, &create.author)?.photo();

        let board = Board {
            name: create.name,
            description: create.description,
            keywords: create.keywords,
            collective: create.on_behalf_of,
            editors: AdhocGroup::new(u32::from(create.pin_majority), [create.author]),
            pinned: Vec::new(),
        };
        let pending = PendingBoard {
            epoch: create.epoch,
            board,
            gate: Gate::seeded(photo, Vote::submission(create.epoch, create.author, hash)),
        };
        self.propose(create.epoch, pending.into())
    }

    pub fn update_board(&mut self, update: UpdateBoard) -> StateResult<()> {
        if let Some(majority) = update.pin_majority {
            check_majority(u32::from(majority))?;
        }
        let hash = update.hashed()?;
        let photo = self.board_owner(&update.board, &update.author)?.photo();
        let pending = PendingBoardUpdate {
            epoch: update.epoch,
            board: update.board,
            description: update.description,
            keywords: update.keywords,
            pin_majority: update.pin_majority,
            gate: Gate::seeded(photo, Vote::submission(update.epoch, update.author, hash)),
        };
        self.propose(update.epoch, pending.into())
    }

    pub fn pin(&mut self, pin: actions::Pin) -> StateResult<()> {
        let board = self
            .boards
            .get(&pin.board)
            .ok_or_else(|| StateError::BoardNotFound(pin.board.clone()))?;
        if !board.editors.is_member(&pin.author) {
            return Err(StateError::NotEditor {
                board: pin.board,
                editor: pin.author,
            });
        }
        if !self.drafts.contains_key(&pin.draft) {
            return Err(StateError::DraftNotFound(pin.draft));
        }
        pin_conflict(board, pin.draft, pin.pin)?;

        let hash = pin_hash(pin.epoch, &pin.draft, &pin.board, pin.pin);
        let editors = board.editors.clone();
        let pending = PendingPin {
            epoch: pin.epoch,
            board: pin.board,
            draft: pin.draft,
            pin: pin.pin,
            gate: Gate::seeded(editors, Vote::submission(pin.epoch, pin.author, hash)),
        };
        self.propose(pin.epoch, pending.into())
    }

    pub fn board_editor(&mut self, action: BoardEditor) -> StateResult<()> {
        self.require_member(&action.editor)?;
        let board = self
            .boards
            .get(&action.board)
            .ok_or_else(|| StateError::BoardNotFound(action.board.clone()))?;
        editor_conflict(board, action.editor, action.insert)?;

        let hash = editor_hash(action.epoch, &action.editor, &action.board, action.insert);
        let photo = self.board_owner(&action.board, &action.author)?.photo();
        let pending = PendingBoardEditor {
            epoch: action.epoch,
            board: action.board,
            editor: action.editor,
            insert: action.insert,
            gate: Gate::seeded(photo, Vote::submission(action.epoch, action.author, hash)),
        };
        self.propose(action.epoch, pending.into())
    }

    /// The live collective owning `board`, provided `author` belongs to it.
    fn board_owner(&self, board: &str, author: &Token) -> StateResult<&Collective> {
        let board = self
            .boards
            .get(board)
            .ok_or_else(|| StateError::BoardNotFound(board.to_string()))?;
        self.collective_member(&board.collective, author)
    }

    pub(crate) fn check_board(&self, pending: &PendingBoard) -> StateResult<()> {
        let name = &pending.board.name;
        if self.boards.contains_key(name) {
            return Err(StateError::BoardAlreadyExists(name.clone()));
        }
        Ok(())
    }

    pub(crate) fn check_board_update(&self, pending: &PendingBoardUpdate) -> StateResult<()> {
        self.board_ref(&pending.board).map(|_| ())
    }

    pub(crate) fn check_pin(&self, pending: &PendingPin) -> StateResult<()> {
        pin_conflict(self.board_ref(&pending.board)?, pending.draft, pending.pin)
    }

    pub(crate) fn check_board_editor(&self, pending: &PendingBoardEditor) -> StateResult<()> {
        editor_conflict(self.board_ref(&pending.board)?, pending.editor, pending.insert)
    }

    pub(crate) fn commit_board(&mut self, epoch: Epoch, pending: PendingBoard) -> StateResult<()> {
        self.check_board(&pending)?;
        let name = pending.board.name.clone();
        info!(board = %name, collective = %pending.board.collective, "Board created");
        self.boards.insert(name.clone(), pending.board);
        self.record(epoch, StateEvent::BoardCreated { name });
        Ok(())
    }

    pub(crate) fn commit_board_update(
        &mut self,
        epoch: Epoch,
        pending: PendingBoardUpdate,
    ) -> StateResult<()> {
        let board = self.board_mut(&pending.board)?;
        if let Some(description) = pending.description {
            board.description = description;
        }
        if let Some(keywords) = pending.keywords {
            board.keywords = keywords;
        }
        if let Some(majority) = pending.pin_majority {
            board.editors.change_majority(u32::from(majority));
        }
        info!(board = %pending.board, "Board updated");
        self.record(epoch, StateEvent::BoardUpdated { name: pending.board });
        Ok(())
    }

    pub(crate) fn commit_pin(&mut self, epoch: Epoch, pending: PendingPin) -> StateResult<()> {
        self.check_pin(&pending)?;
        let PendingPin {
            board: name,
            draft,
            pin,
            ..
        } = pending;
        let board = self.board_mut(&name)?;
        if pin {
            board.pinned.push(draft);
        } else {
            board.pinned.retain(|h| *h != draft);
        }
        if let Some(record) = self.drafts.get_mut(&draft) {
            if pin {
                record.pinned.insert(name.clone());
            } else {
                record.pinned.remove(&name);
            }
        }
        info!(board = %name, %draft, pin, "Board pins changed");
        let event = if pin {
            StateEvent::Pinned { board: name, draft }
        } else {
            StateEvent::Unpinned { board: name, draft }
        };
        self.record(epoch, event);
        Ok(())
    }

    pub(crate) fn commit_board_editor(
        &mut self,
        epoch: Epoch,
        pending: PendingBoardEditor,
    ) -> StateResult<()> {
        self.check_board_editor(&pending)?;
        let PendingBoardEditor {
            board: name,
            editor,
            insert,
            ..
        } = pending;
        let board = self.board_mut(&name)?;
        let event = if insert {
            board.editors.include_member(editor);
            StateEvent::EditorIncluded { board: name, editor }
        } else {
            board.editors.remove_member(&editor);
            StateEvent::EditorRemoved { board: name, editor }
        };
        info!(%editor, insert, "Board editors changed");
        self.record(epoch, event);
        Ok(())
    }

    fn board_ref(&self, name: &str) -> StateResult<&Board> {
        self.boards
            .get(name)
            .ok_or_else(|| StateError::BoardNotFound(name.to_string()))
    }

    fn board_mut(&mut self, name: &str) -> StateResult<&mut Board> {
        self.boards
            .get_mut(name)
            .ok_or_else(|| StateError::BoardNotFound(name.to_string()))
    }
}
