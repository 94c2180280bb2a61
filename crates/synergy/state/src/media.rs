//! Media Assembler
//!
//! Content is addressed by the BLAKE3 hash of its bytes. A single-part
//! upload is verified and committed at once. A multi-part upload is buffered
//! until every part is present, then the concatenation is verified against
//! the declared hash. A mismatch drops the whole upload; nothing partial is
//! ever committed. Uploads still missing parts when their deadline passes
//! are discarded.

use std::collections::{BTreeMap, HashMap};

use synergy_types::actions::MultipartMedia;
use synergy_types::{Epoch, Hash};
use tracing::{debug, info, warn};

use crate::error::{StateError, StateResult};
use crate::journal::StateEvent;
use crate::state::State;

#[derive(Clone, Debug)]
struct PartialUpload {
    of: u8,
    deadline: Epoch,
    parts: BTreeMap<u8, Vec<u8>>,
}

/// Assembled media plus uploads still missing parts
#[derive(Clone, Debug)]
pub struct MediaAssembler {
    media: HashMap<Hash, Vec<u8>>,
    pending: HashMap<Hash, PartialUpload>,
    deadlines: BTreeMap<Epoch, Vec<Hash>>,
    upload_deadline: u64,
}

impl Default for MediaAssembler {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PROPOSAL_DEADLINE)
    }
}

impl MediaAssembler {
    /// `upload_deadline` epochs after its first part, an incomplete upload
    /// is discarded.
    pub fn new(upload_deadline: u64) -> Self {
        Self {
            media: HashMap::new(),
            pending: HashMap::new(),
            deadlines: BTreeMap::new(),
            upload_deadline,
        }
    }

    pub fn get(&self, hash: &Hash) -> Option<&[u8]> {
        self.media.get(hash).map(Vec::as_slice)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.media.contains_key(hash)
    }

    /// Whether an upload for `hash` is waiting for more parts.
    pub fn is_pending(&self, hash: &Hash) -> bool {
        self.pending.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }

    /// Accept one part. Returns the assembled size once the upload is
    /// complete and verified, `None` while parts are still missing.
    ///
    /// Parts are numbered `1..=of`.
    pub fn insert_part(&mut self, part: MultipartMedia) -> StateResult<Option<usize>> {
        let MultipartMedia {
            epoch,
            hash,
            part: index,
            of,
            data,
            ..
        } = part;
        if self.media.contains_key(&hash) {
            return Err(StateError::MediaAlreadyExists(hash));
        }
        if of == 0 || index == 0 || index > of {
            return Err(StateError::InvalidMediaPart { part: index, of });
        }

        if of == 1 {
            return self.verify_and_commit(hash, data).map(Some);
        }

        if !self.pending.contains_key(&hash) {
            let deadline = epoch.saturating_add(self.upload_deadline);
            self.deadlines.entry(deadline).or_default().push(hash);
            self.pending.insert(
                hash,
                PartialUpload {
                    of,
                    deadline,
                    parts: BTreeMap::new(),
                },
            );
        }
        let upload = match self.pending.get_mut(&hash) {
            Some(upload) => upload,
            None => return Ok(None),
        };
        if upload.of != of || upload.parts.contains_key(&index) {
            return Err(StateError::InvalidMediaPart { part: index, of });
        }
        upload.parts.insert(index, data);
        debug!(%hash, part = index, of, "Media part buffered");
        if upload.parts.len() < of as usize {
            return Ok(None);
        }

        let content: Vec<u8> = match self.pending.remove(&hash) {
            Some(upload) => upload.parts.into_values().flatten().collect(),
            None => return Ok(None),
        };
        self.verify_and_commit(hash, content).map(Some)
    }

    /// Discard every incomplete upload whose deadline is at or before
    /// `epoch`, returning their hashes.
    pub fn expire(&mut self, epoch: Epoch) -> Vec<Hash> {
        let due = match epoch.checked_add(1) {
            Some(next) => {
                let later = self.deadlines.split_off(&next);
                std::mem::replace(&mut self.deadlines, later)
            }
            None => std::mem::take(&mut self.deadlines),
        };
        let mut expired = Vec::new();
        for (deadline, hashes) in due {
            for hash in hashes {
                // A finished or dropped upload may have been restarted since.
                let stale = self
                    .pending
                    .get(&hash)
                    .is_some_and(|upload| upload.deadline == deadline);
                if stale {
                    self.pending.remove(&hash);
                    expired.push(hash);
                }
            }
        }
        expired
    }

    fn verify_and_commit(&mut self, declared: Hash, content: Vec<u8>) -> StateResult<usize> {
        let assembled = Hash::of(&content);
        if assembled != declared {
            warn!(%declared, %assembled, "Media hash mismatch, upload dropped");
            return Err(StateError::MediaHashMismatch {
                declared,
                assembled,
            });
        }
        let size = content.len();
        self.media.insert(declared, content);
        Ok(size)
    }
}

impl State {
    pub fn media_part(&mut self, part: MultipartMedia) -> StateResult<()> {
        self.require_member(&part.author)?;
        let hash = part.hash;
        let epoch = part.epoch;
        if let Some(size) = self.media.insert_part(part)? {
            info!(%hash, size, "Media assembled");
            self.record(epoch, StateEvent::MediaAssembled { hash, size });
        }
        Ok(())
    }
}
