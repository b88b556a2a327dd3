use super::{PersistenceGateway, ProfileSnapshot};
use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Slot {
    raw: Option<String>,
    saves: usize,
}

/// Keeps the serialized snapshot in memory.
///
/// Clones share one slot, so a host (or test) can hand a clone to the
/// manager and inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    slot: Rc<RefCell<Slot>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously stored text, valid or not
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let gateway = Self::default();
        gateway.slot.borrow_mut().raw = Some(raw.into());
        gateway
    }

    pub fn with_snapshot(snapshot: &ProfileSnapshot) -> Result<Self> {
        Ok(Self::with_raw(snapshot.to_json()?))
    }

    /// Last saved snapshot, if any parses
    pub fn snapshot(&self) -> Option<ProfileSnapshot> {
        self.load().ok().flatten()
    }

    pub fn save_count(&self) -> usize {
        self.slot.borrow().saves
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Result<Option<ProfileSnapshot>> {
        match self.slot.borrow().raw.as_deref() {
            Some(raw) => ProfileSnapshot::from_json(raw).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &ProfileSnapshot) -> Result<()> {
        let raw = snapshot.to_json()?;
        let mut slot = self.slot.borrow_mut();
        slot.raw = Some(raw);
        slot.saves += 1;
        Ok(())
    }
}
