use std::ffi::{c_char, CString};
use std::sync::{Mutex, PoisonError};

use ising_sim::{IsingError, Simulation};

/// Opaque token handed across the C boundary.
///
/// Low 32 bits are `slot index + 1`, high 32 bits the slot generation, so
/// `0` is never a live handle and a destroyed handle never matches the
/// instance that later reuses its slot.
pub type IsingHandle = u64;

pub const NULL_HANDLE: IsingHandle = 0;

static REGISTRY: Mutex<HandleTable> = Mutex::new(HandleTable::new());

/// Run `f` with exclusive access to the process-wide handle table.
pub fn with_table<R>(f: impl FnOnce(&mut HandleTable) -> R) -> R {
    let mut table = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut table)
}

/// A live instance plus the message of its most recent rejected call.
pub struct Entry {
    pub sim: Simulation,
    last_error: Option<CString>,
}

impl Entry {
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn record_error(&mut self, err: &IsingError) {
        self.last_error = Some(CString::new(err.to_string()).unwrap_or_default());
    }

    /// Pointer to the stored message; valid until the next `clear_error`,
    /// `record_error` or removal of this entry.
    pub fn last_error_ptr(&self) -> Option<*const c_char> {
        self.last_error.as_ref().map(|msg| msg.as_ptr())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_ref().and_then(|msg| msg.to_str().ok())
    }
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Generation-checked arena of simulations.
#[derive(Default)]
pub struct HandleTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

#[inline]
fn join(index: u32, generation: u32) -> IsingHandle {
    ((generation as u64) << 32) | (index as u64 + 1)
}

#[inline]
fn split(handle: IsingHandle) -> Option<(usize, u32)> {
    let low = (handle & 0xFFFF_FFFF) as u32;
    let index = low.checked_sub(1)?;
    Some((index as usize, (handle >> 32) as u32))
}

impl HandleTable {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store `sim` and return its handle.
    ///
    /// Returns [`NULL_HANDLE`] only if every one of the `u32::MAX - 1`
    /// addressable slots is occupied.
    pub fn insert(&mut self, sim: Simulation) -> IsingHandle {
        let entry = Entry {
            sim,
            last_error: None,
        };

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return join(index, slot.generation);
        }

        let Ok(index) = u32::try_from(self.slots.len()) else {
            return NULL_HANDLE;
        };
        if index == u32::MAX {
            return NULL_HANDLE;
        }
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        join(index, 0)
    }

    /// Remove the instance behind `handle`; `None` for stale or unknown handles.
    pub fn remove(&mut self, handle: IsingHandle) -> Option<Simulation> {
        let (index, generation) = split(handle)?;
        let slot = self.slots.get_mut(index)?;
        if slot.generation != generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index as u32);
        Some(entry.sim)
    }

    pub fn get(&self, handle: IsingHandle) -> Option<&Entry> {
        let (index, generation) = split(handle)?;
        let slot = self.slots.get(index)?;
        if slot.generation != generation {
            return None;
        }
        slot.entry.as_ref()
    }

    pub fn get_mut(&mut self, handle: IsingHandle) -> Option<&mut Entry> {
        let (index, generation) = split(handle)?;
        let slot = self.slots.get_mut(index)?;
        if slot.generation != generation {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ising_sim::SimConfig;

    fn sim() -> Simulation {
        Simulation::with_seed(&SimConfig::new(3, 1.0, 1.0), 0).unwrap()
    }

    #[test]
    fn test_handle_encoding() {
        assert_eq!(join(0, 0), 1);
        assert_eq!(split(1), Some((0, 0)));
        assert_eq!(split(join(7, 3)), Some((7, 3)));
        assert_eq!(split(NULL_HANDLE), None);
        // Index part zero with a nonzero generation is still null.
        assert_eq!(split(5u64 << 32), None);
    }

    #[test]
    fn test_insert_get_remove() {
        let mut table = HandleTable::new();
        let h = table.insert(sim());
        assert_ne!(h, NULL_HANDLE);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(h).map(|e| e.sim.size()), Some(3));

        assert!(table.remove(h).is_some());
        assert!(table.is_empty());
        assert!(table.get(h).is_none());
        assert!(table.get_mut(h).is_none());
        assert!(table.remove(h).is_none());
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut table = HandleTable::new();
        let old = table.insert(sim());
        table.remove(old);
        let new = table.insert(sim());

        assert_ne!(old, new);
        assert_eq!(split(old).map(|s| s.0), split(new).map(|s| s.0));
        assert!(table.get(old).is_none());
        assert!(table.remove(old).is_none());
        assert!(table.get(new).is_some());
    }

    #[test]
    fn test_unknown_handles() {
        let mut table = HandleTable::new();
        assert!(table.get(NULL_HANDLE).is_none());
        assert!(table.get(12345).is_none());
        assert!(table.remove(u64::MAX).is_none());
    }

    #[test]
    fn test_error_slot() {
        let mut table = HandleTable::new();
        let h = table.insert(sim());
        let entry = table.get_mut(h).unwrap();
        assert!(entry.last_error_ptr().is_none());

        entry.record_error(&IsingError::InvalidTemperature(-1.0));
        assert_eq!(
            entry.last_error(),
            Some("temperature must be non-negative, got -1")
        );
        assert!(entry.last_error_ptr().is_some());

        entry.clear_error();
        assert!(entry.last_error().is_none());
    }
}
