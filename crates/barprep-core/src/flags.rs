//! Durable boolean flags that survive restarts.
//!
//! Persistence is best effort: a failed read counts as "not set" and a failed
//! write is logged and dropped. The worst outcome is an onboarding screen that
//! shows up again on a later visit.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{CoreError, Result};

/// Flags the orchestrator relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKey {
    /// Visitor finished, skipped, or demoed their way through onboarding.
    OnboardingCompleted,
    /// Visitor has seen (or dismissed) the first-time tooltips.
    TooltipsSeen,
}

impl FlagKey {
    pub fn as_str(self) -> &'static str {
        match self {
            FlagKey::OnboardingCompleted => "onboarding-completed",
            FlagKey::TooltipsSeen => "tooltips-seen",
        }
    }

    pub fn all() -> [FlagKey; 2] {
        [FlagKey::OnboardingCompleted, FlagKey::TooltipsSeen]
    }
}

/// Backing store for flags.
///
/// Methods take `&self` so one storage handle can back several
/// collaborators at once.
pub trait FlagBackend {
    /// Read a flag. `Ok(None)` when it was never written.
    fn read_flag(&self, key: &str) -> Result<Option<bool>>;

    /// Write a flag. Last write wins.
    fn write_flag(&self, key: &str, value: bool) -> Result<()>;
}

impl<T: FlagBackend + ?Sized> FlagBackend for &T {
    fn read_flag(&self, key: &str) -> Result<Option<bool>> {
        (**self).read_flag(key)
    }

    fn write_flag(&self, key: &str, value: bool) -> Result<()> {
        (**self).write_flag(key, value)
    }
}

/// Best-effort flag store over a [`FlagBackend`].
///
/// Only exposes `set`-to-true; clearing flags is up to the hosting
/// environment.
#[derive(Debug)]
pub struct FlagStore<B> {
    backend: B,
}

impl<B: FlagBackend> FlagStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Absent or unreadable flags read as `false`.
    pub fn get(&self, key: FlagKey) -> bool {
        match self.backend.read_flag(key.as_str()) {
            Ok(value) => value.unwrap_or(false),
            Err(e) => {
                tracing::warn!(flag = key.as_str(), error = %e, "flag read failed, treating as unset");
                false
            }
        }
    }

    /// Idempotent. Write failures are logged and swallowed.
    pub fn set(&self, key: FlagKey) {
        if let Err(e) = self.backend.write_flag(key.as_str(), true) {
            tracing::warn!(flag = key.as_str(), error = %e, "flag write failed, continuing");
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

/// In-memory flag backend.
///
/// Lives as long as the process; `failing_writes` makes every write error
/// out, which is how a full or blocked storage layer looks to the core.
#[derive(Debug, Default)]
pub struct MemoryFlags {
    values: RefCell<HashMap<String, bool>>,
    failing_writes: bool,
}

impl MemoryFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with the given flags set to `true`.
    pub fn with(keys: &[FlagKey]) -> Self {
        let flags = Self::new();
        for key in keys {
            flags
                .values
                .borrow_mut()
                .insert(key.as_str().to_string(), true);
        }
        flags
    }

    /// Backend that rejects every write.
    pub fn failing_writes() -> Self {
        Self {
            values: RefCell::new(HashMap::new()),
            failing_writes: true,
        }
    }

    pub fn is_set(&self, key: FlagKey) -> bool {
        self.values
            .borrow()
            .get(key.as_str())
            .copied()
            .unwrap_or(false)
    }
}

impl FlagBackend for MemoryFlags {
    fn read_flag(&self, key: &str) -> Result<Option<bool>> {
        Ok(self.values.borrow().get(key).copied())
    }

    fn write_flag(&self, key: &str, value: bool) -> Result<()> {
        if self.failing_writes {
            return Err(CoreError::Custom(format!("write rejected for flag {key}")));
        }
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_flag_reads_false() {
        let store = FlagStore::new(MemoryFlags::new());
        assert!(!store.get(FlagKey::OnboardingCompleted));
    }

    #[test]
    fn set_is_idempotent() {
        let store = FlagStore::new(MemoryFlags::new());
        store.set(FlagKey::TooltipsSeen);
        store.set(FlagKey::TooltipsSeen);
        assert!(store.get(FlagKey::TooltipsSeen));
        assert!(!store.get(FlagKey::OnboardingCompleted));
    }

    #[test]
    fn failed_write_is_swallowed() {
        let store = FlagStore::new(MemoryFlags::failing_writes());
        store.set(FlagKey::OnboardingCompleted);
        assert!(!store.get(FlagKey::OnboardingCompleted));
    }

    #[test]
    fn store_over_borrowed_backend() {
        let flags = MemoryFlags::new();
        {
            let store = FlagStore::new(&flags);
            store.set(FlagKey::OnboardingCompleted);
        }
        assert!(flags.is_set(FlagKey::OnboardingCompleted));
    }
}
