//! Exclusive ownership of a capture device

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag marking a device as held. Clones refer to the same device.
#[derive(Debug, Clone, Default)]
pub struct DeviceLease {
    held: Arc<AtomicBool>,
}

impl DeviceLease {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the device, or `None` when someone else holds it
    pub fn try_acquire(&self) -> Option<LeaseGuard> {
        self.held
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| LeaseGuard {
                held: Arc::clone(&self.held),
            })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

/// Releases the device when dropped
#[derive(Debug)]
pub struct LeaseGuard {
    held: Arc<AtomicBool>,
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_held() {
        let lease = DeviceLease::new();
        let guard = lease.try_acquire();
        assert!(guard.is_some());
        assert!(lease.clone().try_acquire().is_none());
        assert!(lease.is_held());

        drop(guard);
        assert!(!lease.is_held());
        assert!(lease.try_acquire().is_some());
    }
}
