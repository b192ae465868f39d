//! Owning-thread checks.
//!
//! Data models are immutable and may be built or diffed on any thread. A
//! controller's current model, however, is replaced only on the thread that
//! also drives the rendering surface. [`ThreadAffinity`] remembers that thread.
//!
//! ```
//! use horizon_sections_core::ThreadAffinity;
//!
//! let affinity = ThreadAffinity::current();
//! affinity.debug_assert_same_thread_with_msg("model replaced off the view thread");
//! ```

use std::thread::ThreadId;

/// The thread an object was created on.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl ThreadAffinity {
    /// Binds to the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            owner: std::thread::current().id(),
        }
    }

    /// Returns `true` on the owning thread.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.owner
    }

    /// Panics with `msg` off the owning thread. Compiled out in release builds.
    #[inline]
    pub fn debug_assert_same_thread_with_msg(&self, msg: &str) {
        #[cfg(debug_assertions)]
        if !self.is_same_thread() {
            self.wrong_thread(msg);
        }
        #[cfg(not(debug_assertions))]
        let _ = msg;
    }

    #[cold]
    #[inline(never)]
    fn wrong_thread(&self, msg: &str) -> ! {
        let current = std::thread::current();
        let name = current.name().unwrap_or("<unnamed>");

        crate::sections_warn!(owner = ?self.owner, current = ?current.id(), "{msg}");
        panic!(
            "{msg}: owned by {:?}, called from \"{name}\" ({:?}). Build or diff models \
             anywhere, but replace the current model on the owning thread.",
            self.owner,
            current.id()
        )
    }
}
