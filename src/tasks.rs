//! Background task spawning
//!
//! Tile fetches and persistence writes run off the frame tick. The tick hands
//! boxed futures to a `TaskSpawner`; results come back over channels and are
//! applied when the tick polls them.

use futures::future::BoxFuture;

/// Runs detached futures. Implementations must not block the caller for long.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Spawner backed by a tokio runtime handle
#[cfg(feature = "native")]
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "native")]
impl TokioSpawner {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is currently inside
    pub fn current() -> Option<Self> {
        tokio::runtime::Handle::try_current()
            .ok()
            .map(|handle| Self { handle })
    }
}

#[cfg(feature = "native")]
impl TaskSpawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.handle.spawn(task);
    }
}

/// Drives each task to completion on the calling thread.
///
/// Results still travel through the result channel, so they are observed on
/// the next poll exactly as with a real runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineSpawner;

impl TaskSpawner for InlineSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        futures::executor::block_on(task);
    }
}
