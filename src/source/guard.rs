//! Scoped ownership of an open line source.

use std::ops::{Deref, DerefMut};

use tracing::info;

use super::LineSource;

/// Owns an open [`LineSource`] and closes it when dropped.
///
/// Dropping happens on every exit path of the orchestrator, including
/// early returns, `?` propagation and unwinding.
#[derive(Debug)]
pub struct SourceGuard {
    source: Box<dyn LineSource>,
}

impl SourceGuard {
    pub fn new(source: Box<dyn LineSource>) -> Self {
        Self { source }
    }
}

impl Deref for SourceGuard {
    type Target = dyn LineSource;

    fn deref(&self) -> &Self::Target {
        self.source.as_ref()
    }
}

impl DerefMut for SourceGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.source.as_mut()
    }
}

impl Drop for SourceGuard {
    fn drop(&mut self) {
        self.source.close();
        info!("Closed {}", self.source.description());
    }
}
