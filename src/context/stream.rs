//! Execution stream owned by a handle

use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_STREAM_ID: AtomicUsize = AtomicUsize::new(0);

/// An ordered execution stream
///
/// Operations issued through a handle execute in issue order on the
/// handle's stream. On the host executor every operation has completed by
/// the time its call returns, so [`Stream::synchronize`] has nothing left
/// to wait for; callers that want portable code should still call it
/// before inspecting results produced with device-resident output
/// pointers.
#[derive(Clone, Debug)]
pub struct Stream {
    id: usize,
}

impl Stream {
    /// Create a new stream
    pub fn new() -> Self {
        Self {
            id: NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Unique identifier for this stream
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for all operations issued on this stream to complete
    pub fn synchronize(&self) {
        // Host executor runs kernels to completion inside the issuing
        // call, nothing pending here.
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}
