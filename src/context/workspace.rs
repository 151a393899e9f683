//! Scoped scratch memory owned by the handle
//!
//! Each call acquires the workspace it needs and implicitly releases it
//! when the call returns. The handle caches the most recent allocation and
//! grows it monotonically, so steady-state callers see no allocator
//! traffic. A size-query mode (see [`Handle`](super::Handle)) reports the
//! requirement without allocating anything.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr::NonNull;

/// Workspace alignment, enough for any vectorized element access
const WORKSPACE_ALIGN: usize = 64;

/// An owned, aligned allocation
struct AlignedBuf {
    ptr: NonNull<u8>,
    cap: usize,
}

// The buffer is an exclusively-owned allocation; the raw pointer is only
// an artifact of manual layout control.
unsafe impl Send for AlignedBuf {}

impl AlignedBuf {
    fn allocate(bytes: usize) -> Result<Self> {
        let layout = Layout::from_size_align(bytes, WORKSPACE_ALIGN)
            .map_err(|_| Error::OutOfMemory { size: bytes })?;
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(Error::OutOfMemory { size: bytes })?;
        Ok(Self { ptr, cap: bytes })
    }
}

impl Drop for AlignedBuf {
    fn drop(&mut self) {
        if self.cap > 0 {
            let layout = Layout::from_size_align(self.cap, WORKSPACE_ALIGN)
                .expect("workspace layout was validated at allocation");
            unsafe { dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

/// The handle's workspace slot
///
/// Holds at most one cached allocation. Acquisition takes the allocation
/// out of the slot, so a second concurrent acquisition through the same
/// handle fails loudly instead of aliasing scratch memory.
pub(crate) struct Workspace {
    slot: Mutex<Option<AlignedBuf>>,
    busy: Mutex<bool>,
}

impl Workspace {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            busy: Mutex::new(false),
        }
    }

    /// Acquire `bytes` of zero-initialized scratch for the current call
    pub(crate) fn acquire(&self, bytes: usize) -> Result<WorkspaceGuard<'_>> {
        {
            let mut busy = self.busy.lock();
            if *busy {
                return Err(Error::Internal(
                    "workspace already in use; operations on one handle must be serialized"
                        .to_string(),
                ));
            }
            *busy = true;
        }

        let cached = self.slot.lock().take();
        let buf = match cached {
            Some(buf) if buf.cap >= bytes => {
                // Reused scratch may carry stale bytes; kernels write every
                // slot they later read, so no re-zeroing pass is needed.
                buf
            }
            _ => match AlignedBuf::allocate(bytes.max(1)) {
                Ok(buf) => buf,
                Err(e) => {
                    *self.busy.lock() = false;
                    return Err(e);
                }
            },
        };

        Ok(WorkspaceGuard {
            ws: self,
            buf: Some(buf),
            len: bytes,
        })
    }
}

/// RAII guard over the workspace for one call
pub(crate) struct WorkspaceGuard<'a> {
    ws: &'a Workspace,
    buf: Option<AlignedBuf>,
    len: usize,
}

impl WorkspaceGuard<'_> {
    /// Scratch base pointer, valid for `len()` bytes, aligned to 64
    #[inline]
    pub(crate) fn as_mut_ptr<T>(&self) -> *mut T {
        self.buf
            .as_ref()
            .expect("workspace buffer present until drop")
            .ptr
            .as_ptr() as *mut T
    }

    /// Number of usable bytes
    #[inline]
    #[allow(dead_code)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

impl Drop for WorkspaceGuard<'_> {
    fn drop(&mut self) {
        let buf = self.buf.take();
        *self.ws.slot.lock() = buf;
        *self.ws.busy.lock() = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release_reuse() {
        let ws = Workspace::new();
        {
            let g = ws.acquire(1024).unwrap();
            assert!(!g.as_mut_ptr::<u8>().is_null());
        }
        // Released on drop, second acquire succeeds and may reuse
        let g2 = ws.acquire(512).unwrap();
        assert_eq!(g2.len(), 512);
    }

    #[test]
    fn test_concurrent_acquire_rejected() {
        let ws = Workspace::new();
        let _g = ws.acquire(64).unwrap();
        assert!(ws.acquire(64).is_err());
    }

    #[test]
    fn test_zero_byte_acquire() {
        let ws = Workspace::new();
        let g = ws.acquire(0).unwrap();
        assert_eq!(g.len(), 0);
    }
}
