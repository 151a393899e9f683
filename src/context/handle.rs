//! The operation handle

use super::logging::{LayerMode, LogArgs, Logger};
use super::stream::Stream;
use super::workspace::{Workspace, WorkspaceGuard};
use crate::error::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Where alpha/beta coefficient pointers are resident
///
/// In host mode the core may peek coefficients before launching anything,
/// which enables the zero-coefficient quick returns. In device mode the
/// coefficient is only read inside the kernel, so those shortcuts are
/// disabled and the coefficient pointer is always required.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PointerMode {
    /// Coefficients live in host memory (default)
    #[default]
    Host,
    /// Coefficients live in device memory
    Device,
}

/// Whether operands are scanned for non-finite values around each kernel
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CheckNumerics {
    /// No scanning (default)
    #[default]
    Disabled,
    /// Scan inputs before dispatch and outputs after; a NaN or Inf fails
    /// the call with `check_numerics_fail`
    Enabled,
}

impl CheckNumerics {
    /// True when scanning is active
    #[inline]
    pub fn is_enabled(self) -> bool {
        self == CheckNumerics::Enabled
    }
}

/// Process-wide execution context for parablas operations
///
/// Exclusively owned by the caller and passed by reference into every
/// operation; it must outlive all operations issued through it. The handle
/// performs no locking for operation ordering: issuing operations against
/// one handle from several host threads concurrently is an explicit caller
/// obligation to serialize.
pub struct Handle {
    stream: Stream,
    pointer_mode: PointerMode,
    check_numerics: CheckNumerics,
    layer_mode: LayerMode,
    logger: Option<Arc<dyn Logger>>,
    workspace: Workspace,
    size_query_active: bool,
    size_query_max: AtomicUsize,
}

impl Handle {
    /// Create a handle with a fresh stream and default modes
    pub fn new() -> Self {
        Self {
            stream: Stream::new(),
            pointer_mode: PointerMode::default(),
            check_numerics: CheckNumerics::default(),
            layer_mode: LayerMode::NONE,
            logger: None,
            workspace: Workspace::new(),
            size_query_active: false,
            size_query_max: AtomicUsize::new(0),
        }
    }

    /// The stream operations issued through this handle execute on
    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Replace the execution stream
    pub fn set_stream(&mut self, stream: Stream) {
        self.stream = stream;
    }

    /// Current coefficient pointer mode
    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer_mode
    }

    /// Set the coefficient pointer mode
    pub fn set_pointer_mode(&mut self, mode: PointerMode) {
        self.pointer_mode = mode;
    }

    /// Current numerics-check mode
    pub fn check_numerics(&self) -> CheckNumerics {
        self.check_numerics
    }

    /// Enable or disable the numerics check
    pub fn set_check_numerics(&mut self, mode: CheckNumerics) {
        self.check_numerics = mode;
    }

    /// Current logging mask
    pub fn layer_mode(&self) -> LayerMode {
        self.layer_mode
    }

    /// Set the logging mask
    pub fn set_layer_mode(&mut self, mode: LayerMode) {
        self.layer_mode = mode;
    }

    /// Install the logging collaborator
    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = Some(logger);
    }

    // ========================================================================
    // Device memory size query
    // ========================================================================

    /// Enter size-query mode
    ///
    /// While active, operations report the workspace they would need via
    /// [`Handle::stop_size_query`] and perform no validation-passing work.
    pub fn start_size_query(&mut self) {
        self.size_query_active = true;
        self.size_query_max.store(0, Ordering::Relaxed);
    }

    /// Leave size-query mode, returning the largest requirement recorded
    pub fn stop_size_query(&mut self) -> usize {
        self.size_query_active = false;
        self.size_query_max.swap(0, Ordering::Relaxed)
    }

    /// True while a size query is in progress
    #[inline]
    pub fn is_size_query(&self) -> bool {
        self.size_query_active
    }

    /// Record a workspace requirement during a size query
    ///
    /// Returns true when the query consumed the call, i.e. the operation
    /// must return success without executing.
    #[inline]
    pub(crate) fn record_size_query(&self, bytes: usize) -> bool {
        if self.size_query_active {
            self.size_query_max.fetch_max(bytes, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    // ========================================================================
    // Workspace
    // ========================================================================

    /// Acquire call-scoped scratch memory
    pub(crate) fn workspace(&self, bytes: usize) -> Result<WorkspaceGuard<'_>> {
        self.workspace.acquire(bytes)
    }

    // ========================================================================
    // Logging
    // ========================================================================

    /// Emit a record on every active channel
    ///
    /// The argument list is built lazily, only when a channel is active.
    pub(crate) fn log_call<F>(&self, op: &'static str, build: F)
    where
        F: FnOnce() -> LogArgs,
    {
        let Some(logger) = &self.logger else {
            return;
        };
        if self.layer_mode.is_none() {
            return;
        }
        let args = build();
        if self.layer_mode.contains(LayerMode::LOG_TRACE) {
            logger.trace(op, &args);
        }
        if self.layer_mode.contains(LayerMode::LOG_BENCH) {
            logger.bench(op, &args);
        }
        if self.layer_mode.contains(LayerMode::LOG_PROFILE) {
            logger.profile(op, &args);
        }
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("stream", &self.stream.id())
            .field("pointer_mode", &self.pointer_mode)
            .field("check_numerics", &self.check_numerics)
            .field("layer_mode", &self.layer_mode)
            .finish()
    }
}
