//! Execution context for parablas operations
//!
//! This module defines the [`Handle`] every operation is issued through,
//! together with the pieces it owns:
//!
//! ```text
//! Handle (execution context)
//! ├── Stream (issue-order execution, synchronize)
//! ├── PointerMode (host- or device-resident alpha/beta)
//! ├── CheckNumerics (pre/post operand scans)
//! ├── LayerMode + Logger (structured log records)
//! └── Workspace (scoped scratch memory, size-query mode)
//! ```

mod handle;
mod logging;
mod stream;
mod workspace;

pub use handle::{CheckNumerics, Handle, PointerMode};
pub use logging::{LayerMode, LogArg, Logger};
pub use stream::Stream;
pub(crate) use workspace::WorkspaceGuard;
