//! Logging layer mask and the logger collaborator contract
//!
//! The core decides *whether* to emit a record (from the handle's
//! [`LayerMode`] mask) and *what* arguments to pass; rendering records to
//! text, files, or sockets is entirely the collaborator's concern.

use smallvec::SmallVec;

/// Bitmask selecting which log channels are active on a handle
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerMode(u32);

impl LayerMode {
    /// No logging
    pub const NONE: LayerMode = LayerMode(0);
    /// Per-call trace records (operation name + raw arguments)
    pub const LOG_TRACE: LayerMode = LayerMode(1);
    /// Bench-replay records
    pub const LOG_BENCH: LayerMode = LayerMode(2);
    /// Aggregated profile records
    pub const LOG_PROFILE: LayerMode = LayerMode(4);

    /// True when every bit of `other` is set in `self`
    #[inline]
    pub fn contains(self, other: LayerMode) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when no channel is active
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for LayerMode {
    type Output = LayerMode;

    #[inline]
    fn bitor(self, rhs: LayerMode) -> LayerMode {
        LayerMode(self.0 | rhs.0)
    }
}

/// One named argument of a log record
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LogArg {
    /// Integer argument (dimensions, increments, strides, batch counts)
    Int(&'static str, i64),
    /// Floating argument
    Float(&'static str, f64),
    /// Single-character argument (mode letters, precision tags)
    Char(&'static str, char),
    /// Static string argument
    Str(&'static str, &'static str),
}

impl LogArg {
    /// Integer argument
    #[inline]
    pub fn int(name: &'static str, value: i64) -> Self {
        LogArg::Int(name, value)
    }

    /// Character argument
    #[inline]
    pub fn ch(name: &'static str, value: char) -> Self {
        LogArg::Char(name, value)
    }
}

/// Argument list for one record; sized for the widest operation signature
pub(crate) type LogArgs = SmallVec<[LogArg; 16]>;

/// Collaborator receiving structured log records
///
/// Implementations format and route the records; they must not assume any
/// particular call ordering beyond "records arrive in issue order of the
/// operations that produced them".
pub trait Logger: Send + Sync {
    /// A per-call trace record
    fn trace(&self, op: &'static str, args: &[LogArg]);

    /// A bench-replay record
    fn bench(&self, op: &'static str, args: &[LogArg]);

    /// An aggregated profile record
    fn profile(&self, op: &'static str, args: &[LogArg]);
}
