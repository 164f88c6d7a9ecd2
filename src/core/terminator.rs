//! Process-termination primitive behind the force-exit path.
//!
//! The default implementation calls [`std::process::exit`]. Tests substitute
//! a recording implementation through the crate-private config override; the
//! seam is intentionally not part of the public API.

/// Terminates the process with the given exit status.
pub(crate) trait Terminate: Send + Sync + 'static {
    fn exit(&self, code: i32);
}

/// Default terminator: `std::process::exit`.
pub(crate) struct OsExit;

impl Terminate for OsExit {
    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}
