//! Library side of the `formstate` binary, split out so the session logic
//! can be tested without spawning a process.

pub mod cli;
pub mod logging;
pub mod session;
