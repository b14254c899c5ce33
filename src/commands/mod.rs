//! Command implementations for the binsift CLI.
//!
//! One module per subcommand; each exposes a `run` function returning the
//! text printed to stdout. File and directory errors get their context here,
//! at the application boundary.

pub(crate) mod classify;
pub(crate) mod extract;
pub(crate) mod matching;
pub(crate) mod missing;

pub(crate) use classify::run as classify_command;
pub(crate) use extract::run as extract_command;
pub(crate) use matching::run as matching_command;
pub(crate) use missing::run as missing_command;
