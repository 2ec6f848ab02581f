//! Exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Invalid field values
pub const DATAERR: i32 = 65;

/// A referenced node, element or navigation does not exist
pub const NOINPUT: i32 = 66;

/// Tree mutation failed
pub const SOFTWARE: i32 = 70;

/// Workspace file could not be read or written
pub const IOERR: i32 = 74;

/// Missing or unknown navigation, unknown site, bad settings
pub const CONFIG: i32 = 78;
