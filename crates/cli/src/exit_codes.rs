//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of
//! the shell contract — scripts rely on them.
//!
//! | Code | Description                                   |
//! |------|-----------------------------------------------|
//! | 0    | Success                                       |
//! | 2    | CLI usage error (bad args)                    |
//! | 3    | Invalid config (parse or validation failure)  |
//! | 4    | Runtime error (IO, engine failure)            |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Runtime failure: unreadable input, CSV decode error, engine error.
pub const EXIT_RUNTIME: u8 = 4;
