//! # jsv-cli: Command-Line Front End
//!
//! Provides the `jsv` binary. Argument parsing lives here; every decision
//! about validity is delegated to `jsv-validator`.
//!
//! ```bash
//! jsv validate --schema person.schema.json --instance ada.yaml
//! jsv validate --schema api.json --ref http://example.com/defs.json=defs.json \
//!     --instance request.json --exception-threshold error --brief
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: the instance is valid.
//! - `1`: the report contains an ERROR.
//! - `2`: processing aborted, or an input could not be loaded.

pub mod load;
pub mod validate;

/// Exit code for a valid instance.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for a report containing errors.
pub const EXIT_INVALID: u8 = 1;
/// Exit code for an aborted run or unusable input.
pub const EXIT_ABORTED: u8 = 2;
