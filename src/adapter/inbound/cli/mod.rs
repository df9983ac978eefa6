//! Command-line entry points.

pub mod check;
pub mod command;
pub mod output;
pub mod serve;

use crate::error::Result;
use crate::infrastructure::config::Config;
use command::ConfigArg;

/// Load the config named on the command line. A missing default file means
/// defaults; a missing explicit file is an error.
///
/// # Errors
///
/// Returns an error when the file cannot be read, parsed, or validated.
pub fn load_config(arg: &ConfigArg) -> Result<Config> {
    let path = arg.resolve();
    if arg.is_explicit() {
        Config::load(path)
    } else {
        Config::load_or_default(path)
    }
}
