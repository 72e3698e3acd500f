//! Init command - write a config template

use anstream::println;
use health_submit::config::TEMPLATE;
use health_submit::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Write the config template to `path`
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn run_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, TEMPLATE)?;

    println!("Wrote config template to {}", path.display());
    println!("Fill in the [[forms]] entries, then run `health-submit`.");
    Ok(())
}
