//! `delegate check-config`.

use std::path::Path;

use anyhow::bail;

use delegate_config::{ConfigLoader, ConfigValidator};

/// Load and validate, printing every problem. Fails when any error is found.
pub(crate) fn check_config(path: Option<&Path>) -> anyhow::Result<()> {
    let config = ConfigLoader::load_or_default(path)?;
    let result = ConfigValidator::validate(&config)?;

    for warning in &result.warnings {
        println!("warning: {}", warning);
    }
    for error in &result.errors {
        println!("error: {}", error);
    }

    if !result.is_valid() {
        bail!("configuration has {} error(s)", result.errors.len());
    }
    println!("Configuration OK");
    Ok(())
}
