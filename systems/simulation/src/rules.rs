//! Loading of session rules from RON text.

use std::{
    fs,
    path::{Path, PathBuf},
};

use lawn_defence_core::Rules;
use thiserror::Error;

/// Errors that can occur when loading a rules file.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The file could not be read.
    #[error("failed to read rules file '{}': {source}", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid RON for [`Rules`].
    #[error("failed to parse rules: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The rules parse but describe an unplayable session.
    #[error("invalid rules: {0}")]
    Invalid(&'static str),
}

/// Parses rules from RON text. Fields missing from the text keep their defaults.
pub fn parse_rules(text: &str) -> Result<Rules, RulesError> {
    let rules: Rules = ron::from_str(text)?;
    validate(&rules)?;
    Ok(rules)
}

/// Reads and parses the rules file at `path`.
pub fn load_rules(path: &Path) -> Result<Rules, RulesError> {
    let text = fs::read_to_string(path).map_err(|source| RulesError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(&text)
}

fn validate(rules: &Rules) -> Result<(), RulesError> {
    if rules.kill_quota == 0 {
        return Err(RulesError::Invalid("kill_quota must be at least 1"));
    }
    if rules.final_level == 0 {
        return Err(RulesError::Invalid("final_level must be at least 1"));
    }
    if rules.starting_lives == 0 {
        return Err(RulesError::Invalid("starting_lives must be at least 1"));
    }
    if rules.max_lives < rules.starting_lives {
        return Err(RulesError::Invalid("max_lives must not be below starting_lives"));
    }
    if rules.resource_cap < 0.0 || rules.base_accrual < 0.0 {
        return Err(RulesError::Invalid(
            "resource_cap and base_accrual must be non-negative",
        ));
    }
    if rules.min_shooter_cooldown == 0 {
        return Err(RulesError::Invalid("min_shooter_cooldown must be at least 1"));
    }
    Ok(())
}
