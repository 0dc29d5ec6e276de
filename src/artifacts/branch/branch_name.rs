use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::artifacts::core::error::{GraftError, Result};
use anyhow::Context;

/// Prefix of every branch ref path, relative to `.graft`
pub const REF_PREFIX: &str = "refs/heads/";

/// Target of a symbolic ref, e.g. `refs/heads/main`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymRefName(String);

impl SymRefName {
    pub fn try_parse(ref_path: &str) -> Result<Self> {
        if !ref_path.starts_with(REF_PREFIX) {
            return Err(GraftError::InvalidOperand(format!(
                "symbolic ref must start with '{REF_PREFIX}', got '{ref_path}'"
            )));
        }

        Ok(SymRefName(ref_path.to_string()))
    }

    pub fn as_ref_path(&self) -> &str {
        &self.0
    }
}

impl From<&BranchName> for SymRefName {
    fn from(branch_name: &BranchName) -> Self {
        SymRefName(format!("{REF_PREFIX}{branch_name}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(GraftError::InvalidOperand(
                "branch name cannot be empty".to_string(),
            ));
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Err(GraftError::InvalidOperand(format!(
                "invalid branch name: {name}"
            )))
        } else {
            Ok(Self(name))
        }
    }

    pub fn try_parse_sym_ref_name(sym_ref_name: &SymRefName) -> Result<Self> {
        Self::try_parse(
            sym_ref_name
                .as_ref_path()
                .trim_start_matches(REF_PREFIX)
                .to_string(),
        )
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
