//! UI focus data handed to subprocesses.
//!
//! A pager describes what the user is looking at (current line, file,
//! selection...) as string pairs. Before a command runs, those pairs are
//! exported on top of the inherited environment as `RAT_<KEY>` variables.

use std::collections::BTreeMap;
use std::ffi::OsString;

use super::exec::ExecError;

pub const ENV_PREFIX: &str = "RAT_";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    entries: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Builds the complete environment for a subprocess: `inherited` followed by
/// the context entries. Later entries win when the child reads them, and a
/// context key replaces an inherited variable of the same name.
pub fn derive_environment(
    ctx: &Context,
    inherited: impl IntoIterator<Item = (OsString, OsString)>,
) -> Result<Vec<(OsString, OsString)>, ExecError> {
    let mut exported = Vec::new();
    for (key, value) in ctx.iter() {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ExecError::InvalidContextKey(key.to_string()));
        }
        if value.contains('\0') {
            return Err(ExecError::InvalidContextValue(key.to_string()));
        }
        let name = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
        exported.push((OsString::from(name), OsString::from(value)));
    }

    let mut env: Vec<(OsString, OsString)> = inherited
        .into_iter()
        .filter(|(name, _)| !exported.iter().any(|(exported, _)| exported == name))
        .collect();
    env.extend(exported);
    Ok(env)
}
