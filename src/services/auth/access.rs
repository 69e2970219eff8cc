use serde::{Deserialize, Serialize};

/// The only resource type this server hands out access for.
pub const ACCESS_ENTRY_TYPE: &str = "repository";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub actions: Vec<String>,
}

impl AccessEntry {
    pub fn repository(name: impl Into<String>, actions: Vec<String>) -> Self {
        Self {
            kind: ACCESS_ENTRY_TYPE.to_string(),
            name: name.into(),
            actions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("scope is missing or invalid")]
pub struct InvalidScope;

/// Parse `type:name:action1,action2,...` into a single access entry.
///
/// Exactly three `:`-separated parts are required and the first must be
/// [`ACCESS_ENTRY_TYPE`]. The action list is split on `,` without trimming,
/// so an empty action segment yields a single empty action.
pub fn parse_scope(scope: &str) -> Result<AccessEntry, InvalidScope> {
    let parts: Vec<&str> = scope.split(':').collect();

    match parts.as_slice() {
        [kind, name, actions] if *kind == ACCESS_ENTRY_TYPE => Ok(AccessEntry::repository(
            *name,
            actions.split(',').map(str::to_string).collect(),
        )),
        _ => Err(InvalidScope),
    }
}
