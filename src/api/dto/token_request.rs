/// Query string of `POST /oauth/token`.
///
/// Missing parameters are empty strings so they fail the same checks as
/// wrong values. A repeated parameter keeps its first value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenQuery {
    /// OAuth2 grant type. Must be "client_credentials".
    pub grant_type: String,

    /// `repository:<name>:<action>,<action>...`
    pub scope: String,
}

impl TokenQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut grant_type = None;
        let mut scope = None;

        for (key, value) in pairs {
            match key.as_str() {
                "grant_type" => {
                    grant_type.get_or_insert(value);
                }
                "scope" => {
                    scope.get_or_insert(value);
                }
                _ => {}
            }
        }

        Self {
            grant_type: grant_type.unwrap_or_default(),
            scope: scope.unwrap_or_default(),
        }
    }
}
