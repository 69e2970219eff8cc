use tokio::sync::RwLock;

/// Holds the most recently issued token so `/auth` can replay it.
///
/// Last writer wins; there is no expiry and no per-client binding.
#[derive(Debug, Default)]
pub struct LastTokenStore {
    token: RwLock<Option<String>>,
}

impl LastTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, token: &str) {
        *self.token.write().await = Some(token.to_string());
    }

    /// Empty string until the first token is recorded.
    pub async fn latest(&self) -> String {
        self.token.read().await.clone().unwrap_or_default()
    }
}
