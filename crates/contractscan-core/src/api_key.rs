use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    /// Principal that requests made with this key act as.
    pub user_id: String,
    pub key_hash: String,
    pub created_at: String,
    pub last_used_at: Option<String>,
}
