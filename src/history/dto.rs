use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AddHistoryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
