//! Message Endpoints
//!
//! Message creation, thread retrieval, search and the starred list.

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::types::{ChatMessage, OutgoingMessage, StarredMessage};

impl ApiClient {
    /// Submit a composed message; the server answers with the
    /// confirmed message carrying its assigned id.
    pub async fn create_message(
        &self,
        draft: &OutgoingMessage,
    ) -> Result<ChatMessage, ClientError> {
        let response = self.post("/api/messages").json(draft).send().await?;
        self.decode(response).await
    }

    /// Fetch the message thread of a room
    pub async fn room_messages(&self, room_id: i64) -> Result<Vec<ChatMessage>, ClientError> {
        let response = self
            .get(&format!("/api/rooms/{}/messages", room_id))
            .send()
            .await?;
        self.decode(response).await
    }

    /// Full-text search across messages. Results are passed through,
    /// never cached.
    pub async fn search_messages(&self, query: &str) -> Result<Vec<ChatMessage>, ClientError> {
        let response = self
            .get("/api/messages/search")
            .query(&[("q", query)])
            .send()
            .await?;
        self.decode(response).await
    }

    /// Fetch the current admin's starred messages
    pub async fn starred_messages(&self) -> Result<Vec<StarredMessage>, ClientError> {
        let response = self.get("/api/messages/starred").send().await?;
        self.decode(response).await
    }

    /// Star or unstar a message for the current admin
    pub async fn set_message_starred(
        &self,
        message_id: i64,
        starred: bool,
    ) -> Result<(), ClientError> {
        let response = self
            .post(&format!("/api/messages/{}/star", message_id))
            .json(&serde_json::json!({ "starred": starred }))
            .send()
            .await?;
        self.decode_ok(response).await
    }
}
