//! Room Endpoints

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::types::{Room, RoomDetails};

impl ApiClient {
    /// Fetch the room list for the chat sidebar
    pub async fn list_rooms(&self) -> Result<Vec<Room>, ClientError> {
        let response = self.get("/api/rooms").send().await?;
        self.decode(response).await
    }

    /// Fetch the details of one room
    pub async fn room_details(&self, room_id: i64) -> Result<RoomDetails, ClientError> {
        let response = self
            .get(&format!("/api/rooms/{}", room_id))
            .send()
            .await?;
        self.decode(response).await
    }
}
