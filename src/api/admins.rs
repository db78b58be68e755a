//! Admin Directory Endpoint

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::types::Admin;

impl ApiClient {
    /// Fetch the admin directory
    pub async fn list_admins(&self) -> Result<Vec<Admin>, ClientError> {
        let response = self.get("/api/admins").send().await?;
        self.decode(response).await
    }
}
