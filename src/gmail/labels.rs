//! Label management for Gmail
//!
//! Folders are user labels, so folder operations go through here as well.

use reqwest::Method;

use crate::error::{GmailApiError, Result};
use crate::gmail::client::{check, GmailClient};
use crate::gmail::types::{CreateLabelRequest, Label, LabelList};

/// Label manager for Gmail operations
pub struct LabelManager<'a> {
    client: &'a GmailClient,
}

impl<'a> LabelManager<'a> {
    /// Create a new label manager
    pub fn new(client: &'a GmailClient) -> Self {
        Self { client }
    }

    /// Create a new Gmail label, visible in both lists
    pub async fn create(&self, name: &str) -> Result<Label> {
        let request = CreateLabelRequest::visible(name);

        let response = self
            .client
            .request(Method::POST, "labels")
            .await?
            .json(&request)
            .send()
            .await?;

        if response.status().as_u16() == 409 {
            let text = response.text().await.unwrap_or_default();
            return Err(GmailApiError::RequestFailed {
                message: format!("Label '{}' already exists: {}", name, text),
            }
            .into());
        }

        let label: Label = check(response, "create label", None).await?.json().await?;
        tracing::info!("Created label {} ({})", label.name, label.id);
        Ok(label)
    }

    /// List all labels
    pub async fn list(&self) -> Result<Vec<Label>> {
        let builder = self.client.request(Method::GET, "labels").await?;
        let list: LabelList = self.client.execute(builder, "list labels", None).await?;
        Ok(list.labels)
    }

    /// Only the labels the user created
    pub async fn user_labels(&self) -> Result<Vec<Label>> {
        Ok(self.list().await?.into_iter().filter(Label::is_user).collect())
    }
}
