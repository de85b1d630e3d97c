//! Filter management for Gmail
//!
//! [`FilterSpec`] turns the flat create-filter arguments into the API's
//! criteria/action objects; [`FilterManager`] talks to `settings/filters`.

use reqwest::{Method, StatusCode};

use crate::error::{GmailApiError, Result};
use crate::gmail::client::{check, GmailClient};
use crate::gmail::types::{Filter, FilterAction, FilterCriteria, FilterList, SizeComparison};

const FILTERS_PATH: &str = "settings/filters";

/// Flat description of a filter; every `None` is left out of the request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub from_email: Option<String>,
    pub to_email: Option<String>,
    pub subject: Option<String>,
    pub query: Option<String>,
    pub has_attachment: Option<bool>,
    pub exclude_chats: Option<bool>,
    pub size_comparison: Option<SizeComparison>,
    pub size: Option<i64>,
    pub add_label_ids: Option<Vec<String>>,
    pub remove_label_ids: Option<Vec<String>>,
    pub forward_to: Option<String>,
}

impl FilterSpec {
    /// Build the filter resource sent to the API
    pub fn into_filter(self) -> Filter {
        let criteria = FilterCriteria {
            from: self.from_email,
            to: self.to_email,
            subject: self.subject,
            query: self.query,
            has_attachment: self.has_attachment,
            exclude_chats: self.exclude_chats,
            size: self.size,
            size_comparison: self.size_comparison,
        };

        let action = FilterAction {
            add_label_ids: self.add_label_ids.filter(|ids| !ids.is_empty()),
            remove_label_ids: self.remove_label_ids.filter(|ids| !ids.is_empty()),
            forward: self.forward_to,
        };

        Filter {
            id: None,
            criteria,
            action,
        }
    }
}

/// Filter manager for Gmail operations
pub struct FilterManager<'a> {
    client: &'a GmailClient,
}

impl<'a> FilterManager<'a> {
    /// Create a new filter manager
    pub fn new(client: &'a GmailClient) -> Self {
        Self { client }
    }

    fn filter_not_found(filter_id: &str) -> Option<GmailApiError> {
        Some(GmailApiError::FilterNotFound {
            filter_id: filter_id.to_string(),
        })
    }

    /// Create a new Gmail filter
    pub async fn create(&self, filter: Filter) -> Result<Filter> {
        let response = self
            .client
            .request(Method::POST, FILTERS_PATH)
            .await?
            .json(&filter)
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let text = response.text().await.unwrap_or_default();
            return Err(GmailApiError::InvalidFilterCriteria { message: text }.into());
        }

        let created: Filter = check(response, "create filter", None).await?.json().await?;
        tracing::info!("Created filter {}", created.id.as_deref().unwrap_or("?"));
        Ok(created)
    }

    /// List all Gmail filters
    pub async fn list(&self) -> Result<Vec<Filter>> {
        let response = self
            .client
            .request(Method::GET, FILTERS_PATH)
            .await?
            .send()
            .await?;
        let text = check(response, "list filters", None).await?.text().await?;

        // No filters comes back as an empty body or `{}`
        if text.trim().is_empty() || text.trim() == "{}" {
            return Ok(Vec::new());
        }

        let list: FilterList = serde_json::from_str(&text).map_err(|e| GmailApiError::RequestFailed {
            message: format!("Failed to parse filter list: {}", e),
        })?;
        Ok(list.filter)
    }

    /// Get a specific filter by ID
    pub async fn get(&self, filter_id: &str) -> Result<Filter> {
        let builder = self
            .client
            .request(Method::GET, &format!("{}/{}", FILTERS_PATH, filter_id))
            .await?;
        self.client
            .execute(builder, "get filter", Self::filter_not_found(filter_id))
            .await
    }

    /// Delete a Gmail filter
    pub async fn delete(&self, filter_id: &str) -> Result<()> {
        let builder = self
            .client
            .request(Method::DELETE, &format!("{}/{}", FILTERS_PATH, filter_id))
            .await?;
        self.client
            .execute_empty(builder, "delete filter", Self::filter_not_found(filter_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_omits_unset_fields() {
        let filter = FilterSpec {
            from_email: Some("boss@example.com".to_string()),
            add_label_ids: Some(vec!["Label_9".to_string()]),
            remove_label_ids: Some(vec![]),
            ..Default::default()
        }
        .into_filter();

        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(value["criteria"], serde_json::json!({"from": "boss@example.com"}));
        assert_eq!(value["action"], serde_json::json!({"addLabelIds": ["Label_9"]}));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_spec_size_comparison() {
        let filter = FilterSpec {
            size_comparison: Some(SizeComparison::Larger),
            size: Some(1_000_000),
            forward_to: Some("archive@example.com".to_string()),
            ..Default::default()
        }
        .into_filter();

        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(value["criteria"]["sizeComparison"], "larger");
        assert_eq!(value["criteria"]["size"], 1_000_000);
        assert_eq!(value["action"]["forward"], "archive@example.com");
    }
}
