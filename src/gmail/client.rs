//! Gmail API client
//!
//! High-level client for Gmail API operations.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::gmail::{labels, API_BASE_URL, UNREAD_QUERY, USER_ID};
use crate::error::{GmailApiError, Result};
use crate::gmail::api::MailApi;
use crate::gmail::auth::TokenProvider;
use crate::gmail::compose::{apply_subject_override, build_raw_message};
use crate::gmail::filters::FilterManager;
use crate::gmail::labels::LabelManager;
use crate::gmail::mime::{decode_base64url, extract_email};
use crate::gmail::types::*;

/// Gmail API client
pub struct GmailClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Source of bearer tokens
    tokens: Arc<dyn TokenProvider>,

    /// API root, without the `users/me` part
    base_url: String,

    /// Address used for the From header
    sender: Option<String>,
}

impl GmailClient {
    /// Create a new Gmail client
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            tokens,
            base_url: API_BASE_URL.to_string(),
            sender: None,
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the From address for outgoing mail
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Address used for the From header, if known
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// URL below `users/me`
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/users/{}/{}", self.base_url.trim_end_matches('/'), USER_ID, path)
    }

    /// Start an authorized request
    pub(crate) async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self
            .http_client
            .request(method, self.url(path))
            .bearer_auth(token))
    }

    /// Send and decode a JSON response
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        action: &str,
        not_found: Option<GmailApiError>,
    ) -> Result<T> {
        let response = check(builder.send().await?, action, not_found).await?;
        Ok(response.json().await?)
    }

    /// Send and discard the response body
    pub(crate) async fn execute_empty(
        &self,
        builder: RequestBuilder,
        action: &str,
        not_found: Option<GmailApiError>,
    ) -> Result<()> {
        check(builder.send().await?, action, not_found).await?;
        Ok(())
    }

    /// Fetch the mailbox profile
    pub async fn profile(&self) -> Result<Profile> {
        let builder = self.request(Method::GET, "profile").await?;
        self.execute(builder, "get profile", None).await
    }

    /// Follow `nextPageToken` until exhausted or `cap` items are collected
    async fn paginate<P>(
        &self,
        path: &str,
        query: &[(&str, String)],
        cap: Option<usize>,
        action: &str,
    ) -> Result<Vec<P::Item>>
    where
        P: Page + DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        if cap == Some(0) {
            return Ok(items);
        }

        loop {
            let mut params: Vec<(&str, String)> = query.to_vec();
            if let Some(cap) = cap {
                params.push(("maxResults", (cap - items.len()).to_string()));
            }
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let builder = self.request(Method::GET, path).await?.query(&params);
            let page: P = self.execute(builder, action, None).await?;
            let (batch, next) = page.into_parts();
            items.extend(batch);

            if let Some(cap) = cap {
                if items.len() >= cap {
                    items.truncate(cap);
                    break;
                }
            }

            match next {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!("Collected {} items from {}", items.len(), path);
        Ok(items)
    }

    async fn list_messages(&self, query: &str, cap: Option<usize>) -> Result<Vec<MessageRef>> {
        self.paginate::<MessageList>("messages", &[("q", query.to_string())], cap, "list messages")
            .await
    }

    async fn modify(&self, email_id: &str, request: &ModifyMessageRequest) -> Result<()> {
        let builder = self
            .request(Method::POST, &format!("messages/{}/modify", email_id))
            .await?
            .json(request);
        self.execute_empty(builder, "modify message", Some(message_not_found(email_id)))
            .await
    }

    async fn message_metadata(&self, email_id: &str, headers: &[&str]) -> Result<Message> {
        let mut params = vec![("format", "metadata".to_string())];
        params.extend(headers.iter().map(|h| ("metadataHeaders", h.to_string())));

        let builder = self
            .request(Method::GET, &format!("messages/{}", email_id))
            .await?
            .query(&params);
        self.execute(builder, "get message", Some(message_not_found(email_id)))
            .await
    }

    fn compose(&self, to: &str, subject: &str, body: &str) -> Result<String> {
        let composed = apply_subject_override(subject, body);
        build_raw_message(self.sender(), to, &composed.subject, &composed.body)
    }
}

#[async_trait]
impl MailApi for GmailClient {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<String> {
        let request = SendMessageRequest {
            raw: self.compose(to, subject, body)?,
        };
        let builder = self
            .request(Method::POST, "messages/send")
            .await?
            .json(&request);
        let message: Message = self.execute(builder, "send email", None).await?;

        tracing::info!("Sent message {}", message.id);
        Ok(message.id)
    }

    async fn create_draft(&self, to: &str, subject: &str, body: &str) -> Result<String> {
        let request = CreateDraftRequest {
            message: SendMessageRequest {
                raw: self.compose(to, subject, body)?,
            },
        };
        let builder = self.request(Method::POST, "drafts").await?.json(&request);
        let draft: Draft = self.execute(builder, "create draft", None).await?;

        tracing::info!("Created draft {}", draft.id);
        Ok(draft.id)
    }

    async fn trash_email(&self, email_id: &str) -> Result<()> {
        let builder = self
            .request(Method::POST, &format!("messages/{}/trash", email_id))
            .await?;
        self.execute_empty(builder, "trash email", Some(message_not_found(email_id)))
            .await
    }

    async fn unread_emails(&self) -> Result<Vec<MessageRef>> {
        self.list_messages(UNREAD_QUERY, None).await
    }

    async fn read_email(&self, email_id: &str) -> Result<EmailContent> {
        let builder = self
            .request(Method::GET, &format!("messages/{}", email_id))
            .await?
            .query(&[("format", "raw")]);
        let message: Message = self
            .execute(builder, "read email", Some(message_not_found(email_id)))
            .await?;

        let raw = message.raw.ok_or_else(|| GmailApiError::RequestFailed {
            message: format!("Message {} has no raw content", email_id),
        })?;
        let email = extract_email(&decode_base64url(&raw)?);

        self.mark_as_read(email_id).await?;
        Ok(email)
    }

    async fn mark_as_read(&self, email_id: &str) -> Result<()> {
        self.modify(email_id, &ModifyMessageRequest::remove(labels::UNREAD))
            .await
    }

    async fn list_drafts(&self) -> Result<Vec<DraftSummary>> {
        let drafts = self
            .paginate::<DraftList>("drafts", &[], None, "list drafts")
            .await?;

        let mut summaries = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let builder = self
                .request(Method::GET, &format!("drafts/{}", draft.id))
                .await?
                .query(&[
                    ("format", "metadata"),
                    ("metadataHeaders", "Subject"),
                    ("metadataHeaders", "To"),
                ]);
            let full: Draft = self.execute(builder, "get draft", None).await?;
            let message = full.message.as_ref();
            let header = |name: &str| message.and_then(|m| m.header(name)).map(str::to_string);

            summaries.push(DraftSummary {
                subject: header("Subject").unwrap_or_else(|| "No Subject".to_string()),
                to: header("To").unwrap_or_else(|| "No Recipient".to_string()),
                id: full.id,
            });
        }

        Ok(summaries)
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        LabelManager::new(self).list().await
    }

    async fn create_label(&self, name: &str) -> Result<Label> {
        LabelManager::new(self).create(name).await
    }

    async fn apply_label(&self, email_id: &str, label_id: &str) -> Result<()> {
        self.modify(email_id, &ModifyMessageRequest::add(label_id)).await
    }

    async fn remove_label(&self, email_id: &str, label_id: &str) -> Result<()> {
        self.modify(email_id, &ModifyMessageRequest::remove(label_id))
            .await
    }

    async fn search_by_label(&self, label_id: &str) -> Result<Vec<MessageRef>> {
        self.list_messages(&format!("label:{}", label_id), None).await
    }

    async fn list_filters(&self) -> Result<Vec<Filter>> {
        FilterManager::new(self).list().await
    }

    async fn get_filter(&self, filter_id: &str) -> Result<Filter> {
        FilterManager::new(self).get(filter_id).await
    }

    async fn create_filter(&self, filter: Filter) -> Result<Filter> {
        FilterManager::new(self).create(filter).await
    }

    async fn delete_filter(&self, filter_id: &str) -> Result<()> {
        FilterManager::new(self).delete(filter_id).await
    }

    async fn search_emails(&self, query: &str, max_results: usize) -> Result<Vec<EmailSummary>> {
        let refs = self.list_messages(query, Some(max_results)).await?;

        let mut results = Vec::with_capacity(refs.len());
        for message_ref in refs {
            let message = self
                .message_metadata(&message_ref.id, &["Subject", "From", "Date"])
                .await?;
            let header = |name: &str| message.header(name).map(str::to_string);

            results.push(EmailSummary {
                subject: header("Subject").unwrap_or_else(|| "No Subject".to_string()),
                from: header("From").unwrap_or_else(|| "Unknown Sender".to_string()),
                date: header("Date").unwrap_or_default(),
                snippet: message.snippet.clone().unwrap_or_default(),
                thread_id: message_ref.thread_id,
                id: message_ref.id,
            });
        }

        Ok(results)
    }

    async fn create_folder(&self, name: &str) -> Result<Label> {
        LabelManager::new(self).create(name).await
    }

    async fn move_to_folder(&self, email_id: &str, folder_id: &str) -> Result<()> {
        self.modify(email_id, &ModifyMessageRequest::add(folder_id))
            .await?;

        if let Err(e) = self
            .modify(email_id, &ModifyMessageRequest::remove(labels::INBOX))
            .await
        {
            tracing::warn!(
                "Message {} labelled {} but still in INBOX: {}",
                email_id,
                folder_id,
                e
            );
            return Err(GmailApiError::PartialMove {
                email_id: email_id.to_string(),
                folder_id: folder_id.to_string(),
                message: e.to_string(),
            }
            .into());
        }

        Ok(())
    }

    async fn list_folders(&self) -> Result<Vec<FolderSummary>> {
        let labels = LabelManager::new(self).user_labels().await?;
        Ok(labels
            .into_iter()
            .map(|l| FolderSummary {
                id: l.id,
                name: l.name,
            })
            .collect())
    }
}

fn message_not_found(email_id: &str) -> GmailApiError {
    GmailApiError::MessageNotFound {
        message_id: email_id.to_string(),
    }
}

/// Pass successful responses through; map the rest to typed errors
pub(crate) async fn check(
    response: Response,
    action: &str,
    not_found: Option<GmailApiError>,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let error = match (status, not_found) {
        (StatusCode::NOT_FOUND, Some(not_found)) => not_found,
        (StatusCode::TOO_MANY_REQUESTS, _) => GmailApiError::RateLimited { message: text },
        (StatusCode::FORBIDDEN, _) => GmailApiError::InsufficientPermissions { message: text },
        _ => GmailApiError::RequestFailed {
            message: format!("Failed to {} ({}): {}", action, status, text),
        },
    };

    Err(error.into())
}
