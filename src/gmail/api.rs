//! Operations the mail tools need from Gmail
//!
//! [`crate::gmail::client::GmailClient`] is the real implementation; tests
//! plug in recording stubs.

use async_trait::async_trait;

use crate::error::Result;
use crate::gmail::types::{
    DraftSummary, EmailContent, EmailSummary, Filter, FolderSummary, Label, MessageRef,
};

#[async_trait]
pub trait MailApi: Send + Sync {
    /// Send a message, returning its id
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<String>;

    /// Save a draft, returning the draft id
    async fn create_draft(&self, to: &str, subject: &str, body: &str) -> Result<String>;

    /// Move a message to the trash
    async fn trash_email(&self, email_id: &str) -> Result<()>;

    /// Unread messages in the primary inbox
    async fn unread_emails(&self) -> Result<Vec<MessageRef>>;

    /// Decode a message and mark it read
    async fn read_email(&self, email_id: &str) -> Result<EmailContent>;

    /// Remove the UNREAD label
    async fn mark_as_read(&self, email_id: &str) -> Result<()>;

    async fn list_drafts(&self) -> Result<Vec<DraftSummary>>;

    async fn list_labels(&self) -> Result<Vec<Label>>;

    async fn create_label(&self, name: &str) -> Result<Label>;

    async fn apply_label(&self, email_id: &str, label_id: &str) -> Result<()>;

    async fn remove_label(&self, email_id: &str, label_id: &str) -> Result<()>;

    async fn search_by_label(&self, label_id: &str) -> Result<Vec<MessageRef>>;

    async fn list_filters(&self) -> Result<Vec<Filter>>;

    async fn get_filter(&self, filter_id: &str) -> Result<Filter>;

    async fn create_filter(&self, filter: Filter) -> Result<Filter>;

    async fn delete_filter(&self, filter_id: &str) -> Result<()>;

    /// Gmail query search, capped at `max_results` hits
    async fn search_emails(&self, query: &str, max_results: usize) -> Result<Vec<EmailSummary>>;

    async fn create_folder(&self, name: &str) -> Result<Label>;

    /// Add the folder label, then drop INBOX; two separate requests
    async fn move_to_folder(&self, email_id: &str, folder_id: &str) -> Result<()>;

    async fn list_folders(&self) -> Result<Vec<FolderSummary>>;
}
