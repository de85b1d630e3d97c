//! Gmail API type definitions
//!
//! Wire types mirror the Gmail API (camelCase JSON). The summary types at the
//! bottom are what the tools hand back to clients.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One page of a paginated listing
pub trait Page {
    type Item;

    /// Split into the page's items and the continuation token
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

/// A Gmail message part (MIME part)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    /// MIME type of this part
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Headers for this part
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,

    /// Nested parts (for multipart messages)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<MessagePart>,
}

impl MessagePart {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Header in a message part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    /// Header name
    pub name: String,

    /// Header value
    pub value: String,
}

/// A Gmail message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message ID
    pub id: String,

    /// Thread ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    /// Label IDs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_ids: Vec<String>,

    /// Snippet (preview text)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    /// Message payload (headers only with format=metadata)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<MessagePart>,

    /// Raw RFC822 message (only with format=raw)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Message {
    /// Header from the top-level payload
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.as_ref().and_then(|p| p.header(name))
    }
}

/// List of messages response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    /// Messages in this page
    #[serde(default)]
    pub messages: Vec<MessageRef>,

    /// Next page token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl Page for MessageList {
    type Item = MessageRef;

    fn into_parts(self) -> (Vec<MessageRef>, Option<String>) {
        (self.messages, self.next_page_token)
    }
}

/// Reference to a message (id and thread_id only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    /// Message ID
    pub id: String,

    /// Thread ID
    #[serde(default)]
    pub thread_id: String,
}

/// A Gmail label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Label ID
    pub id: String,

    /// Label name
    pub name: String,

    /// Label type (system or user)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub label_type: Option<String>,

    /// Message list visibility
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_list_visibility: Option<String>,

    /// Label list visibility
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_list_visibility: Option<String>,
}

impl Label {
    /// User-created labels double as folders
    pub fn is_user(&self) -> bool {
        self.label_type.as_deref() == Some("user")
    }
}

/// List of labels response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LabelList {
    /// Labels
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Request to create a label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabelRequest {
    /// Label name
    pub name: String,

    /// Message list visibility
    pub message_list_visibility: MessageListVisibility,

    /// Label list visibility
    pub label_list_visibility: LabelListVisibility,
}

impl CreateLabelRequest {
    /// A label shown in both the label list and the message list
    pub fn visible(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message_list_visibility: MessageListVisibility::Show,
            label_list_visibility: LabelListVisibility::Show,
        }
    }
}

/// Request to modify message labels
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModifyMessageRequest {
    /// Label IDs to add
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_label_ids: Option<Vec<String>>,

    /// Label IDs to remove
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_label_ids: Option<Vec<String>>,
}

impl ModifyMessageRequest {
    pub fn add(label_id: impl Into<String>) -> Self {
        Self {
            add_label_ids: Some(vec![label_id.into()]),
            ..Default::default()
        }
    }

    pub fn remove(label_id: impl Into<String>) -> Self {
        Self {
            remove_label_ids: Some(vec![label_id.into()]),
            ..Default::default()
        }
    }
}

/// Gmail filter criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Sender email to match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Recipient email to match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Subject to match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Search query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Whether message has attachment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_attachment: Option<bool>,

    /// Whether to exclude chats
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_chats: Option<bool>,

    /// Size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,

    /// Size comparison operator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_comparison: Option<SizeComparison>,
}

/// Size comparison for filters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SizeComparison {
    Smaller,
    Larger,
}

/// Gmail filter action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterAction {
    /// Label IDs to add
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_label_ids: Option<Vec<String>>,

    /// Label IDs to remove
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_label_ids: Option<Vec<String>>,

    /// Email to forward to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward: Option<String>,
}

/// A Gmail filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    /// Filter ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Filter criteria
    #[serde(default)]
    pub criteria: FilterCriteria,

    /// Filter action
    #[serde(default)]
    pub action: FilterAction,
}

/// List of filters response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterList {
    /// Filters
    #[serde(default)]
    pub filter: Vec<Filter>,
}

/// Gmail draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    /// Draft ID
    pub id: String,

    /// The message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// List of drafts response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DraftList {
    /// Drafts in this page
    #[serde(default)]
    pub drafts: Vec<Draft>,

    /// Next page token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl Page for DraftList {
    type Item = Draft;

    fn into_parts(self) -> (Vec<Draft>, Option<String>) {
        (self.drafts, self.next_page_token)
    }
}

/// Request to send a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Raw RFC822 message (base64url encoded)
    pub raw: String,
}

/// Request to create a draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    /// The message
    pub message: SendMessageRequest,
}

/// Mailbox profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Address of the authenticated account
    pub email_address: String,
}

/// Visibility options for labels in message list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageListVisibility {
    #[default]
    Show,
    Hide,
}

/// Visibility options for labels in label list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LabelListVisibility {
    #[default]
    #[serde(rename = "labelShow")]
    Show,
    #[serde(rename = "labelShowIfUnread")]
    ShowIfUnread,
    #[serde(rename = "labelHide")]
    Hide,
}

// ==================== Tool-facing summaries ====================

/// Decoded content of one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailContent {
    pub subject: String,
    pub from: String,
    pub to: String,
    pub date: String,
    pub content: String,
}

/// One search hit with its headline metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailSummary {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: String,
    pub subject: String,
    pub from: String,
    pub date: String,
    pub snippet: String,
}

/// A draft's id with its subject and recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftSummary {
    pub id: String,
    pub subject: String,
    pub to: String,
}

/// Label as reported by list-labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub label_type: String,
}

impl From<Label> for LabelSummary {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            name: label.name,
            label_type: label.label_type.unwrap_or_default(),
        }
    }
}

/// Folder as reported by list-folders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderSummary {
    pub id: String,
    pub name: String,
}
