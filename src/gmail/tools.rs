//! Mail tool catalog and dispatcher
//!
//! Every tool call is parsed into a [`MailToolCall`] before anything touches
//! the network, so bad arguments never reach Gmail.

use std::borrow::Cow;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::config::gmail::{DEFAULT_SEARCH_RESULTS, WEB_MESSAGE_URL};
use crate::error::{AdapterError, McpError, Result, ValidationError};
use crate::gmail::api::MailApi;
use crate::gmail::filters::FilterSpec;
use crate::gmail::prompts::mail_prompts;
use crate::gmail::types::{LabelSummary, SizeComparison};
use crate::mcp::handler::McpHandler;
use crate::mcp::prompts::PromptRegistry;
use crate::mcp::schema::{parse_args, tool_def, NoArgs};
use crate::mcp::types::{CallToolResult, ServerInfo, Tool};

/// Name reported during `initialize`
pub const SERVER_NAME: &str = "gmail";

// ==================== Argument structs ====================

/// Arguments for send-email and create-draft
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct ComposeArgs {
    /// Recipient email address
    #[validate(email)]
    pub recipient_id: String,

    /// Email subject
    #[validate(length(min = 1))]
    pub subject: String,

    /// Email content text; a first line starting with "Subject:" replaces the subject
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct EmailIdArgs {
    /// Email ID
    #[validate(length(min = 1))]
    pub email_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct NameArgs {
    /// Name of the label or folder
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct LabelArgs {
    /// Email ID
    #[validate(length(min = 1))]
    pub email_id: String,

    /// Label ID
    #[validate(length(min = 1))]
    pub label_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct LabelIdArgs {
    /// Label ID to search for
    #[validate(length(min = 1))]
    pub label_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct FilterIdArgs {
    /// Filter ID
    #[validate(length(min = 1))]
    pub filter_id: String,
}

/// Arguments for create-filter; at least one field must be set
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_filter_args"))]
pub struct CreateFilterArgs {
    /// Filter emails from this sender
    #[serde(default)]
    pub from_email: Option<String>,

    /// Filter emails to this recipient
    #[serde(default)]
    pub to_email: Option<String>,

    /// Filter emails with this subject
    #[serde(default)]
    pub subject: Option<String>,

    /// Filter emails matching this query
    #[serde(default)]
    pub query: Option<String>,

    /// Filter emails with attachments
    #[serde(default)]
    pub has_attachment: Option<bool>,

    /// Exclude chats from filter
    #[serde(default)]
    pub exclude_chats: Option<bool>,

    /// Size comparison; requires `size`
    #[serde(default)]
    pub size_comparison: Option<SizeComparison>,

    /// Size in bytes for comparison
    #[serde(default)]
    #[validate(range(min = 0))]
    pub size: Option<i64>,

    /// Labels to add to matching emails
    #[serde(default)]
    pub add_label_ids: Option<Vec<String>>,

    /// Labels to remove from matching emails
    #[serde(default)]
    pub remove_label_ids: Option<Vec<String>>,

    /// Email address to forward matching emails to
    #[serde(default)]
    pub forward_to: Option<String>,
}

impl CreateFilterArgs {
    fn into_spec(self) -> FilterSpec {
        let text = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        FilterSpec {
            from_email: text(self.from_email),
            to_email: text(self.to_email),
            subject: text(self.subject),
            query: text(self.query),
            has_attachment: self.has_attachment,
            exclude_chats: self.exclude_chats,
            size_comparison: self.size_comparison,
            size: self.size,
            add_label_ids: self.add_label_ids,
            remove_label_ids: self.remove_label_ids,
            forward_to: text(self.forward_to),
        }
    }
}

fn validate_filter_args(args: &CreateFilterArgs) -> std::result::Result<(), validator::ValidationError> {
    if args.size_comparison.is_some() != args.size.is_some() {
        let mut error = validator::ValidationError::new("size_pair");
        error.message = Some(Cow::from("size_comparison and size must be given together"));
        return Err(error);
    }

    let forward_to = args.forward_to.as_deref().filter(|v| !v.trim().is_empty());
    if let Some(address) = forward_to {
        if !validator::validate_email(address) {
            let mut error = validator::ValidationError::new("forward_to");
            error.message = Some(Cow::from("forward_to must be an email address"));
            return Err(error);
        }
    }

    if args.clone().into_spec() == FilterSpec::default() {
        let mut error = validator::ValidationError::new("empty_filter");
        error.message = Some(Cow::from("at least one criteria or action field is required"));
        return Err(error);
    }

    Ok(())
}

fn default_max_results() -> usize {
    DEFAULT_SEARCH_RESULTS
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct SearchArgs {
    /// Gmail search query (e.g. 'from:example@gmail.com', 'subject:hello', 'is:unread')
    #[validate(length(min = 1))]
    pub query: String,

    /// Maximum number of results to return
    #[serde(default = "default_max_results")]
    #[validate(range(min = 1, max = 500))]
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct MoveArgs {
    /// Email ID
    #[validate(length(min = 1))]
    pub email_id: String,

    /// Folder ID to move the email to
    #[validate(length(min = 1))]
    pub folder_id: String,
}

// ==================== Typed calls ====================

/// A validated mail tool invocation
#[derive(Debug, Clone)]
pub enum MailToolCall {
    SendEmail(ComposeArgs),
    TrashEmail(EmailIdArgs),
    GetUnreadEmails,
    ReadEmail(EmailIdArgs),
    MarkEmailAsRead(EmailIdArgs),
    OpenEmail(EmailIdArgs),
    CreateDraft(ComposeArgs),
    ListDrafts,
    ListLabels,
    CreateLabel(NameArgs),
    ApplyLabel(LabelArgs),
    RemoveLabel(LabelArgs),
    SearchByLabel(LabelIdArgs),
    ListFilters,
    GetFilter(FilterIdArgs),
    CreateFilter(CreateFilterArgs),
    DeleteFilter(FilterIdArgs),
    SearchEmails(SearchArgs),
    CreateFolder(NameArgs),
    MoveToFolder(MoveArgs),
    ListFolders,
}

impl MailToolCall {
    /// Resolve a tool name and validate its arguments
    pub fn parse(name: &str, args: Value) -> std::result::Result<Self, McpError> {
        let no_args = |args: Value| parse_args::<NoArgs>(args).map(|_| ());

        Ok(match name {
            "send-email" => Self::SendEmail(parse_args(args)?),
            "trash-email" => Self::TrashEmail(parse_args(args)?),
            "get-unread-emails" => no_args(args).map(|_| Self::GetUnreadEmails)?,
            "read-email" => Self::ReadEmail(parse_args(args)?),
            "mark-email-as-read" => Self::MarkEmailAsRead(parse_args(args)?),
            "open-email" => Self::OpenEmail(parse_args(args)?),
            "create-draft" => Self::CreateDraft(parse_args(args)?),
            "list-drafts" => no_args(args).map(|_| Self::ListDrafts)?,
            "list-labels" => no_args(args).map(|_| Self::ListLabels)?,
            "create-label" => Self::CreateLabel(parse_args(args)?),
            "apply-label" => Self::ApplyLabel(parse_args(args)?),
            "remove-label" => Self::RemoveLabel(parse_args(args)?),
            "search-by-label" => Self::SearchByLabel(parse_args(args)?),
            "list-filters" => no_args(args).map(|_| Self::ListFilters)?,
            "get-filter" => Self::GetFilter(parse_args(args)?),
            "create-filter" => Self::CreateFilter(parse_args(args)?),
            "delete-filter" => Self::DeleteFilter(parse_args(args)?),
            "search-emails" => Self::SearchEmails(parse_args(args)?),
            "create-folder" => Self::CreateFolder(parse_args(args)?),
            "move-to-folder" => Self::MoveToFolder(parse_args(args)?),
            "list-folders" => no_args(args).map(|_| Self::ListFolders)?,
            _ => {
                return Err(McpError::UnknownTool {
                    name: name.to_string(),
                })
            }
        })
    }
}

/// The mail tool catalog, in the order clients see it
pub fn mail_tools() -> Vec<Tool> {
    vec![
        tool_def::<ComposeArgs>(
            "send-email",
            "Sends email to recipient. Do not use if user only asked to draft email. Drafts must be approved before sending.",
        ),
        tool_def::<EmailIdArgs>("trash-email", "Moves email to trash. Confirm before moving email to trash."),
        tool_def::<NoArgs>("get-unread-emails", "Retrieve unread emails"),
        tool_def::<EmailIdArgs>("read-email", "Retrieves given email content"),
        tool_def::<EmailIdArgs>("mark-email-as-read", "Marks given email as read"),
        tool_def::<EmailIdArgs>("open-email", "Open email in browser"),
        tool_def::<ComposeArgs>("create-draft", "Creates a draft email without sending it"),
        tool_def::<NoArgs>("list-drafts", "Lists all draft emails"),
        tool_def::<NoArgs>("list-labels", "Lists all labels in the user's mailbox"),
        tool_def::<NameArgs>("create-label", "Creates a new label"),
        tool_def::<LabelArgs>("apply-label", "Applies a label to an email"),
        tool_def::<LabelArgs>("remove-label", "Removes a label from an email"),
        tool_def::<LabelIdArgs>("search-by-label", "Searches for emails with a specific label"),
        tool_def::<NoArgs>("list-filters", "Lists all email filters in the user's mailbox"),
        tool_def::<FilterIdArgs>("get-filter", "Gets details of a specific filter"),
        tool_def::<CreateFilterArgs>("create-filter", "Creates a new email filter"),
        tool_def::<FilterIdArgs>("delete-filter", "Deletes a specific filter"),
        tool_def::<SearchArgs>("search-emails", "Searches for emails using Gmail's search syntax"),
        tool_def::<NameArgs>("create-folder", "Creates a new folder"),
        tool_def::<MoveArgs>("move-to-folder", "Moves an email to a folder"),
        tool_def::<NoArgs>("list-folders", "Lists all user-created folders"),
    ]
}

// ==================== Dispatcher ====================

/// Launches a URL in the user's browser
pub type UrlOpener = fn(&str) -> std::io::Result<()>;

fn open_in_browser(url: &str) -> std::io::Result<()> {
    open::that(url)
}

/// Tool handler for the Gmail server
pub struct MailToolHandler<A> {
    api: A,
    prompts: PromptRegistry,
    opener: UrlOpener,
}

impl<A: MailApi> MailToolHandler<A> {
    /// Create a new tool handler
    pub fn new(api: A) -> Self {
        Self {
            api,
            prompts: mail_prompts(),
            opener: open_in_browser,
        }
    }

    /// Replace the browser launcher
    pub fn with_opener(mut self, opener: UrlOpener) -> Self {
        self.opener = opener;
        self
    }

    /// Borrow the API client
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run a validated call
    pub async fn execute(&self, call: MailToolCall) -> Result<CallToolResult> {
        let api = &self.api;

        Ok(match call {
            MailToolCall::SendEmail(args) => {
                let id = api
                    .send_email(&args.recipient_id, &args.subject, &args.message)
                    .await?;
                CallToolResult::with_structured(
                    format!("Email sent successfully. Message ID: {}", id),
                    "message_id",
                    &json!({ "message_id": id }),
                )
            }
            MailToolCall::CreateDraft(args) => {
                let id = api
                    .create_draft(&args.recipient_id, &args.subject, &args.message)
                    .await?;
                CallToolResult::with_structured(
                    format!("Draft created successfully. Draft ID: {}", id),
                    "draft_id",
                    &json!({ "draft_id": id }),
                )
            }
            MailToolCall::TrashEmail(args) => {
                api.trash_email(&args.email_id).await?;
                CallToolResult::text("Email moved to trash successfully.")
            }
            MailToolCall::GetUnreadEmails => json_result("messages", &api.unread_emails().await?),
            MailToolCall::ReadEmail(args) => json_result("email", &api.read_email(&args.email_id).await?),
            MailToolCall::MarkEmailAsRead(args) => {
                api.mark_as_read(&args.email_id).await?;
                CallToolResult::text("Email marked as read.")
            }
            MailToolCall::OpenEmail(args) => {
                let url = format!("{}{}", WEB_MESSAGE_URL, args.email_id);
                let opener = self.opener;
                tokio::task::spawn_blocking(move || opener(&url))
                    .await
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;
                CallToolResult::text("Email opened in browser successfully.")
            }
            MailToolCall::ListDrafts => json_result("drafts", &api.list_drafts().await?),
            MailToolCall::ListLabels => {
                let labels: Vec<LabelSummary> =
                    api.list_labels().await?.into_iter().map(LabelSummary::from).collect();
                json_result("labels", &labels)
            }
            MailToolCall::CreateLabel(args) => {
                let label = api.create_label(&args.name).await?;
                CallToolResult::with_structured(
                    format!(
                        "Label created successfully. Label ID: {}, Name: {}",
                        label.id, label.name
                    ),
                    "label",
                    &json!({ "label_id": label.id, "name": label.name }),
                )
            }
            MailToolCall::ApplyLabel(args) => {
                api.apply_label(&args.email_id, &args.label_id).await?;
                CallToolResult::text("Label applied successfully to email.")
            }
            MailToolCall::RemoveLabel(args) => {
                api.remove_label(&args.email_id, &args.label_id).await?;
                CallToolResult::text("Label removed successfully from email.")
            }
            MailToolCall::SearchByLabel(args) => {
                json_result("messages", &api.search_by_label(&args.label_id).await?)
            }
            MailToolCall::ListFilters => json_result("filters", &api.list_filters().await?),
            MailToolCall::GetFilter(args) => json_result("filter", &api.get_filter(&args.filter_id).await?),
            MailToolCall::CreateFilter(args) => {
                let filter = api.create_filter(args.into_spec().into_filter()).await?;
                CallToolResult::with_structured(
                    format!(
                        "Filter created successfully. Filter ID: {}",
                        filter.id.as_deref().unwrap_or("unknown")
                    ),
                    "filter",
                    &filter,
                )
            }
            MailToolCall::DeleteFilter(args) => {
                api.delete_filter(&args.filter_id).await?;
                CallToolResult::text("Filter deleted successfully.")
            }
            MailToolCall::SearchEmails(args) => {
                json_result("messages", &api.search_emails(&args.query, args.max_results).await?)
            }
            MailToolCall::CreateFolder(args) => {
                let folder = api.create_folder(&args.name).await?;
                CallToolResult::with_structured(
                    format!(
                        "Folder created successfully. Folder ID: {}, Name: {}",
                        folder.id, folder.name
                    ),
                    "folder",
                    &json!({ "folder_id": folder.id, "name": folder.name }),
                )
            }
            MailToolCall::MoveToFolder(args) => {
                api.move_to_folder(&args.email_id, &args.folder_id).await?;
                CallToolResult::text("Email moved to folder successfully.")
            }
            MailToolCall::ListFolders => json_result("folders", &api.list_folders().await?),
        })
    }
}

#[async_trait]
impl<A: MailApi> McpHandler for MailToolHandler<A> {
    fn server_info(&self) -> ServerInfo {
        ServerInfo::named(SERVER_NAME)
    }

    fn list_tools(&self) -> Vec<Tool> {
        mail_tools()
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> std::result::Result<CallToolResult, McpError> {
        let call = MailToolCall::parse(name, arguments)?;

        Ok(self.execute(call).await.unwrap_or_else(|e| {
            tracing::warn!("Tool {} failed: {}", name, e);
            failure(e)
        }))
    }

    fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }
}

/// Pretty JSON for the text channel plus the same data as structured content
fn json_result<T: Serialize>(key: &str, payload: &T) -> CallToolResult {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => CallToolResult::with_structured(text, key, payload),
        Err(e) => failure(ValidationError::MessageBuild {
            message: e.to_string(),
        }
        .into()),
    }
}

fn failure(error: AdapterError) -> CallToolResult {
    CallToolResult::failure(error.kind(), error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names() {
        let names: Vec<String> = mail_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 21);
        assert!(names.contains(&"move-to-folder".to_string()));
        assert!(names.contains(&"get-unread-emails".to_string()));
    }

    #[test]
    fn test_catalog_schemas_list_required_fields() {
        let tools = mail_tools();
        let send = tools.iter().find(|t| t.name == "send-email").unwrap();
        let required = send.input_schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);

        let filter = tools.iter().find(|t| t.name == "create-filter").unwrap();
        assert!(filter.input_schema.get("required").is_none());
    }

    #[test]
    fn test_parse_send_email() {
        let call = MailToolCall::parse(
            "send-email",
            json!({"recipient_id": "a@example.com", "subject": "Hi", "message": "Body"}),
        )
        .unwrap();
        assert!(matches!(call, MailToolCall::SendEmail(ref a) if a.subject == "Hi"));
    }

    #[test]
    fn test_parse_rejects_bad_recipient() {
        let err = MailToolCall::parse(
            "send-email",
            json!({"recipient_id": "not-an-address", "subject": "Hi", "message": "Body"}),
        )
        .unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments { .. }));
    }

    #[test]
    fn test_parse_unknown_tool() {
        let err = MailToolCall::parse("delete-everything", Value::Null).unwrap_err();
        assert!(matches!(err, McpError::UnknownTool { .. }));
    }

    #[test]
    fn test_no_arg_tools_accept_null_and_empty() {
        assert!(matches!(
            MailToolCall::parse("list-labels", Value::Null).unwrap(),
            MailToolCall::ListLabels
        ));
        assert!(matches!(
            MailToolCall::parse("list-folders", json!({})).unwrap(),
            MailToolCall::ListFolders
        ));
    }

    #[test]
    fn test_search_defaults_max_results() {
        match MailToolCall::parse("search-emails", json!({"query": "is:unread"})).unwrap() {
            MailToolCall::SearchEmails(args) => assert_eq!(args.max_results, 50),
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_create_filter_rules() {
        assert!(MailToolCall::parse("create-filter", json!({})).is_err());
        assert!(MailToolCall::parse("create-filter", json!({"from_email": ""})).is_err());
        assert!(MailToolCall::parse("create-filter", json!({"size_comparison": "larger"})).is_err());
        assert!(MailToolCall::parse("create-filter", json!({"size_comparison": "bigger", "size": 5})).is_err());

        let ok = MailToolCall::parse(
            "create-filter",
            json!({"size_comparison": "larger", "size": 1024, "add_label_ids": ["Label_1"]}),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_blank_forward_to_counts_as_unset() {
        let call = MailToolCall::parse(
            "create-filter",
            json!({"forward_to": "  ", "add_label_ids": ["Label_1"]}),
        )
        .unwrap();
        match call {
            MailToolCall::CreateFilter(args) => assert_eq!(args.into_spec().forward_to, None),
            other => panic!("unexpected call: {:?}", other),
        }

        assert!(MailToolCall::parse("create-filter", json!({"forward_to": ""})).is_err());
        assert!(MailToolCall::parse("create-filter", json!({"forward_to": "not-an-address"})).is_err());
        assert!(MailToolCall::parse("create-filter", json!({"forward_to": "team@example.com"})).is_ok());
    }

    #[test]
    fn test_failure_maps_error_kind() {
        let result = failure(
            crate::error::GmailApiError::MessageNotFound {
                message_id: "m1".to_string(),
            }
            .into(),
        );
        assert!(result.is_error);
        assert_eq!(
            result.structured_content.unwrap()["error"]["kind"],
            "not_found"
        );
    }
}
