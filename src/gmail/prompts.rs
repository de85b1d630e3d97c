//! Prompt templates for the Gmail server

use crate::mcp::prompts::{PromptRegistry, PromptTemplate};

const EMAIL_ADMIN: &str = "You are an email administrator.
You can draft, edit, read, trash, open, and send emails.
You've been given access to a specific gmail account.
You have the following tools available:
- Send an email (send-email)
- Create a draft email (create-draft)
- List draft emails (list-drafts)
- Retrieve unread emails (get-unread-emails)
- Read email content (read-email)
- Mark an email as read (mark-email-as-read)
- Trash email (trash-email)
- Open email in browser (open-email)
- List all labels (list-labels)
- Create a new label (create-label)
- Apply a label to an email (apply-label)
- Remove a label from an email (remove-label)
- Search for emails with a specific label (search-by-label)
- Search for emails using Gmail's search syntax (search-emails)
- List all email filters (list-filters)
- Get details of a specific filter (get-filter)
- Create a new email filter (create-filter)
- Delete a filter (delete-filter)
- Create a new folder (create-folder)
- Move an email to a folder (move-to-folder)
- List all folders (list-folders)

Never send an email draft or trash an email unless the user confirms first.
Always ask for approval if not already given.
";

/// All Gmail prompts
pub fn mail_prompts() -> PromptRegistry {
    PromptRegistry::new()
        .with(PromptTemplate::new(
            "manage-email",
            "Act like an email administrator",
            |_| EMAIL_ADMIN.to_string(),
        ))
        .with(
            PromptTemplate::new("draft-email", "Draft an email with content and recipient", |args| {
                format!(
                    "Please draft an email about {} for {} ({}).\n\
                     Include a subject line starting with 'Subject:' on the first line.\n\
                     Do not send the email yet, just draft it and ask the user for their thoughts.",
                    args.get_or("content", ""),
                    args.get_or("recipient", ""),
                    args.get_or("recipient_email", ""),
                )
            })
            .required("content", "What the email is about")
            .required("recipient", "Who should the email be addressed to")
            .required("recipient_email", "Recipient's email address"),
        )
        .with(
            PromptTemplate::new("edit-draft", "Edit the existing email draft", |args| {
                format!(
                    "Please revise the current email draft:\n{}\n\nRequested changes:\n{}\n\nPlease provide the updated draft.",
                    args.get_or("current_draft", ""),
                    args.get_or("changes", ""),
                )
            })
            .required("changes", "What changes should be made to the draft")
            .required("current_draft", "The current draft to edit"),
        )
        .with(
            PromptTemplate::new("manage-labels", "Manage email labels for organization", |args| {
                let action = args.get_or("action", "");
                format!(
                    "I need help with managing my email labels. Specifically, I want to {action}.

Here are the tools you can use for label management:
- list-labels: Lists all existing labels in my Gmail account
- create-label: Creates a new label with a specified name
- apply-label: Applies a label to a specific email
- remove-label: Removes a label from a specific email
- search-by-label: Finds all emails with a specific label

Please help me {action} by using the appropriate tools. If you need to list labels first to get label IDs, please do so."
                )
            })
            .required(
                "action",
                "What action to take with labels (create, list, apply, remove, search)",
            ),
        )
        .with(
            PromptTemplate::new("manage-filters", "Manage email filters for automation", |args| {
                let action = args.get_or("action", "");
                format!(
                    "I need help with managing my email filters. Specifically, I want to {action}.

Here are the tools you can use for filter management:
- list-filters: Lists all existing filters in my Gmail account
- get-filter: Gets details of a specific filter
- create-filter: Creates a new filter
- delete-filter: Deletes a specific filter

Please help me {action} by using the appropriate tools. If you need to list filters first to get filter IDs, please do so."
                )
            })
            .required("action", "What action to take with filters (create, list, view, delete)"),
        )
        .with(
            PromptTemplate::new("search-emails", "Search for emails using Gmail's search syntax", |args| {
                let query = args.get_or("query", "");
                format!(
                    "I need to search through my emails for: {query}

Here are the tools you can use for searching emails:
- search-emails: Searches all emails using Gmail's search syntax
- get-unread-emails: Gets only unread emails from the inbox

Please help me find emails matching my search criteria. You can use Gmail's search syntax for advanced searches:
- from:sender - Emails from a specific sender
- to:recipient - Emails to a specific recipient
- subject:text - Emails with specific text in the subject
- has:attachment - Emails with attachments
- after:YYYY/MM/DD - Emails after a specific date
- before:YYYY/MM/DD - Emails before a specific date
- is:important - Important emails
- label:name - Emails with a specific label

Please search for emails matching: {query}"
                )
            })
            .required("query", "What to search for in emails"),
        )
        .with(
            PromptTemplate::new("manage-folders", "Manage email folders for organization", |args| {
                let action = args.get_or("action", "");
                format!(
                    "I need help with managing my email folders. Specifically, I want to {action}.

Here are the tools you can use for folder management:
- list-folders: Lists all existing folders in my Gmail account
- create-folder: Creates a new folder with a specified name
- move-to-folder: Moves an email to a specific folder (removes it from inbox)

Please help me {action} by using the appropriate tools. If you need to list folders first to get folder IDs, please do so.

Note: In Gmail, folders are implemented as labels. Moving an email to a folder applies the folder's label and then removes the email from the inbox."
                )
            })
            .required("action", "What action to take with folders (create, list, move)"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::types::ToolResultContent;
    use std::collections::HashMap;

    fn render(name: &str, args: &[(&str, &str)]) -> String {
        let args: HashMap<String, String> = args
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let result = mail_prompts().get(name, Some(args)).unwrap();
        match &result.messages[0].content {
            ToolResultContent::Text { text } => text.clone(),
        }
    }

    #[test]
    fn test_catalog() {
        let names: Vec<String> = mail_prompts().list().into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "manage-email",
                "draft-email",
                "edit-draft",
                "manage-labels",
                "manage-filters",
                "search-emails",
                "manage-folders"
            ]
        );
    }

    #[test]
    fn test_draft_email_substitution() {
        let text = render(
            "draft-email",
            &[
                ("content", "the offsite"),
                ("recipient", "Sam"),
                ("recipient_email", "sam@example.com"),
            ],
        );
        assert!(text.starts_with("Please draft an email about the offsite for Sam (sam@example.com)."));
        assert!(text.contains("'Subject:'"));
    }

    #[test]
    fn test_manage_email_lists_every_tool() {
        let text = render("manage-email", &[]);
        for tool in crate::gmail::tools::mail_tools() {
            assert!(text.contains(&format!("({})", tool.name)), "missing {}", tool.name);
        }
    }

    #[test]
    fn test_action_repeated() {
        let text = render("manage-folders", &[("action", "archive receipts")]);
        assert_eq!(text.matches("archive receipts").count(), 2);
    }
}
