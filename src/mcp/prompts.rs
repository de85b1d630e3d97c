//! Prompt registry
//!
//! A fixed catalog of named templates. Rendering only substitutes the
//! caller's arguments into text; nothing here touches the network.

use std::collections::HashMap;

use crate::error::McpError;
use crate::mcp::types::{
    GetPromptResult, Prompt, PromptArgument, PromptMessage, ToolResultContent,
};

/// Arguments handed to a template's render function
#[derive(Debug, Default, Clone)]
pub struct PromptArgs(HashMap<String, String>);

impl PromptArgs {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self(values)
    }

    /// Value of an argument, if supplied
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of an argument, or `default` when absent or blank
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.get(name) {
            Some(value) if !value.trim().is_empty() => value,
            _ => default,
        }
    }
}

type Render = Box<dyn Fn(&PromptArgs) -> String + Send + Sync>;

/// A single registered template
pub struct PromptTemplate {
    name: String,
    description: String,
    arguments: Vec<PromptArgument>,
    render: Render,
}

impl PromptTemplate {
    pub fn new(
        name: &str,
        description: &str,
        render: impl Fn(&PromptArgs) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            arguments: Vec::new(),
            render: Box::new(render),
        }
    }

    /// Declare an argument the caller must supply
    pub fn required(self, name: &str, description: &str) -> Self {
        self.argument(name, description, true)
    }

    /// Declare an argument the caller may supply
    pub fn optional(self, name: &str, description: &str) -> Self {
        self.argument(name, description, false)
    }

    fn argument(mut self, name: &str, description: &str, required: bool) -> Self {
        self.arguments.push(PromptArgument {
            name: name.to_string(),
            description: Some(description.to_string()),
            required,
        });
        self
    }

    fn definition(&self) -> Prompt {
        Prompt {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            arguments: self.arguments.clone(),
        }
    }
}

/// Ordered catalog of templates
#[derive(Default)]
pub struct PromptRegistry {
    templates: Vec<PromptTemplate>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template (builder style)
    pub fn with(mut self, template: PromptTemplate) -> Self {
        self.templates.push(template);
        self
    }

    /// Definitions for `prompts/list`, in registration order
    pub fn list(&self) -> Vec<Prompt> {
        self.templates.iter().map(PromptTemplate::definition).collect()
    }

    /// Render a template for `prompts/get`
    pub fn get(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<GetPromptResult, McpError> {
        let template = self
            .templates
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| McpError::UnknownPrompt {
                name: name.to_string(),
            })?;

        let args = PromptArgs::new(arguments.unwrap_or_default());

        if let Some(missing) = template
            .arguments
            .iter()
            .find(|a| a.required && args.get(&a.name).map_or(true, |v| v.trim().is_empty()))
        {
            return Err(McpError::InvalidArguments {
                message: format!("Prompt '{}' requires argument '{}'", name, missing.name),
            });
        }

        Ok(GetPromptResult {
            description: Some(template.description.clone()),
            messages: vec![PromptMessage {
                role: "user".to_string(),
                content: ToolResultContent::Text {
                    text: (template.render)(&args),
                },
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PromptRegistry {
        PromptRegistry::new()
            .with(
                PromptTemplate::new("greet", "Say hello", |args| {
                    format!("Hello {} from {}", args.get_or("who", "?"), args.get_or("place", "here"))
                })
                .required("who", "Who to greet")
                .optional("place", "Where from"),
            )
            .with(PromptTemplate::new("static", "No arguments", |_| "fixed".to_string()))
    }

    fn text(result: &GetPromptResult) -> &str {
        match &result.messages[0].content {
            ToolResultContent::Text { text } => text,
        }
    }

    #[test]
    fn test_list_keeps_order() {
        let names: Vec<_> = registry().list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["greet", "static"]);
    }

    #[test]
    fn test_render_substitutes_and_defaults() {
        let mut args = HashMap::new();
        args.insert("who".to_string(), "Ada".to_string());

        let result = registry().get("greet", Some(args)).unwrap();
        assert_eq!(text(&result), "Hello Ada from here");
        assert_eq!(result.messages[0].role, "user");
    }

    #[test]
    fn test_unknown_prompt() {
        let err = registry().get("nope", None).unwrap_err();
        assert!(matches!(err, McpError::UnknownPrompt { .. }));
    }

    #[test]
    fn test_missing_required_argument() {
        let err = registry().get("greet", None).unwrap_err();
        assert!(err.to_string().contains("who"));
    }
}
