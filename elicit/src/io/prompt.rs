//! Ask prompt rendering.

use anyhow::Result;
use minijinja::{Environment, context};

use crate::core::types::OptionChoice;

const ASK_TEMPLATE: &str = include_str!("prompts/ask.md");

/// Inputs for one ask prompt.
#[derive(Debug, Clone)]
pub struct AskPrompt<'a> {
    pub field: &'a str,
    pub description: &'a str,
    pub options: &'a [OptionChoice],
}

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
    max_listed_options: usize,
}

impl PromptEngine {
    pub fn new(max_listed_options: usize) -> Self {
        let mut env = Environment::new();
        env.add_template("ask", ASK_TEMPLATE)
            .expect("ask template should be valid");
        Self {
            env,
            max_listed_options,
        }
    }

    /// Render the prompt for `input`, listing at most `max_listed_options`.
    pub fn render_ask(&self, input: &AskPrompt<'_>) -> Result<String> {
        let listed: Vec<&str> = input
            .options
            .iter()
            .take(self.max_listed_options)
            .map(|option| option.id.as_str())
            .collect();
        let hidden = input.options.len() - listed.len();
        let template = self.env.get_template("ask")?;
        let rendered = template.render(context! {
            field => input.field,
            description => Some(input.description.trim()).filter(|s| !s.is_empty()),
            options => listed,
            hidden => hidden,
        })?;
        Ok(rendered.trim_end().to_string())
    }
}
