//! Prompt templates
//!
//! Templates are plain text with `{name}` placeholders; `{{` and `}}` produce
//! literal braces. Each template declares the placeholders it may use, and a
//! rendered value is inserted verbatim (never scanned for placeholders again).

use docsmith_core::{DocsmithError, DocsmithResult, ErrorContext, PromptConfig, Stage};

/// Per-file summary prompt. Placeholders: `{content}`
pub const SUMMARY_PROMPT: &str =
    "Summarize the following code or text content in a few sentences:\n\n{content}";

/// README prompt. Placeholders: `{repo_name}`, `{summaries}`
pub const README_PROMPT: &str = r#"Generate a README.md file for a repository named {repo_name}.
Use the provided summaries to create an organized and comprehensive overview of the project and its key components.

The README should include the following sections:

Project Title: Display the title of the project.
Brief Description: Provide a concise overview of the project's purpose and goals in 75 to 100 words.
Table of Contents: Help users quickly navigate to different sections of the README.
Project Structure: Explain the organization of files and directories within the repository.
Installation Instructions: Step-by-step instructions to set up the project locally.
Usage Examples: Demonstrate how to use the project, including any relevant code snippets or examples.
Contributing Guidelines: Outline how others can contribute to the project.
License Information: Specify the license under which the project is released.
Contact Information: Provide details for users to reach out for support or inquiries.

Use the following file summaries to inform the structure and details of the README:
{summaries}
"#;

/// Per-file documentation prompt. Placeholders: `{file_path}`, `{content}`
pub const CODE_DOCUMENTATION_PROMPT: &str = "Generate detailed documentation for the following code file. Include an overview of the file's purpose, any classes or functions defined, and important logic or algorithms:\n\nFile: {file_path}\n\nContent:\n{content}";

pub const SUMMARY_VARIABLES: &[&str] = &["content"];
pub const README_VARIABLES: &[&str] = &["repo_name", "summaries"];
pub const CODE_DOCUMENTATION_VARIABLES: &[&str] = &["file_path", "content"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Variable(String),
}

/// A parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    stage: Stage,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse `text`, rejecting malformed braces and placeholders outside `allowed`
    pub fn new(name: &str, stage: Stage, text: &str, allowed: &[&str]) -> DocsmithResult<Self> {
        let template_error = |message: String| DocsmithError::PromptRender {
            stage,
            template: name.to_string(),
            message,
            context: ErrorContext::new("prompt_template")
                .with_operation("parse")
                .with_suggestion("Escape literal braces as '{{' and '}}'"),
        };

        let mut segments = Vec::new();
        let mut text_buf = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text_buf.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text_buf.push('}');
                }
                '{' => {
                    let mut variable = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        variable.push(c);
                    }

                    if !closed || !is_identifier(&variable) {
                        return Err(template_error(format!(
                            "malformed placeholder '{{{}'",
                            variable
                        )));
                    }
                    if !allowed.contains(&variable.as_str()) {
                        return Err(template_error(format!(
                            "unknown placeholder '{{{}}}', expected one of: {}",
                            variable,
                            allowed.join(", ")
                        )));
                    }

                    if !text_buf.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text_buf)));
                    }
                    segments.push(Segment::Variable(variable));
                }
                '}' => return Err(template_error("unmatched '}'".to_string())),
                c => text_buf.push(c),
            }
        }

        if !text_buf.is_empty() {
            segments.push(Segment::Text(text_buf));
        }

        Ok(Self {
            name: name.to_string(),
            stage,
            segments,
        })
    }

    pub fn summary() -> Self {
        Self::builtin("summary", Stage::Analysis, SUMMARY_PROMPT, SUMMARY_VARIABLES)
    }

    pub fn readme() -> Self {
        Self::builtin("readme", Stage::Readme, README_PROMPT, README_VARIABLES)
    }

    pub fn code_documentation() -> Self {
        Self::builtin(
            "code_documentation",
            Stage::CodeDocumentation,
            CODE_DOCUMENTATION_PROMPT,
            CODE_DOCUMENTATION_VARIABLES,
        )
    }

    // Built-in templates are covered by tests, so parsing them cannot fail.
    fn builtin(name: &str, stage: Stage, text: &str, allowed: &[&str]) -> Self {
        match Self::new(name, stage, text, allowed) {
            Ok(template) => template,
            Err(e) => unreachable!("built-in template '{}' is invalid: {}", name, e),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholders used by the template, in order of appearance
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Substitute `values` into the template. Every placeholder must be supplied.
    pub fn render(&self, values: &[(&str, &str)]) -> DocsmithResult<String> {
        let capacity = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.len(),
                Segment::Variable(_) => 0,
            })
            .sum::<usize>()
            + values.iter().map(|(_, value)| value.len()).sum::<usize>();
        let mut rendered = String::with_capacity(capacity);

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => rendered.push_str(text),
                Segment::Variable(name) => {
                    let value = values
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| DocsmithError::PromptRender {
                            stage: self.stage,
                            template: self.name.clone(),
                            message: format!("missing value for placeholder '{{{}}}'", name),
                            context: ErrorContext::new("prompt_template")
                                .with_operation("render"),
                        })?;
                    rendered.push_str(value);
                }
            }
        }

        Ok(rendered)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// The three templates used by the pipeline
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub summary: PromptTemplate,
    pub readme: PromptTemplate,
    pub code_documentation: PromptTemplate,
}

impl PromptSet {
    /// Built-in templates, replaced by any override present in `config`
    pub fn from_config(config: &PromptConfig) -> DocsmithResult<Self> {
        let summary = match &config.summary {
            Some(text) => {
                PromptTemplate::new("summary", Stage::Analysis, text, SUMMARY_VARIABLES)?
            }
            None => PromptTemplate::summary(),
        };
        let readme = match &config.readme {
            Some(text) => PromptTemplate::new("readme", Stage::Readme, text, README_VARIABLES)?,
            None => PromptTemplate::readme(),
        };
        let code_documentation = match &config.code_documentation {
            Some(text) => PromptTemplate::new(
                "code_documentation",
                Stage::CodeDocumentation,
                text,
                CODE_DOCUMENTATION_VARIABLES,
            )?,
            None => PromptTemplate::code_documentation(),
        };

        Ok(Self {
            summary,
            readme,
            code_documentation,
        })
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            summary: PromptTemplate::summary(),
            readme: PromptTemplate::readme(),
            code_documentation: PromptTemplate::code_documentation(),
        }
    }
}
