//! Prompt templates for the generative fallbacks

use std::collections::HashMap;

/// System prompt sent with every chat completion unless configured otherwise
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Tia Apa, a helpful AI assistant for Bangladeshi \
                                         farmers. Provide clear, simple answers in the specified \
                                         language.";

/// Token limit for the image description step
pub const IMAGE_DESCRIPTION_MAX_TOKENS: u32 = 300;

/// Token limit for the image fallback answer
pub const IMAGE_ANSWER_MAX_TOKENS: u32 = 500;

/// Template with `{{name}}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template in one left-to-right pass; unknown placeholders
    /// are left as they are and substituted values are never re-scanned
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                result.push_str(&rest[start..]);
                return result;
            };
            match values.get(&after[..end]) {
                Some(value) => result.push_str(value),
                None => result.push_str(&rest[start..start + end + 4]),
            }
            rest = &after[end + 2..];
        }
        result.push_str(rest);
        result
    }

    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                chars.next();
                if ch == '}' {
                    if chars.peek() == Some(&'}') {
                        chars.next();
                    }
                    break;
                }
                var_name.push(ch);
            }
            if !var_name.is_empty() && !variables.contains(&var_name) {
                variables.push(var_name);
            }
        }
    }

    variables
}

/// Prompts for the advisory fallbacks
pub struct AdvisoryPrompts;

impl AdvisoryPrompts {
    /// User message for a text question without a dataset answer
    #[must_use]
    pub fn text_query() -> PromptTemplate {
        PromptTemplate::new("Language: {{language}}\nQuery: {{query}}")
    }

    /// Asks the vision model what the photo shows
    #[must_use]
    pub fn image_description() -> PromptTemplate {
        PromptTemplate::new("Describe the agricultural problem or disease in this image.")
    }

    /// Asks the vision model to answer the user's prompt directly
    #[must_use]
    pub fn image_answer() -> PromptTemplate {
        PromptTemplate::new(
            "Language: {{language}}\nPrompt: {{prompt}}\nBased on this image, answer the question \
             or provide a solution.",
        )
    }

    /// Retrieval query built from an image description and the user's prompt
    #[must_use]
    pub fn image_query() -> PromptTemplate {
        PromptTemplate::new("{{description}}\n{{prompt}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_variables() {
        let template = PromptTemplate::new("Language: {{language}}\nQuery: {{query}} {{query}}");
        assert_eq!(template.variables(), &["language", "query"]);
    }

    #[test]
    fn test_text_query_render() {
        let values = HashMap::from([("language", "bn"), ("query", "ধানের রোগ")]);
        assert_eq!(
            AdvisoryPrompts::text_query().render(&values),
            "Language: bn\nQuery: ধানের রোগ"
        );
    }

    #[test]
    fn test_missing_value_left_in_place() {
        let values = HashMap::from([("prompt", "what is this?")]);
        let rendered = AdvisoryPrompts::image_answer().render(&values);
        assert!(rendered.starts_with("Language: {{language}}\nPrompt: what is this?"));
    }

    #[test]
    fn test_image_query_joins_with_newline() {
        let values = HashMap::from([("description", "brown spots"), ("prompt", "cure?")]);
        assert_eq!(
            AdvisoryPrompts::image_query().render(&values),
            "brown spots\ncure?"
        );
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let values = HashMap::from([
            ("description", "label reads {{prompt}}"),
            ("prompt", "cure?"),
        ]);
        assert_eq!(
            AdvisoryPrompts::image_query().render(&values),
            "label reads {{prompt}}\ncure?"
        );
    }

    #[test]
    fn test_unterminated_placeholder_kept() {
        let values = HashMap::from([("query", "rice")]);
        assert_eq!(
            PromptTemplate::new("{{query}} {{open").render(&values),
            "rice {{open"
        );
    }

    #[test]
    fn test_default_system_prompt_text() {
        assert!(DEFAULT_SYSTEM_PROMPT.starts_with("You are Tia Apa"));
        assert!(DEFAULT_SYSTEM_PROMPT.ends_with("in the specified language."));
        assert!(!DEFAULT_SYSTEM_PROMPT.contains("  "));
    }
}
