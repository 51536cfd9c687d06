//! Picks the answer field out of a matched record
//!
//! Rules are an ordered list of `(keywords, candidate fields)` pairs. The
//! first rule with a keyword contained in the lower-cased query decides which
//! field is returned; later rules are never consulted.

use crate::config::RuleConfig;
use crate::corpus::ColumnKind;
use crate::corpus::FieldValue;
use crate::corpus::Record;

/// Returned when no rule matched and the record has no usable text
pub const NO_ANSWER: &str = "No relevant answer found";

/// One keyword-to-field mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    keywords: Vec<String>,
    fields: Vec<String>,
}

impl KeywordRule {
    pub fn new<K, F>(keywords: K, fields: F) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// `query_lower` must already be lower-cased
    pub fn matches(&self, query_lower: &str) -> bool {
        self.keywords.iter().any(|k| query_lower.contains(k.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// First non-empty candidate field, else `Empty`
    fn select(&self, record: &Record) -> FieldValue {
        self.fields
            .iter()
            .filter_map(|name| record.get(name))
            .find(|value| !value.is_empty())
            .cloned()
            .unwrap_or(FieldValue::Empty)
    }
}

impl From<&RuleConfig> for KeywordRule {
    fn from(rule: &RuleConfig) -> Self {
        Self::new(&rule.keywords, rule.fields.iter().cloned())
    }
}

/// Built-in rules, in precedence order
pub fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            ["solution", "সমাধান", "advice"],
            ["Probable Solution", "Advice/ solution given"],
        ),
        KeywordRule::new(["symptom", "লক্ষণ"], ["Symptoms"]),
        KeywordRule::new(["date", "তারিখ"], ["Date"]),
    ]
}

#[derive(Debug, Clone)]
pub struct FieldExtractor {
    rules: Vec<KeywordRule>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl FieldExtractor {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Built-in rules followed by configured ones
    pub fn with_extra_rules<'a, I>(extra: I) -> Self
    where
        I: IntoIterator<Item = &'a RuleConfig>,
    {
        let mut rules = default_rules();
        rules.extend(extra.into_iter().map(KeywordRule::from));
        Self { rules }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Select the answer value for `query` from `record`.
    ///
    /// Without a matching rule the first non-empty text field is returned,
    /// or [`NO_ANSWER`] when the record has none.
    pub fn extract(&self, query: &str, record: &Record) -> FieldValue {
        let query_lower = query.to_lowercase();
        if let Some(rule) = self.rules.iter().find(|r| r.matches(&query_lower)) {
            return rule.select(record);
        }

        record
            .fields()
            .find(|(column, value)| column.kind == ColumnKind::Text && !value.is_empty())
            .map_or_else(
                || FieldValue::Text(NO_ANSWER.to_string()),
                |(_, value)| value.clone(),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn blight() -> Record {
        Record::from_pairs([
            ("Disease", text("Leaf Blight")),
            ("Symptoms", text("yellowing leaves")),
            ("Probable Solution", text("Spray copper fungicide")),
            ("Date", text("2023-06-01")),
        ])
    }

    #[test]
    fn test_symptom_rule_bengali_keyword() {
        let extractor = FieldExtractor::default();
        assert_eq!(
            extractor.extract("What are the লক্ষণ?", &blight()),
            text("yellowing leaves")
        );
    }

    #[test]
    fn test_solution_rule_shadows_symptom_rule() {
        let extractor = FieldExtractor::default();
        assert_eq!(
            extractor.extract("symptom and solution please", &blight()),
            text("Spray copper fungicide")
        );
        assert_eq!(
            extractor.extract("সমাধান ও লক্ষণ", &blight()),
            text("Spray copper fungicide")
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let extractor = FieldExtractor::default();
        assert_eq!(
            extractor.extract("Give me ADVICE", &blight()),
            text("Spray copper fungicide")
        );
        assert_eq!(
            extractor.extract("Which DATE was it?", &blight()),
            text("2023-06-01")
        );
    }

    #[test]
    fn test_solution_falls_back_to_alternative_field() {
        let record = Record::from_pairs([
            ("Probable Solution", FieldValue::Empty),
            ("Advice/ solution given", text("Rotate crops")),
        ]);
        assert_eq!(
            FieldExtractor::default().extract("solution?", &record),
            text("Rotate crops")
        );
    }

    #[test]
    fn test_matched_rule_without_field_is_empty() {
        let record = Record::from_pairs([("Disease", text("Blast"))]);
        assert_eq!(
            FieldExtractor::default().extract("date?", &record),
            FieldValue::Empty
        );
    }

    #[test]
    fn test_default_rule_returns_first_text_field() {
        let record = Record::from_pairs([
            ("Year", FieldValue::Integer(2021)),
            ("Disease", text("Blast")),
        ]);
        assert_eq!(
            FieldExtractor::default().extract("rice problem", &record),
            text("Blast")
        );
    }

    #[test]
    fn test_default_rule_without_text_fields() {
        let record = Record::from_pairs([
            ("Year", FieldValue::Integer(2021)),
            ("Yield", FieldValue::Float(3.5)),
        ]);
        assert_eq!(
            FieldExtractor::default().extract("rice problem", &record),
            text(NO_ANSWER)
        );
        let empty = Record::from_pairs(Vec::<(String, FieldValue)>::new());
        assert_eq!(
            FieldExtractor::default().extract("anything", &empty),
            text(NO_ANSWER)
        );
    }

    #[test]
    fn test_extra_rules_run_after_builtins() {
        let extra = [RuleConfig {
            keywords: vec!["District".to_string()],
            fields: vec!["District".to_string()],
        }];
        let extractor = FieldExtractor::with_extra_rules(&extra);
        let record = Record::from_pairs([
            ("District", text("Bogura")),
            ("Symptoms", text("wilting")),
        ]);

        assert_eq!(extractor.extract("which district", &record), text("Bogura"));
        assert_eq!(
            extractor.extract("district symptom", &record),
            text("wilting")
        );
        assert_eq!(extractor.rules().len(), 4);
        assert_eq!(extractor.rules()[3].keywords(), ["district"]);
    }
}
