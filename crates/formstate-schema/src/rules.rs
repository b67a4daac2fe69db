//! Declarative per-field rules.
//!
//! Each field entry pairs a [`PathPattern`] with an ordered list of rules.
//! For every concrete path the pattern expands to, the first failing rule
//! produces one issue at that path.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use formstate_path::{tree, PathPattern};

use crate::{Schema, SchemaError, ValidationIssue};

/// User-facing messages. `{n}` is replaced by the rule's bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub required: String,
    pub min_length: String,
    pub max_length: String,
    pub pattern: String,
    pub number: String,
    pub integer: String,
    pub min: String,
    pub max: String,
    pub min_items: String,
    pub max_items: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            required: "This field is required.".to_string(),
            min_length: "Must be at least {n} characters.".to_string(),
            max_length: "Must be at most {n} characters.".to_string(),
            pattern: "Invalid format.".to_string(),
            number: "Must be a number.".to_string(),
            integer: "Must be a whole number.".to_string(),
            min: "Must be greater than or equal to {n}.".to_string(),
            max: "Must be less than or equal to {n}.".to_string(),
            min_items: "Must have at least {n} items.".to_string(),
            max_items: "Must have at most {n} items.".to_string(),
        }
    }
}

fn with_bound(template: &str, bound: impl ToString) -> String {
    template.replace("{n}", &bound.to_string())
}

/// A single check applied to the value at a field path.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Fails for absent, null, `""` and `[]`.
    Required,
    MinLength(usize),
    MaxLength(usize),
    /// Fails when the string does not match; the message overrides the
    /// default `pattern` message.
    Pattern(Regex, Option<String>),
    Min(f64),
    Max(f64),
    Integer,
    MinItems(usize),
    MaxItems(usize),
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

impl Rule {
    /// Compile a `Pattern` rule.
    pub fn pattern(regex: &str, message: Option<&str>) -> Result<Rule, regex::Error> {
        Ok(Rule::Pattern(Regex::new(regex)?, message.map(str::to_string)))
    }

    /// Returns the failure message, or `None` when `value` passes.
    pub fn check(&self, value: Option<&Value>, messages: &Messages) -> Option<String> {
        if let Rule::Required = self {
            let missing = match value {
                Some(Value::Array(items)) => items.is_empty(),
                other => is_blank(other),
            };
            return missing.then(|| messages.required.clone());
        }
        if is_blank(value) {
            return None;
        }
        let value = value?;
        match self {
            Rule::Required => None,
            Rule::MinLength(n) => {
                let len = value.as_str()?.chars().count();
                (len < *n).then(|| with_bound(&messages.min_length, n))
            }
            Rule::MaxLength(n) => {
                let len = value.as_str()?.chars().count();
                (len > *n).then(|| with_bound(&messages.max_length, n))
            }
            Rule::Pattern(regex, message) => {
                let s = value.as_str()?;
                (!regex.is_match(s)).then(|| message.clone().unwrap_or_else(|| messages.pattern.clone()))
            }
            Rule::Min(bound) => match value.as_f64() {
                None => Some(messages.number.clone()),
                Some(x) => (x < *bound).then(|| with_bound(&messages.min, bound)),
            },
            Rule::Max(bound) => match value.as_f64() {
                None => Some(messages.number.clone()),
                Some(x) => (x > *bound).then(|| with_bound(&messages.max, bound)),
            },
            Rule::Integer => match value.as_f64() {
                None => Some(messages.number.clone()),
                Some(x) => (x.fract() != 0.0).then(|| messages.integer.clone()),
            },
            Rule::MinItems(n) => {
                let len = value.as_array()?.len();
                (len < *n).then(|| with_bound(&messages.min_items, n))
            }
            Rule::MaxItems(n) => {
                let len = value.as_array()?.len();
                (len > *n).then(|| with_bound(&messages.max_items, n))
            }
        }
    }
}

/// Serialized form of a [`Rule`], as found in a schema config file.
///
/// ```json
/// {"rule": "max_length", "value": 64}
/// {"rule": "pattern", "regex": "^[a-z]+$", "message": "Lowercase only."}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleSpec {
    Required,
    MinLength { value: usize },
    MaxLength { value: usize },
    Pattern {
        regex: String,
        #[serde(default)]
        message: Option<String>,
    },
    Min { value: f64 },
    Max { value: f64 },
    Integer,
    MinItems { value: usize },
    MaxItems { value: usize },
}

impl RuleSpec {
    fn compile(&self, field: &str) -> Result<Rule, SchemaError> {
        Ok(match self {
            RuleSpec::Required => Rule::Required,
            RuleSpec::MinLength { value } => Rule::MinLength(*value),
            RuleSpec::MaxLength { value } => Rule::MaxLength(*value),
            RuleSpec::Pattern { regex, message } => Rule::pattern(regex, message.as_deref())
                .map_err(|source| SchemaError::InvalidPattern {
                    field: field.to_string(),
                    source,
                })?,
            RuleSpec::Min { value } => Rule::Min(*value),
            RuleSpec::Max { value } => Rule::Max(*value),
            RuleSpec::Integer => Rule::Integer,
            RuleSpec::MinItems { value } => Rule::MinItems(*value),
            RuleSpec::MaxItems { value } => Rule::MaxItems(*value),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub path: String,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// A rule schema as loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub messages: Messages,
    pub fields: Vec<FieldConfig>,
}

/// A [`Schema`] built from per-field rules.
///
/// # Example
///
/// ```
/// use formstate_schema::{Rule, RuleSchema, Schema};
/// use serde_json::json;
///
/// let schema = RuleSchema::builder()
///     .field("labels[*].label", [Rule::Required, Rule::MaxLength(8)])
///     .build()
///     .unwrap();
/// let issues = schema.validate(&json!({"labels": [{"label": "Cat"}, {"label": ""}]}));
/// assert_eq!(issues.len(), 1);
/// assert_eq!(issues[0].path.to_string(), "labels[1].label");
/// assert_eq!(issues[0].message, "This field is required.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSchema {
    fields: Vec<(PathPattern, Vec<Rule>)>,
    messages: Messages,
}

impl RuleSchema {
    pub fn builder() -> RuleSchemaBuilder {
        RuleSchemaBuilder::default()
    }

    pub fn from_config(config: &SchemaConfig) -> Result<Self, SchemaError> {
        let mut fields = Vec::with_capacity(config.fields.len());
        for field in &config.fields {
            let pattern = PathPattern::parse(&field.path)?;
            let rules = field
                .rules
                .iter()
                .map(|spec| spec.compile(&field.path))
                .collect::<Result<Vec<_>, _>>()?;
            fields.push((pattern, rules));
        }
        Ok(Self {
            fields,
            messages: config.messages.clone(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let config: SchemaConfig = serde_json::from_str(json)?;
        Self::from_config(&config)
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// The field patterns, in declaration order.
    pub fn patterns(&self) -> impl Iterator<Item = &PathPattern> {
        self.fields.iter().map(|(pattern, _)| pattern)
    }
}

impl Schema for RuleSchema {
    fn validate(&self, document: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (pattern, rules) in &self.fields {
            for path in pattern.expand(document) {
                let value = tree::read(document, &path);
                if let Some(message) = rules.iter().find_map(|rule| rule.check(value, &self.messages)) {
                    tracing::trace!(field = %path, %message, "rule failed");
                    issues.push(ValidationIssue::new(path, message));
                }
            }
        }
        issues
    }
}

#[derive(Debug, Default)]
pub struct RuleSchemaBuilder {
    fields: Vec<(String, Vec<Rule>)>,
    messages: Messages,
}

impl RuleSchemaBuilder {
    pub fn field(mut self, pattern: &str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((pattern.to_string(), rules.into_iter().collect()));
        self
    }

    pub fn messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn build(self) -> Result<RuleSchema, SchemaError> {
        let fields = self
            .fields
            .into_iter()
            .map(|(pattern, rules)| Ok((PathPattern::parse(&pattern)?, rules)))
            .collect::<Result<Vec<_>, SchemaError>>()?;
        Ok(RuleSchema {
            fields,
            messages: self.messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(rule: Rule, value: Value) -> Option<String> {
        rule.check(Some(&value), &Messages::default())
    }

    #[test]
    fn test_required() {
        let m = Messages::default();
        assert_eq!(Rule::Required.check(None, &m).as_deref(), Some("This field is required."));
        assert!(check(Rule::Required, json!(null)).is_some());
        assert!(check(Rule::Required, json!("")).is_some());
        assert!(check(Rule::Required, json!([])).is_some());
        assert!(check(Rule::Required, json!(" ")).is_none());
        assert!(check(Rule::Required, json!(0)).is_none());
        assert!(check(Rule::Required, json!(false)).is_none());
    }

    #[test]
    fn test_optional_rules_skip_blank() {
        assert!(check(Rule::MinLength(3), json!("")).is_none());
        assert!(check(Rule::Min(1.0), json!(null)).is_none());
        assert!(Rule::MaxItems(0).check(None, &Messages::default()).is_none());
    }

    #[test]
    fn test_lengths_count_chars() {
        assert_eq!(check(Rule::MaxLength(3), json!("ábcd")).as_deref(), Some("Must be at most 3 characters."));
        assert!(check(Rule::MaxLength(3), json!("ábc")).is_none());
        assert_eq!(check(Rule::MinLength(2), json!("a")).as_deref(), Some("Must be at least 2 characters."));
    }

    #[test]
    fn test_pattern() {
        let rule = Rule::pattern("^[a-z0-9-]+$", Some("Lowercase letters, digits and dashes only.")).unwrap();
        assert!(check(rule.clone(), json!("my-job-1")).is_none());
        assert_eq!(
            check(rule, json!("My Job")).as_deref(),
            Some("Lowercase letters, digits and dashes only.")
        );
        let rule = Rule::pattern("^x$", None).unwrap();
        assert_eq!(check(rule, json!("y")).as_deref(), Some("Invalid format."));
        assert!(Rule::pattern("(", None).is_err());
    }

    #[test]
    fn test_numeric() {
        assert_eq!(check(Rule::Min(1.0), json!(0)).as_deref(), Some("Must be greater than or equal to 1."));
        assert_eq!(check(Rule::Max(10.0), json!(10.5)).as_deref(), Some("Must be less than or equal to 10."));
        assert_eq!(check(Rule::Integer, json!(1.5)).as_deref(), Some("Must be a whole number."));
        assert_eq!(check(Rule::Min(0.0), json!("abc")).as_deref(), Some("Must be a number."));
        assert!(check(Rule::Integer, json!(3)).is_none());
    }

    #[test]
    fn test_items() {
        assert_eq!(check(Rule::MinItems(1), json!([])).as_deref(), Some("Must have at least 1 items."));
        assert_eq!(check(Rule::MinItems(2), json!([1])).as_deref(), Some("Must have at least 2 items."));
        assert_eq!(check(Rule::MaxItems(1), json!([1, 2])).as_deref(), Some("Must have at most 1 items."));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let schema = RuleSchema::builder()
            .field("name", [Rule::Required, Rule::MinLength(3)])
            .build()
            .unwrap();
        let issues = schema.validate(&json!({}));
        assert_eq!(issues, vec![ValidationIssue::new("name".parse().unwrap(), "This field is required.")]);
        let issues = schema.validate(&json!({"name": "ab"}));
        assert_eq!(issues[0].message, "Must be at least 3 characters.");
    }

    #[test]
    fn test_builder_rejects_malformed_pattern() {
        let err = RuleSchema::builder().field("a[", [Rule::Required]).build().unwrap_err();
        assert!(matches!(err, SchemaError::MalformedPath(_)));
    }

    #[test]
    fn test_from_config() {
        let schema = RuleSchema::from_json_str(
            r#"{
                "messages": {"required": "Required!"},
                "fields": [
                    {"path": "job.name", "rules": [
                        {"rule": "required"},
                        {"rule": "pattern", "regex": "^[a-z]+$", "message": "Lowercase only."}
                    ]},
                    {"path": "job.workers", "rules": [{"rule": "min", "value": 1}, {"rule": "integer"}]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.messages().max_length, Messages::default().max_length);
        let patterns: Vec<String> = schema.patterns().map(ToString::to_string).collect();
        assert_eq!(patterns, vec!["job.name", "job.workers"]);

        let issues = schema.validate(&json!({"job": {"name": "", "workers": 0}}));
        let got: Vec<_> = issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            got,
            vec![
                "job.name: Required!",
                "job.workers: Must be greater than or equal to 1.",
            ]
        );
    }

    #[test]
    fn test_from_config_invalid_regex() {
        let err = RuleSchema::from_json_str(
            r#"{"fields": [{"path": "a", "rules": [{"rule": "pattern", "regex": "("}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { ref field, .. } if field == "a"));
    }
}
