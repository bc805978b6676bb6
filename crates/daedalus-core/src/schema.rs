//! Declarative schema descriptors.
//!
//! A [`Schema`] describes the expected shape of one value: its kind, whether
//! it must be present, kind-specific constraints and documentation metadata
//! (label, description, example). Descriptors are built with chained methods
//! and shared freely between routes:
//!
//! ```
//! use daedalus_core::Schema;
//! use serde_json::json;
//!
//! let limit = Schema::integer()
//!     .positive()
//!     .description("Number of items to return")
//!     .example(25)
//!     .label("QueryLimit");
//!
//! // Query strings arrive as text; integers are coerced.
//! assert_eq!(limit.validate(&json!("25")).unwrap(), json!(25));
//! assert!(limit.validate(&json!("-1")).is_err());
//! ```
//!
//! Validation is a recursive walk over [`SchemaKind`] that collects every
//! failure into [`FieldErrors`] and returns the coerced value.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::error::FieldErrors;

/// A compiled regular expression constraint.
///
/// Compared by source text so schemas stay comparable.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Wraps a compiled regex.
    #[must_use]
    pub const fn new(regex: Regex) -> Self {
        Self(regex)
    }

    /// The source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns `true` if the pattern matches anywhere in `value`.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// String constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringRules {
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    /// Regex the value must match.
    pub pattern: Option<Pattern>,
}

/// Numeric constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRules {
    /// Only whole numbers are accepted.
    pub integer: bool,
    /// Lower bound.
    pub minimum: Option<f64>,
    /// Upper bound.
    pub maximum: Option<f64>,
    /// The lower bound itself is rejected.
    pub exclusive_minimum: bool,
    /// The upper bound itself is rejected.
    pub exclusive_maximum: bool,
}

/// Array constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayRules {
    /// Schema applied to every item.
    pub items: Option<Box<Schema>>,
    /// Minimum number of items.
    pub min_items: Option<usize>,
    /// Maximum number of items.
    pub max_items: Option<usize>,
}

/// Object constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRules {
    /// Declared keys, in declaration order.
    pub properties: IndexMap<String, Schema>,
    /// Undeclared keys pass through instead of failing.
    pub allow_unknown: bool,
}

/// The kind of value a schema accepts, with its constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Any JSON value.
    Any,
    /// A string.
    String(StringRules),
    /// A number, optionally restricted to integers.
    Number(NumberRules),
    /// A boolean.
    Boolean,
    /// An array.
    Array(ArrayRules),
    /// An object.
    Object(ObjectRules),
}

/// Documentation metadata carried by a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaMeta {
    /// Stable name; used in messages and as the document reference name.
    pub label: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
    /// Example value.
    pub example: Option<Value>,
    /// Value substituted when the field is absent.
    pub default: Option<Value>,
}

/// A composable description of an expected value.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: SchemaKind,
    required: bool,
    meta: SchemaMeta,
    allowed: Vec<Value>,
}

impl Schema {
    fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            required: false,
            meta: SchemaMeta::default(),
            allowed: Vec::new(),
        }
    }

    /// Accepts any value.
    #[must_use]
    pub fn any() -> Self {
        Self::of(SchemaKind::Any)
    }

    /// Accepts strings.
    #[must_use]
    pub fn string() -> Self {
        Self::of(SchemaKind::String(StringRules::default()))
    }

    /// Accepts numbers; numeric strings are coerced.
    #[must_use]
    pub fn number() -> Self {
        Self::of(SchemaKind::Number(NumberRules::default()))
    }

    /// Accepts whole numbers; numeric strings are coerced.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(SchemaKind::Number(NumberRules {
            integer: true,
            ..NumberRules::default()
        }))
    }

    /// Accepts booleans; `"true"` and `"false"` are coerced.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    /// Accepts arrays whose items match `items`.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self::of(SchemaKind::Array(ArrayRules {
            items: Some(Box::new(items)),
            ..ArrayRules::default()
        }))
    }

    /// Accepts objects. Add keys with [`Schema::key`].
    #[must_use]
    pub fn object() -> Self {
        Self::of(SchemaKind::Object(ObjectRules::default()))
    }

    /// Declares an object key. No effect on other kinds.
    #[must_use]
    pub fn key(mut self, name: impl Into<String>, schema: Self) -> Self {
        if let SchemaKind::Object(rules) = &mut self.kind {
            rules.properties.insert(name.into(), schema);
        }
        self
    }

    /// Lets undeclared object keys through.
    #[must_use]
    pub fn unknown(mut self, allow: bool) -> Self {
        if let SchemaKind::Object(rules) = &mut self.kind {
            rules.allow_unknown = allow;
        }
        self
    }

    /// The value must be present.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The value may be absent (the default).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.meta.label = Some(label.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }

    /// Sets the example.
    #[must_use]
    pub fn example(mut self, example: impl Into<Value>) -> Self {
        self.meta.example = Some(example.into());
        self
    }

    /// Sets the value used when the field is absent.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.meta.default = Some(value.into());
        self
    }

    /// Restricts the value to an explicit set.
    #[must_use]
    pub fn valid<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed.extend(values.into_iter().map(Into::into));
        self
    }

    /// Lower bound: value for numbers, length for strings, item count for
    /// arrays.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn min(mut self, limit: i64) -> Self {
        match &mut self.kind {
            SchemaKind::Number(rules) => {
                rules.minimum = Some(limit as f64);
                rules.exclusive_minimum = false;
            }
            SchemaKind::String(rules) => rules.min_length = usize::try_from(limit).ok(),
            SchemaKind::Array(rules) => rules.min_items = usize::try_from(limit).ok(),
            _ => {}
        }
        self
    }

    /// Upper bound: value for numbers, length for strings, item count for
    /// arrays.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn max(mut self, limit: i64) -> Self {
        match &mut self.kind {
            SchemaKind::Number(rules) => {
                rules.maximum = Some(limit as f64);
                rules.exclusive_maximum = false;
            }
            SchemaKind::String(rules) => rules.max_length = usize::try_from(limit).ok(),
            SchemaKind::Array(rules) => rules.max_items = usize::try_from(limit).ok(),
            _ => {}
        }
        self
    }

    /// Numbers must be strictly greater than zero.
    #[must_use]
    pub fn positive(mut self) -> Self {
        if let SchemaKind::Number(rules) = &mut self.kind {
            rules.minimum = Some(0.0);
            rules.exclusive_minimum = true;
        }
        self
    }

    /// Strings must match `regex`.
    #[must_use]
    pub fn pattern(mut self, regex: Regex) -> Self {
        if let SchemaKind::String(rules) = &mut self.kind {
            rules.pattern = Some(Pattern::new(regex));
        }
        self
    }

    /// The kind and its constraints.
    #[must_use]
    pub const fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// Whether the value must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Documentation metadata.
    #[must_use]
    pub const fn meta(&self) -> &SchemaMeta {
        &self.meta
    }

    /// The label, if any.
    #[must_use]
    pub fn label_str(&self) -> Option<&str> {
        self.meta.label.as_deref()
    }

    /// The explicit set of accepted values; empty means unrestricted.
    #[must_use]
    pub fn allowed(&self) -> &[Value] {
        &self.allowed
    }

    /// Validates a present value and returns it coerced.
    ///
    /// # Errors
    ///
    /// Returns every constraint violation found.
    pub fn validate(&self, value: &Value) -> Result<Value, FieldErrors> {
        let mut errors = FieldErrors::new();
        let out = self.validate_at(Some(value), "value", "value", &mut errors);
        if errors.is_empty() {
            Ok(out.unwrap_or(Value::Null))
        } else {
            Err(errors)
        }
    }

    /// Validates `value` found at `path`, recording failures in `errors`.
    ///
    /// `key` is the last path segment and names the field in messages unless
    /// the schema carries a label. Returns the coerced value, the default
    /// when absent, or `None` when absent without default or invalid.
    pub fn validate_at(
        &self,
        value: Option<&Value>,
        path: &str,
        key: &str,
        errors: &mut FieldErrors,
    ) -> Option<Value> {
        let name = self.meta.label.as_deref().unwrap_or(key);

        let Some(value) = value else {
            if self.required {
                errors.add(path, format!("\"{name}\" is required"));
                return None;
            }
            return self.meta.default.clone();
        };

        let before = errors.count();
        let coerced = match &self.kind {
            SchemaKind::Any => Some(value.clone()),
            SchemaKind::String(rules) => check_string(rules, value, path, name, errors),
            SchemaKind::Number(rules) => check_number(rules, value, path, name, errors),
            SchemaKind::Boolean => check_boolean(value, path, name, errors),
            SchemaKind::Array(rules) => check_array(rules, value, path, name, errors),
            SchemaKind::Object(rules) => check_object(rules, value, path, name, errors),
        }?;

        if !self.allowed.is_empty() && !self.allowed.contains(&coerced) {
            let options = self
                .allowed
                .iter()
                .map(display_value)
                .collect::<Vec<_>>()
                .join(", ");
            errors.add(path, format!("\"{name}\" must be one of [{options}]"));
        }

        (errors.count() == before).then_some(coerced)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn check_string(
    rules: &StringRules,
    value: &Value,
    path: &str,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let Value::String(s) = value else {
        errors.add(path, format!("\"{name}\" must be a string"));
        return None;
    };

    let len = s.chars().count();
    let mut ok = true;
    if let Some(min) = rules.min_length {
        if len < min {
            errors.add(
                path,
                format!("\"{name}\" length must be at least {min} characters long"),
            );
            ok = false;
        }
    }
    if let Some(max) = rules.max_length {
        if len > max {
            errors.add(
                path,
                format!("\"{name}\" length must be less than or equal to {max} characters long"),
            );
            ok = false;
        }
    }
    if let Some(pattern) = &rules.pattern {
        if !pattern.is_match(s) {
            errors.add(
                path,
                format!(
                    "\"{name}\" with value \"{s}\" fails to match the required pattern: /{}/",
                    pattern.as_str()
                ),
            );
            ok = false;
        }
    }
    ok.then(|| value.clone())
}

/// Parses a number from JSON or from its text form.
fn to_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Number::from(i));
            }
            s.parse::<f64>().ok().and_then(Number::from_f64)
        }
        _ => None,
    }
}

fn is_whole(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// Narrows a whole float (`7.0`) to an integer number when it fits in `i64`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn to_integer(number: Number) -> Number {
    if number.is_i64() || number.is_u64() {
        return number;
    }
    match number.as_f64() {
        Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => Number::from(f as i64),
        _ => number,
    }
}

fn check_number(
    rules: &NumberRules,
    value: &Value,
    path: &str,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let Some(number) = to_number(value) else {
        errors.add(path, format!("\"{name}\" must be a number"));
        return None;
    };

    if rules.integer && !is_whole(&number) {
        errors.add(path, format!("\"{name}\" must be an integer"));
        return None;
    }
    let number = if rules.integer { to_integer(number) } else { number };

    let n = number.as_f64().unwrap_or(f64::NAN);
    let mut ok = true;
    if let Some(min) = rules.minimum {
        if rules.exclusive_minimum && n <= min {
            if min == 0.0 {
                errors.add(path, format!("\"{name}\" must be a positive number"));
            } else {
                errors.add(path, format!("\"{name}\" must be greater than {min}"));
            }
            ok = false;
        } else if !rules.exclusive_minimum && n < min {
            errors.add(
                path,
                format!("\"{name}\" must be larger than or equal to {min}"),
            );
            ok = false;
        }
    }
    if let Some(max) = rules.maximum {
        if rules.exclusive_maximum && n >= max {
            errors.add(path, format!("\"{name}\" must be less than {max}"));
            ok = false;
        } else if !rules.exclusive_maximum && n > max {
            errors.add(
                path,
                format!("\"{name}\" must be less than or equal to {max}"),
            );
            ok = false;
        }
    }
    ok.then_some(Value::Number(number))
}

fn check_boolean(value: &Value, path: &str, name: &str, errors: &mut FieldErrors) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
        _ => {
            errors.add(path, format!("\"{name}\" must be a boolean"));
            None
        }
    }
}

fn check_array(
    rules: &ArrayRules,
    value: &Value,
    path: &str,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let Value::Array(items) = value else {
        errors.add(path, format!("\"{name}\" must be an array"));
        return None;
    };

    let before = errors.count();
    if let Some(min) = rules.min_items {
        if items.len() < min {
            errors.add(path, format!("\"{name}\" must contain at least {min} items"));
        }
    }
    if let Some(max) = rules.max_items {
        if items.len() > max {
            errors.add(
                path,
                format!("\"{name}\" must contain less than or equal to {max} items"),
            );
        }
    }

    let out: Vec<Value> = match &rules.items {
        Some(schema) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let key = i.to_string();
                schema.validate_at(Some(item), &format!("{path}[{i}]"), &key, errors)
            })
            .collect(),
        None => items.clone(),
    };

    (errors.count() == before).then_some(Value::Array(out))
}

fn check_object(
    rules: &ObjectRules,
    value: &Value,
    path: &str,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let Value::Object(fields) = value else {
        errors.add(path, format!("\"{name}\" must be an object"));
        return None;
    };

    let before = errors.count();
    let mut out = Map::new();
    for (key, schema) in &rules.properties {
        let child = format!("{path}.{key}");
        if let Some(v) = schema.validate_at(fields.get(key), &child, key, errors) {
            out.insert(key.clone(), v);
        }
    }

    for (key, v) in fields {
        if rules.properties.contains_key(key) {
            continue;
        }
        if rules.allow_unknown {
            out.insert(key.clone(), v.clone());
        } else {
            errors.add(format!("{path}.{key}"), format!("\"{key}\" is not allowed"));
        }
    }

    (errors.count() == before).then_some(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn messages(errors: &FieldErrors) -> Vec<String> {
        errors.fields.values().flatten().cloned().collect()
    }

    #[test]
    fn test_string_constraints() {
        let schema = Schema::string().min(2).max(10);
        assert_eq!(schema.validate(&json!("Rex")).unwrap(), json!("Rex"));

        let errors = schema.validate(&json!("R")).unwrap_err();
        assert_eq!(
            messages(&errors),
            vec!["\"value\" length must be at least 2 characters long"]
        );
        assert!(schema.validate(&json!(42)).is_err());
    }

    #[test]
    fn test_string_pattern() {
        let schema = Schema::string().pattern(Regex::new("^[a-z]+$").unwrap());
        assert!(schema.validate(&json!("abc")).is_ok());
        let errors = schema.validate(&json!("ABC")).unwrap_err();
        assert!(messages(&errors)[0].contains("fails to match the required pattern"));
    }

    #[test]
    fn test_integer_coercion() {
        let schema = Schema::integer();
        assert_eq!(schema.validate(&json!("7")).unwrap(), json!(7));
        assert_eq!(schema.validate(&json!(7)).unwrap(), json!(7));

        let errors = schema.validate(&json!("abc")).unwrap_err();
        assert_eq!(messages(&errors), vec!["\"value\" must be a number"]);

        let errors = schema.validate(&json!("7.5")).unwrap_err();
        assert_eq!(messages(&errors), vec!["\"value\" must be an integer"]);
    }

    #[test]
    fn test_whole_float_becomes_integer() {
        let schema = Schema::integer();
        let value = schema.validate(&json!("7.0")).unwrap();
        assert_eq!(value, json!(7));
        assert_eq!(value.as_i64(), Some(7));
        assert_eq!(schema.validate(&json!(-2.0)).unwrap().as_i64(), Some(-2));

        // plain numbers keep their float form
        assert_eq!(Schema::number().validate(&json!("7.0")).unwrap(), json!(7.0));
    }

    #[test]
    fn test_number_bounds() {
        let positive = Schema::integer().positive().label("QueryLimit");
        let errors = positive.validate(&json!(0)).unwrap_err();
        assert_eq!(
            messages(&errors),
            vec!["\"QueryLimit\" must be a positive number"]
        );

        let offset = Schema::integer().min(0).max(100);
        assert!(offset.validate(&json!(0)).is_ok());
        assert!(offset.validate(&json!(100)).is_ok());
        let errors = offset.validate(&json!(-1)).unwrap_err();
        assert_eq!(
            messages(&errors),
            vec!["\"value\" must be larger than or equal to 0"]
        );
        assert!(offset.validate(&json!(101)).is_err());
    }

    #[test]
    fn test_boolean_coercion() {
        let schema = Schema::boolean();
        assert_eq!(schema.validate(&json!("true")).unwrap(), json!(true));
        assert_eq!(schema.validate(&json!("FALSE")).unwrap(), json!(false));
        assert!(schema.validate(&json!("yes")).is_err());
    }

    #[test]
    fn test_null_is_not_a_string() {
        assert!(Schema::string().validate(&Value::Null).is_err());
        assert!(Schema::any().validate(&Value::Null).is_ok());
    }

    #[test]
    fn test_required_and_default() {
        let mut errors = FieldErrors::new();
        let required = Schema::string().required().label("ApiKey");
        assert_eq!(
            required.validate_at(None, "headers.x-api-key", "x-api-key", &mut errors),
            None
        );
        assert_eq!(messages(&errors), vec!["\"ApiKey\" is required"]);

        let mut errors = FieldErrors::new();
        let defaulted = Schema::integer().default_value(10);
        assert_eq!(
            defaulted.validate_at(None, "limit", "limit", &mut errors),
            Some(json!(10))
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_object_validation() {
        let schema = Schema::object()
            .key("name", Schema::string().required())
            .key("age", Schema::integer());

        assert_eq!(
            schema.validate(&json!({"name": "Rex", "age": "3"})).unwrap(),
            json!({"name": "Rex", "age": 3})
        );

        let errors = schema.validate(&json!({"age": 3})).unwrap_err();
        assert_eq!(messages(&errors), vec!["\"name\" is required"]);
        assert!(errors.fields.contains_key("value.name"));
    }

    #[test]
    fn test_object_unknown_keys() {
        let strict = Schema::object().key("name", Schema::string());
        let errors = strict.validate(&json!({"name": "Rex", "color": "red"})).unwrap_err();
        assert_eq!(messages(&errors), vec!["\"color\" is not allowed"]);

        let lenient = strict.clone().unknown(true);
        assert_eq!(
            lenient.validate(&json!({"name": "Rex", "color": "red"})).unwrap(),
            json!({"name": "Rex", "color": "red"})
        );
    }

    #[test]
    fn test_nested_errors_are_all_collected() {
        let schema = Schema::object()
            .key("name", Schema::string().required())
            .key("tags", Schema::array(Schema::string()).max(2));

        let errors = schema
            .validate(&json!({"tags": ["a", 1, "c"]}))
            .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.fields.contains_key("value.name"));
        assert!(errors.fields.contains_key("value.tags"));
        assert!(errors.fields.contains_key("value.tags[1]"));
    }

    #[test]
    fn test_valid_values() {
        let schema = Schema::string().valid(["cat", "dog"]);
        assert!(schema.validate(&json!("cat")).is_ok());
        let errors = schema.validate(&json!("fish")).unwrap_err();
        assert_eq!(
            messages(&errors),
            vec!["\"value\" must be one of [cat, dog]"]
        );
    }

    #[test]
    fn test_metadata() {
        let schema = Schema::string()
            .description("Name of the pet")
            .example("Garfield")
            .label("PetName");
        assert_eq!(schema.label_str(), Some("PetName"));
        assert_eq!(schema.meta().example, Some(json!("Garfield")));
        assert!(!schema.is_required());
        assert!(schema.clone().required().is_required());
    }

    proptest! {
        #[test]
        fn integer_strings_coerce_exactly(n in any::<i64>()) {
            let out = Schema::integer().validate(&json!(n.to_string())).unwrap();
            prop_assert_eq!(out, json!(n));
        }

        #[test]
        fn min_bound_is_inclusive(min in -1000i64..1000, delta in 0i64..1000) {
            let schema = Schema::integer().min(min);
            prop_assert!(schema.validate(&json!(min + delta)).is_ok());
            prop_assert!(schema.validate(&json!(min - 1)).is_err());
        }
    }
}
