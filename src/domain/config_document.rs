//! The per-deployment `config.yaml` document.
//!
//! Values are read with `serde_yaml`, but saving edits the original text in
//! place: only keys whose value changed are rewritten, so comments and layout
//! written by hand survive a load/save cycle.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::domain::AppError;
use crate::domain::parameters;

/// A parameter value: nothing, one string, or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParamValue {
    #[default]
    Absent,
    Scalar(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        ParamValue::Scalar(value.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Absent => true,
            ParamValue::Scalar(value) => value.is_empty(),
            ParamValue::List(items) => items.is_empty(),
        }
    }

    /// Scalar text, or `""` for absent values and lists.
    pub fn as_str(&self) -> &str {
        match self {
            ParamValue::Scalar(value) => value,
            _ => "",
        }
    }

    /// Text form used for environment exports.
    pub fn to_plain(&self) -> String {
        match self {
            ParamValue::Absent => String::new(),
            ParamValue::Scalar(value) => value.clone(),
            ParamValue::List(items) => list_literal(items),
        }
    }

    /// Literal in the provisioner's variable syntax: `"value"` or `["a", "b"]`.
    pub fn to_literal(&self) -> String {
        match self {
            ParamValue::List(items) => list_literal(items),
            other => quote(&other.to_plain()),
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `["a", "b"]`
pub fn list_literal(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| quote(item)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Ordered, mutable view of one deployment's `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: Option<PathBuf>,
    source: String,
    values: IndexMap<String, ParamValue>,
    baseline: IndexMap<String, ParamValue>,
}

impl ConfigDocument {
    /// Load and parse a config file. Malformed YAML is fatal.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let source = fs::read_to_string(path)?;
        let mut document = Self::parse(&source, &path.display().to_string())?;
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Parse YAML text that is not (yet) backed by a file.
    pub fn from_yaml(source: &str) -> Result<Self, AppError> {
        Self::parse(source, "<inline>")
    }

    fn parse(source: &str, origin: &str) -> Result<Self, AppError> {
        let values = parse_values(source)
            .map_err(|details| AppError::ConfigParse { path: origin.to_string(), details })?;
        Ok(Self { path: None, source: source.to_string(), baseline: values.clone(), values })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// The stored value for `key`, `Absent` when missing.
    pub fn value(&self, key: &str) -> ParamValue {
        self.values.get(key).cloned().unwrap_or_default()
    }

    /// Scalar text for `key`, `""` when missing or not a scalar.
    pub fn scalar(&self, key: &str) -> &str {
        self.values.get(key).map(ParamValue::as_str).unwrap_or("")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: ParamValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Drop any pending edit of `key`.
    pub fn revert(&mut self, key: &str) {
        match self.baseline.get(key) {
            Some(value) => {
                self.values.insert(key.to_string(), value.clone());
            }
            None => {
                self.values.shift_remove(key);
            }
        }
    }

    /// Whether any value differs from what was last loaded or saved.
    pub fn is_dirty(&self) -> bool {
        !self.dirty_keys().is_empty()
    }

    fn dirty_keys(&self) -> Vec<&str> {
        self.values
            .iter()
            .filter(|(key, value)| self.baseline.get(*key) != Some(*value))
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// YAML text with pending edits applied to the original source.
    pub fn render(&self) -> String {
        let dirty: HashSet<&str> = self.dirty_keys().into_iter().collect();
        let lines: Vec<&str> = self.source.split_inclusive('\n').collect();
        let mut out = String::with_capacity(self.source.len());
        let mut written: HashSet<&str> = HashSet::new();

        let mut index = 0;
        while index < lines.len() {
            let line = lines[index];
            index += 1;

            let Some(key) = top_level_key(line) else {
                out.push_str(line);
                continue;
            };
            let Some((key, value)) = self.values.get_key_value(key) else {
                out.push_str(line);
                continue;
            };
            if !dirty.contains(key.as_str()) || written.contains(key.as_str()) {
                out.push_str(line);
                continue;
            }

            let mut kept_comments = Vec::new();
            while index < lines.len() && is_continuation(lines[index]) {
                if lines[index].trim_start().starts_with('#') {
                    kept_comments.push(lines[index]);
                }
                index += 1;
            }

            out.push_str(&render_entry(key, value, trailing_comment(line)));
            for comment in kept_comments {
                out.push_str(comment);
                if !comment.ends_with('\n') {
                    out.push('\n');
                }
            }
            written.insert(key.as_str());
        }

        for (key, value) in &self.values {
            if dirty.contains(key.as_str()) && !written.contains(key.as_str()) {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&render_entry(key, value, None));
            }
        }

        out
    }

    /// Write pending edits back to the file the document was loaded from.
    pub fn save(&mut self) -> Result<(), AppError> {
        let path = self.path.clone().ok_or_else(|| AppError::ConfigParse {
            path: "<inline>".into(),
            details: "document has no backing file".into(),
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&mut self, path: &Path) -> Result<(), AppError> {
        let rendered = self.render();
        fs::write(path, &rendered)?;
        self.source = rendered;
        self.baseline = self.values.clone();
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn parse_values(source: &str) -> Result<IndexMap<String, ParamValue>, String> {
    let mut values = IndexMap::new();
    if source.trim().is_empty() {
        return Ok(values);
    }

    let root: Value = serde_yaml::from_str(source).map_err(|err| err.to_string())?;
    let mapping = match root {
        Value::Null => return Ok(values),
        Value::Mapping(mapping) => mapping,
        _ => return Err("expected a mapping of parameter names to values".into()),
    };

    for (key, value) in mapping {
        let key = scalar_text(&key).ok_or_else(|| "keys must be plain scalars".to_string())?;
        match to_param_value(&value) {
            Some(param) => {
                values.insert(key, param);
            }
            None if parameters::is_recognized(&key) => {
                return Err(format!("'{}' must be a scalar or a list of scalars", key));
            }
            // Unknown structured values stay in the source text untouched.
            None => {}
        }
    }

    Ok(values)
}

pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn to_param_value(value: &Value) -> Option<ParamValue> {
    match value {
        Value::Null => Some(ParamValue::Absent),
        Value::Sequence(items) => {
            items.iter().map(scalar_text).collect::<Option<Vec<_>>>().map(ParamValue::List)
        }
        Value::Tagged(tagged) => to_param_value(&tagged.value),
        Value::Mapping(_) => None,
        scalar => scalar_text(scalar).map(ParamValue::Scalar),
    }
}

/// Key of a `key: ...` line at column zero.
fn top_level_key(line: &str) -> Option<&str> {
    let first = line.chars().next()?;
    if first.is_whitespace() || matches!(first, '#' | '-' | '{' | '[') {
        return None;
    }
    let bytes = line.as_bytes();
    let colon = (0..bytes.len()).find(|&i| {
        bytes[i] == b':' && bytes.get(i + 1).is_none_or(|next| next.is_ascii_whitespace())
    })?;
    let key = line[..colon].trim().trim_matches(|c| c == '"' || c == '\'');
    if key.is_empty() { None } else { Some(key) }
}

/// Lines belonging to the value of the preceding top-level key.
fn is_continuation(line: &str) -> bool {
    if line.trim().is_empty() || line.starts_with("---") {
        return false;
    }
    line.starts_with(' ') || line.starts_with('\t') || line.starts_with('-')
}

/// `  # comment` suffix of a key line, including its leading whitespace.
fn trailing_comment(line: &str) -> Option<&str> {
    let body = line.trim_end_matches(['\n', '\r']);
    let hash = body.find(" #").or_else(|| body.find("\t#"))?;
    let start = body[..hash].trim_end().len();
    Some(&body[start..])
}

fn render_entry(key: &str, value: &ParamValue, comment: Option<&str>) -> String {
    let comment = comment.unwrap_or("");
    match value {
        ParamValue::Absent => format!("{}:{}\n", key, comment),
        ParamValue::Scalar(text) => format!("{}: {}{}\n", key, render_scalar(text), comment),
        ParamValue::List(items) if items.is_empty() => format!("{}: []{}\n", key, comment),
        ParamValue::List(items) => {
            let mut entry = format!("{}:{}\n", key, comment);
            for item in items {
                entry.push_str(&format!("- {}\n", render_scalar(item)));
            }
            entry
        }
    }
}

/// Emit `text` plain when plain YAML reads back as the same text, quoted otherwise.
fn render_scalar(text: &str) -> String {
    if !text.is_empty() && !text.contains('\n') && !text.contains(" #") {
        let probe = format!("value: {}", text);
        if let Ok(Value::Mapping(mapping)) = serde_yaml::from_str::<Value>(&probe)
            && let Some(parsed) = mapping.get("value")
            && matches!(parsed, Value::String(_) | Value::Bool(_) | Value::Number(_))
            && scalar_text(parsed).as_deref() == Some(text)
        {
            return text.to_string();
        }
    }
    match serde_yaml::to_string(&Value::String(text.to_string())) {
        Ok(rendered) => rendered.trim_end().to_string(),
        Err(_) => format!("'{}'", text.replace('\'', "''")),
    }
}
