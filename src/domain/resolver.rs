//! Parameter resolution.
//!
//! Every recognized parameter is resolved exactly once per run, in catalog
//! order, from (highest precedence first) the `UPPERCASE(name)` environment
//! override, the configuration document, and then a kind-specific filler
//! (generated secret, derived names, adapter outputs) when still empty.
//!
//! Resolution is split in two phases. Phase one covers everything that does
//! not depend on the external tools; the coordinator then lets the adapters
//! read their artifacts and hands the results to phase two.
//!
//! Resolved values are written back into the document, recorded in an
//! explicit export map (`UPPERCASE(name)` and `TF_VAR_<name>`), and appended
//! to the flat variable list passed to the adapters. The host process
//! environment is only ever read.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::domain::config_document::{ConfigDocument, ParamValue, scalar_text};
use crate::domain::identity::{DeploymentIdentity, data_bucket_name};
use crate::domain::parameters::{self, ParameterKind, ParameterSpec};
use crate::domain::secret::generate_default_secret;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Environment,
    Document,
    Generated,
    AdapterOutput,
}

/// One parameter after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParameter {
    pub name: &'static str,
    /// Value as stored in the document.
    pub value: ParamValue,
    /// Text exported to the environment.
    pub export: String,
    /// Literal appended to the adapter variable list.
    pub literal: String,
    pub source: ValueSource,
}

/// A `(name, literal)` pair destined for the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVariable {
    pub name: String,
    pub literal: String,
}

impl ToolVariable {
    /// The literal without the scalar double quotes, for tools that take raw strings.
    pub fn bare_value(&self) -> String {
        let literal = self.literal.as_str();
        if literal.len() >= 2 && literal.starts_with('"') && literal.ends_with('"') {
            literal[1..literal.len() - 1].replace("\\\"", "\"").replace("\\\\", "\\")
        } else {
            literal.to_string()
        }
    }
}

/// Ordered variable list shared with the adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolVariables(Vec<ToolVariable>);

impl ToolVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, literal: impl Into<String>) {
        self.0.push(ToolVariable { name: name.into(), literal: literal.into() });
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolVariable> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Literal of the last entry named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().rev().find(|var| var.name == name).map(|var| var.literal.as_str())
    }
}

impl FromIterator<(String, String)> for ToolVariables {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(name, literal)| ToolVariable { name, literal }).collect())
    }
}

/// Host environment snapshot plus the variables exported by resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    host: BTreeMap<String, String>,
    exports: BTreeMap<String, String>,
}

impl ResolvedEnvironment {
    pub fn from_host<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let host = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { host, exports: BTreeMap::new() }
    }

    /// Non-empty host value for `key`.
    pub fn host_value(&self, key: &str) -> Option<&str> {
        self.host.get(key).map(String::as_str).filter(|value| !value.is_empty())
    }

    /// Exported value if any, otherwise the host value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.exports.get(key).or_else(|| self.host.get(key)).map(String::as_str)
    }

    pub fn export(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.exports.insert(key.into(), value.into());
    }

    /// Variables to layer over the inherited environment of a subprocess.
    pub fn exports(&self) -> &BTreeMap<String, String> {
        &self.exports
    }

    /// Host snapshot with the exports layered on top, for subprocess launches.
    pub fn subprocess_env(&self) -> BTreeMap<String, String> {
        let mut env = self.host.clone();
        env.extend(self.exports.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }
}

/// Values only the adapters can supply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterOutputs {
    pub builder_role_arn: String,
    pub deployment_id: String,
    pub server_ami: String,
}

/// Resolves the parameter catalog against one document.
#[derive(Debug, Clone)]
pub struct ValueResolver {
    environment: ResolvedEnvironment,
    identity: DeploymentIdentity,
    resolved: IndexMap<&'static str, ResolvedParameter>,
    variables: ToolVariables,
}

impl ValueResolver {
    pub fn new(environment: ResolvedEnvironment, identity: DeploymentIdentity) -> Self {
        Self { environment, identity, resolved: IndexMap::new(), variables: ToolVariables::new() }
    }

    /// Phase one: every parameter that does not depend on tool artifacts.
    pub fn resolve_independent(&mut self, document: &mut ConfigDocument) {
        for spec in parameters::independent() {
            self.resolve(document, spec, None);
        }
    }

    /// Phase two: parameters whose fallback is an adapter output.
    pub fn resolve_adapter_derived(
        &mut self,
        document: &mut ConfigDocument,
        outputs: &AdapterOutputs,
    ) {
        for spec in parameters::adapter_derived() {
            self.resolve(document, spec, Some(outputs));
        }
    }

    /// Resolve one parameter. A parameter already resolved keeps its value.
    pub fn resolve(
        &mut self,
        document: &mut ConfigDocument,
        spec: &'static ParameterSpec,
        outputs: Option<&AdapterOutputs>,
    ) -> &ResolvedParameter {
        if !self.resolved.contains_key(spec.name) {
            let resolved = self.compute(document, spec, outputs);
            self.record(document, resolved);
        }
        &self.resolved[spec.name]
    }

    fn compute(
        &self,
        document: &ConfigDocument,
        spec: &'static ParameterSpec,
        outputs: Option<&AdapterOutputs>,
    ) -> ResolvedParameter {
        let (mut value, mut source) =
            match self.environment.host_value(&parameters::override_var(spec.name)) {
                Some(raw) => (coerce_override(spec.kind, raw), ValueSource::Environment),
                None => (document.value(spec.name), ValueSource::Document),
            };

        if value.is_empty()
            && let Some((filled, filled_source)) = self.fill_empty(spec.kind, outputs)
        {
            value = filled;
            source = filled_source;
        }

        let tool_value = match (spec.kind, &value) {
            (ParameterKind::UserFilter, ParamValue::List(items)) => ParamValue::Scalar(
                items.iter().map(|item| item.trim()).collect::<Vec<_>>().join(","),
            ),
            _ => value.clone(),
        };

        ResolvedParameter {
            name: spec.name,
            export: tool_value.to_plain(),
            literal: tool_value.to_literal(),
            value,
            source,
        }
    }

    fn fill_empty(
        &self,
        kind: ParameterKind,
        outputs: Option<&AdapterOutputs>,
    ) -> Option<(ParamValue, ValueSource)> {
        let generated = |value: String| (ParamValue::Scalar(value), ValueSource::Generated);
        let from_adapter = |value: &str| {
            (!value.is_empty())
                .then(|| (ParamValue::scalar(value), ValueSource::AdapterOutput))
        };

        match kind {
            ParameterKind::Secret => Some(generated(generate_default_secret())),
            ParameterKind::DeploymentName => Some(generated(self.identity.to_string())),
            ParameterKind::BucketName => data_bucket_name(
                self.text(parameters::MACHINE_NAME),
                self.text(parameters::HOSTED_ZONE),
            )
            .map(generated),
            ParameterKind::BuilderRoleArn => outputs.and_then(|o| from_adapter(&o.builder_role_arn)),
            ParameterKind::DeploymentId => outputs.and_then(|o| from_adapter(&o.deployment_id)),
            ParameterKind::ServerAmi => outputs.and_then(|o| from_adapter(&o.server_ami)),
            ParameterKind::Plain | ParameterKind::List | ParameterKind::UserFilter => None,
        }
    }

    fn record(&mut self, document: &mut ConfigDocument, resolved: ResolvedParameter) {
        let stored = document.get(resolved.name);
        let unchanged = match stored {
            Some(current) => *current == resolved.value,
            None => resolved.value == ParamValue::Absent,
        };
        if !unchanged {
            document.set(resolved.name, resolved.value.clone());
        }

        self.environment.export(parameters::override_var(resolved.name), resolved.export.clone());
        self.environment.export(parameters::tf_var(resolved.name), resolved.export.clone());
        self.variables.push(resolved.name, resolved.literal.clone());

        tracing::debug!(
            parameter = resolved.name,
            source = ?resolved.source,
            "resolved deployment parameter"
        );
        self.resolved.insert(resolved.name, resolved);
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedParameter> {
        self.resolved.get(name)
    }

    /// Scalar text of a resolved parameter, `""` when unresolved or a list.
    pub fn text(&self, name: &str) -> &str {
        self.resolved.get(name).map(|p| p.value.as_str()).unwrap_or("")
    }

    pub fn resolved(&self) -> impl Iterator<Item = &ResolvedParameter> {
        self.resolved.values()
    }

    /// Whether any value was generated or derived locally during this run.
    pub fn generated_values(&self) -> bool {
        self.resolved.values().any(|p| p.source == ValueSource::Generated)
    }

    pub fn identity(&self) -> &DeploymentIdentity {
        &self.identity
    }

    pub fn variables(&self) -> &ToolVariables {
        &self.variables
    }

    pub fn environment(&self) -> &ResolvedEnvironment {
        &self.environment
    }
}

/// Environment overrides are flat strings; list parameters accept either a
/// flow sequence (`["a", "b"]`) or a comma-separated list.
fn coerce_override(kind: ParameterKind, raw: &str) -> ParamValue {
    if !kind.is_list() {
        return ParamValue::scalar(raw);
    }

    let trimmed = raw.trim();
    if trimmed.starts_with('[')
        && let Ok(Value::Sequence(items)) = serde_yaml::from_str::<Value>(trimmed)
        && let Some(items) = items.iter().map(scalar_text).collect::<Option<Vec<_>>>()
    {
        return ParamValue::List(items);
    }

    ParamValue::List(
        trimmed
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
