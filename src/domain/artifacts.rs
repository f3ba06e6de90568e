//! Records recovered from the external tools' output artifacts.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Outcome of reading an artifact file that may legitimately not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLoad<T> {
    Missing,
    Loaded(T),
    Corrupt(String),
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    builds: Vec<ManifestBuild>,
    #[serde(default)]
    last_run_uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ManifestBuild {
    artifact_id: String,
    #[serde(default)]
    packer_run_uuid: Option<String>,
    /// Free-form user data; only `drone_deployment_id` is read.
    #[serde(default)]
    custom_data: BTreeMap<String, Value>,
}

/// What the image builder's manifest says about the last build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifactRecord {
    pub new_build: bool,
    pub server_ami: String,
    pub deployment_id: String,
    /// Parse failure of a manifest that exists.
    pub corrupt: Option<String>,
}

impl Default for BuildArtifactRecord {
    fn default() -> Self {
        Self::new_build()
    }
}

impl BuildArtifactRecord {
    /// No manifest yet.
    pub fn new_build() -> Self {
        Self {
            new_build: true,
            server_ami: String::new(),
            deployment_id: String::new(),
            corrupt: None,
        }
    }

    pub fn from_load(load: ArtifactLoad<String>) -> Self {
        match load {
            ArtifactLoad::Missing => Self::new_build(),
            ArtifactLoad::Loaded(text) => {
                Self::from_manifest(&text).unwrap_or_else(|details| Self::corrupt(details))
            }
            ArtifactLoad::Corrupt(details) => Self::corrupt(details),
        }
    }

    fn corrupt(details: String) -> Self {
        Self { corrupt: Some(details), ..Self::new_build() }
    }

    /// Parse `manifest.json`.
    ///
    /// The build matching `last_run_uuid` is used, falling back to the last
    /// build listed. `artifact_id` has the form `region:ami-id`.
    pub fn from_manifest(text: &str) -> Result<Self, String> {
        let manifest: Manifest = serde_json::from_str(text).map_err(|err| err.to_string())?;

        let build = manifest
            .last_run_uuid
            .as_deref()
            .and_then(|uuid| {
                manifest.builds.iter().find(|b| b.packer_run_uuid.as_deref() == Some(uuid))
            })
            .or_else(|| manifest.builds.last())
            .ok_or_else(|| "manifest lists no builds".to_string())?;

        let server_ami = match build.artifact_id.split_once(':') {
            Some((_, ami)) if !ami.is_empty() => ami.split(',').next().unwrap_or(ami).to_string(),
            _ => {
                return Err(format!(
                    "artifact_id '{}' is not in region:image-id form",
                    build.artifact_id
                ));
            }
        };

        Ok(Self {
            new_build: false,
            server_ami,
            deployment_id: build
                .custom_data
                .get("drone_deployment_id")
                .map(plain_text)
                .unwrap_or_default(),
            corrupt: None,
        })
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// What the provisioner's state file says about deployed resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisioningStateRecord {
    pub has_state: bool,
    pub state: Option<Value>,
    pub builder_role_arn: String,
    pub corrupt: Option<String>,
}

/// Output key holding the role assumed by the image builder.
pub const BUILDER_ROLE_OUTPUT: &str = "DRONE_BUILDER_ROLE_ARN";

impl ProvisioningStateRecord {
    pub fn from_load(load: ArtifactLoad<String>) -> Self {
        match load {
            ArtifactLoad::Missing => Self::default(),
            ArtifactLoad::Loaded(text) => Self::from_state(&text)
                .unwrap_or_else(|details| Self { corrupt: Some(details), ..Self::default() }),
            ArtifactLoad::Corrupt(details) => Self { corrupt: Some(details), ..Self::default() },
        }
    }

    /// Parse `terraform.tfstate`. A missing output is an empty string.
    pub fn from_state(text: &str) -> Result<Self, String> {
        let state: Value = serde_json::from_str(text).map_err(|err| err.to_string())?;
        if !state.is_object() {
            return Err("state file is not a JSON object".into());
        }

        let builder_role_arn = output_value(&state, BUILDER_ROLE_OUTPUT).unwrap_or_default();
        Ok(Self { has_state: true, state: Some(state), builder_role_arn, corrupt: None })
    }

    /// Number of managed resources recorded in the state.
    pub fn resource_count(&self) -> usize {
        let Some(state) = &self.state else {
            return 0;
        };

        let module_resources: usize = state
            .get("modules")
            .and_then(Value::as_array)
            .map(|modules| {
                modules
                    .iter()
                    .filter_map(|module| module.get("resources").and_then(Value::as_object))
                    .map(|resources| resources.len())
                    .sum()
            })
            .unwrap_or(0);

        let top_level = state.get("resources").and_then(Value::as_array).map_or(0, Vec::len);
        module_resources + top_level
    }

    pub fn is_deployed(&self) -> bool {
        self.has_state && self.resource_count() > 0
    }
}

/// `modules[0].outputs.<key>.value`, or the root `outputs` of newer state formats.
fn output_value(state: &Value, key: &str) -> Option<String> {
    let legacy = format!("/modules/0/outputs/{}/value", key);
    let current = format!("/outputs/{}/value", key);
    state
        .pointer(&legacy)
        .or_else(|| state.pointer(&current))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
  "builds": [
    {
      "name": "drone-server-ami",
      "builder_type": "amazon-ebs",
      "build_time": 1564347734,
      "files": null,
      "artifact_id": "us-east-1:ami-0edf58c4682eddea0",
      "packer_run_uuid": "adc2e76b-0ecd-465f-7cdf-4fbb61473a7d",
      "custom_data": {
        "builder_arn": "",
        "drone_deployment_id": "fb8b32847f4f9569d9094d966af7a0cb"
      }
    }
  ],
  "last_run_uuid": "adc2e76b-0ecd-465f-7cdf-4fbb61473a7d"
}"#;

    const STATE: &str = r#"{
  "version": 3,
  "terraform_version": "0.11.14",
  "modules": [
    {
      "path": ["root"],
      "outputs": {
        "DRONE_BUILDER_ROLE_ARN": {
          "sensitive": false,
          "type": "string",
          "value": "arn:aws:iam::1234567890:role/x"
        }
      },
      "resources": {
        "aws_iam_role.drone-builder": {},
        "aws_iam_instance_profile.drone-builder": {}
      }
    }
  ]
}"#;

    #[test]
    fn missing_manifest_is_a_new_build() {
        let record = BuildArtifactRecord::from_load(ArtifactLoad::Missing);
        assert!(record.new_build);
        assert_eq!(record.server_ami, "");
        assert_eq!(record.deployment_id, "");
        assert!(record.corrupt.is_none());
    }

    #[test]
    fn manifest_yields_ami_and_deployment_id() {
        let record = BuildArtifactRecord::from_manifest(MANIFEST).unwrap();
        assert!(!record.new_build);
        assert_eq!(record.server_ami, "ami-0edf58c4682eddea0");
        assert_eq!(record.deployment_id, "fb8b32847f4f9569d9094d966af7a0cb");
    }

    #[test]
    fn last_run_build_is_preferred() {
        let manifest = r#"{
  "builds": [
    {"artifact_id": "us-east-1:ami-new", "packer_run_uuid": "b", "custom_data": {"drone_deployment_id": "two"}},
    {"artifact_id": "us-east-1:ami-old", "packer_run_uuid": "a", "custom_data": {"drone_deployment_id": "one"}}
  ],
  "last_run_uuid": "b"
}"#;
        let record = BuildArtifactRecord::from_manifest(manifest).unwrap();
        assert_eq!(record.server_ami, "ami-new");
        assert_eq!(record.deployment_id, "two");
    }

    #[test]
    fn last_build_is_used_without_run_uuid() {
        let manifest = r#"{"builds": [
            {"artifact_id": "us-east-1:ami-1"},
            {"artifact_id": "us-east-1:ami-2"}
        ]}"#;
        let record = BuildArtifactRecord::from_manifest(manifest).unwrap();
        assert_eq!(record.server_ami, "ami-2");
        assert_eq!(record.deployment_id, "");
    }

    #[test]
    fn non_string_custom_data_is_tolerated() {
        let manifest = r#"{"builds": [{
            "artifact_id": "us-east-1:ami-3",
            "custom_data": {"drone_deployment_id": "abc", "build_number": 42, "tags": {"team": "ci"}}
        }]}"#;
        let record = BuildArtifactRecord::from_manifest(manifest).unwrap();
        assert_eq!(record.server_ami, "ami-3");
        assert_eq!(record.deployment_id, "abc");
        assert!(record.corrupt.is_none());
    }

    #[test]
    fn garbage_manifest_is_corrupt_not_fatal() {
        let record = BuildArtifactRecord::from_load(ArtifactLoad::Loaded("}garbilygook}".into()));
        assert!(record.new_build);
        assert_eq!(record.server_ami, "");
        assert!(record.corrupt.is_some());
    }

    #[test]
    fn malformed_artifact_id_is_rejected() {
        let err = BuildArtifactRecord::from_manifest(r#"{"builds": [{"artifact_id": "nope"}]}"#)
            .unwrap_err();
        assert!(err.contains("region:image-id"));
    }

    #[test]
    fn empty_build_list_is_rejected() {
        assert!(BuildArtifactRecord::from_manifest(r#"{"builds": []}"#).is_err());
    }

    #[test]
    fn missing_state_has_no_outputs() {
        let record = ProvisioningStateRecord::from_load(ArtifactLoad::Missing);
        assert!(!record.has_state);
        assert_eq!(record.builder_role_arn, "");
        assert!(!record.is_deployed());
    }

    #[test]
    fn state_yields_builder_role_arn() {
        let record = ProvisioningStateRecord::from_state(STATE).unwrap();
        assert!(record.has_state);
        assert_eq!(record.builder_role_arn, "arn:aws:iam::1234567890:role/x");
        assert_eq!(record.resource_count(), 2);
        assert!(record.is_deployed());
    }

    #[test]
    fn state_without_output_resolves_empty() {
        let record = ProvisioningStateRecord::from_state(r#"{"version": 3, "modules": []}"#).unwrap();
        assert!(record.has_state);
        assert_eq!(record.builder_role_arn, "");
        assert!(!record.is_deployed());
    }

    #[test]
    fn root_outputs_are_read_too() {
        let state = r#"{"version": 4, "outputs": {"DRONE_BUILDER_ROLE_ARN": {"value": "arn:new"}}, "resources": [{}]}"#;
        let record = ProvisioningStateRecord::from_state(state).unwrap();
        assert_eq!(record.builder_role_arn, "arn:new");
        assert_eq!(record.resource_count(), 1);
    }

    #[test]
    fn corrupt_state_is_reported() {
        let record = ProvisioningStateRecord::from_load(ArtifactLoad::Loaded("{nope".into()));
        assert!(!record.has_state);
        assert!(record.corrupt.is_some());
    }
}
