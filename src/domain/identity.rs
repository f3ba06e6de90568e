use std::fmt;

use crate::domain::parameters::PRODUCT_PREFIX;

/// Name under which a deployment's cloud resources are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentIdentity(String);

impl DeploymentIdentity {
    /// Derive the identity from a deployment directory name.
    ///
    /// Names that already mention the product are kept as they are; anything
    /// else gets the `drone-` prefix.
    pub fn derive(directory_name: &str) -> Self {
        if directory_name.contains(PRODUCT_PREFIX) {
            Self(directory_name.to_string())
        } else {
            Self(format!("{}-{}", PRODUCT_PREFIX, directory_name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeploymentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data bucket name: `drone-data.<machine-name>.<hosted-zone>`.
///
/// `None` until both inputs are known.
pub fn data_bucket_name(machine_name: &str, hosted_zone: &str) -> Option<String> {
    if machine_name.is_empty() || hosted_zone.is_empty() {
        return None;
    }
    Some(format!("{}-data.{}.{}", PRODUCT_PREFIX, machine_name, hosted_zone))
}
