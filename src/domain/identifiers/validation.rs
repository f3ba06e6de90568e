/// Validates a deployment directory name.
///
/// Checks:
/// - Non-empty
/// - No path separators (/, \)
/// - Does not start with '.' (rules out "." and "..")
/// - Characters are alphanumeric, '-', '_', or '.'
pub fn validate_directory_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') {
        return false;
    }
    if name.contains('/') || name.contains('\\') {
        return false;
    }
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

#[macro_export]
macro_rules! impl_validated_name {
    ($name:ident, $err_variant:path) => {
        impl $name {
            /// Validate and create a new instance.
            pub fn new(name: &str) -> Result<Self, $crate::domain::AppError> {
                if $crate::domain::identifiers::validation::validate_directory_name(name) {
                    Ok(Self(name.to_string()))
                } else {
                    Err($err_variant(name.to_string()))
                }
            }

            /// Return the inner string value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}
