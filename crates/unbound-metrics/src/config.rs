use unbound_common::error::{Result, UnboundError};

pub const NAMESPACE_ENV: &str = "UNBOUND_EXPORTER_NAMESPACE";
pub const DEFAULT_NAMESPACE: &str = "unbound";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    pub namespace: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl ExporterConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let namespace = lookup(NAMESPACE_ENV)
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        validate_namespace(&namespace)?;
        Ok(Self { namespace })
    }
}

fn validate_namespace(namespace: &str) -> Result<()> {
    let mut chars = namespace.chars();
    let valid = match chars.next() {
        None => true,
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
    };

    if valid {
        return Ok(());
    }

    Err(UnboundError::InvalidConfig(format!(
        "{NAMESPACE_ENV} must match [a-zA-Z_][a-zA-Z0-9_]*, got {namespace:?}"
    )))
}
