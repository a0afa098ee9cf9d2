//! Environment variable expansion in the configuration file

#[cfg(test)]
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::ConfigurationError;

static ENV_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{env\.([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("env reference pattern is valid")
});

/// Replaces `${env.NAME}` and `${env.NAME:-default}` in every string value.
#[derive(Clone, Debug, Default)]
pub(crate) struct Expansion {
    #[cfg(test)]
    mocked_env_vars: HashMap<String, String>,
}

impl Expansion {
    pub(crate) fn from_env() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn mocked(mocked_env_vars: HashMap<String, String>) -> Self {
        Self { mocked_env_vars }
    }

    fn var(&self, name: &str) -> Option<String> {
        #[cfg(test)]
        return self.mocked_env_vars.get(name).cloned();
        #[cfg(not(test))]
        std::env::var(name).ok()
    }

    pub(crate) fn expand(&self, value: Value) -> Result<Value, ConfigurationError> {
        Ok(match value {
            Value::String(raw) => Value::String(self.expand_str(&raw)?),
            Value::Array(values) => Value::Array(
                values
                    .into_iter()
                    .map(|value| self.expand(value))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| Ok((key, self.expand(value)?)))
                    .collect::<Result<_, ConfigurationError>>()?,
            ),
            other => other,
        })
    }

    fn expand_str(&self, raw: &str) -> Result<String, ConfigurationError> {
        let mut expanded = String::with_capacity(raw.len());
        let mut last = 0;
        for captures in ENV_REFERENCE.captures_iter(raw) {
            let (Some(reference), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let value = match (self.var(name.as_str()), captures.get(2)) {
                (Some(value), _) => value,
                (None, Some(default)) => default.as_str().to_string(),
                (None, None) => {
                    return Err(ConfigurationError::UnknownEnvironmentVariable(
                        name.as_str().to_string(),
                    ))
                }
            };
            expanded.push_str(&raw[last..reference.start()]);
            expanded.push_str(&value);
            last = reference.end();
        }
        expanded.push_str(&raw[last..]);
        Ok(expanded)
    }
}
