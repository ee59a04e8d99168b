//! Environment variable expansion for configuration strings.
//!
//! Only braced references are expanded:
//! - `${VAR}` expands to the value of VAR, an error if unset
//! - `${VAR:-default}` expands to VAR if set, otherwise to `default`
//!
//! Any other `$` is literal. Confluence API tokens and passwords may
//! contain `$`, and an unbraced `$name` inside one must not be looked up.

use std::sync::LazyLock;

use regex::Regex;

use crate::ConfigError;

/// Regex to match one `${...}` reference.
static ENV_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{[^}]*\}").unwrap());

/// Expand `${...}` references in a string, leaving everything else as is.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut last = 0;

    for reference in ENV_REF_RE.find_iter(value) {
        expanded.push_str(&value[last..reference.start()]);
        expanded.push_str(&expand_reference(reference.as_str(), field)?);
        last = reference.end();
    }
    expanded.push_str(&value[last..]);

    Ok(expanded)
}

/// Expand a single `${...}` reference.
fn expand_reference(reference: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(reference, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Variable that was referenced but is not set.
struct LookupError {
    var_name: String,
}
