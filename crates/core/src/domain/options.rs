// npm option flags

use serde::{Deserialize, Serialize};

/// Ordered `--key value` flags appended to an install command
///
/// Rendering rules:
/// - value starting with `=` is glued to the key: `("save-prefix", "=~")` -> `--save-prefix=~`
/// - empty value gives a bare flag: `("no-audit", "")` -> `--no-audit`
/// - anything else is a separate token: `("registry", "https://r")` -> `--registry https://r`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOptions {
    entries: Vec<(String, String)>,
}

impl InstallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw key/value pair, keeping insertion order
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Append a `--key=value` flag
    pub fn assign(self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        let value = format!("={}", value.as_ref());
        self.set(key, value)
    }

    /// Append a bare `--key` flag
    pub fn flag(self, key: impl Into<String>) -> Self {
        self.set(key, "")
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for (key, value) in &self.entries {
            if value.is_empty() {
                args.push(format!("--{}", key));
            } else if let Some(rest) = value.strip_prefix('=') {
                args.push(format!("--{}={}", key, rest));
            } else {
                args.push(format!("--{}", key));
                args.push(value.clone());
            }
        }
        args
    }
}

impl<K, V> FromIterator<(K, V)> for InstallOptions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Render `key=value` pairs as `--key=value` flags (manifest installs)
pub fn assignment_args(pairs: &[(String, String)]) -> Vec<String> {
    pairs
        .iter()
        .map(|(key, value)| format!("--{}={}", key, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_rules() {
        let opts = InstallOptions::new()
            .set("registry", "https://registry.example")
            .set("save-prefix", "=~")
            .flag("no-audit");

        assert_eq!(
            opts.to_args(),
            vec![
                "--registry",
                "https://registry.example",
                "--save-prefix=~",
                "--no-audit",
            ]
        );
    }

    #[test]
    fn test_assign_glues_value() {
        let opts = InstallOptions::new().assign("unsafe-perm", "true");
        assert_eq!(opts.to_args(), vec!["--unsafe-perm=true"]);
    }

    #[test]
    fn test_order_preserved_from_iter() {
        let opts: InstallOptions = vec![("b", "2"), ("a", "=1")].into_iter().collect();
        assert_eq!(opts.to_args(), vec!["--b", "2", "--a=1"]);
    }

    #[test]
    fn test_assignment_args() {
        let pairs = vec![
            ("prefix".to_string(), "/opt/app".to_string()),
            ("loglevel".to_string(), "warn".to_string()),
        ];
        assert_eq!(
            assignment_args(&pairs),
            vec!["--prefix=/opt/app", "--loglevel=warn"]
        );
        assert!(assignment_args(&[]).is_empty());
    }
}
