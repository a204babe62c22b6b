use std::env;
use std::path::PathBuf;
use tracing::warn;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub prompt: String,
    /// Nesting limit for eval, past it evaluation fails instead of
    /// overflowing the stack.
    pub max_depth: usize,
    pub history_file: Option<PathBuf>,
    pub history_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config{
            prompt: format!("lisp> "),
            max_depth: 512,
            history_file: dirs::home_dir().map(|home| home.join(".lispcalc_history")),
            history_size: 1000,
        }
    }
}

impl Config {
    /// Defaults overridden by LISPCALC_PROMPT, LISPCALC_MAX_DEPTH and
    /// LISPCALC_HISTORY (set it empty to disable history).
    pub fn from_env() -> Self {
        Config::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Self where F: Fn(&str) -> Option<String> {
        let mut config = Config::default();
        if let Some(prompt) = var("LISPCALC_PROMPT") {
            config.prompt = prompt;
        }
        if let Some(depth) = var("LISPCALC_MAX_DEPTH") {
            match depth.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.max_depth = n,
                _ => warn!(value = depth.as_str(), "ignoring bad LISPCALC_MAX_DEPTH"),
            }
        }
        if let Some(history) = var("LISPCALC_HISTORY") {
            config.history_file = match history.trim() {
                "" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter()
            .map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.prompt, "lisp> ");
        assert_eq!(config.max_depth, 512);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("LISPCALC_PROMPT", "~> "),
            ("LISPCALC_MAX_DEPTH", "64"),
            ("LISPCALC_HISTORY", "/tmp/hist"),
        ]));
        assert_eq!(config.prompt, "~> ");
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.history_file, Some(PathBuf::from("/tmp/hist")));
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let config = Config::from_vars(vars(&[
            ("LISPCALC_MAX_DEPTH", "lots"),
            ("LISPCALC_HISTORY", ""),
        ]));
        assert_eq!(config.max_depth, 512);
        assert_eq!(config.history_file, None);
    }
}
