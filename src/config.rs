use std::collections::HashMap;

pub const CHECKER_ENV: &str = "TSBUNDLE_CHECKER";
pub const LOG_ENV: &str = "TSBUNDLE_LOG";

pub const DEFAULT_CHECKER: &str = "deno check";
pub const DEFAULT_LOG_FILTER: &str = "tsbundle=info";

/// Command line used to type-check the entry file. The entry path is
/// appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CheckerCommand {
    /// Split a whitespace-separated command line. Returns `None` for blank input.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Default for CheckerCommand {
    fn default() -> Self {
        Self {
            program: "deno".to_string(),
            args: vec!["check".to_string()],
        }
    }
}

/// Process-level settings that do not come from the command line
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub checker: CheckerCommand,
    pub log_filter: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            checker: CheckerCommand::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ToolchainConfig {
    pub fn from_env() -> Self {
        // Only our own variables are read; others may not be valid UTF-8.
        let vars: HashMap<String, String> = [CHECKER_ENV, LOG_ENV]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        Self::from_vars(&vars)
    }

    /// Environment values override defaults; blank values are ignored.
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let mut config = Self::default();

        if let Some(checker) = vars.get(CHECKER_ENV).and_then(|v| CheckerCommand::parse(v)) {
            config.checker = checker;
        }

        if let Some(filter) = vars.get(LOG_ENV).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            config.log_filter = filter.to_string();
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ToolchainConfig::from_vars(&HashMap::new());
        assert_eq!(config.checker, CheckerCommand::parse(DEFAULT_CHECKER).unwrap());
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_checker_override() {
        let config = ToolchainConfig::from_vars(&vars(&[(CHECKER_ENV, "tsc --noEmit  --strict")]));
        assert_eq!(config.checker.program, "tsc");
        assert_eq!(config.checker.args, vec!["--noEmit", "--strict"]);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = ToolchainConfig::from_vars(&vars(&[(CHECKER_ENV, "   "), (LOG_ENV, "")]));
        assert_eq!(config.checker, CheckerCommand::default());
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[cfg(unix)]
    #[test]
    fn test_from_env_ignores_foreign_non_utf8_variables() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var("TSBUNDLE_TEST_NON_UTF8", OsStr::from_bytes(b"\xff\xfe"));
        let result = std::panic::catch_unwind(ToolchainConfig::from_env);
        std::env::remove_var("TSBUNDLE_TEST_NON_UTF8");

        let config = result.expect("from_env must not panic");
        assert!(!config.log_filter.is_empty());
    }
}
