use std::path::PathBuf;

use crate::error::ProvoloneError;

/// Credentials the bot cannot start without.
pub const REQUIRED_VARS: &[&str] = &["FACEBOOK_ACCESS_TOKEN", "FACEBOOK_PAGE_ID"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One full cycle, then exit. Suited to cron and CI runners.
    Single,
    /// One full cycle, then keep running on fixed intervals.
    Scheduled,
}

impl std::str::FromStr for RunMode {
    type Err = ProvoloneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(RunMode::Single),
            "schedule" | "scheduled" => Ok(RunMode::Scheduled),
            other => Err(ProvoloneError::Config(format!(
                "RUN_MODE must be 'single' or 'schedule', got '{other}'"
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Image provider keys are optional: a provider without a key is skipped.
#[derive(Debug, Clone)]
pub struct Config {
    // Platform
    pub facebook_access_token: String,
    pub facebook_page_id: String,

    // Image providers, in fallback order
    pub openai_api_key: Option<String>,
    pub stability_api_key: Option<String>,
    pub replicate_api_token: Option<String>,

    // Runtime
    pub data_dir: PathBuf,
    pub custom_message: Option<String>,
    pub run_mode: RunMode,
    pub generate_images: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ProvoloneError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ProvoloneError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ProvoloneError::AuthenticationUnavailable(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let run_mode = match get("RUN_MODE") {
            Some(mode) => mode.parse()?,
            None => RunMode::Single,
        };

        let generate_images = match get("GENERATE_IMAGES") {
            Some(flag) => flag.parse::<bool>().map_err(|_| {
                ProvoloneError::Config(format!("GENERATE_IMAGES must be true or false, got '{flag}'"))
            })?,
            None => true,
        };

        Ok(Self {
            facebook_access_token: get("FACEBOOK_ACCESS_TOKEN").unwrap_or_default(),
            facebook_page_id: get("FACEBOOK_PAGE_ID").unwrap_or_default(),
            openai_api_key: get("OPENAI_API_KEY"),
            stability_api_key: get("STABILITY_API_KEY"),
            replicate_api_token: get("REPLICATE_API_TOKEN"),
            data_dir: PathBuf::from(get("DATA_DIR").unwrap_or_else(|| "data".to_string())),
            custom_message: lookup("CUSTOM_MESSAGE").filter(|m| !m.trim().is_empty()),
            run_mode,
            generate_images,
        })
    }

    pub fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.char_indices().nth(5).map(|(i, _)| i).unwrap_or(val.len());
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) => preview(v),
                None => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  FACEBOOK_ACCESS_TOKEN: {}", preview(&self.facebook_access_token));
        tracing::info!("  FACEBOOK_PAGE_ID: {}", self.facebook_page_id);
        tracing::info!("  OPENAI_API_KEY: {}", preview_opt(&self.openai_api_key));
        tracing::info!("  STABILITY_API_KEY: {}", preview_opt(&self.stability_api_key));
        tracing::info!("  REPLICATE_API_TOKEN: {}", preview_opt(&self.replicate_api_token));
        tracing::info!("  DATA_DIR: {}", self.data_dir.display());
        tracing::info!("  RUN_MODE: {:?}", self.run_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_credentials_are_fatal_and_all_listed() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        match err {
            ProvoloneError::AuthenticationUnavailable(msg) => {
                assert!(msg.contains("FACEBOOK_ACCESS_TOKEN"));
                assert!(msg.contains("FACEBOOK_PAGE_ID"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[
            ("FACEBOOK_ACCESS_TOKEN", "  "),
            ("FACEBOOK_PAGE_ID", "123"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ProvoloneError::AuthenticationUnavailable(_)));
    }

    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        let config = Config::from_lookup(lookup(&[
            ("FACEBOOK_ACCESS_TOKEN", "token"),
            ("FACEBOOK_PAGE_ID", "123"),
        ]))
        .unwrap();
        assert_eq!(config.run_mode, RunMode::Single);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.generate_images);
        assert!(config.openai_api_key.is_none());
        assert!(config.custom_message.is_none());
    }

    #[test]
    fn optional_vars_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("FACEBOOK_ACCESS_TOKEN", "token"),
            ("FACEBOOK_PAGE_ID", "123"),
            ("REPLICATE_API_TOKEN", "r8_abc"),
            ("RUN_MODE", "schedule"),
            ("GENERATE_IMAGES", "false"),
            ("CUSTOM_MESSAGE", "Happy National Sandwich Day!"),
            ("DATA_DIR", "/var/lib/provolone"),
        ]))
        .unwrap();
        assert_eq!(config.replicate_api_token.as_deref(), Some("r8_abc"));
        assert_eq!(config.run_mode, RunMode::Scheduled);
        assert!(!config.generate_images);
        assert_eq!(config.custom_message.as_deref(), Some("Happy National Sandwich Day!"));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/provolone"));
    }

    #[test]
    fn unknown_run_mode_is_config_error() {
        let err = Config::from_lookup(lookup(&[
            ("FACEBOOK_ACCESS_TOKEN", "token"),
            ("FACEBOOK_PAGE_ID", "123"),
            ("RUN_MODE", "sometimes"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ProvoloneError::Config(_)));
    }
}
