//! Configuration management

use crate::error::{ErrorContext, MarginaliaError, MarginaliaResult};
use crate::logging::LoggingConfig;
use crate::types::{MarginaliaConfig, ServerConfig, UsernameConfig};

use std::collections::HashSet;
use std::path::Path;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for UsernameConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 15,
            blacklist_path: None,
        }
    }
}

impl Default for MarginaliaConfig {
    fn default() -> Self {
        Self {
            authority: "localhost".to_string(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            username: UsernameConfig::default(),
            users: Vec::new(),
        }
    }
}

impl MarginaliaConfig {
    /// Load configuration from a TOML file and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> MarginaliaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| MarginaliaError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> MarginaliaResult<Self> {
        let config: MarginaliaConfig =
            toml::from_str(content).map_err(|e| MarginaliaError::Config {
                message: format!("Failed to parse config: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config")
                    .with_operation("parse_toml")
                    .with_suggestion("Check TOML syntax in config file"),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> MarginaliaResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| MarginaliaError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| MarginaliaError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> MarginaliaResult<()> {
        if self.authority.trim().is_empty() {
            return Err(Self::invalid(
                "authority must not be empty",
                "Set authority to the domain used in account identifiers",
            ));
        }

        if self.username.min_length == 0 {
            return Err(Self::invalid(
                "username.min_length must be greater than 0",
                "Set username.min_length to a positive value",
            ));
        }

        if self.username.min_length > self.username.max_length {
            return Err(Self::invalid(
                "username.min_length must not exceed username.max_length",
                "Lower username.min_length or raise username.max_length",
            ));
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.username.to_lowercase()) {
                return Err(MarginaliaError::Config {
                    message: format!("Duplicate user '{}'", user.username),
                    source: None,
                    context: ErrorContext::new("config")
                        .with_operation("validate")
                        .with_metadata("username", &user.username)
                        .with_suggestion("Usernames are compared case-insensitively"),
                });
            }
        }

        Ok(())
    }

    fn invalid(message: &str, suggestion: &str) -> MarginaliaError {
        MarginaliaError::Config {
            message: message.to_string(),
            source: None,
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion(suggestion),
        }
    }
}
