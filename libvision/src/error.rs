//! Error types for the Vision site shell

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VisionError>;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Site configuration could not be loaded: {0}")]
    Load(#[from] ConfigLoadError),

    #[error("Deployment error: {0}")]
    Deploy(#[from] DeployError),

    #[error("Routing error: {0}")]
    Route(#[from] RouteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl VisionError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            VisionError::InvalidInput(_) => 3,
            VisionError::Config(_) => 2,
            VisionError::Load(_) => 1,
            VisionError::Deploy(_) => 1,
            VisionError::Route(_) => 1,
            VisionError::Io(_) => 1,
        }
    }
}

/// Operational configuration errors (the server's own `config.toml`)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Failure to produce the site configuration.
///
/// This is the only failure that reaches the view state. Its details are
/// logged; visitors only ever see the generic configuration error message.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse site configuration: {0}")]
    Parse(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("invalid site configuration: {0}")]
    Invalid(String),
}

impl From<reqwest::Error> for ConfigLoadError {
    fn from(err: reqwest::Error) -> Self {
        ConfigLoadError::Http(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("redirect loop while resolving {path} (gave up after {hops} hops)")]
    RedirectLoop { path: String, hops: usize },

    #[error("no route matches {0}")]
    NoMatch(String),
}

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_yaml::Error),

    #[error("Server '{name}' not found in manifest (available: {available})")]
    UnknownServer { name: String, available: String },

    #[error("Unknown server type: {0}")]
    UnknownServerType(String),

    #[error("Pre-deployment check failed: {0}")]
    CheckFailed(String),

    #[error("Command failed: {command} ({reason})")]
    CommandFailed { command: String, reason: String },

    #[error("Health check failed: {0}")]
    HealthCheck(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = VisionError::InvalidInput("unknown mode".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_config_error() {
        let error = VisionError::Config(ConfigError::MissingField("site.source".to_string()));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_deploy_error() {
        let error = VisionError::Deploy(DeployError::UnknownServerType("ftp".to_string()));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_load() {
        let error = VisionError::Load(ConfigLoadError::Http("network timeout".to_string()));
        assert_eq!(
            error.to_string(),
            "Site configuration could not be loaded: request failed: network timeout"
        );
    }

    #[test]
    fn test_error_message_formatting_unknown_server() {
        let error = DeployError::UnknownServer {
            name: "qa".to_string(),
            available: "production, staging".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Server 'qa' not found in manifest (available: production, staging)"
        );
    }

    #[test]
    fn test_error_message_formatting_status() {
        let error = ConfigLoadError::Status {
            url: "https://example.org/site.json".to_string(),
            status: 502,
        };
        assert_eq!(
            error.to_string(),
            "unexpected HTTP status 502 from https://example.org/site.json"
        );
    }

    #[test]
    fn test_error_conversion_from_config_error() {
        let config_error = ConfigError::MissingField("test".to_string());
        let vision_error: VisionError = config_error.into();

        match vision_error {
            VisionError::Config(_) => {}
            _ => panic!("Expected VisionError::Config"),
        }
    }

    #[test]
    fn test_error_conversion_from_route_error() {
        let route_error = RouteError::RedirectLoop {
            path: "/a".to_string(),
            hops: 8,
        };
        let vision_error: VisionError = route_error.into();
        assert_eq!(vision_error.exit_code(), 1);
    }
}
