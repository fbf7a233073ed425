use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Connection configuration for the Redis instance backing the work queue.
///
/// This intentionally does not implement [`Serialize`] to avoid accidentally
/// leaking the password into serialized forms.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QueueConfig {
    /// Hostname or IP address of the Redis server.
    pub host: String,
    /// Port of the Redis server.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Optional username for ACL-enabled servers.
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<SecretString>,
    /// Optional database index to select after connecting.
    pub database: Option<u8>,
}

/// Same as [`QueueConfig`] but without secrets, safe to serialize.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QueueConfigWithoutSecrets {
    /// Hostname or IP address of the Redis server.
    pub host: String,
    /// Port of the Redis server.
    pub port: u16,
    /// Optional username for ACL-enabled servers.
    pub username: Option<String>,
    /// Optional database index to select after connecting.
    pub database: Option<u8>,
}

impl From<QueueConfig> for QueueConfigWithoutSecrets {
    fn from(value: QueueConfig) -> Self {
        QueueConfigWithoutSecrets {
            host: value.host,
            port: value.port,
            username: value.username,
            database: value.database,
        }
    }
}

impl QueueConfig {
    /// Returns the password as a plain string, if one is configured.
    pub fn exposed_password(&self) -> Option<String> {
        self.password
            .as_ref()
            .map(|password| password.expose_secret().to_owned())
    }
}

fn default_port() -> u16 {
    6379
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_secrets_form_drops_the_password() {
        let config = QueueConfig {
            host: "127.0.0.1".to_string(),
            port: 6379,
            username: Some("agent".to_string()),
            password: Some(SecretString::new("hunter2".to_string())),
            database: Some(2),
        };

        let safe: QueueConfigWithoutSecrets = config.into();
        let serialized = serde_json::to_string(&safe).unwrap();

        assert!(!serialized.contains("hunter2"));
        assert!(serialized.contains("127.0.0.1"));
    }

    #[test]
    fn password_is_exposed_only_on_request() {
        let config = QueueConfig {
            host: "127.0.0.1".to_string(),
            port: 6379,
            username: None,
            password: Some(SecretString::new("hunter2".to_string())),
            database: None,
        };

        assert_eq!(config.exposed_password().as_deref(), Some("hunter2"));
        // The debug rendering must not leak the secret.
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
