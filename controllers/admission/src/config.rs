//! Webhook configuration read from the environment

use crate::error::AdmissionError;
use std::net::SocketAddr;

const DEFAULT_WEBHOOK_ADDR: &str = "0.0.0.0:9443";

/// Certificate and key served to the API server
#[derive(Debug, Clone, PartialEq)]
pub struct TlsFiles {
    pub cert_file: String,
    pub key_file: String,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub addr: SocketAddr,
    /// `None` serves plain HTTP, for a TLS-terminating proxy in front
    pub tls: Option<TlsFiles>,
}

impl WebhookConfig {
    pub fn from_env() -> Result<Self, AdmissionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AdmissionError> {
        let addr = lookup("WEBHOOK_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WEBHOOK_ADDR.to_string());
        let addr = addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| AdmissionError::InvalidConfig(format!("WEBHOOK_ADDR {:?}: {}", addr, e)))?;

        let cert_file = lookup("TLS_CERT_FILE").filter(|v| !v.trim().is_empty());
        let key_file = lookup("TLS_KEY_FILE").filter(|v| !v.trim().is_empty());
        let tls = match (cert_file, key_file) {
            (Some(cert_file), Some(key_file)) => Some(TlsFiles { cert_file, key_file }),
            (None, None) => None,
            _ => {
                return Err(AdmissionError::InvalidConfig(
                    "TLS_CERT_FILE and TLS_KEY_FILE must be set together".to_string(),
                ));
            }
        };

        Ok(Self { addr, tls })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<WebhookConfig, AdmissionError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        WebhookConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:9443".parse::<SocketAddr>().unwrap());
        assert!(config.tls.is_none());
    }

    #[test]
    fn test_tls_files() {
        let config = config(&[
            ("WEBHOOK_ADDR", "127.0.0.1:8443"),
            ("TLS_CERT_FILE", "/certs/tls.crt"),
            ("TLS_KEY_FILE", "/certs/tls.key"),
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 8443);
        assert_eq!(
            config.tls,
            Some(TlsFiles {
                cert_file: "/certs/tls.crt".to_string(),
                key_file: "/certs/tls.key".to_string(),
            })
        );
    }

    #[test]
    fn test_rejects_half_tls_and_bad_addr() {
        assert!(matches!(
            config(&[("TLS_CERT_FILE", "/certs/tls.crt")]),
            Err(AdmissionError::InvalidConfig(_))
        ));
        assert!(matches!(config(&[("WEBHOOK_ADDR", "not-an-addr")]), Err(AdmissionError::InvalidConfig(_))));
    }
}
