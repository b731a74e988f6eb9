use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use security::{AuthPolicy, BearerAuthorizer};
use smshook_cipher::CipherConfig;
use smshook_core::CiphertextLogging;

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

#[derive(Clone)]
pub struct IngressConfig {
    pub addr: SocketAddr,
    pub signing_key: Option<String>,
    pub require_auth: bool,
    pub cipher: CipherConfig,
    pub log_ciphertext: bool,
    pub shutdown_grace: Duration,
}

impl fmt::Debug for IngressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngressConfig")
            .field("addr", &self.addr)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .field("require_auth", &self.require_auth)
            .field("cipher", &self.cipher)
            .field("log_ciphertext", &self.log_ciphertext)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish()
    }
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            signing_key: None,
            require_auth: false,
            cipher: CipherConfig::default(),
            log_ciphertext: false,
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }
}

impl IngressConfig {
    pub fn from_env() -> Result<Self> {
        let bind = std::env::var("BIND").unwrap_or_else(|_| DEFAULT_BIND.into());
        let addr: SocketAddr = bind
            .parse()
            .with_context(|| format!("invalid BIND address {bind}"))?;

        let signing_key = non_empty_env("HTTPSMS_SIGNING_KEY");
        let require_auth = env_flag("HTTPSMS_REQUIRE_AUTH");
        if require_auth && signing_key.is_none() {
            bail!("HTTPSMS_REQUIRE_AUTH is set but HTTPSMS_SIGNING_KEY is missing");
        }

        let shutdown_grace = match non_empty_env("SHUTDOWN_GRACE_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .with_context(|| format!("invalid SHUTDOWN_GRACE_SECS {raw}"))?,
            ),
            None => Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        };

        Ok(Self {
            addr,
            signing_key,
            require_auth,
            cipher: CipherConfig {
                encryption_key: non_empty_env("HTTPSMS_ENCRYPTION_KEY"),
            },
            log_ciphertext: env_flag("LOG_CIPHERTEXT"),
            shutdown_grace,
        })
    }

    pub fn auth_policy(&self) -> AuthPolicy {
        AuthPolicy::new(
            self.signing_key.as_deref().map(BearerAuthorizer::from_secret),
            self.require_auth,
        )
    }

    pub fn ciphertext_logging(&self) -> CiphertextLogging {
        CiphertextLogging::from_flag(self.log_ciphertext)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
