use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: &str = "8080";
const DEFAULT_AUTOMATION_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct Config {
    pub port: String,
    pub listen_addr: String,
    pub url_param: String,
    pub expected_value: String,
    pub target_url: String,
    pub admin_email: String,
    pub admin_password: String,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    pub interpreter: PathBuf,
    pub script_path: PathBuf,
    pub automation_timeout: Duration,
    pub automation_max_concurrency: Option<usize>,
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve every setting through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let port = var("PORT").unwrap_or_else(|| DEFAULT_PORT.into());
        let listen_addr = var("LISTEN_ADDR").unwrap_or_else(|| format!(":{port}"));

        Self {
            listen_addr,
            port,
            url_param: var("URL_PARAM").unwrap_or_default(),
            expected_value: var("EXPECTED_VALUE").unwrap_or_default(),
            target_url: var("OVERLEAF_URL").unwrap_or_default(),
            admin_email: var("ADMIN_EMAIL").unwrap_or_default(),
            admin_password: var("ADMIN_PASSWORD").unwrap_or_default(),
            templates_dir: var("TEMPLATES_DIR")
                .map_or_else(|| PathBuf::from("templates"), PathBuf::from),
            static_dir: var("STATIC_DIR")
                .map_or_else(|| PathBuf::from("static"), PathBuf::from),
            interpreter: var("NODE_PATH")
                .map_or_else(|| PathBuf::from("node"), PathBuf::from),
            script_path: var("SCRIPT_PATH")
                .map_or_else(|| PathBuf::from("register.js"), PathBuf::from),
            automation_timeout: Duration::from_secs(
                var("AUTOMATION_TIMEOUT_SECS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_AUTOMATION_TIMEOUT_SECS),
            ),
            automation_max_concurrency: var("AUTOMATION_MAX_CONCURRENCY")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n > 0),
        }
    }

    /// Parse the listen address. A bare `:port` binds every interface.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = if self.listen_addr.starts_with(':') {
            format!("0.0.0.0{}", self.listen_addr)
        } else {
            self.listen_addr.clone()
        };
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address '{}': {e}", self.listen_addr))
    }

    /// Log settings that leave the service half-working.
    pub fn warn_on_gaps(&self) {
        if self.url_param.is_empty() {
            tracing::warn!("URL_PARAM is empty, every registration request will be forbidden");
        } else if self.expected_value.is_empty() {
            tracing::warn!(
                param = %self.url_param,
                "EXPECTED_VALUE is empty, an empty invite parameter will be accepted"
            );
        }
        if self.target_url.is_empty() {
            tracing::warn!("OVERLEAF_URL is empty, registrations will fail");
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("url_param", &self.url_param)
            .field("expected_value", &"<redacted>")
            .field("target_url", &self.target_url)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"<redacted>")
            .field("templates_dir", &self.templates_dir)
            .field("static_dir", &self.static_dir)
            .field("interpreter", &self.interpreter)
            .field("script_path", &self.script_path)
            .field("automation_timeout", &self.automation_timeout)
            .field("automation_max_concurrency", &self.automation_max_concurrency)
            .finish_non_exhaustive()
    }
}
