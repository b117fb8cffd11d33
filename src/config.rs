use crate::{
    data::search::SearchMode,
    error::{BadEnvVarSnafu, ParseTimeoutSnafu, RosterError, RosterResult},
};
use dotenvy::var;
use reqwest::Url;
use snafu::ResultExt;
use std::{env::VarError, sync::Arc, time::Duration};

pub const DEFAULT_RECORD_SERVICE_URL: &str = "https://studentapi-d9xy.onrender.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    record_service: Arc<RecordServiceConfig>,
    search_mode: SearchMode,
    server_ip: String,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        let search_mode = match optional_env_var("ROSTER_SEARCH_MODE")? {
            Some(mode) => mode.parse()?,
            None => SearchMode::default(),
        };
        let server_ip =
            optional_env_var("ROSTER_SERVER_IP")?.unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());

        Ok(Self {
            record_service: Arc::new(RecordServiceConfig::new()?),
            search_mode,
            server_ip,
        })
    }

    pub fn from_parts(record_service: RecordServiceConfig, search_mode: SearchMode) -> Self {
        Self {
            record_service: Arc::new(record_service),
            search_mode,
            server_ip: DEFAULT_SERVER_IP.to_string(),
        }
    }

    pub fn record_service(&self) -> Arc<RecordServiceConfig> {
        self.record_service.clone()
    }

    pub const fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }
}

#[derive(Debug)]
pub struct RecordServiceConfig {
    base_url: Url,
    timeout: Duration,
}

impl RecordServiceConfig {
    pub fn new() -> RosterResult<Self> {
        let base_url = optional_env_var("RECORD_SERVICE_URL")?
            .unwrap_or_else(|| DEFAULT_RECORD_SERVICE_URL.to_string());
        let timeout = match optional_env_var("RECORD_SERVICE_TIMEOUT_SECS")? {
            Some(secs) => Duration::from_secs(secs.trim().parse().context(ParseTimeoutSnafu)?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Self::from_parts(&base_url, timeout)
    }

    pub fn from_parts(base_url: &str, timeout: Duration) -> RosterResult<Self> {
        let bad_url = |reason: &str| RosterError::ParseBaseUrl {
            original: base_url.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(base_url.trim()).map_err(|e| bad_url(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(bad_url("expected an http(s) base URL"));
        }

        Ok(Self {
            base_url: parsed,
            timeout,
        })
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn optional_env_var(name: &'static str) -> RosterResult<Option<String>> {
    match var(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => {
            debug!(name, "env var not set, using default");
            Ok(None)
        }
        Err(source) => Err(source).context(BadEnvVarSnafu { name }),
    }
}
