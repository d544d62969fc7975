use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

/// Serper's Google search endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";
/// Hard cap on results per response.
pub const MAX_RESULTS: usize = 10;
/// Outbound search request timeout unless configured otherwise.
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub llm: LLMConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub azure_openai_endpoint: Option<String>,
    pub azure_openai_api_version: String,
    pub azure_openai_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub default_model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestratorMode {
    /// LLM when credentials for the default model exist, otherwise direct.
    Auto,
    Llm,
    Direct,
}

impl std::str::FromStr for OrchestratorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "llm" => Ok(Self::Llm),
            "direct" => Ok(Self::Direct),
            other => anyhow::bail!("unknown orchestrator mode: {}", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub orchestrator: OrchestratorMode,
    pub job_title: String,
    pub company_url: String,
    pub company_objective: String,
    pub reflection: bool,
    pub max_steps: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub log_dir: Option<String>,
}

impl ServerConfig {
    /// Host and port to hand to the listener. The host may be a name
    /// (`localhost`), an IPv4 literal or a bare IPv6 literal (`::`).
    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl SearchConfig {
    /// Serper settings with defaults for everything but the key.
    pub fn with_api_key(api_key: Option<String>) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            max_results: MAX_RESULTS,
            timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl LLMConfig {
    /// Whether the provider named by `default_model` has credentials.
    pub fn has_credentials(&self) -> bool {
        match self.default_model.split_once('/').map(|(p, _)| p) {
            Some("azure") => {
                self.azure_openai_api_key.is_some() && self.azure_openai_endpoint.is_some()
            }
            _ => self.openai_api_key.is_some(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8000,
                host: "0.0.0.0".to_string(),
                cors_allowed_origins: vec!["*".to_string()],
            },
            search: SearchConfig::with_api_key(None),
            llm: LLMConfig {
                azure_openai_endpoint: None,
                azure_openai_api_version: "2024-06-01".to_string(),
                azure_openai_api_key: None,
                openai_api_key: None,
                openai_base_url: "https://api.openai.com/v1".to_string(),
                default_model: "azure/gpt-4o".to_string(),
                timeout_secs: 60,
            },
            agent: AgentConfig {
                orchestrator: OrchestratorMode::Auto,
                job_title: "Search Analyst".to_string(),
                company_url: "https://upsonic.ai".to_string(),
                company_objective: "Fetch and analyze the latest search results".to_string(),
                reflection: true,
                max_steps: 4,
            },
            logging: LoggingConfig {
                filter: "websearch_agent=debug,tower_http=debug".to_string(),
                log_dir: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        // Blank values count as unset.
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            server: ServerConfig {
                port: parse_or(var("PORT"), "PORT", defaults.server.port)?,
                host: var("HOST").unwrap_or(defaults.server.host),
                cors_allowed_origins: var("ALLOWED_ORIGINS")
                    .map(|origins| {
                        origins
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.server.cors_allowed_origins),
            },
            search: SearchConfig {
                api_key: var("SERPAPI_API_KEY").or_else(|| var("SERPER_API_KEY")),
                endpoint: var("SEARCH_ENDPOINT").unwrap_or(defaults.search.endpoint),
                max_results: parse_or(
                    var("SEARCH_MAX_RESULTS"),
                    "SEARCH_MAX_RESULTS",
                    defaults.search.max_results,
                )?
                .clamp(1, MAX_RESULTS),
                timeout_secs: parse_or(
                    var("SEARCH_TIMEOUT_SECS"),
                    "SEARCH_TIMEOUT_SECS",
                    defaults.search.timeout_secs,
                )?
                .max(1),
            },
            llm: LLMConfig {
                azure_openai_endpoint: var("AZURE_OPENAI_ENDPOINT"),
                azure_openai_api_version: var("AZURE_OPENAI_API_VERSION")
                    .unwrap_or(defaults.llm.azure_openai_api_version),
                azure_openai_api_key: var("AZURE_OPENAI_API_KEY"),
                openai_api_key: var("OPENAI_API_KEY"),
                openai_base_url: var("OPENAI_BASE_URL").unwrap_or(defaults.llm.openai_base_url),
                default_model: var("LLM_DEFAULT_MODEL").unwrap_or(defaults.llm.default_model),
                timeout_secs: parse_or(
                    var("LLM_TIMEOUT_SECS"),
                    "LLM_TIMEOUT_SECS",
                    defaults.llm.timeout_secs,
                )?
                .max(1),
            },
            agent: AgentConfig {
                orchestrator: parse_or(
                    var("AGENT_ORCHESTRATOR"),
                    "AGENT_ORCHESTRATOR",
                    defaults.agent.orchestrator,
                )?,
                job_title: var("AGENT_JOB_TITLE").unwrap_or(defaults.agent.job_title),
                company_url: var("AGENT_COMPANY_URL").unwrap_or(defaults.agent.company_url),
                company_objective: var("AGENT_COMPANY_OBJECTIVE")
                    .unwrap_or(defaults.agent.company_objective),
                reflection: parse_or(
                    var("AGENT_REFLECTION"),
                    "AGENT_REFLECTION",
                    defaults.agent.reflection,
                )?,
                max_steps: parse_or(var("AGENT_MAX_STEPS"), "AGENT_MAX_STEPS", defaults.agent.max_steps)?
                    .max(1),
            },
            logging: LoggingConfig {
                filter: var("RUST_LOG").unwrap_or(defaults.logging.filter),
                log_dir: var("LOG_DIR"),
            },
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.search.endpoint, DEFAULT_SEARCH_ENDPOINT);
        assert_eq!(config.search.max_results, 10);
        assert!(config.search.api_key.is_none());
        assert_eq!(config.llm.default_model, "azure/gpt-4o");
        assert_eq!(config.agent.orchestrator, OrchestratorMode::Auto);
        assert!(config.agent.reflection);
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = config_from(&[("SERPAPI_API_KEY", "   ")]).unwrap();
        assert!(!config.search.is_configured());
    }

    #[test]
    fn test_serper_key_alias() {
        let config = config_from(&[("SERPER_API_KEY", "abc")]).unwrap();
        assert_eq!(config.search.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_max_results_is_clamped() {
        let config = config_from(&[("SEARCH_MAX_RESULTS", "50")]).unwrap();
        assert_eq!(config.search.max_results, MAX_RESULTS);

        let config = config_from(&[("SEARCH_MAX_RESULTS", "0")]).unwrap();
        assert_eq!(config.search.max_results, 1);
    }

    #[test]
    fn test_zero_timeouts_are_raised_to_one_second() {
        let config = config_from(&[("SEARCH_TIMEOUT_SECS", "0"), ("LLM_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.search.timeout_secs, 1);
        assert_eq!(config.llm.timeout_secs, 1);

        let config = config_from(&[("SEARCH_TIMEOUT_SECS", "30")]).unwrap();
        assert_eq!(config.search.timeout_secs, 30);
        assert_eq!(config.llm.timeout_secs, 60);
    }

    #[test]
    fn test_bind_target_accepts_host_names_and_ipv6() {
        use std::net::ToSocketAddrs;

        let config = config_from(&[("HOST", "localhost"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.server.bind_target(), ("localhost", 8080));
        let addrs: Vec<_> = config.server.bind_target().to_socket_addrs().unwrap().collect();
        assert!(!addrs.is_empty());
        assert!(addrs.iter().all(|a| a.port() == 8080 && a.ip().is_loopback()));

        let config = config_from(&[("HOST", "::")]).unwrap();
        let addr = config.server.bind_target().to_socket_addrs().unwrap().next().unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.port(), 8000);
    }

    #[tokio::test]
    async fn test_listener_binds_to_host_name() {
        let config = config_from(&[("HOST", "localhost"), ("PORT", "0")]).unwrap();
        let listener = tokio::net::TcpListener::bind(config.server.bind_target()).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn test_invalid_port_fails() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_orchestrator_mode_parsing() {
        let config = config_from(&[("AGENT_ORCHESTRATOR", "Direct")]).unwrap();
        assert_eq!(config.agent.orchestrator, OrchestratorMode::Direct);
        assert!(config_from(&[("AGENT_ORCHESTRATOR", "magic")]).is_err());
    }

    #[test]
    fn test_llm_credentials_follow_model_provider() {
        let config = config_from(&[("AZURE_OPENAI_API_KEY", "k")]).unwrap();
        assert!(!config.llm.has_credentials());

        let config = config_from(&[
            ("AZURE_OPENAI_API_KEY", "k"),
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
        ])
        .unwrap();
        assert!(config.llm.has_credentials());

        let config = config_from(&[
            ("LLM_DEFAULT_MODEL", "openai/gpt-4o-mini"),
            ("OPENAI_API_KEY", "k"),
        ])
        .unwrap();
        assert!(config.llm.has_credentials());
    }

    #[test]
    fn test_allowed_origins_list() {
        let config = config_from(&[("ALLOWED_ORIGINS", "http://a.test, http://b.test,")]).unwrap();
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
