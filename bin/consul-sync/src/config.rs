use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use sync_api::PortOverrides;

use crate::logging::LogFormat;

#[derive(Parser, Debug, Clone)]
#[command(name = "consul-sync")]
#[command(about = "Registers the ports of a Marathon application as Consul services")]
pub struct Config {
    /// Marathon application id to synchronize
    #[arg(long, env = "MARATHON_APP_ID", required_unless_present = "definition")]
    pub app_id: Option<String>,

    #[arg(long, env = "MARATHON_URL", default_value = "http://localhost:8080")]
    pub marathon_url: String,

    #[arg(long, env = "CONSUL_HTTP_ADDR", default_value = "http://localhost:8500")]
    pub consul_url: String,

    #[arg(long, env = "CONSUL_HTTP_TOKEN", hide_env_values = true)]
    pub consul_token: Option<String>,

    /// Replace the port at an index of the port definitions, as INDEX=PORT
    #[arg(
        long = "port-override",
        env = "PORT_OVERRIDES",
        value_delimiter = ',',
        value_parser = parse_port_override
    )]
    pub port_overrides: Vec<(usize, i32)>,

    /// Seconds between two synchronizations
    #[arg(long, default_value_t = 30)]
    pub interval: u64,

    /// Seconds before an HTTP call to Marathon or Consul is abandoned
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Synchronize once and exit
    #[arg(long)]
    pub once: bool,

    /// Print registrations instead of submitting them to Consul
    #[arg(long)]
    pub dry_run: bool,

    /// Translate a local JSON or YAML application definition and print the result
    #[arg(long, value_name = "PATH")]
    pub definition: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn port_overrides(&self) -> PortOverrides {
        self.port_overrides.iter().copied().collect()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn consul_url(&self) -> String {
        with_scheme(&self.consul_url)
    }

    pub fn marathon_url(&self) -> String {
        with_scheme(&self.marathon_url)
    }
}

// CONSUL_HTTP_ADDR is commonly set as host:port
fn with_scheme(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

fn parse_port_override(value: &str) -> Result<(usize, i32), String> {
    let (index, port) = value
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=PORT, got {:?}", value))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid port index {:?}: {}", index, e))?;
    let port = port
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid port {:?}: {}", port, e))?;
    if !(1..=65535).contains(&port) {
        return Err(format!("port {} is out of range", port));
    }
    Ok((index, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_override() {
        assert_eq!(parse_port_override("0=9999"), Ok((0, 9999)));
        assert_eq!(parse_port_override(" 2 = 80 "), Ok((2, 80)));
        assert!(parse_port_override("9999").is_err());
        assert!(parse_port_override("a=80").is_err());
        assert!(parse_port_override("0=http").is_err());
        assert!(parse_port_override("0=0").is_err());
        assert!(parse_port_override("0=70000").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["consul-sync", "--app-id", "/prod/web.1"]).unwrap();
        assert_eq!(config.app_id.as_deref(), Some("/prod/web.1"));
        assert_eq!(config.interval(), Duration::from_secs(30));
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.port_overrides().is_empty());
        assert!(!config.once);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_repeated_port_overrides() {
        let config = Config::try_parse_from([
            "consul-sync",
            "--app-id",
            "web.1",
            "--port-override",
            "0=9999",
            "--port-override",
            "1=8000,2=8001",
        ])
        .unwrap();
        assert_eq!(
            config.port_overrides(),
            PortOverrides::from([(0, 9999), (1, 8000), (2, 8001)])
        );
    }

    #[test]
    fn test_invalid_port_override_is_rejected() {
        let result =
            Config::try_parse_from(["consul-sync", "--app-id", "web.1", "--port-override", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_definition_replaces_app_id() {
        let config =
            Config::try_parse_from(["consul-sync", "--definition", "app.yaml"]).unwrap();
        assert!(config.app_id.is_none());
        assert_eq!(config.definition, Some(PathBuf::from("app.yaml")));
    }

    #[test]
    fn test_with_scheme() {
        assert_eq!(with_scheme("127.0.0.1:8500"), "http://127.0.0.1:8500");
        assert_eq!(with_scheme("https://consul:8501"), "https://consul:8501");
    }
}
