use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_transport_api_url")]
    pub transport_api_url: String,
    /// When no preference-compatible candidate exists, fall back to showing
    /// anyone except the requester. Safety valve for small populations.
    #[serde(default = "default_relax_preferences")]
    pub relax_preferences: bool,
    /// Pause between a match confirmation and the next candidate, so the
    /// confirmation lands first.
    #[serde(default = "default_match_resume_delay_ms")]
    pub match_resume_delay_ms: u64,
    #[serde(default = "default_notify_timeout_ms")]
    pub notify_timeout_ms: u64,
}

fn default_port() -> u16 { 3010 }
fn default_transport_api_url() -> String { "http://localhost:8081".into() }
fn default_relax_preferences() -> bool { true }
fn default_match_resume_delay_ms() -> u64 { 2000 }
fn default_notify_timeout_ms() -> u64 { 10_000 }

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("AMORA_BOT").separator("__"))
            .build()?;
        Ok(config.try_deserialize().unwrap_or_else(|_| Self {
            port: default_port(),
            transport_api_url: default_transport_api_url(),
            relax_preferences: default_relax_preferences(),
            match_resume_delay_ms: default_match_resume_delay_ms(),
            notify_timeout_ms: default_notify_timeout_ms(),
        }))
    }

    pub fn match_resume_delay(&self) -> Duration {
        Duration::from_millis(self.match_resume_delay_ms)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}
