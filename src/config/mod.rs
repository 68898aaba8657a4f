pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{MeetingRequest, Objective, TransportProfile};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "meetpoint")]
#[command(about = "Find a fair meeting point reachable on foot from every address")]
pub struct CliConfig {
    /// Participant street addresses (1 to 10)
    #[arg(required = true)]
    pub addresses: Vec<String>,

    /// City or region appended to every geocoding query
    #[arg(long)]
    pub city_hint: Option<String>,

    #[arg(long, default_value = "walking")]
    pub profile: String,

    /// Travel time budget in minutes; defaults to the configured budget
    #[arg(long)]
    pub max_minutes: Option<u32>,

    /// min_sum or min_max
    #[arg(long, default_value = "min_sum")]
    pub objective: String,

    /// Optional TOML settings file
    #[arg(long)]
    pub config: Option<String>,

    /// Mapbox access token; overrides the settings file
    #[arg(long, env = "MAPBOX_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Pretty-print the JSON result")]
    pub pretty: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn to_request(&self, default_budget: u32) -> Result<MeetingRequest> {
        let profile: TransportProfile = self.profile.parse()?;
        let objective: Objective = self.objective.parse()?;
        let mut request = MeetingRequest::new(self.addresses.iter().cloned())
            .with_profile(profile)
            .with_objective(objective)
            .with_max_minutes(self.max_minutes.unwrap_or(default_budget));
        if let Some(hint) = &self.city_hint {
            request = request.with_city_hint(hint.clone());
        }
        Ok(request)
    }
}
