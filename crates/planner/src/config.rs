use floe_common::ring::Partitioner;
use serde::Deserialize;

use crate::error::PlannerError;

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Optional narrowing of the planning pass. Only the key pair is honored;
/// the token fields exist so their presence can be rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct RestrictionSettings {
    pub start_key: Option<String>,
    pub end_key: Option<String>,
    pub start_token: Option<String>,
    pub end_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerSettings {
    pub seeds: Vec<String>,
    pub rpc_port: u16,
    pub keyspace: String,
    pub table: String,
    pub partitioner: String,
    #[serde(default = "default_split_size_rows")]
    pub split_size_rows: u64,
    /// Worker-pool bound; 0 means unbounded.
    #[serde(default)]
    pub max_parallel: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Optional per-unit deadline. Unset preserves the historical behavior
    /// where only the retry budget bounds a hung unit.
    #[serde(default)]
    pub unit_timeout_secs: Option<u64>,
    #[serde(default)]
    pub restriction: Option<RestrictionSettings>,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

fn default_split_size_rows() -> u64 {
    65536
}

fn default_max_retries() -> u32 {
    3
}

impl PlannerSettings {
    pub fn new() -> Result<Self, PlannerError> {
        let config_file_path = std::env::var("FLOE_PLANNER_CONFIG_PATH")
            .unwrap_or_else(|_| "crates/planner/config/default.toml".to_string());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&config_file_path).required(true))
            .add_source(config::Environment::with_prefix("FLOE_PLANNER").separator("__"))
            .build()?;
        Ok(s.try_deserialize()?)
    }

    /// Validate and freeze the per-invocation planning inputs. Everything
    /// raised here happens before any network call.
    pub fn context(&self) -> Result<PlanningContext, PlannerError> {
        if self.keyspace.is_empty() || self.table.is_empty() {
            return Err(PlannerError::Configuration(
                "keyspace and table must both be set".to_string(),
            ));
        }
        if self.seeds.is_empty() {
            return Err(PlannerError::Configuration(
                "at least one seed address must be set".to_string(),
            ));
        }
        let partitioner = Partitioner::from_name(&self.partitioner)
            .map_err(|e| PlannerError::Configuration(e.to_string()))?;
        Ok(PlanningContext {
            keyspace: self.keyspace.clone(),
            table: self.table.clone(),
            partitioner,
            rpc_port: self.rpc_port,
            split_size_rows: self.split_size_rows,
            credentials: self.credentials.clone(),
        })
    }
}

/// Immutable inputs threaded through one planning invocation.
#[derive(Debug, Clone)]
pub struct PlanningContext {
    pub keyspace: String,
    pub table: String,
    pub partitioner: Partitioner,
    pub rpc_port: u16,
    pub split_size_rows: u64,
    pub credentials: Option<Credentials>,
}
