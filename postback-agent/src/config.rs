use postback_config::load_config;
use postback_config::shared::AgentConfig;

use crate::error::{AgentError, AgentResult};

/// Loads and validates the agent configuration.
///
/// Uses the standard layered loading mechanism from [`postback_config`] and
/// validates the resulting [`AgentConfig`] before returning it.
pub fn load_agent_config() -> AgentResult<AgentConfig> {
    let config = load_config::<AgentConfig>().map_err(AgentError::config)?;
    config.validate().map_err(AgentError::config)?;

    Ok(config)
}
