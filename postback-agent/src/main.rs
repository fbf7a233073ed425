//! Postback delivery agent service binary.
//!
//! Loads configuration, initializes tracing, starts the async runtime, and
//! runs the delivery pipeline until it completes or a shutdown signal
//! arrives. Exits zero on a clean shutdown; a non-zero exit means the agent
//! failed before or outside steady-state delivery.

use postback_config::shared::AgentConfig;
use postback_telemetry::tracing::init_tracing;
use tracing::error;

use crate::config::load_agent_config;
use crate::core::start_agent_with_config;
use crate::error::AgentResult;

mod config;
mod core;
mod error;

/// Entry point for the agent service.
fn main() -> AgentResult<()> {
    let agent_config = load_agent_config()?;

    init_tracing("postback_agent=info,postback=info");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(agent_config))?;

    Ok(())
}

/// Main async entry point that runs the agent and reports failures.
async fn async_main(agent_config: AgentConfig) -> AgentResult<()> {
    if let Err(err) = start_agent_with_config(agent_config).await {
        error!("{}: {err}", err.category());

        return Err(err);
    }

    Ok(())
}
