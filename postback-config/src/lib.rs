//! Configuration loading for the postback delivery agent.
//!
//! Configuration is assembled from three layers, later layers overriding
//! earlier ones:
//!
//! 1. `configuration/base.yaml`: settings shared by every environment.
//! 2. `configuration/{dev,prod}.yaml`: environment-specific overrides,
//!    selected via the `APP_ENVIRONMENT` variable.
//! 3. `APP_`-prefixed environment variables, with `__` separating nested
//!    keys (`APP_QUEUE__HOST`, `APP_PIPELINE__WORKER_COUNT`, ...).

pub mod environment;
mod load;
pub mod shared;

pub use load::{LoadConfigError, load_config};
