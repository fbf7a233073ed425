use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Configuration for the delivery record log.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeliveryLogConfig {
    /// Path of the append-only file delivery records are written to.
    pub path: String,
}

impl DeliveryLogConfig {
    /// Validates delivery log configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.is_empty() {
            return Err(ValidationError::DeliveryLogPathEmpty);
        }

        Ok(())
    }
}
