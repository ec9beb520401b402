use crate::{transition::DEFAULT_PROBABILITY_DECIMALS, types::REFERRAL_ACTION_TYPE};
use serde::{Deserialize, Serialize};

/// More places than f64 can represent meaningfully for a ratio.
pub const MAX_PROBABILITY_DECIMALS: u32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Action type whose records form the referral graph.
    #[serde(default = "default_referral_action_type")]
    pub referral_action_type: String,
    /// Decimal places kept on next-action probabilities.
    #[serde(default = "default_probability_decimals")]
    pub probability_decimals: u32,
}

fn default_referral_action_type() -> String {
    REFERRAL_ACTION_TYPE.to_string()
}

fn default_probability_decimals() -> u32 {
    DEFAULT_PROBABILITY_DECIMALS
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            referral_action_type: default_referral_action_type(),
            probability_decimals: default_probability_decimals(),
        }
    }
}

impl AnalyticsConfig {
    /// Load from a JSON config file. Missing keys take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let config: AnalyticsConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.referral_action_type.trim().is_empty() {
            anyhow::bail!("referral_action_type must not be empty");
        }
        if self.probability_decimals > MAX_PROBABILITY_DECIMALS {
            anyhow::bail!(
                "probability_decimals must be at most {MAX_PROBABILITY_DECIMALS}, got {}",
                self.probability_decimals
            );
        }
        Ok(())
    }
}
