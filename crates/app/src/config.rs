//! App configuration

use std::{path::PathBuf, time::Duration};

use clap::Args;
use roastery::{orders::TransitionPolicy, pricing::BASE_PRICE};
use zeroize::Zeroizing;

use crate::domain::checkout::OrderApiConfig;

/// Roastery configuration, read from arguments, the environment and `.env`.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Where the cart is kept between runs
    #[arg(long, global = true, env = "CART_STORAGE_PATH", default_value = ".roastery/cart.json")]
    pub cart_storage_path: PathBuf,

    /// Price of one bag, in paise
    #[arg(long, global = true, env = "BASE_PRICE", default_value_t = BASE_PRICE)]
    pub base_price: u64,

    /// Order service base URL
    #[arg(long, global = true, env = "ORDER_API_URL", default_value = "http://localhost:3000/api")]
    pub order_api_url: String,

    /// Order service bearer token
    #[arg(long, global = true, env = "ORDER_API_TOKEN", hide_env_values = true)]
    pub order_api_token: Option<String>,

    /// Seconds to wait for the order service
    #[arg(long, global = true, env = "CHECKOUT_TIMEOUT_SECS", default_value_t = 15)]
    pub checkout_timeout_secs: u64,

    /// Signed-in user id; orders are placed as a guest when omitted
    #[arg(long, global = true, env = "USER_ID")]
    pub user_id: Option<String>,

    /// Signed-in user's display name
    #[arg(long, global = true, env = "USER_NAME")]
    pub user_name: Option<String>,

    /// Reject order status updates that break the progression
    #[arg(long, global = true, env = "STRICT_ORDER_STATUS")]
    pub strict_order_status: bool,

    /// Taste profile presets file
    #[arg(long, global = true, env = "PROFILES_PATH", default_value = "fixtures/profiles/house.yml")]
    pub profiles_path: PathBuf,
}

impl AppConfig {
    #[must_use]
    pub fn checkout_timeout(&self) -> Duration {
        Duration::from_secs(self.checkout_timeout_secs)
    }

    #[must_use]
    pub fn transition_policy(&self) -> TransitionPolicy {
        if self.strict_order_status {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        }
    }

    #[must_use]
    pub fn order_api(&self) -> OrderApiConfig {
        OrderApiConfig {
            base_url: self.order_api_url.clone(),
            token: self
                .order_api_token
                .as_ref()
                .filter(|token| !token.trim().is_empty())
                .map(|token| Zeroizing::new(token.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        config: AppConfig,
    }

    #[test]
    fn flags_override_defaults() -> Result<(), clap::Error> {
        let Harness { config } = Harness::try_parse_from([
            "roastery",
            "--base-price",
            "45000",
            "--checkout-timeout-secs",
            "3",
            "--strict-order-status",
            "--order-api-token",
            "s3cret",
        ])?;

        assert_eq!(config.base_price, 45_000);
        assert_eq!(config.checkout_timeout(), Duration::from_secs(3));
        assert_eq!(config.transition_policy(), TransitionPolicy::Strict);
        assert_eq!(
            config.order_api().token.as_deref().map(String::as_str),
            Some("s3cret")
        );

        Ok(())
    }

    #[test]
    fn blank_token_is_treated_as_missing() -> Result<(), clap::Error> {
        let Harness { config } =
            Harness::try_parse_from(["roastery", "--order-api-token", " "])?;

        assert!(config.order_api().token.is_none());

        Ok(())
    }
}
