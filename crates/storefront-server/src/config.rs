//! Server Configuration
//!
//! Everything is read once at startup. Missing credentials stop the process
//! before it binds a port.

use std::path::PathBuf;

use storefront_core::{
    DeliveryTemplate, Product, Result, StoreUrls, StorefrontError, catalog::DEFAULT_ASSET_PATH,
};
use storefront_mail::SendGridConfig;
use storefront_payments::StripeConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STATIC_DIR: &str = "static";

/// Which payment gateway to talk to
#[derive(Clone, Debug)]
pub enum GatewayConfig {
    Stripe(StripeConfig),
    /// In-memory gateway that marks every session paid (local demo)
    Mock,
}

/// Store-level settings shared by the request handlers
#[derive(Clone, Debug)]
pub struct StoreSettings {
    pub urls: StoreUrls,
    pub product: Product,

    /// Sender address of delivery emails
    pub mail_from: String,

    /// Absolute download URL of the purchased asset
    pub asset_url: String,

    /// Email the asset as soon as a paid session is verified
    pub fulfill_on_verify: bool,
}

impl StoreSettings {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let urls = StoreUrls::new(required(&lookup, "APP_URL")?)?;
        let product = Product::from_lookup(&lookup, &urls)?;
        let asset_url =
            urls.absolute(&lookup("ASSET_PATH").unwrap_or_else(|| DEFAULT_ASSET_PATH.into()));

        Ok(Self {
            mail_from: required(&lookup, "MAIL_FROM")?,
            fulfill_on_verify: flag(&lookup, "FULFILL_ON_VERIFY")?,
            urls,
            product,
            asset_url,
        })
    }

    pub fn delivery_template(&self) -> DeliveryTemplate {
        DeliveryTemplate {
            from: self.mail_from.clone(),
            product_name: self.product.name.clone(),
            asset_url: self.asset_url.clone(),
        }
    }
}

/// Complete server configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub static_dir: PathBuf,
    pub gateway: GatewayConfig,
    pub sendgrid: SendGridConfig,
    pub store: StoreSettings,
}

impl AppConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gateway = match lookup("PAYMENT_GATEWAY").as_deref().map(str::trim) {
            None | Some("" | "stripe") => GatewayConfig::Stripe(StripeConfig::from_lookup(&lookup)?),
            Some("mock") => GatewayConfig::Mock,
            Some(other) => {
                return Err(StorefrontError::Config(format!(
                    "PAYMENT_GATEWAY must be \"stripe\" or \"mock\", got {other:?}"
                )));
            }
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            static_dir: lookup("STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.into())
                .into(),
            gateway,
            sendgrid: SendGridConfig::from_lookup(&lookup)?,
            store: StoreSettings::from_lookup(&lookup)?,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| StorefrontError::Config(format!("{key} not set")))
}

fn flag<F>(lookup: &F, key: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()).as_deref() {
        None | Some("" | "0" | "false" | "no") => Ok(false),
        Some("1" | "true" | "yes") => Ok(true),
        Some(other) => Err(StorefrontError::Config(format!(
            "{key} must be true or false, got {other:?}"
        ))),
    }
}
