//! Product Catalog
//!
//! The store sells a single product. Its price and labels are configuration,
//! not code, so one build can serve any price point.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorefrontError};
use crate::gateway::{LineItem, SESSION_ID_PLACEHOLDER};

pub const DEFAULT_PRODUCT_NAME: &str = "Stand Out and Scale";
pub const DEFAULT_PRODUCT_DESCRIPTION: &str = "Strategic Brand Building for Serious Entrepreneurs";
pub const DEFAULT_PRICE_CENTS: i64 = 2500;
pub const DEFAULT_CURRENCY: &str = "usd";
pub const DEFAULT_ASSET_PATH: &str = "/downloads/stand-out-and-scale.pdf";

/// Number of copies in one checkout (always at least one)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Self = Self(1);

    pub fn new(value: u32) -> Result<Self> {
        if value == 0 {
            return Err(invalid_quantity());
        }
        Ok(Self(value))
    }

    /// Parse an untrusted JSON value; accepts positive integers only
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let raw = value.as_u64().ok_or_else(invalid_quantity)?;
        let value = u32::try_from(raw).map_err(|_| invalid_quantity())?;
        Self::new(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = StorefrontError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

fn invalid_quantity() -> StorefrontError {
    StorefrontError::InvalidInput("Quantity must be a positive integer".into())
}

/// The product on sale
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,

    /// Price per copy in minor units
    pub unit_amount: i64,

    pub currency: String,

    #[serde(default)]
    pub image_url: Option<String>,

    /// Price already registered at the gateway, if any
    #[serde(default)]
    pub gateway_price_id: Option<String>,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            name: DEFAULT_PRODUCT_NAME.into(),
            description: DEFAULT_PRODUCT_DESCRIPTION.into(),
            unit_amount: DEFAULT_PRICE_CENTS,
            currency: DEFAULT_CURRENCY.into(),
            image_url: None,
            gateway_price_id: None,
        }
    }
}

impl Product {
    /// Build from `PRODUCT_*` variables; every one of them is optional
    pub fn from_lookup<F>(lookup: F, urls: &StoreUrls) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let unit_amount = match lookup("PRODUCT_PRICE_CENTS") {
            Some(raw) => raw.trim().parse::<i64>().ok().filter(|cents| *cents >= 0).ok_or_else(
                || StorefrontError::Config(format!("PRODUCT_PRICE_CENTS is not a valid amount: {raw}")),
            )?,
            None => defaults.unit_amount,
        };

        Ok(Self {
            name: lookup("PRODUCT_NAME").unwrap_or(defaults.name),
            description: lookup("PRODUCT_DESCRIPTION").unwrap_or(defaults.description),
            unit_amount,
            currency: lookup("PRODUCT_CURRENCY")
                .map_or(defaults.currency, |c| c.trim().to_lowercase()),
            image_url: lookup("PRODUCT_IMAGE_PATH").map(|path| urls.absolute(&path)),
            gateway_price_id: lookup("PRODUCT_PRICE_ID").filter(|id| !id.trim().is_empty()),
        })
    }

    /// Line item for `quantity` copies
    ///
    /// A caller-supplied price id is only honoured when it names the
    /// configured gateway price; anything else is rejected rather than
    /// charged at an unknown price.
    pub fn line_item(&self, quantity: Quantity, price_id: Option<&str>) -> Result<LineItem> {
        let gateway_price_id = match price_id.map(str::trim).filter(|id| !id.is_empty()) {
            None => None,
            Some(requested) if self.gateway_price_id.as_deref() == Some(requested) => {
                Some(requested.to_string())
            }
            Some(requested) => {
                return Err(StorefrontError::InvalidInput(format!("Unknown price: {requested}")));
            }
        };

        Ok(LineItem {
            name: self.name.clone(),
            description: self.description.clone(),
            unit_amount: self.unit_amount,
            currency: self.currency.clone(),
            quantity: quantity.get(),
            image_url: self.image_url.clone(),
            gateway_price_id,
        })
    }

    /// Human readable price, e.g. `$25.00`
    pub fn display_price(&self) -> String {
        let symbol = match self.currency.as_str() {
            "usd" => "$",
            "eur" => "€",
            "gbp" => "£",
            _ => "",
        };
        let major = self.unit_amount / 100;
        let minor = self.unit_amount % 100;
        if symbol.is_empty() {
            format!("{major}.{minor:02} {}", self.currency.to_uppercase())
        } else {
            format!("{symbol}{major}.{minor:02}")
        }
    }
}

/// Public URLs of the storefront
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreUrls {
    base: String,
}

impl StoreUrls {
    pub fn new(app_url: impl Into<String>) -> Result<Self> {
        let base = app_url.into().trim().trim_end_matches('/').to_string();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(StorefrontError::Config(format!(
                "APP_URL must be an absolute http(s) URL, got {base:?}"
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Join a site-relative path onto the base URL
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Where the gateway sends the buyer after paying
    pub fn success_template(&self) -> String {
        format!("{}/success?session_id={SESSION_ID_PLACEHOLDER}", self.base)
    }

    /// Where the gateway sends the buyer after backing out
    pub fn cancel_url(&self) -> String {
        format!("{}/?canceled=true", self.base)
    }
}
