//! Capacity policy configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::util::ids::{BasketSizeName, ProductTypeId};

/// Rule family by which usage against a capacity is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Continuous share units per product type.
    #[default]
    Share,
    /// Discrete baskets per named basket size.
    Basket,
}

impl fmt::Display for CapacityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Share => f.write_str("share"),
            Self::Basket => f.write_str("basket"),
        }
    }
}

impl FromStr for CapacityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "share" | "shares" => Ok(Self::Share),
            "basket" | "baskets" | "basket_size" => Ok(Self::Basket),
            other => Err(format!("unknown capacity policy `{other}`")),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Policy of product types without an override.
    #[serde(default)]
    pub default_policy: CapacityPolicy,
    /// Per-product-type policy overrides.
    #[serde(default)]
    pub product_type_policies: BTreeMap<ProductTypeId, CapacityPolicy>,
    /// Whether subscriptions silently renew into the next growing period.
    #[serde(default)]
    pub auto_renewal: bool,
    /// Recognised basket sizes, checked in this order.
    #[serde(default)]
    pub basket_sizes: Vec<BasketSizeName>,
}

impl EngineConfig {
    /// Policy governing `product_type`.
    #[must_use]
    pub fn policy_for(&self, product_type: &ProductTypeId) -> CapacityPolicy {
        self.product_type_policies
            .get(product_type)
            .copied()
            .unwrap_or(self.default_policy)
    }

    /// Whether any product type may be accounted in baskets.
    #[must_use]
    pub fn uses_baskets(&self) -> bool {
        self.default_policy == CapacityPolicy::Basket
            || self
                .product_type_policies
                .values()
                .any(|policy| *policy == CapacityPolicy::Basket)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Basket policy without basket sizes, or blank/duplicate basket size names.
    pub fn validate(&self) -> Result<(), String> {
        if self.uses_baskets() && self.basket_sizes.is_empty() {
            return Err("basket policy in use but no basket sizes configured".into());
        }
        let mut seen = BTreeSet::new();
        for basket_size in &self.basket_sizes {
            if basket_size.as_str().trim().is_empty() {
                return Err("basket size names must not be blank".into());
            }
            if !seen.insert(basket_size) {
                return Err(format!("basket size `{basket_size}` configured twice"));
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    /// Malformed JSON or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read configuration from the process environment, loading `.env` first.
    ///
    /// See [`Self::from_lookup`] for the variables read.
    ///
    /// # Errors
    /// Unparseable values or an invalid result.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    ///
    /// - `COOP_CAPACITY_POLICY`: `share` (default) or `basket`
    /// - `COOP_CAPACITY_POLICY_OVERRIDES`: `product_type=policy` pairs, comma separated
    /// - `COOP_AUTO_RENEWAL`: `true`/`false`, `1`/`0`, `yes`/`no`
    /// - `COOP_BASKET_SIZES`: comma separated basket size names
    ///
    /// # Errors
    /// Unparseable values or an invalid result.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        match lookup("COOP_CAPACITY_POLICY") {
            Some(raw) => cfg.default_policy = raw.parse()?,
            None => warn!(policy = %cfg.default_policy, "COOP_CAPACITY_POLICY not set, using default policy"),
        }
        if let Some(raw) = lookup("COOP_CAPACITY_POLICY_OVERRIDES") {
            for pair in raw.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
                let (product_type, policy) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("override `{pair}` must look like type=policy"))?;
                cfg.product_type_policies
                    .insert(ProductTypeId::new(product_type.trim()), policy.parse()?);
            }
        }
        match lookup("COOP_AUTO_RENEWAL") {
            Some(raw) => cfg.auto_renewal = parse_flag(&raw)?,
            None => warn!(auto_renewal = cfg.auto_renewal, "COOP_AUTO_RENEWAL not set, renewals not projected"),
        }
        if let Some(raw) = lookup("COOP_BASKET_SIZES") {
            cfg.basket_sizes = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(BasketSizeName::new)
                .collect();
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(format!("`{other}` is not a boolean")),
    }
}
