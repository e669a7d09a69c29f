//! Engine configuration.
//!
//! Every tunable is passed explicitly at engine construction; nothing is read
//! from ambient environment state at call time, which keeps reconciliations
//! deterministic and testable.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Rules for computing the ERP-facing delivery date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRules {
    /// Street-number token identifying the special delivery address.
    pub special_street_number: String,
    /// Street-suffix token identifying the special delivery address. Both
    /// tokens must appear in the address for the special rule to apply.
    pub special_street_suffix: String,
    /// Calendar days subtracted from the extracted delivery date.
    pub lead_time_days: i64,
}

impl Default for DeliveryRules {
    fn default() -> Self {
        Self {
            special_street_number: "12 Bet".to_owned(),
            special_street_suffix: "St.".to_owned(),
            lead_time_days: 6,
        }
    }
}

/// Reconciliation engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Decimal places of the minor-unit currency representation.
    pub currency_scale: u8,
    /// Delivery date computation rules.
    pub delivery: DeliveryRules,
    /// Bound on each upstream (ERP / extraction) call; an elapsed timeout
    /// surfaces as `UpstreamUnavailable`.
    pub upstream_timeout: Duration,
    /// Pass the ERP's expected part codes to the extractor to narrow its
    /// work. When disabled, the ERP fetch and the extraction run
    /// concurrently instead.
    pub scoped_extraction: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency_scale: 2,
            delivery: DeliveryRules::default(),
            upstream_timeout: Duration::from_secs(30),
            scoped_extraction: true,
        }
    }
}
