//! Regulatory fee schedule.
//!
//! The MPF/HMF rates and the MPF floor/ceiling are statutory values that
//! change over time (19 CFR 24 adjustments), so they are carried as
//! configuration with the current values as defaults. The clamp semantics
//! themselves are fixed.

use serde::{Deserialize, Serialize};

use htsline_core::defaults;

/// Government-fee constants applied to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Merchandise Processing Fee ad-valorem rate (fraction of value).
    pub mpf_rate: f64,
    /// MPF statutory floor (USD).
    pub mpf_min: f64,
    /// MPF statutory ceiling (USD).
    pub mpf_max: f64,
    /// Harbor Maintenance Fee ad-valorem rate (fraction of value).
    pub hmf_rate: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            mpf_rate: defaults::MPF_RATE,
            mpf_min: defaults::MPF_MIN,
            mpf_max: defaults::MPF_MAX,
            hmf_rate: defaults::HMF_RATE,
        }
    }
}

impl FeeSchedule {
    /// Create from environment variables, falling back to the statutory
    /// defaults.
    ///
    /// - `HTSLINE_MPF_RATE`, `HTSLINE_MPF_MIN`, `HTSLINE_MPF_MAX`
    /// - `HTSLINE_HMF_RATE`
    pub fn from_env() -> Self {
        fn var(name: &str, default: f64) -> f64 {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        Self {
            mpf_rate: var("HTSLINE_MPF_RATE", defaults::MPF_RATE),
            mpf_min: var("HTSLINE_MPF_MIN", defaults::MPF_MIN),
            mpf_max: var("HTSLINE_MPF_MAX", defaults::MPF_MAX),
            hmf_rate: var("HTSLINE_HMF_RATE", defaults::HMF_RATE),
        }
    }
}
