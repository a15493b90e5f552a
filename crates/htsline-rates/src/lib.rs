//! # htsline-rates
//!
//! Tariff-rate source adapters and the rate aggregator.
//!
//! Three independently-fallible external signals are combined with the
//! catalog's statutory base rate into one [`AggregatedRateSet`]:
//!
//! - [`RemedySearchSource`]: Section 301 trade-remedy rate scraped from the
//!   USTR investigation document search
//! - [`SurchargeSource`]: IEEPA and reciprocal surcharges asked of an LLM
//!   knowledge service with a structured-answer contract
//!
//! The aggregator absorbs every per-source failure as a zero contribution
//! with provenance; an aggregation run itself never fails.
//!
//! [`AggregatedRateSet`]: htsline_core::AggregatedRateSet

pub mod aggregator;
pub mod remedy;
pub mod surcharge;

pub use aggregator::RateAggregator;
pub use remedy::RemedySearchSource;
pub use surcharge::{SurchargeAuthority, SurchargeSource};
