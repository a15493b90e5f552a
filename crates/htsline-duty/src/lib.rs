//! # htsline-duty
//!
//! Duty and fee calculation for customs entries.
//!
//! This crate provides:
//! - [`compute_duty`]: the pure (value, rate set) to itemized-breakdown
//!   calculation, including the clamped government-fee formulas
//! - [`FeeSchedule`]: the regulatory fee constants as configuration
//! - [`form_fields`]: mapping of a computed breakdown onto the CBP Form
//!   7501 field layout for the external form populator

pub mod calculator;
pub mod form;
pub mod schedule;

pub use calculator::{compute_duty, money, DutyLineItem};
pub use form::{form_fields, EntryMeta};
pub use schedule::FeeSchedule;
