//! Pure duty and fee calculation.

use serde::Serialize;

use htsline_core::{DutyRates, Error, Result};

use crate::schedule::FeeSchedule;

/// Itemized duty/fee breakdown for one entry line.
///
/// Stores only the components; every total is recomputed from them on
/// access, so a corrected component can never leave a stale total behind.
/// Values are unrounded internally; presentation rounds once, at the end
/// (sum-then-round).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DutyLineItem {
    pub entered_value: f64,
    pub basic_duty: f64,
    pub section_301_duty: f64,
    pub other_duty: f64,
    pub mpf: f64,
    pub hmf: f64,
}

impl DutyLineItem {
    /// Sum of the three ad-valorem duty components.
    pub fn total_duty(&self) -> f64 {
        self.basic_duty + self.section_301_duty + self.other_duty
    }

    /// Sum of the government fees.
    pub fn total_other_fees(&self) -> f64 {
        self.mpf + self.hmf
    }

    /// Grand total payable on the entry.
    pub fn total_payable(&self) -> f64 {
        self.total_duty() + self.total_other_fees()
    }
}

/// Compute the itemized duty/fee breakdown for an entered value and rate set.
///
/// Pure and deterministic; never fails for finite non-negative inputs.
/// Negative or non-finite values and rates are caller contract violations
/// and fail fast rather than produce a silently negative payable amount.
///
/// The Merchandise Processing Fee is `value × mpf_rate` clamped to the
/// statutory floor and ceiling; a zero-value entry still attracts the floor,
/// mirroring the regulatory text. The Harbor Maintenance Fee is unclamped.
pub fn compute_duty(value: f64, rates: &DutyRates, schedule: &FeeSchedule) -> Result<DutyLineItem> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidInput(format!(
            "Entered value must be a finite non-negative amount, got {}",
            value
        )));
    }
    for (label, rate) in [
        ("basic", rates.basic),
        ("section 301", rates.section_301),
        ("other", rates.other),
    ] {
        if !rate.is_finite() || rate < 0.0 {
            return Err(Error::InvalidInput(format!(
                "The {} rate must be a finite non-negative percentage, got {}",
                label, rate
            )));
        }
    }

    let mpf = (value * schedule.mpf_rate)
        .min(schedule.mpf_max)
        .max(schedule.mpf_min);

    Ok(DutyLineItem {
        entered_value: value,
        basic_duty: value * rates.basic / 100.0,
        section_301_duty: value * rates.section_301 / 100.0,
        other_duty: value * rates.other / 100.0,
        mpf,
        hmf: value * schedule.hmf_rate,
    })
}

/// Format a monetary amount with two decimals for presentation.
pub fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}
