//! Shared data model for htsline.
//!
//! Catalog records, match candidates, rate-source results, and the
//! structured contract expected back from LLM-driven surcharge lookups.

use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults;

/// Embedding vector. Plain `Vec<f32>`; the catalog fixes the dimension.
pub type Vector = Vec<f32>;

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// One immutable entry of the classification catalog.
///
/// Field names follow the catalog build output: `htsno` is the dotted HTS
/// code (e.g. "9401.61.0000"), `general` is the raw statutory rate column
/// (may be "Free", "2.5%", or compound text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtsRecord {
    pub htsno: String,
    pub description: String,
    pub general: String,
    pub embedding: Vector,
}

/// A ranked classification candidate for a product description.
///
/// Transient; produced fresh per query. `general_rate` is the numeric rate
/// parsed out of the record's raw rate text (0 when unparseable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub hs_code: String,
    pub description: String,
    pub general_rate: f64,
    pub similarity_score: f32,
}

// =============================================================================
// RATE AGGREGATION
// =============================================================================

/// A successful rate lookup from a single source.
#[derive(Debug, Clone, Default)]
pub struct RateQuote {
    /// Rate in percentage points.
    pub rate: f64,
    /// Optional explanatory text (e.g. the model's reasoning).
    pub note: Option<String>,
}

/// Outcome of one rate source for one aggregation run.
///
/// Failure is a first-class value here, not an exception: a failed source
/// contributes rate 0 and carries the failure text in `note`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSourceResult {
    pub name: String,
    pub rate: f64,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RateSourceResult {
    /// A source that answered, contributing `rate`.
    pub fn succeeded(name: impl Into<String>, rate: f64, note: Option<String>) -> Self {
        Self {
            name: name.into(),
            rate,
            succeeded: true,
            note,
        }
    }

    /// A source that failed; contributes exactly 0.
    pub fn failed(name: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rate: 0.0,
            succeeded: false,
            note: Some(note.into()),
        }
    }
}

/// Combined rate picture for one classification code, with provenance.
///
/// `total_rate()` is always derived from the component rates; it is never
/// stored, so it cannot drift from its parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedRateSet {
    pub hs_code: String,
    pub description: String,
    pub country_of_origin: String,
    pub general_rate: f64,
    pub section_301_rate: f64,
    pub ieepa_rate: f64,
    pub reciprocal_rate: f64,
    pub sources: Vec<RateSourceResult>,
    pub status: String,
}

impl AggregatedRateSet {
    /// Sum of all contributing rates. Failed sources contribute exactly 0,
    /// so the total is always well-defined.
    pub fn total_rate(&self) -> f64 {
        self.general_rate + self.section_301_rate + self.ieepa_rate + self.reciprocal_rate
    }

    /// All-zero result for a country of origin this system does not cover.
    /// This is a scope restriction, not a failure.
    pub fn unsupported_country(
        hs_code: impl Into<String>,
        description: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            hs_code: hs_code.into(),
            description: description.into(),
            country_of_origin: country.into(),
            general_rate: 0.0,
            section_301_rate: 0.0,
            ieepa_rate: 0.0,
            reciprocal_rate: 0.0,
            sources: Vec::new(),
            status: format!(
                "Only {} imports are supported for tariff calculation",
                defaults::SUPPORTED_COUNTRY
            ),
        }
    }
}

// =============================================================================
// DUTY CALCULATION
// =============================================================================

/// The three ad-valorem rate components of an entry, in percentage points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DutyRates {
    pub basic: f64,
    pub section_301: f64,
    pub other: f64,
}

impl DutyRates {
    pub fn new(basic: f64, section_301: f64, other: f64) -> Self {
        Self {
            basic,
            section_301,
            other,
        }
    }
}

// =============================================================================
// SURCHARGE ANSWER CONTRACT
// =============================================================================

/// The structured answer a surcharge lookup expects back from the knowledge
/// service, parsed from a fenced JSON block in the free-text reply.
///
/// Deserialization is tolerant of the answer shapes models actually produce:
/// `applicable` accepts a bool or a "Y"/"N" string, `rate` accepts a number
/// or a "20%" string, and the authority-specific field names
/// (`subject_to_ieepa`, `ieepa_rate`, ...) are accepted as aliases. Anything
/// else is a deserialization error, which the caller treats as a source
/// failure.
#[derive(Debug, Clone, Deserialize)]
pub struct SurchargeAnswer {
    #[serde(
        alias = "subject_to_ieepa",
        alias = "subject_to_reciprocal_tariff",
        deserialize_with = "de_applicable"
    )]
    pub applicable: bool,
    #[serde(
        default,
        alias = "ieepa_rate",
        alias = "reciprocal_rate",
        deserialize_with = "de_rate"
    )]
    pub rate: f64,
    #[serde(default, alias = "reason")]
    pub explanation: String,
}

/// Accept `true`/`false` or "Y"/"N"/"yes"/"no" (case-insensitive).
fn de_applicable<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.trim().to_lowercase().as_str() {
            "y" | "yes" | "true" => Ok(true),
            "n" | "no" | "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "unrecognized applicability flag: {:?}",
                other
            ))),
        },
    }
}

/// Accept a JSON number or a string like "20" / "20%".
fn de_rate<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Rate {
        Num(f64),
        Text(String),
    }

    match Rate::deserialize(deserializer)? {
        Rate::Num(n) => Ok(n),
        Rate::Text(s) => {
            let trimmed = s.trim().trim_end_matches('%').trim();
            trimmed.parse::<f64>().map_err(|_| {
                serde::de::Error::custom(format!("unparseable rate value: {:?}", s))
            })
        }
    }
}
