//! LLM-driven surcharge rate sources (IEEPA and reciprocal tariffs).
//!
//! These surcharges are announced by executive action and have no stable
//! machine-readable feed; the lookup poses a natural-language question to a
//! knowledge service and holds it to a structured-answer contract: the reply
//! must contain a fenced ```json block deserializing to
//! [`SurchargeAnswer`]. Any violation of that contract is a source failure,
//! absorbed by the aggregator.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use htsline_core::{Error, GenerationBackend, RateQuote, RateSource, Result, SurchargeAnswer};

/// Fenced JSON block in a model reply.
static JSON_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("json fence regex is valid")
});

/// Legal authority a surcharge lookup asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurchargeAuthority {
    /// Additional tariffs under the International Emergency Economic
    /// Powers Act.
    EmergencyPowers,
    /// Reciprocal tariffs on the supported trade partner's imports.
    Reciprocal,
}

impl SurchargeAuthority {
    fn name(self) -> &'static str {
        match self {
            Self::EmergencyPowers => "ieepa",
            Self::Reciprocal => "reciprocal",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Self::EmergencyPowers => "IEEPA tariff",
            Self::Reciprocal => "Reciprocal tariff",
        }
    }

    /// The question posed to the knowledge service.
    fn prompt(self, hts_code: &str) -> String {
        match self {
            Self::EmergencyPowers => format!(
                "Please confirm whether the HS code [{hts_code}] is subject to the additional \
                 tariffs imposed by the United States under the International Emergency Economic \
                 Powers Act (IEEPA) on imports from China, and what the current tariff rate is.\n\
                 \n\
                 Detailed instructions:\n\
                 - Check the latest announcements from U.S. Customs and Border Protection (CBP)\n\
                 - Confirm whether the IEEPA tariffs apply to this code\n\
                 - Record the current applicable tariff rate\n\
                 - Check for product-specific exclusion clauses\n\
                 \n\
                 Return exactly one fenced JSON block in this format:\n\
                 ```json\n\
                 {{\n\
                   \"applicable\": \"<Y or N>\",\n\
                   \"rate\": \"<rate if Y else 0>\",\n\
                   \"explanation\": \"<reason>\"\n\
                 }}\n\
                 ```"
            ),
            Self::Reciprocal => format!(
                "Please confirm whether the HS code [{hts_code}] is subject to the reciprocal \
                 tariffs imposed by the United States on imports from China, and what the current \
                 tariff rate is.\n\
                 \n\
                 Detailed instructions:\n\
                 - Check the latest announcements from the Office of the United States Trade \
                 Representative (USTR) and White House executive orders\n\
                 - Confirm whether the reciprocal tariff applies to this code\n\
                 - Record the current applicable tariff rate\n\
                 - Check for product-specific exclusion clauses\n\
                 \n\
                 You may explain your steps; finish with exactly one fenced JSON block in this \
                 format:\n\
                 ```json\n\
                 {{\n\
                   \"applicable\": \"<Y or N>\",\n\
                   \"rate\": \"<rate if Y else 0>\",\n\
                   \"explanation\": \"<reason>\"\n\
                 }}\n\
                 ```"
            ),
        }
    }
}

/// Surcharge rate source backed by a generation backend.
pub struct SurchargeSource {
    backend: Arc<dyn GenerationBackend>,
    authority: SurchargeAuthority,
}

impl SurchargeSource {
    pub fn new(backend: Arc<dyn GenerationBackend>, authority: SurchargeAuthority) -> Self {
        Self { backend, authority }
    }

    /// IEEPA surcharge lookup.
    pub fn emergency_powers(backend: Arc<dyn GenerationBackend>) -> Self {
        Self::new(backend, SurchargeAuthority::EmergencyPowers)
    }

    /// Reciprocal surcharge lookup.
    pub fn reciprocal(backend: Arc<dyn GenerationBackend>) -> Self {
        Self::new(backend, SurchargeAuthority::Reciprocal)
    }
}

/// Extract the last fenced JSON block from a model reply.
///
/// The last block is authoritative: models asked to show their work emit
/// intermediate blocks before the final answer.
fn extract_json_block(reply: &str) -> Option<&str> {
    JSON_FENCE
        .captures_iter(reply)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse a model reply against the surcharge answer contract.
fn parse_answer(reply: &str) -> Result<SurchargeAnswer> {
    let block = extract_json_block(reply).ok_or_else(|| {
        Error::Inference("Reply contained no fenced JSON block".to_string())
    })?;

    serde_json::from_str::<SurchargeAnswer>(block)
        .map_err(|e| Error::Inference(format!("Answer violates surcharge contract: {}", e)))
}

#[async_trait]
impl RateSource for SurchargeSource {
    fn name(&self) -> &str {
        self.authority.name()
    }

    fn display_name(&self) -> &str {
        self.authority.display_name()
    }

    #[instrument(skip(self, _description), fields(subsystem = "rates", component = "surcharge", op = "lookup", source = self.authority.name(), hts_code = hts_code))]
    async fn lookup(&self, hts_code: &str, _description: &str) -> Result<RateQuote> {
        let prompt = self.authority.prompt(hts_code);
        let reply = self.backend.generate(&prompt).await?;
        let answer = parse_answer(&reply)?;

        let rate = if answer.applicable { answer.rate } else { 0.0 };
        let note = if answer.explanation.is_empty() {
            None
        } else {
            Some(answer.explanation)
        };

        debug!(rate, applicable = answer.applicable, "Surcharge lookup complete");
        Ok(RateQuote { rate, note })
    }
}
