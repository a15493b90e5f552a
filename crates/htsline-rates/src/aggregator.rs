//! Aggregation of independently-fallible rate sources.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use htsline_catalog::{extract_rate, Catalog};
use htsline_core::{
    defaults, AggregatedRateSet, RateQuote, RateSource, RateSourceResult, Result,
};

/// Combines the catalog base rate with the three external rate signals for
/// one classification code.
///
/// The source set is fixed at construction: one trade-remedy slot and two
/// surcharge slots. Lookups run concurrently and each failure is absorbed at
/// this boundary as a zero contribution with a failed provenance entry; an
/// aggregation run never fails because a source did. Repeated calls with the
/// same inputs vary only with the real-world sources, never with the
/// aggregation logic.
pub struct RateAggregator {
    catalog: Arc<Catalog>,
    remedy: Arc<dyn RateSource>,
    emergency: Arc<dyn RateSource>,
    reciprocal: Arc<dyn RateSource>,
}

impl RateAggregator {
    pub fn new(
        catalog: Arc<Catalog>,
        remedy: Arc<dyn RateSource>,
        emergency: Arc<dyn RateSource>,
        reciprocal: Arc<dyn RateSource>,
    ) -> Self {
        Self {
            catalog,
            remedy,
            emergency,
            reciprocal,
        }
    }

    /// Build the combined rate picture for `hs_code`.
    ///
    /// Any country other than the supported trade partner short-circuits to
    /// an all-zero result with an explanatory status; no external lookups
    /// are issued. This is a scope restriction, not a failure.
    #[instrument(skip(self, description), fields(subsystem = "rates", component = "aggregator", op = "aggregate", hts_code = hs_code, country = country))]
    pub async fn aggregate(
        &self,
        hs_code: &str,
        description: &str,
        country: &str,
    ) -> AggregatedRateSet {
        if country != defaults::SUPPORTED_COUNTRY {
            debug!("Unsupported country of origin; returning zero result");
            return AggregatedRateSet::unsupported_country(hs_code, description, country);
        }

        let start = Instant::now();
        let mut sources = Vec::with_capacity(4);

        let general_rate = match self.catalog.get(hs_code) {
            Some(record) => {
                let rate = extract_rate(&record.general);
                sources.push(RateSourceResult::succeeded(
                    "Basic duty rate",
                    rate,
                    Some("Harmonized Tariff Schedule".to_string()),
                ));
                rate
            }
            None => {
                debug!("Code not in catalog; base rate is 0");
                0.0
            }
        };

        // Fan-out: the three external lookups are independent and merge into
        // fixed slots, so a failed or cancelled lookup degrades exactly like
        // a zero-rate answer.
        let (remedy_res, emergency_res, reciprocal_res) = tokio::join!(
            self.remedy.lookup(hs_code, description),
            self.emergency.lookup(hs_code, description),
            self.reciprocal.lookup(hs_code, description),
        );

        let (section_301_rate, entry) = settle(self.remedy.as_ref(), remedy_res);
        sources.push(entry);
        let (ieepa_rate, entry) = settle(self.emergency.as_ref(), emergency_res);
        sources.push(entry);
        let (reciprocal_rate, entry) = settle(self.reciprocal.as_ref(), reciprocal_res);
        sources.push(entry);

        let set = AggregatedRateSet {
            hs_code: hs_code.to_string(),
            description: description.to_string(),
            country_of_origin: country.to_string(),
            general_rate,
            section_301_rate,
            ieepa_rate,
            reciprocal_rate,
            sources,
            status: "success".to_string(),
        };

        info!(
            rate = set.total_rate(),
            result_count = set.sources.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Rate aggregation complete"
        );
        set
    }
}

/// Fold one source's outcome into (contributed rate, provenance entry).
fn settle(source: &dyn RateSource, result: Result<RateQuote>) -> (f64, RateSourceResult) {
    match result {
        Ok(quote) => (
            quote.rate,
            RateSourceResult::succeeded(source.display_name(), quote.rate, quote.note),
        ),
        Err(e) => {
            warn!(
                source = source.name(),
                error = %e,
                "Rate source failed; contributing 0"
            );
            (0.0, RateSourceResult::failed(source.display_name(), e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use htsline_core::{Error, HtsRecord};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed-outcome source for aggregator tests.
    struct StubSource {
        name: &'static str,
        display: &'static str,
        outcome: std::result::Result<f64, String>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn ok(name: &'static str, display: &'static str, rate: f64) -> Arc<Self> {
            Arc::new(Self {
                name,
                display,
                outcome: Ok(rate),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, display: &'static str, msg: &str) -> Arc<Self> {
            Arc::new(Self {
                name,
                display,
                outcome: Err(msg.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateSource for StubSource {
        fn name(&self) -> &str {
            self.name
        }

        fn display_name(&self) -> &str {
            self.display
        }

        async fn lookup(&self, _hs_code: &str, _description: &str) -> Result<RateQuote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Ok(rate) => Ok(RateQuote {
                    rate: *rate,
                    note: None,
                }),
                Err(msg) => Err(Error::Request(msg.clone())),
            }
        }
    }

    fn catalog_with_sofa() -> Arc<Catalog> {
        Arc::new(
            Catalog::from_records(vec![HtsRecord {
                htsno: "9401.61.0000".to_string(),
                description: "Upholstered seats with wooden frames".to_string(),
                general: "2.5%".to_string(),
                embedding: vec![1.0, 0.0],
            }])
            .unwrap(),
        )
    }

    fn aggregator(
        remedy: Arc<StubSource>,
        emergency: Arc<StubSource>,
        reciprocal: Arc<StubSource>,
    ) -> RateAggregator {
        RateAggregator::new(catalog_with_sofa(), remedy, emergency, reciprocal)
    }

    #[tokio::test]
    async fn total_is_sum_of_all_sources() {
        let agg = aggregator(
            StubSource::ok("section_301", "Section 301 tariff", 7.5),
            StubSource::ok("ieepa", "IEEPA tariff", 20.0),
            StubSource::ok("reciprocal", "Reciprocal tariff", 125.0),
        );

        let set = agg.aggregate("9401.61.0000", "Sofa", "CN").await;
        assert_eq!(set.general_rate, 2.5);
        assert_eq!(set.section_301_rate, 7.5);
        assert_eq!(set.ieepa_rate, 20.0);
        assert_eq!(set.reciprocal_rate, 125.0);
        assert_eq!(set.total_rate(), 155.0);
        assert_eq!(set.status, "success");
        assert_eq!(set.sources.len(), 4);
        assert!(set.sources.iter().all(|s| s.succeeded));
    }

    #[tokio::test]
    async fn failing_source_contributes_exactly_zero() {
        let agg = aggregator(
            StubSource::failing("section_301", "Section 301 tariff", "timed out"),
            StubSource::ok("ieepa", "IEEPA tariff", 20.0),
            StubSource::ok("reciprocal", "Reciprocal tariff", 125.0),
        );

        let set = agg.aggregate("9401.61.0000", "Sofa", "CN").await;
        assert_eq!(set.section_301_rate, 0.0);
        // The other sources are unaffected.
        assert_eq!(set.ieepa_rate, 20.0);
        assert_eq!(set.reciprocal_rate, 125.0);
        assert_eq!(set.total_rate(), 147.5);
        assert_eq!(set.status, "success");

        let failed: Vec<_> = set.sources.iter().filter(|s| !s.succeeded).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "Section 301 tariff");
        assert!(failed[0].note.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn all_sources_failing_still_returns_base_rate() {
        let agg = aggregator(
            StubSource::failing("section_301", "Section 301 tariff", "down"),
            StubSource::failing("ieepa", "IEEPA tariff", "down"),
            StubSource::failing("reciprocal", "Reciprocal tariff", "down"),
        );

        let set = agg.aggregate("9401.61.0000", "Sofa", "CN").await;
        assert_eq!(set.total_rate(), 2.5);
        assert_eq!(set.status, "success");
        assert_eq!(set.sources.len(), 4);
    }

    #[tokio::test]
    async fn unsupported_country_short_circuits() {
        let remedy = StubSource::ok("section_301", "Section 301 tariff", 7.5);
        let emergency = StubSource::ok("ieepa", "IEEPA tariff", 20.0);
        let reciprocal = StubSource::ok("reciprocal", "Reciprocal tariff", 125.0);
        let agg = aggregator(remedy.clone(), emergency.clone(), reciprocal.clone());

        let set = agg.aggregate("9401.61.0000", "Sofa", "DE").await;
        assert_eq!(set.total_rate(), 0.0);
        assert!(set.status.contains("CN"));
        assert!(set.sources.is_empty());
        // No external lookups were issued.
        assert_eq!(remedy.call_count(), 0);
        assert_eq!(emergency.call_count(), 0);
        assert_eq!(reciprocal.call_count(), 0);
    }

    #[tokio::test]
    async fn base_rate_round_trips_catalog_parse() {
        let agg = aggregator(
            StubSource::ok("section_301", "Section 301 tariff", 0.0),
            StubSource::ok("ieepa", "IEEPA tariff", 0.0),
            StubSource::ok("reciprocal", "Reciprocal tariff", 0.0),
        );

        let set = agg.aggregate("9401.61.0000", "Sofa", "CN").await;
        let catalog = catalog_with_sofa();
        let expected = extract_rate(&catalog.get("9401.61.0000").unwrap().general);
        assert_eq!(set.general_rate, expected);

        let base = set
            .sources
            .iter()
            .find(|s| s.name == "Basic duty rate")
            .unwrap();
        assert_eq!(base.rate, expected);
        assert_eq!(base.note.as_deref(), Some("Harmonized Tariff Schedule"));
    }

    #[tokio::test]
    async fn unknown_code_has_zero_base_and_no_base_entry() {
        let agg = aggregator(
            StubSource::ok("section_301", "Section 301 tariff", 7.5),
            StubSource::ok("ieepa", "IEEPA tariff", 20.0),
            StubSource::ok("reciprocal", "Reciprocal tariff", 0.0),
        );

        let set = agg.aggregate("0000.00.0000", "Mystery goods", "CN").await;
        assert_eq!(set.general_rate, 0.0);
        assert!(set.sources.iter().all(|s| s.name != "Basic duty rate"));
        // External sources still contribute.
        assert_eq!(set.total_rate(), 27.5);
    }
}
