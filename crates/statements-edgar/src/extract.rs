//! Company-facts extraction.

use chrono::NaiveDate;
use tracing::debug;

use statements_core::{FactExtractor, PeriodType, RawFact, Unit, dedupe_facts};

use crate::facts::{CompanyFacts, Observation};

/// Taxonomies read by default.
pub const DEFAULT_TAXONOMIES: [&str; 2] = ["us-gaap", "ifrs-full"];

/// Extracts [`RawFact`]s from a [`CompanyFacts`] document.
///
/// Observations without a value or end date are skipped, as are units other than
/// currency, per-share currency and `pure`. Duration facts must fit the period type.
/// When several filings report the same concept and period, the most recently filed
/// observation is kept.
#[derive(Clone, Debug)]
pub struct CompanyFactsExtractor {
    period_type: PeriodType,
    taxonomies: Vec<String>,
}

impl CompanyFactsExtractor {
    /// Creates an extractor for `period_type` over the default taxonomies.
    #[must_use]
    pub fn new(period_type: PeriodType) -> Self {
        Self {
            period_type,
            taxonomies: DEFAULT_TAXONOMIES.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replaces the taxonomies read, in order.
    #[must_use]
    pub fn with_taxonomies<I, S>(mut self, taxonomies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taxonomies = taxonomies.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the period type facts are filtered for.
    #[must_use]
    pub const fn period_type(&self) -> PeriodType {
        self.period_type
    }

    fn observation_to_fact(&self, concept: &str, unit: Unit, obs: &Observation) -> Option<RawFact> {
        let (Some(value), Some(end)) = (obs.val, obs.end.as_deref()) else {
            return None;
        };

        let period_end = match parse_date(end) {
            Some(date) => date,
            None => {
                debug!(concept, end, "Dropping observation with unparseable end date");
                return None;
            }
        };
        let period_start = match obs.start.as_deref() {
            Some(start) => match parse_date(start) {
                Some(date) => Some(date),
                None => {
                    debug!(concept, start, "Dropping observation with unparseable start date");
                    return None;
                }
            },
            None => None,
        };

        let fact = RawFact {
            concept: concept.to_string(),
            value,
            period_end,
            period_start,
            unit,
        };
        self.period_type
            .accepts_duration(fact.duration_days())
            .then_some(fact)
    }
}

impl FactExtractor for CompanyFactsExtractor {
    type Source = CompanyFacts;

    fn extract(&self, source: &CompanyFacts) -> Vec<RawFact> {
        // (filed, fact)
        let mut candidates: Vec<(Option<NaiveDate>, RawFact)> = Vec::new();

        for taxonomy in &self.taxonomies {
            let Some(concepts) = source.facts.get(taxonomy) else {
                continue;
            };
            for (name, concept_facts) in concepts {
                let concept = format!("{taxonomy}:{name}");
                for (unit_name, observations) in &concept_facts.units {
                    let Some(unit) = Unit::from_api_unit(unit_name) else {
                        continue;
                    };
                    for obs in observations {
                        if let Some(fact) = self.observation_to_fact(&concept, unit, obs) {
                            let filed = obs.filed.as_deref().and_then(parse_date);
                            candidates.push((filed, fact));
                        }
                    }
                }
            }
        }

        // Newest filing first so dedupe keeps it; stable for equal dates.
        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        let facts = dedupe_facts(candidates.into_iter().map(|(_, fact)| fact));

        debug!(
            entity = %source.entity_name,
            period_type = %self.period_type,
            facts = facts.len(),
            "Extracted company facts"
        );
        facts
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
