//! The normalization engine.
//!
//! [`Normalizer::normalize`] turns a fact set into a [`NormalizedStatement`]:
//!
//! 1. Facts are partitioned by catalog group: each fact belongs to the first group that
//!    lists its concept. Facts whose concept is not listed or whose duration does not
//!    fit the requested period type are discarded.
//! 2. The fiscal-year-end month is inferred from the period ends of every partitioned
//!    fact, whatever its statement. The periods to report are then selected among the
//!    ends of the requested statement's facts.
//! 3. Every in-scope group with at least one own fact in a selected period becomes a
//!    metric. Each cell is resolved through the group's own facts by synonym rank, then
//!    through its substitutes.
//! 4. Metrics are ordered by category, then by the catalog's intra-category order.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::{
    catalog::{ConceptCatalog, ConceptGroup},
    fiscal::infer_fiscal_month,
    request::StatementRequest,
    select::select_periods,
    statement::{
        InsufficiencyReason, InsufficientData, Metadata, Metric, Normalization,
        NormalizedStatement, Provenance,
    },
    types::RawFact,
};

/// Builds normalized statements against a concept catalog.
///
/// The normalizer holds no per-request state and can be shared across threads.
#[derive(Clone, Copy, Debug)]
pub struct Normalizer<'a> {
    catalog: &'a ConceptCatalog,
}

impl Default for Normalizer<'static> {
    fn default() -> Self {
        Self::new(ConceptCatalog::standard())
    }
}

impl<'a> Normalizer<'a> {
    /// Creates a normalizer over `catalog`.
    #[must_use]
    pub const fn new(catalog: &'a ConceptCatalog) -> Self {
        Self { catalog }
    }

    /// Returns the catalog this normalizer resolves concepts against.
    #[must_use]
    pub const fn catalog(&self) -> &'a ConceptCatalog {
        self.catalog
    }

    /// Normalizes `facts` into the statement described by `request`.
    pub fn normalize(&self, facts: &[RawFact], request: &StatementRequest) -> Normalization {
        let insufficient = |reason: InsufficiencyReason| {
            debug!(
                statement_type = %request.statement_type(),
                period_type = %request.period_type(),
                %reason,
                "Insufficient data for statement"
            );
            Normalization::InsufficientData(InsufficientData {
                reason,
                statement_type: request.statement_type(),
                period_type: request.period_type(),
            })
        };

        if facts.is_empty() {
            return insufficient(InsufficiencyReason::NoFacts);
        }

        let partition = self.partition(facts, request);
        if partition.ordered.is_empty() {
            return insufficient(InsufficiencyReason::NoCatalogMatches { facts: facts.len() });
        }

        let fiscal_month = infer_fiscal_month(partition.fiscal_ends.iter().copied());
        let available: BTreeSet<NaiveDate> =
            partition.ordered.iter().map(|f| f.period_end).collect();
        let periods = select_periods(
            &available,
            request.period_type(),
            fiscal_month,
            request.num_periods(),
        );
        if periods.is_empty() {
            return insufficient(InsufficiencyReason::NoPeriods);
        }

        let mut metrics: Vec<Metric> = self
            .catalog
            .groups_for(request.statement_type())
            .filter_map(|(index, group)| partition.build_metric(index, group, &periods))
            .collect();
        // stable: catalog position breaks ties
        metrics.sort_by_key(|m| (m.category, m.order));

        debug!(
            statement_type = %request.statement_type(),
            fiscal_month,
            periods = periods.len(),
            metrics = metrics.len(),
            "Normalized statement"
        );

        Normalization::Complete(NormalizedStatement {
            periods,
            metrics,
            metadata: Metadata {
                fiscal_year_end_month: fiscal_month,
                period_type: request.period_type(),
                statement_type: request.statement_type(),
            },
        })
    }

    fn partition<'f>(&self, facts: &'f [RawFact], request: &StatementRequest) -> Partition<'f> {
        let statement_type = request.statement_type();
        let period_type = request.period_type();

        let mut partition = Partition::default();
        let mut wrong_duration = 0usize;
        for fact in facts {
            let Some((index, group)) = self.catalog.group_for(&fact.concept) else {
                continue;
            };
            if !period_type.accepts_duration(fact.duration_days()) {
                wrong_duration += 1;
                continue;
            }
            partition.fiscal_ends.push(fact.period_end);
            if !statement_type.includes(group.category) {
                continue;
            }
            partition.ordered.push(fact);
            partition.by_group.entry(index).or_default().push(fact);
            partition
                .by_concept
                .entry(fact.local_name())
                .or_default()
                .push(fact);
        }

        if wrong_duration > 0 {
            debug!(
                dropped = wrong_duration,
                %period_type,
                "Dropped facts with durations outside the period type"
            );
        }
        partition
    }
}

/// Facts that survived partitioning.
#[derive(Default)]
struct Partition<'f> {
    /// Period ends of every catalog fact, in or out of the requested statement.
    fiscal_ends: Vec<NaiveDate>,
    /// In-scope facts in input order.
    ordered: Vec<&'f RawFact>,
    /// In-scope facts by owning group index.
    by_group: HashMap<usize, Vec<&'f RawFact>>,
    /// In-scope facts by local concept name, for substitutes.
    by_concept: HashMap<&'f str, Vec<&'f RawFact>>,
}

/// Whether `fact` should replace `current` for the same period: longer durations win
/// over shorter ones and instants, ties keep input order.
fn longer(fact: &RawFact, current: &RawFact) -> bool {
    fact.duration_days().unwrap_or(0) > current.duration_days().unwrap_or(0)
}

impl<'f> Partition<'f> {
    fn own_facts(&self, index: usize) -> &[&'f RawFact] {
        self.by_group.get(&index).map(Vec::as_slice).unwrap_or_default()
    }

    /// Picks the substitute fact of `concept` ending on `period`.
    fn lookup(&self, concept: &str, period: NaiveDate) -> Option<&'f RawFact> {
        let mut best: Option<&'f RawFact> = None;
        for fact in self.by_concept.get(concept)?.iter().copied() {
            if fact.period_end == period && best.is_none_or(|b| longer(fact, b)) {
                best = Some(fact);
            }
        }
        best
    }

    fn resolve(
        &self,
        index: usize,
        group: &ConceptGroup,
        period: NaiveDate,
    ) -> Option<(f64, Provenance)> {
        // lowest synonym rank first, then the longest duration
        let mut best: Option<(usize, &'f RawFact)> = None;
        for fact in self.own_facts(index).iter().copied() {
            if fact.period_end != period {
                continue;
            }
            let Some(rank) = group.synonym_rank(&fact.concept) else {
                continue;
            };
            let better = best.is_none_or(|(best_rank, b)| {
                rank < best_rank || (rank == best_rank && longer(fact, b))
            });
            if better {
                best = Some((rank, fact));
            }
        }
        if let Some((rank, fact)) = best {
            let provenance = if rank == 0 {
                Provenance::Reported
            } else {
                Provenance::Synonym(fact.concept.clone())
            };
            return Some((fact.value, provenance));
        }

        for substitute in group.substitutes {
            if let Some(fact) = self.lookup(substitute, period) {
                debug!(
                    group = group.key,
                    substitute = %fact.concept,
                    %period,
                    "Substituting related concept"
                );
                return Some((fact.value, Provenance::Substituted(fact.concept.clone())));
            }
        }
        None
    }

    fn build_metric(
        &self,
        index: usize,
        group: &ConceptGroup,
        periods: &[NaiveDate],
    ) -> Option<Metric> {
        let own = self.own_facts(index);
        if !own.iter().any(|f| periods.contains(&f.period_end)) {
            return None;
        }

        let mut values = BTreeMap::new();
        let mut provenance = BTreeMap::new();
        for &period in periods {
            match self.resolve(index, group, period) {
                Some((value, origin)) => {
                    values.insert(period, Some(value));
                    provenance.insert(period, origin);
                }
                None => {
                    values.insert(period, None);
                }
            }
        }

        Some(Metric {
            key: group.metric_key(),
            label: group.label.to_string(),
            group: group.key.to_string(),
            category: group.category,
            order: group.order,
            values,
            provenance,
        })
    }
}
