//! Named views built from a snapshot.
//!
//! The assembler picks the entities for a request (one entity, or the top-N
//! "world" set), runs the primitives from the sibling modules and returns
//! ordered series ready to plot.

use std::fmt;
use std::num::NonZeroUsize;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{
    ChartKind, DerivedSecondary, DerivedSeries, EntitySeries, Metric, RankedEntity, SeriesX, Snapshot, ViewKind,
};
use crate::stats::mortality::{mortality_rate, mortality_series, top_mortality_rates};
use crate::stats::normalize::{LeadingZeros, dated_deltas, deltas, first_started};
use crate::stats::per_capita::{DisplayThreshold, PER_CAPITA_UNIT, PopulationLookup, per_million};
use crate::stats::ranking::{DEFAULT_TOP_N, top_n, top_series};
use crate::stats::rolling::{WEEK, rolling_average};

/// Tunables for view assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Entity count for world views and rankings.
    pub top_n: usize,
    /// Rolling average window (days).
    pub window: NonZeroUsize,
    /// Minimum sample value drawn in averaged and per-capita views.
    pub threshold: DisplayThreshold,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            window: WEEK,
            threshold: DisplayThreshold::DEFAULT,
        }
    }
}

/// Which entities a view covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The top-N entities for the requested metric.
    World,
    /// A single entity by snapshot name.
    Entity(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub chart: ChartKind,
    pub scope: Scope,
}

impl ViewRequest {
    pub fn world(view: ViewKind, metric: Metric) -> Self {
        Self {
            chart: ChartKind::new(view, metric),
            scope: Scope::World,
        }
    }

    pub fn entity(view: ViewKind, metric: Metric, name: impl Into<String>) -> Self {
        Self {
            chart: ChartKind::new(view, metric),
            scope: Scope::Entity(name.into()),
        }
    }
}

/// Assembled output of a view.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// One line per entity, in ranking order.
    Lines(Vec<DerivedSeries>),
    /// Bar-chart-ready ranking: ascending, so the largest value comes last.
    Bars(Vec<RankedEntity>),
}

impl View {
    pub fn is_empty(&self) -> bool {
        match self {
            View::Lines(lines) => lines.iter().all(DerivedSeries::is_empty),
            View::Bars(bars) => bars.is_empty(),
        }
    }
}

/// Why a view has no data. Never fatal: callers report it or fall back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The snapshot could not be fetched or holds no entities.
    NoSnapshot,
    /// The requested entity is not in the snapshot.
    UnknownEntity(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::NoSnapshot => write!(f, "Data is not available right now."),
            Unavailable::UnknownEntity(name) => write!(f, "No data for '{name}'."),
        }
    }
}

/// Latest numbers for one entity (used for text replies).
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySummary {
    pub name: String,
    pub date: NaiveDate,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
    pub new_confirmed: u64,
    pub new_deaths: u64,
    pub new_recovered: u64,
    /// Latest mortality in percent; `None` when nothing is confirmed.
    pub mortality_pct: Option<f64>,
}

/// How per-capita series label their x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XAxis {
    Dates,
    /// Day number since the first displayed sample, so entities line up.
    DayNumber,
}

/// Orchestrates the derived views over a population source.
pub struct SeriesAssembler<'p> {
    population: &'p dyn PopulationLookup,
    config: AssemblerConfig,
}

impl<'p> SeriesAssembler<'p> {
    pub fn new(population: &'p dyn PopulationLookup, config: AssemblerConfig) -> Self {
        Self { population, config }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Build the requested view.
    ///
    /// A missing snapshot or unknown entity is reported as `Unavailable`;
    /// entities without population data are silently dropped from
    /// per-capita views.
    pub fn assemble(&self, snapshot: Option<&Snapshot>, request: &ViewRequest) -> Result<View, Unavailable> {
        let snapshot = match snapshot {
            Some(s) if !s.is_empty() => s,
            _ => return Err(Unavailable::NoSnapshot),
        };

        let metric = request.chart.metric;
        let view = request.chart.view;
        let single = matches!(request.scope, Scope::Entity(_));
        let entities = self.select_entities(snapshot, request)?;

        let out = match view {
            ViewKind::Total => View::Lines(
                entities
                    .iter()
                    .map(|e| total_series(e, metric, single && metric == Metric::Confirmed))
                    .collect(),
            ),
            ViewKind::Daily => View::Lines(
                entities
                    .iter()
                    .map(|e| daily_series(e, metric, single && metric == Metric::Confirmed))
                    .collect(),
            ),
            ViewKind::Week => View::Lines(
                entities
                    .iter()
                    .map(|e| week_average_series(e, metric, self.config.window, self.config.threshold))
                    .collect(),
            ),
            ViewKind::PerMillion => {
                let axis = if single { XAxis::Dates } else { XAxis::DayNumber };
                View::Lines(
                    entities
                        .iter()
                        .filter_map(|e| {
                            let population = self.population.population(&e.name);
                            let series = per_million_series(
                                e,
                                metric,
                                population,
                                self.config.window,
                                self.config.threshold,
                                axis,
                            );
                            if series.is_none() {
                                debug!(entity = %e.name, population, "no per-capita view (population unknown)");
                            }
                            series
                        })
                        .collect(),
                )
            }
            ViewKind::Bar => {
                let mut bars: Vec<RankedEntity> = match &request.scope {
                    Scope::World => top_n(snapshot, metric, self.config.top_n),
                    Scope::Entity(_) => entities
                        .iter()
                        .filter_map(|e| {
                            e.latest().map(|r| RankedEntity {
                                name: e.name.clone(),
                                value: r.value(metric),
                            })
                        })
                        .collect(),
                };
                bars.reverse();
                View::Bars(bars)
            }
            ViewKind::Mortality => View::Lines(entities.iter().map(|e| mortality_rate_series(e)).collect()),
        };

        Ok(out)
    }

    fn select_entities<'s>(
        &self,
        snapshot: &'s Snapshot,
        request: &ViewRequest,
    ) -> Result<Vec<&'s EntitySeries>, Unavailable> {
        match &request.scope {
            Scope::Entity(name) => snapshot
                .get(name)
                .map(|e| vec![e])
                .ok_or_else(|| Unavailable::UnknownEntity(name.clone())),
            Scope::World if request.chart.view == ViewKind::Mortality => Ok(top_mortality_rates(
                snapshot,
                self.config.top_n,
            )
            .iter()
            .filter_map(|r| snapshot.get(&r.name))
            .collect()),
            Scope::World => Ok(top_series(snapshot, request.chart.metric, self.config.top_n)),
        }
    }

    /// Latest cumulative numbers and daily changes for one entity.
    pub fn summary(&self, snapshot: Option<&Snapshot>, name: &str) -> Result<EntitySummary, Unavailable> {
        let snapshot = match snapshot {
            Some(s) if !s.is_empty() => s,
            _ => return Err(Unavailable::NoSnapshot),
        };
        let entity = snapshot
            .get(name)
            .ok_or_else(|| Unavailable::UnknownEntity(name.to_string()))?;
        summarize(entity).ok_or_else(|| Unavailable::UnknownEntity(name.to_string()))
    }
}

/// Raw cumulative values, starting at the first non-zero record.
///
/// With `with_recovered`, the recovered totals of the same dates ride along
/// as the secondary series.
pub fn total_series(entity: &EntitySeries, metric: Metric, with_recovered: bool) -> DerivedSeries {
    let mut series = DerivedSeries::new(&entity.name);
    let values = entity.values(metric);
    let Some(start) = first_started(&values) else {
        return series;
    };

    for (record, &value) in entity.records[start..].iter().zip(&values[start..]) {
        series.push(SeriesX::Date(record.date), value as f64);
    }

    if with_recovered {
        series.secondary = Some(DerivedSecondary {
            label: Metric::Recovered.title().to_string(),
            y: entity.records[start..]
                .iter()
                .map(|r| r.recovered as f64)
                .collect(),
        });
    }
    series
}

/// Daily deltas after the outbreak start (skip-leading-zeros mode).
pub fn daily_series(entity: &EntitySeries, metric: Metric, with_recovered: bool) -> DerivedSeries {
    let mut series = DerivedSeries::new(&entity.name);
    let values = entity.values(metric);
    let Some(start) = first_started(&values) else {
        return series;
    };

    for (date, delta) in dated_deltas(&entity.records, metric, LeadingZeros::Skip) {
        series.push(SeriesX::Date(date), delta as f64);
    }

    if with_recovered {
        let recovered = deltas(&entity.values(Metric::Recovered));
        series.secondary = Some(DerivedSecondary {
            label: Metric::Recovered.title().to_string(),
            y: recovered[start..].iter().map(|&d| d as f64).collect(),
        });
    }
    series
}

/// Rolling average of the daily deltas; samples under the threshold are left out.
pub fn week_average_series(
    entity: &EntitySeries,
    metric: Metric,
    window: NonZeroUsize,
    threshold: DisplayThreshold,
) -> DerivedSeries {
    let mut series = DerivedSeries::new(&entity.name);
    for (date, avg) in averaged(entity, metric, window) {
        if threshold.meets(avg) {
            series.push(SeriesX::Date(date), avg as f64);
        }
    }
    series
}

/// Rolling average rescaled per million inhabitants.
///
/// `None` when the population is unknown or under one million.
pub fn per_million_series(
    entity: &EntitySeries,
    metric: Metric,
    population: u64,
    window: NonZeroUsize,
    threshold: DisplayThreshold,
    axis: XAxis,
) -> Option<DerivedSeries> {
    if population < PER_CAPITA_UNIT {
        return None;
    }

    let mut series = DerivedSeries::new(&entity.name);
    let mut day: u32 = 0;
    for (date, avg) in averaged(entity, metric, window) {
        let value = per_million(avg, population)?;
        if !threshold.meets(value) {
            continue;
        }
        day += 1;
        let x = match axis {
            XAxis::Dates => SeriesX::Date(date),
            XAxis::DayNumber => SeriesX::Day(day),
        };
        series.push(x, value as f64);
    }
    Some(series)
}

/// Mortality in percent for every date with confirmed cases.
pub fn mortality_rate_series(entity: &EntitySeries) -> DerivedSeries {
    let mut series = DerivedSeries::new(&entity.name);
    for (date, pct) in mortality_series(&entity.records) {
        series.push(SeriesX::Date(date), pct);
    }
    series
}

fn averaged(entity: &EntitySeries, metric: Metric, window: NonZeroUsize) -> Vec<(NaiveDate, u64)> {
    let dated = dated_deltas(&entity.records, metric, LeadingZeros::Skip);
    let values: Vec<u64> = dated.iter().map(|(_, d)| *d).collect();
    let avg = rolling_average(&values, window);
    dated.into_iter().map(|(date, _)| date).zip(avg).collect()
}

fn summarize(entity: &EntitySeries) -> Option<EntitySummary> {
    let latest = entity.latest()?;
    let prev = entity
        .records
        .len()
        .checked_sub(2)
        .and_then(|idx| entity.records.get(idx));
    let change = |metric: Metric| match prev {
        Some(p) => latest.value(metric).saturating_sub(p.value(metric)),
        None => latest.value(metric),
    };

    Some(EntitySummary {
        name: entity.name.clone(),
        date: latest.date,
        confirmed: latest.confirmed,
        deaths: latest.deaths,
        recovered: latest.recovered,
        new_confirmed: change(Metric::Confirmed),
        new_deaths: change(Metric::Deaths),
        new_recovered: change(Metric::Recovered),
        mortality_pct: mortality_rate(latest.confirmed, latest.deaths).map(|r| r * 100.0),
    })
}
