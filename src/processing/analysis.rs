// src/processing/analysis.rs
use std::collections::BTreeMap;
use std::iter;

use anyhow::Result;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::composite::{CompositeSelection, CompositeSelector, SelectionAttempt, SelectorSettings, SOIL_BANDS};
use super::indices::{soil_calculators, IndexCalculator, IndexContext};
use super::reduction::RemoteReduction;
use super::timeseries::{composite_series, CompositeSeries};
use crate::config::EngineConfig;
use crate::engine::RasterEngine;
use crate::error::InputError;
use crate::region::Region;
use crate::scoring::{colorize, interpret, score, Color, IndexName, IndexValue, ScoreSummary};
use crate::utils::ReductionCache;
use crate::window::TimeWindow;

/// Present or absent value per evaluated index.
pub type IndexValues = BTreeMap<IndexName, Option<IndexValue>>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub index: IndexName,
    pub value: Option<IndexValue>,
    pub interpretation: String,
    pub color: Color,
}

impl IndexEntry {
    pub fn new(index: IndexName, value: Option<IndexValue>) -> Self {
        Self {
            index,
            value,
            interpretation: interpret(index, value),
            color: colorize(index, value),
        }
    }
}

/// Result of one soil analysis.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SoilReport {
    /// Window requested by the caller.
    pub window: TimeWindow,
    /// Window of the composite actually used, after any widening.
    pub composite_window: Option<TimeWindow>,
    pub composite_frames: usize,
    pub attempts: Vec<SelectionAttempt>,
    pub entries: Vec<IndexEntry>,
    pub score: ScoreSummary,
}

impl SoilReport {
    pub fn new(window: TimeWindow, selection: CompositeSelection, values: &IndexValues) -> Self {
        let entries: Vec<IndexEntry> = values
            .iter()
            .map(|(&index, &value)| IndexEntry::new(index, value))
            .collect();
        let score = score(values.iter().map(|(&index, &value)| (index, value)));
        let composite = selection.composite.as_ref();

        Self {
            window,
            composite_window: composite.map(|c| c.window()),
            composite_frames: composite.map_or(0, |c| c.frames),
            attempts: selection.attempts,
            entries,
            score,
        }
    }

    pub fn entry(&self, index: IndexName) -> Option<&IndexEntry> {
        self.entries.iter().find(|entry| entry.index == index)
    }

    pub fn value(&self, index: IndexName) -> Option<IndexValue> {
        self.entry(index).and_then(|entry| entry.value)
    }

    pub fn values(&self) -> IndexValues {
        self.entries
            .iter()
            .map(|entry| (entry.index, entry.value))
            .collect()
    }
}

/// Runs soil analyses against one engine.
pub struct SoilAnalyzer<E: RasterEngine> {
    engine: E,
    config: EngineConfig,
    pool: ThreadPool,
    cache: Option<ReductionCache>,
    calculators: Vec<Box<dyn IndexCalculator>>,
}

impl<E: RasterEngine> SoilAnalyzer<E> {
    pub fn new(engine: E, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads())
            .build()?;
        let cache = config.cache_reductions.then(ReductionCache::new);
        let calculators = soil_calculators(&config);

        Ok(Self {
            engine,
            config,
            pool,
            cache,
            calculators,
        })
    }

    /// Replace the default calculator set.
    pub fn with_calculators(mut self, calculators: Vec<Box<dyn IndexCalculator>>) -> Self {
        self.calculators = calculators;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache_size(&self) -> usize {
        self.cache.as_ref().map_or(0, ReductionCache::len)
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    fn reduction(&self) -> RemoteReduction<'_> {
        match &self.cache {
            Some(cache) => RemoteReduction::with_cache(&self.engine, cache),
            None => RemoteReduction::new(&self.engine),
        }
    }

    pub fn select_composite(&self, region: &Region, window: TimeWindow) -> CompositeSelection {
        let reduction = self.reduction();
        CompositeSelector::new(&reduction, SelectorSettings::from(&self.config))
            .select(region, window, &SOIL_BANDS)
    }

    /// Select a composite and evaluate every calculator. Calculators run
    /// concurrently and each fills only its own index slots.
    pub fn evaluate(&self, region: &Region, window: TimeWindow) -> (CompositeSelection, IndexValues) {
        let reduction = self.reduction();
        let selection = CompositeSelector::new(&reduction, SelectorSettings::from(&self.config))
            .select(region, window, &SOIL_BANDS);

        let ctx = IndexContext {
            reduction: &reduction,
            composite: selection.composite.as_ref(),
            region,
            window,
            config: &self.config,
        };

        let results: Vec<Vec<(IndexName, Option<IndexValue>)>> = self.pool.install(|| {
            self.calculators
                .par_iter()
                .map(|calculator| {
                    let values = calculator.calculate(&ctx);
                    calculator
                        .outputs()
                        .iter()
                        .copied()
                        .zip(values.into_iter().chain(iter::repeat(None)))
                        .collect()
                })
                .collect()
        });

        let values: IndexValues = results.into_iter().flatten().collect();
        (selection, values)
    }

    pub fn analyze(&self, region: &Region, window: TimeWindow) -> SoilReport {
        let (selection, values) = self.evaluate(region, window);
        let report = SoilReport::new(window, selection, &values);
        info!(
            "Soil health {:.1}% ({}) from {}/{} indices",
            report.score.percentage,
            report.score.rating,
            report.score.evaluated,
            values.len()
        );
        report
    }

    /// Per-period composite index series over `window`.
    pub fn series(
        &self,
        region: &Region,
        window: TimeWindow,
        period_days: u32,
    ) -> Result<CompositeSeries, InputError> {
        let reduction = self.reduction();
        composite_series(&reduction, region, window, period_days, &self.config)
    }
}
