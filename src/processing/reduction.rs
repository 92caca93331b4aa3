// src/processing/reduction.rs
//! The single place where engine failures become absent values.
//!
//! Index calculators go through [`RemoteReduction`] for every engine call.
//! `try_*` methods return the classified [`IndexError`]; the plain methods
//! log it and return `None`.

use tracing::{debug, warn};

use crate::engine::{ImageQuery, RasterEngine, ReduceRequest, Statistics};
use crate::error::IndexError;
use crate::utils::ReductionCache;

pub struct RemoteReduction<'a> {
    engine: &'a dyn RasterEngine,
    cache: Option<&'a ReductionCache>,
}

impl<'a> RemoteReduction<'a> {
    pub fn new(engine: &'a dyn RasterEngine) -> Self {
        Self {
            engine,
            cache: None,
        }
    }

    pub fn with_cache(engine: &'a dyn RasterEngine, cache: &'a ReductionCache) -> Self {
        Self {
            engine,
            cache: Some(cache),
        }
    }

    pub fn engine(&self) -> &'a dyn RasterEngine {
        self.engine
    }

    pub fn try_count(&self, query: &ImageQuery) -> Result<usize, IndexError> {
        Ok(self.engine.count(query)?)
    }

    pub fn try_statistics(&self, request: &ReduceRequest) -> Result<Statistics, IndexError> {
        if let Some(stats) = self.cache.and_then(|cache| cache.get(request)) {
            debug!("reduction cache hit");
            return Ok(stats);
        }
        let stats = self.engine.reduce(request)?;
        if let Some(cache) = self.cache {
            cache.insert(request, stats.clone());
        }
        Ok(stats)
    }

    /// Pull one statistic out of a response, classifying missing and null.
    pub fn extract(stats: &Statistics, statistic: &str) -> Result<f64, IndexError> {
        match stats.get(statistic) {
            None => Err(IndexError::MalformedResponse {
                statistic: statistic.to_string(),
            }),
            Some(None) => Err(IndexError::Empty {
                statistic: statistic.to_string(),
            }),
            Some(Some(value)) if value.is_finite() => Ok(value),
            Some(Some(_)) => Err(IndexError::Empty {
                statistic: statistic.to_string(),
            }),
        }
    }

    pub fn try_scalar(&self, request: &ReduceRequest, statistic: &str) -> Result<f64, IndexError> {
        let stats = self.try_statistics(request)?;
        Self::extract(&stats, statistic)
    }

    /// Reduce to one scalar; any failure is logged under `label` and
    /// becomes `None`.
    pub fn scalar(&self, request: &ReduceRequest, statistic: &str, label: &str) -> Option<f64> {
        absent_on_error(self.try_scalar(request, statistic), label)
    }

    /// Reduce several outputs in one call. A failed call makes every output
    /// absent; a missing or null output only affects itself.
    pub fn scalars(
        &self,
        request: &ReduceRequest,
        statistics: &[&str],
        label: &str,
    ) -> Vec<Option<f64>> {
        match self.try_statistics(request) {
            Ok(stats) => statistics
                .iter()
                .map(|name| absent_on_error(Self::extract(&stats, name), name))
                .collect(),
            Err(e) => {
                warn!("Failed to fetch {label}: {e}");
                vec![None; statistics.len()]
            }
        }
    }
}

/// Log a failed fetch and turn it into an absent value.
pub fn absent_on_error<T>(result: Result<T, IndexError>, label: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to fetch {label}: {e}");
            None
        }
    }
}
