//! Renewable generation traces and how they are blended into a single generator profile.
use crate::error::{EngineResult, ensure_config};
use crate::units::Capacity;
use std::borrow::Cow;
use std::ops::Index;
use std::sync::Arc;

/// Number of hours in a normal reference year
pub const HOURS_PER_YEAR: usize = 8760;

/// Number of hours in a leap reference year
pub const HOURS_PER_LEAP_YEAR: usize = 8784;

/// Hourly capacity factors for one resource over a reference year.
///
/// Traces are immutable once loaded and cheap to clone, and may be shared between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationTrace(Arc<[f64]>);

impl GenerationTrace {
    /// Create a new trace from hourly capacity factors
    pub fn new(values: Vec<f64>) -> Self {
        Self(values.into())
    }

    /// The capacity factors as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// The number of hours in the trace
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the trace contains no hours
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the trace covers a whole normal or leap year
    pub fn is_full_year(&self) -> bool {
        matches!(self.len(), HOURS_PER_YEAR | HOURS_PER_LEAP_YEAR)
    }
}

impl Index<usize> for GenerationTrace {
    type Output = f64;

    fn index(&self, hour: usize) -> &f64 {
        &self.0[hour]
    }
}

impl From<Vec<f64>> for GenerationTrace {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// The solar and wind traces for a single location
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationTraces {
    solar: GenerationTrace,
    wind: GenerationTrace,
}

impl GenerationTraces {
    /// Pair up solar and wind traces, checking that they cover the same hours
    pub fn new(solar: GenerationTrace, wind: GenerationTrace) -> EngineResult<Self> {
        ensure_config!(!solar.is_empty(), "Generation traces cannot be empty");
        ensure_config!(
            solar.len() == wind.len(),
            "Solar and wind traces have different lengths ({} vs {} hours)",
            solar.len(),
            wind.len()
        );

        Ok(Self { solar, wind })
    }

    /// The solar capacity factor trace
    pub fn solar(&self) -> &GenerationTrace {
        &self.solar
    }

    /// The wind capacity factor trace
    pub fn wind(&self) -> &GenerationTrace {
        &self.wind
    }

    /// The number of hours covered by the traces
    pub fn hours(&self) -> usize {
        self.solar.len()
    }
}

/// Blend solar and wind traces into one generator trace, weighted by nominal capacity.
///
/// If all of the capacity is of one type, that trace is returned as-is so that no floating-point
/// noise is introduced.
///
/// # Arguments
///
/// * `traces` - Solar and wind traces for the location
/// * `solar_capacity` - Nominal solar capacity
/// * `wind_capacity` - Nominal wind capacity
///
/// # Returns
///
/// The blended hourly capacity factors or an error if there is no generation capacity.
pub fn blend_traces(
    traces: &GenerationTraces,
    solar_capacity: Capacity,
    wind_capacity: Capacity,
) -> EngineResult<Cow<'_, [f64]>> {
    let total = solar_capacity + wind_capacity;
    ensure_config!(
        total > Capacity(0.0),
        "Total generation capacity must be greater than zero"
    );

    let solar_ratio = (solar_capacity / total).value();
    let wind_ratio = (wind_capacity / total).value();
    if solar_ratio == 1.0 {
        return Ok(Cow::Borrowed(traces.solar.as_slice()));
    }
    if wind_ratio == 1.0 {
        return Ok(Cow::Borrowed(traces.wind.as_slice()));
    }

    let blended = traces
        .solar
        .as_slice()
        .iter()
        .zip(traces.wind.as_slice())
        .map(|(solar, wind)| solar * solar_ratio + wind * wind_ratio)
        .collect();

    Ok(Cow::Owned(blended))
}
