//! Simulating a year of hourly plant operation for one capacity configuration.
use crate::dispatch::{BatterySpec, DispatchInputs, LoadBounds, OverloadSpec, dispatch};
use crate::error::{EngineResult, ensure_config};
use crate::fuel::{ElectrolyserPerformance, SpecificConsumptionType, hydrogen_output};
use crate::generation::{GenerationTraces, blend_traces};
use crate::units::{Capacity, Energy, Hours, Mass};

/// The physical configuration of the plant
#[derive(Debug, Clone, PartialEq)]
pub struct PlantConfiguration {
    /// Nominal solar capacity
    pub solar_capacity: Capacity,
    /// Nominal wind capacity
    pub wind_capacity: Capacity,
    /// Electrolyser nameplate capacity
    pub electrolyser_capacity: Capacity,
    /// Electrolyser load bounds
    pub load: LoadBounds,
    /// Overload parameters, if the electrolyser may be overloaded
    pub overload: Option<OverloadSpec>,
    /// The battery, if there is one
    pub battery: Option<BatterySpec>,
    /// Electrolyser performance
    pub performance: ElectrolyserPerformance,
}

impl PlantConfiguration {
    /// Total nominal generation capacity
    pub fn generation_capacity(&self) -> Capacity {
        self.solar_capacity + self.wind_capacity
    }

    /// The battery, if one is present with non-zero power
    pub fn active_battery(&self) -> Option<&BatterySpec> {
        self.battery.as_ref().filter(|battery| battery.is_enabled())
    }
}

/// Hourly operation of the plant over the reference year.
///
/// All series have one entry per hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyOperationSeries {
    /// Blended generator capacity factor
    pub generator_cf: Vec<f64>,
    /// Electrolyser capacity factor
    pub electrolyser_cf: Vec<f64>,
    /// Hydrogen output with fixed specific consumption
    pub hydrogen_fixed: Vec<Mass>,
    /// Hydrogen output with load-dependent specific consumption
    pub hydrogen_variable: Vec<Mass>,
    /// Battery state of charge at the end of the hour
    pub battery_soc: Vec<f64>,
    /// Generation used by neither the electrolyser nor the battery
    pub surplus_energy: Vec<Energy>,
}

impl HourlyOperationSeries {
    /// The number of hours simulated
    pub fn hours(&self) -> usize {
        self.electrolyser_cf.len()
    }

    /// Hourly hydrogen output for the given consumption type
    pub fn hydrogen_output(&self, consumption_type: SpecificConsumptionType) -> &[Mass] {
        match consumption_type {
            SpecificConsumptionType::Fixed => &self.hydrogen_fixed,
            SpecificConsumptionType::Variable => &self.hydrogen_variable,
        }
    }

    /// Total generation over the year
    pub fn generation_energy(&self, generation_capacity: Capacity) -> Energy {
        generation_capacity * Hours(self.generator_cf.iter().sum())
    }

    /// Total electricity consumed by the electrolyser over the year
    pub fn electrolyser_energy(&self, electrolyser_capacity: Capacity) -> Energy {
        electrolyser_capacity * Hours(self.electrolyser_cf.iter().sum())
    }

    /// Total surplus generation over the year
    pub fn total_surplus(&self) -> Energy {
        self.surplus_energy.iter().copied().sum()
    }

    /// Number of hours in which the electrolyser ran
    pub fn operating_hours(&self) -> u32 {
        self.electrolyser_cf.iter().filter(|cf| **cf > 0.0).count() as u32
    }

    /// Mean generator capacity factor
    pub fn mean_generator_cf(&self) -> f64 {
        mean(&self.generator_cf)
    }

    /// Mean electrolyser capacity factor
    pub fn mean_electrolyser_cf(&self) -> f64 {
        mean(&self.electrolyser_cf)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Simulate a year of hourly operation.
///
/// Solar and wind capacities are passed separately from the plant configuration so that degraded
/// capacities can be simulated.
///
/// # Arguments
///
/// * `traces` - Solar and wind traces for the plant's location
/// * `plant` - Plant configuration
/// * `solar_capacity` - Solar capacity to simulate
/// * `wind_capacity` - Wind capacity to simulate
pub fn simulate_hourly_operation(
    traces: &GenerationTraces,
    plant: &PlantConfiguration,
    solar_capacity: Capacity,
    wind_capacity: Capacity,
) -> EngineResult<HourlyOperationSeries> {
    ensure_config!(
        plant.electrolyser_capacity > Capacity(0.0),
        "Electrolyser capacity must be greater than zero"
    );

    let generator_cf = blend_traces(traces, solar_capacity, wind_capacity)?;
    let oversize_ratio = ((solar_capacity + wind_capacity) / plant.electrolyser_capacity).value();
    let result = dispatch(&DispatchInputs {
        generator_cf: &generator_cf,
        oversize_ratio,
        electrolyser_capacity: plant.electrolyser_capacity,
        load: plant.load,
        overload: plant.overload,
        battery: plant.battery,
    })?;
    let hydrogen = hydrogen_output(
        &plant.performance,
        &result.electrolyser_cf,
        plant.electrolyser_capacity,
    );

    Ok(HourlyOperationSeries {
        generator_cf: generator_cf.into_owned(),
        electrolyser_cf: result.electrolyser_cf,
        hydrogen_fixed: hydrogen.fixed,
        hydrogen_variable: hydrogen.variable,
        battery_soc: result.battery_soc,
        surplus_energy: result.surplus,
    })
}
