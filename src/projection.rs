//! Projecting plant operation over the project lifetime.
//!
//! Each project year is simulated with solar and wind capacities reduced by degradation. The
//! electrolyser stack also degrades, which reduces its hydrogen output, until it is replaced.
use crate::error::{EngineResult, ensure_config};
use crate::fuel::FuelPathway;
use crate::generation::GenerationTraces;
use crate::operation::{HourlyOperationSeries, PlantConfiguration, simulate_hourly_operation};
use crate::units::{Capacity, Dimensionless, Energy, Mass};
use serde::Serialize;

/// Annual degradation rates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DegradationRates {
    /// Solar capacity lost per year
    pub solar: Dimensionless,
    /// Wind capacity lost per year
    pub wind: Dimensionless,
    /// Electrolyser stack performance lost per year
    pub stack: Dimensionless,
}

/// When the electrolyser stack is replaced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StackReplacementPolicy {
    /// Replace once the stack has run for its lifetime
    CumulativeHours {
        /// Operating hours after which the stack is replaced
        lifetime_hours: u32,
    },
    /// Replace once performance has dropped by the threshold
    MaxDegradation {
        /// Loss of performance at which the stack is replaced
        threshold: Dimensionless,
    },
}

/// Component replacement rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplacementSchedule {
    /// When the electrolyser stack is replaced
    pub stack_policy: StackReplacementPolicy,
    /// Years between battery replacements (zero for never)
    pub battery_lifetime: u32,
}

/// Plant operation in one project year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualSummary {
    /// Project year, starting at 1
    pub year: u32,
    /// Degraded solar capacity
    pub solar_capacity: Capacity,
    /// Degraded wind capacity
    pub wind_capacity: Capacity,
    /// Mean generator capacity factor
    pub generator_cf: f64,
    /// Mean electrolyser capacity factor
    pub electrolyser_cf: f64,
    /// Total generation
    pub generation_energy: Energy,
    /// Electricity consumed by the electrolyser
    pub electrolyser_energy: Energy,
    /// Generation used by neither the electrolyser nor the battery
    pub surplus_energy: Energy,
    /// Hours in which the electrolyser ran
    pub operating_hours: u32,
    /// Stack output relative to a new stack
    pub stack_performance: Dimensionless,
    /// Hydrogen produced
    pub hydrogen_output: Mass,
    /// Final fuel produced
    pub fuel_output: Mass,
    /// Whether the stack is replaced at the end of the year
    pub stack_replacement: bool,
    /// Whether the battery is replaced at the end of the year
    pub battery_replacement: bool,
}

/// The result of projecting operation over the project lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// One summary per project year
    pub annual: Vec<AnnualSummary>,
    /// Hourly operation in the first project year
    pub first_year: HourlyOperationSeries,
}

/// Tracks stack ageing between replacements
struct StackState {
    age: i32,
    cumulative_hours: u32,
}

impl StackState {
    fn new() -> Self {
        Self {
            age: 1,
            cumulative_hours: 0,
        }
    }

    fn performance(&self, degradation: Dimensionless) -> Dimensionless {
        (Dimensionless(1.0) - degradation).powi(self.age)
    }

    fn is_worn_out(&self, policy: &StackReplacementPolicy, performance: Dimensionless) -> bool {
        match policy {
            StackReplacementPolicy::CumulativeHours { lifetime_hours } => {
                self.cumulative_hours >= *lifetime_hours
            }
            StackReplacementPolicy::MaxDegradation { threshold } => {
                Dimensionless(1.0) - performance >= *threshold
            }
        }
    }
}

fn check_schedule(replacement: &ReplacementSchedule, project_life: u32) -> EngineResult<()> {
    ensure_config!(project_life > 0, "Project life must be at least one year");
    match replacement.stack_policy {
        StackReplacementPolicy::CumulativeHours { lifetime_hours } => ensure_config!(
            lifetime_hours > 0,
            "Stack lifetime must be greater than zero hours"
        ),
        StackReplacementPolicy::MaxDegradation { threshold } => ensure_config!(
            threshold > Dimensionless(0.0),
            "Stack degradation threshold must be greater than zero"
        ),
    }

    Ok(())
}

/// Project plant operation over every year of the project.
///
/// A year is only re-simulated when the degraded capacities differ from the previous year's.
/// Replacements happen at the end of a year and never in the final year.
///
/// # Arguments
///
/// * `traces` - Solar and wind traces for the plant's location
/// * `plant` - Plant configuration with nominal capacities
/// * `degradation` - Annual degradation rates
/// * `replacement` - Component replacement rules
/// * `pathway` - How fuel is made from hydrogen
/// * `project_life` - Number of operating years
pub fn project_annual_operation(
    traces: &GenerationTraces,
    plant: &PlantConfiguration,
    degradation: &DegradationRates,
    replacement: &ReplacementSchedule,
    pathway: &FuelPathway,
    project_life: u32,
) -> EngineResult<Projection> {
    check_schedule(replacement, project_life)?;

    let consumption_type = plant.performance.consumption_type;
    let has_battery = plant.active_battery().is_some();
    let degraded_capacities = |year: u32| {
        let exponent = year as i32;
        (
            plant.solar_capacity * (Dimensionless(1.0) - degradation.solar).powi(exponent),
            plant.wind_capacity * (Dimensionless(1.0) - degradation.wind).powi(exponent),
        )
    };

    let (solar_capacity, wind_capacity) = degraded_capacities(1);
    let first_year = simulate_hourly_operation(traces, plant, solar_capacity, wind_capacity)?;
    let mut current = (solar_capacity, wind_capacity, first_year.clone());

    let mut stack = StackState::new();
    let mut annual = Vec::with_capacity(project_life as usize);
    for year in 1..=project_life {
        let (solar_capacity, wind_capacity) = degraded_capacities(year);
        if (solar_capacity, wind_capacity) != (current.0, current.1) {
            let series = simulate_hourly_operation(traces, plant, solar_capacity, wind_capacity)?;
            current = (solar_capacity, wind_capacity, series);
        }
        let series = &current.2;

        let stack_performance = stack.performance(degradation.stack);
        let nameplate_hydrogen: Mass =
            series.hydrogen_output(consumption_type).iter().copied().sum();
        let hydrogen_output = nameplate_hydrogen * stack_performance;
        let operating_hours = series.operating_hours();
        stack.cumulative_hours += operating_hours;

        let final_year = year == project_life;
        let stack_replacement =
            !final_year && stack.is_worn_out(&replacement.stack_policy, stack_performance);
        let battery_replacement = !final_year
            && has_battery
            && replacement.battery_lifetime > 0
            && year % replacement.battery_lifetime == 0;

        annual.push(AnnualSummary {
            year,
            solar_capacity,
            wind_capacity,
            generator_cf: series.mean_generator_cf(),
            electrolyser_cf: series.mean_electrolyser_cf(),
            generation_energy: series.generation_energy(solar_capacity + wind_capacity),
            electrolyser_energy: series.electrolyser_energy(plant.electrolyser_capacity),
            surplus_energy: series.total_surplus(),
            operating_hours,
            stack_performance,
            hydrogen_output,
            fuel_output: pathway.fuel_output(hydrogen_output),
            stack_replacement,
            battery_replacement,
        });

        if stack_replacement {
            stack = StackState::new();
        } else {
            stack.age += 1;
        }
    }

    Ok(Projection { annual, first_year })
}
