//! Functionality for running a scenario from hourly dispatch through to financial results.
use crate::cost::{CostBreakdown, CostParameters, calculate_costs};
use crate::error::EngineResult;
use crate::fuel::FuelPathway;
use crate::generation::GenerationTraces;
use crate::levelised::{FinancialResult, FinancingParameters, financial_result};
use crate::model::Model;
use crate::operation::PlantConfiguration;
use crate::output::{DataWriter, write_metadata};
use crate::projection::{
    DegradationRates, Projection, ReplacementSchedule, project_annual_operation,
};
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Everything needed to evaluate a plant over its lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioParameters {
    /// The physical plant
    pub plant: PlantConfiguration,
    /// Annual degradation of generators and the electrolyser stack
    pub degradation: DegradationRates,
    /// When the stack and battery are replaced
    pub replacement: ReplacementSchedule,
    /// The fuel produced and how
    pub pathway: FuelPathway,
    /// Cost and price assumptions
    pub costs: CostParameters,
    /// Financing assumptions
    pub financing: FinancingParameters,
    /// Project life in years
    pub project_life: u32,
}

/// The results of evaluating a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Hourly and annual operation
    pub projection: Projection,
    /// Capital and operating costs
    pub costs: CostBreakdown,
    /// Levelised cost and cash flows
    pub financial: FinancialResult,
}

/// Evaluate a scenario for the given generation traces.
///
/// The battery duration is checked before any hourly simulation is carried out.
pub fn run_scenario(
    scenario: &ScenarioParameters,
    traces: &GenerationTraces,
) -> EngineResult<SimulationResult> {
    if let Some(battery) = scenario.plant.active_battery() {
        battery.check_duration()?;
    }

    let projection = project_annual_operation(
        traces,
        &scenario.plant,
        &scenario.degradation,
        &scenario.replacement,
        &scenario.pathway,
        scenario.project_life,
    )?;
    let costs = calculate_costs(
        &scenario.costs,
        &scenario.plant,
        &scenario.pathway,
        &projection.annual,
    )?;
    let financial = financial_result(&costs, &projection.annual, &scenario.financing)?;

    Ok(SimulationResult {
        projection,
        costs,
        financial,
    })
}

/// Run the model and write the results to disk.
///
/// # Arguments
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to write additional information (e.g. hourly operation) to file
pub fn run(model: &Model, output_path: &Path, debug_model: bool) -> Result<()> {
    let scenario = &model.scenario;
    info!(
        "Simulating {} production at {} over {} years",
        scenario.pathway.fuel(),
        model.location,
        scenario.project_life
    );

    write_metadata(
        output_path,
        &model.model_path,
        &model.location,
        scenario.pathway.fuel(),
    )
    .context("Failed to save metadata")?;

    let result = run_scenario(scenario, &model.traces)?;
    let first_year = &result.projection.annual[0];
    info!(
        "Year 1: electrolyser capacity factor {:.1}%, {:.0} kg of {}",
        first_year.electrolyser_cf * 100.0,
        first_year.fuel_output.value(),
        scenario.pathway.fuel()
    );
    info!(
        "Levelised cost: {:.2} per kg",
        result.financial.levelised_cost.value()
    );

    let mut writer = DataWriter::create(output_path, debug_model)?;
    writer.write_results(&result, scenario.pathway.fuel())?;
    writer.flush()?;
    info!("Results written to {}", output_path.display());

    Ok(())
}
