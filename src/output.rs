//! The module responsible for writing output data to disk.
use crate::cost::{OperatingCostCategory, Subsystem};
use crate::fuel::Fuel;
use crate::levelised::{CashFlowYear, CostComponent};
use crate::operation::HourlyOperationSeries;
use crate::projection::AnnualSummary;
use crate::simulation::SimulationResult;
use crate::units::{Energy, Mass, Money, MoneyPerMass};
use anyhow::{Context, Result, ensure};
use itertools::izip;
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;
pub use metadata::write_metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "powerfuel_results";

/// The output file name for annual operation
const ANNUAL_SUMMARY_FILE_NAME: &str = "annual_summary.csv";

/// The output file name for capital and indirect costs
const CAPITAL_COSTS_FILE_NAME: &str = "capital_costs.csv";

/// The output file name for operating costs
const ANNUAL_COSTS_FILE_NAME: &str = "annual_costs.csv";

/// The output file name for cash flows
const CASH_FLOW_FILE_NAME: &str = "cash_flow.csv";

/// The output file name for the breakdown of the levelised cost
const COST_WATERFALL_FILE_NAME: &str = "cost_waterfall.csv";

/// The output file name for headline results
const RESULTS_FILE_NAME: &str = "results.toml";

/// The output file name for hourly operation in the first year
const HOURLY_OPERATION_FILE_NAME: &str = "debug_hourly_operation.csv";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data.
///
/// # Returns
///
/// True if an existing non-empty directory was cleared, false otherwise. An error is returned if
/// the directory is not empty and `allow_overwrite` is false.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut entries) = fs::read_dir(output_dir) {
        if entries.next().is_none() {
            // Already exists and is empty
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use the --overwrite option to \
            overwrite it."
        );
        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the capital costs CSV file
#[derive(Serialize, Debug, PartialEq)]
struct CapitalCostRow {
    subsystem: Subsystem,
    capital_cost: Money,
    indirect_cost: Money,
}

/// Represents a row in the annual costs CSV file
#[derive(Serialize, Debug, PartialEq)]
struct AnnualCostRow {
    year: u32,
    category: OperatingCostCategory,
    cost: Money,
}

/// Represents a row in the cost waterfall CSV file
#[derive(Serialize, Debug, PartialEq)]
struct CostWaterfallRow {
    component: CostComponent,
    levelised_cost: MoneyPerMass,
}

/// Represents a row in the hourly operation CSV file
#[derive(Serialize, Debug, PartialEq)]
struct HourlyOperationRow {
    hour: usize,
    generator_cf: f64,
    electrolyser_cf: f64,
    hydrogen_fixed: Mass,
    hydrogen_variable: Mass,
    battery_soc: f64,
    surplus_energy: Energy,
}

/// Headline figures written to the results file
#[derive(Serialize, Debug, PartialEq)]
struct ResultsSummary {
    fuel: String,
    levelised_cost: MoneyPerMass,
    total_capital_cost: Money,
    total_indirect_cost: Money,
    upfront_investment: Money,
    net_profit: Money,
    return_on_investment: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    payback_year: Option<u32>,
    first_year_fuel_output: Mass,
}

/// For writing extra debug information about the model
struct DebugDataWriter {
    hourly_operation_writer: csv::Writer<File>,
}

impl DebugDataWriter {
    /// Open CSV files to write debug info to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    fn create(output_path: &Path) -> Result<Self> {
        let file_path = output_path.join(HOURLY_OPERATION_FILE_NAME);
        Ok(Self {
            hourly_operation_writer: csv::Writer::from_path(file_path)?,
        })
    }

    /// Write hourly operation to file
    fn write_hourly_operation(&mut self, series: &HourlyOperationSeries) -> Result<()> {
        let rows = izip!(
            &series.generator_cf,
            &series.electrolyser_cf,
            &series.hydrogen_fixed,
            &series.hydrogen_variable,
            &series.battery_soc,
            &series.surplus_energy,
        );
        for (hour, (generator_cf, electrolyser_cf, fixed, variable, soc, surplus)) in
            rows.enumerate()
        {
            self.hourly_operation_writer.serialize(HourlyOperationRow {
                hour,
                generator_cf: *generator_cf,
                electrolyser_cf: *electrolyser_cf,
                hydrogen_fixed: *fixed,
                hydrogen_variable: *variable,
                battery_soc: *soc,
                surplus_energy: *surplus,
            })?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    fn flush(&mut self) -> Result<()> {
        self.hourly_operation_writer.flush()?;

        Ok(())
    }
}

/// An object for writing simulation results to file.
///
/// Money is rounded to whole currency units. Levelised costs are written unrounded.
pub struct DataWriter {
    output_path: PathBuf,
    annual_summary_writer: csv::Writer<File>,
    capital_costs_writer: csv::Writer<File>,
    annual_costs_writer: csv::Writer<File>,
    cash_flow_writer: csv::Writer<File>,
    cost_waterfall_writer: csv::Writer<File>,
    debug_writer: Option<DebugDataWriter>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, save_debug_info: bool) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let debug_writer = if save_debug_info {
            // Create debug CSV files
            Some(DebugDataWriter::create(output_path)?)
        } else {
            None
        };

        Ok(Self {
            output_path: output_path.to_path_buf(),
            annual_summary_writer: new_writer(ANNUAL_SUMMARY_FILE_NAME)?,
            capital_costs_writer: new_writer(CAPITAL_COSTS_FILE_NAME)?,
            annual_costs_writer: new_writer(ANNUAL_COSTS_FILE_NAME)?,
            cash_flow_writer: new_writer(CASH_FLOW_FILE_NAME)?,
            cost_waterfall_writer: new_writer(COST_WATERFALL_FILE_NAME)?,
            debug_writer,
        })
    }

    /// Write all results of a simulation
    pub fn write_results(&mut self, result: &SimulationResult, fuel: Fuel) -> Result<()> {
        self.write_annual_summary(&result.projection.annual)?;
        self.write_costs(result)?;
        self.write_cash_flows(&result.financial.cash_flows)?;
        self.write_waterfall(result)?;
        self.write_summary(result, fuel)?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.write_hourly_operation(&result.projection.first_year)?;
        }

        Ok(())
    }

    /// Write annual operation to a CSV file
    fn write_annual_summary(&mut self, annual: &[AnnualSummary]) -> Result<()> {
        for summary in annual {
            self.annual_summary_writer.serialize(summary)?;
        }

        Ok(())
    }

    /// Write capital and operating costs to CSV files
    fn write_costs(&mut self, result: &SimulationResult) -> Result<()> {
        let costs = result.costs.rounded();
        for (subsystem, capital_cost) in &costs.capex {
            self.capital_costs_writer.serialize(CapitalCostRow {
                subsystem: *subsystem,
                capital_cost: *capital_cost,
                indirect_cost: costs.indirect.get(subsystem).copied().unwrap_or_default(),
            })?;
        }

        for year in &costs.annual {
            for (category, cost) in &year.costs {
                self.annual_costs_writer.serialize(AnnualCostRow {
                    year: year.year,
                    category: *category,
                    cost: *cost,
                })?;
            }
        }

        Ok(())
    }

    /// Write cash flows to a CSV file
    fn write_cash_flows(&mut self, cash_flows: &[CashFlowYear]) -> Result<()> {
        for flow in cash_flows {
            self.cash_flow_writer.serialize(flow.rounded())?;
        }

        Ok(())
    }

    /// Write the breakdown of the levelised cost to a CSV file
    fn write_waterfall(&mut self, result: &SimulationResult) -> Result<()> {
        for (component, levelised_cost) in &result.financial.waterfall {
            self.cost_waterfall_writer.serialize(CostWaterfallRow {
                component: *component,
                levelised_cost: *levelised_cost,
            })?;
        }

        Ok(())
    }

    /// Write headline results to a TOML file
    fn write_summary(&self, result: &SimulationResult, fuel: Fuel) -> Result<()> {
        let financial = &result.financial;
        let summary = ResultsSummary {
            fuel: fuel.to_string(),
            levelised_cost: financial.levelised_cost,
            total_capital_cost: result.costs.total_capex().round(),
            total_indirect_cost: result.costs.total_indirect().round(),
            upfront_investment: result.costs.upfront_investment().round(),
            net_profit: financial.net_profit.round(),
            return_on_investment: financial.return_on_investment.value(),
            payback_year: financial.payback_year,
            first_year_fuel_output: result
                .projection
                .annual
                .first()
                .map_or(Mass(0.0), |summary| summary.fuel_output),
        };
        let file_path = self.output_path.join(RESULTS_FILE_NAME);
        fs::write(&file_path, toml::to_string(&summary)?)
            .with_context(|| format!("Failed to write {}", file_path.display()))?;

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.annual_summary_writer.flush()?;
        self.capital_costs_writer.flush()?;
        self.annual_costs_writer.flush()?;
        self.cash_flow_writer.flush()?;
        self.cost_waterfall_writer.flush()?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}
