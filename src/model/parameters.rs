//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
//!
//! The file is a flat table. Keys marked (%) are given in percent and converted to proportions.
use crate::cost::{CostParameters, ExperienceCurve, SubsystemCosts};
use crate::dispatch::{BatterySpec, LoadBounds, OverloadSpec};
use crate::error::{EngineError, EngineResult, ensure_config};
use crate::fuel::{
    DEFAULT_HYDROGEN_VOLUME_TO_MASS, ElectrolyserPerformance, Fuel, FuelPathway,
    SpecificConsumptionType, SynthesisPlant,
};
use crate::id::LocationID;
use crate::input::{input_err_msg, read_toml};
use crate::levelised::{DepreciationProfile, FinancingParameters};
use crate::operation::PlantConfiguration;
use crate::projection::{DegradationRates, ReplacementSchedule, StackReplacementPolicy};
use crate::simulation::ScenarioParameters;
use crate::units::{
    Capacity, Dimensionless, KW_PER_MW, Money, MoneyPerEnergy, MoneyPerMass, percent,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_hydrogen_volume_to_mass, f64, DEFAULT_HYDROGEN_VOLUME_TO_MASS);
define_param_default!(default_fold_increase, f64, 1.0);
define_param_default!(default_synthesis_efficiency, f64, 100.0);
define_param_default!(default_equity_share, f64, 100.0);

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Location whose generation traces are used
    pub location: Option<LocationID>,
    /// The fuel produced
    #[serde(default)]
    pub fuel: Fuel,

    /// Solar capacity (MW)
    #[serde(default)]
    pub solar_capacity: f64,
    /// Wind capacity (MW)
    #[serde(default)]
    pub wind_capacity: f64,

    /// Electrolyser nameplate capacity (MW)
    pub electrolyser_capacity: Option<f64>,
    /// Minimum electrolyser load (%)
    pub electrolyser_min_load: Option<f64>,
    /// Maximum electrolyser load (%)
    pub electrolyser_max_load: Option<f64>,
    /// Maximum overloaded electrolyser load (%). Overloading is disabled unless this exceeds the
    /// maximum load.
    pub electrolyser_max_overload: Option<f64>,
    /// Hours without overloading needed before the electrolyser may be overloaded again
    #[serde(default)]
    pub overload_recharge_hours: usize,
    /// Electrolyser efficiency (%)
    pub electrolyser_efficiency: Option<f64>,
    /// Specific energy consumption at nameplate load (kWh/Nm³)
    pub specific_energy_consumption: Option<f64>,
    /// Whether specific consumption is fixed or varies with load
    #[serde(default)]
    pub specific_consumption_type: SpecificConsumptionType,
    /// Density of hydrogen (kg/Nm³)
    #[serde(default = "default_hydrogen_volume_to_mass")]
    pub hydrogen_volume_to_mass: f64,

    /// Battery rated power (MW)
    #[serde(default)]
    pub battery_power: f64,
    /// Battery duration (hours)
    #[serde(default)]
    pub battery_duration: u32,
    /// Battery round-trip efficiency (%)
    pub battery_round_trip_efficiency: Option<f64>,
    /// Minimum battery state of charge (%)
    #[serde(default)]
    pub battery_min_soc: f64,
    /// Years between battery replacements (zero for never)
    #[serde(default)]
    pub battery_lifetime: u32,

    /// Annual degradation of solar capacity (%)
    #[serde(default)]
    pub solar_degradation: f64,
    /// Annual degradation of wind capacity (%)
    #[serde(default)]
    pub wind_degradation: f64,
    /// Annual degradation of electrolyser stack performance (%)
    #[serde(default)]
    pub stack_degradation: f64,
    /// What triggers a stack replacement
    #[serde(default)]
    pub stack_replacement_policy: StackReplacementPolicyType,
    /// Operating hours after which the stack is replaced
    pub stack_lifetime: Option<u32>,
    /// Stack degradation at which the stack is replaced (%)
    pub stack_max_degradation: Option<f64>,

    /// Efficiency of fuel synthesis relative to the stoichiometric yield (%)
    #[serde(default = "default_synthesis_efficiency")]
    pub synthesis_efficiency: f64,
    /// Electricity used by the synthesis plant (MWh per tonne of fuel)
    #[serde(default)]
    pub synthesis_electricity: f64,

    /// Solar capital cost (per kW)
    pub solar_capex: Option<f64>,
    /// Solar capacity at which `solar_capex` applies (MW)
    pub solar_reference_capacity: Option<f64>,
    /// Solar cost reduction per doubling of capacity (%)
    #[serde(default)]
    pub solar_cost_reduction: f64,
    /// Multiple of the reference capacity at which cost reductions start
    #[serde(default = "default_fold_increase")]
    pub solar_fold_increase: f64,
    /// Solar O&M (% of capital cost)
    #[serde(default)]
    pub solar_om: f64,
    /// Solar EPC costs (% of capital cost)
    #[serde(default)]
    pub solar_epc: f64,
    /// Solar land procurement (% of capital cost)
    #[serde(default)]
    pub solar_land_procurement: f64,

    /// Wind capital cost (per kW)
    pub wind_capex: Option<f64>,
    /// Wind capacity at which `wind_capex` applies (MW)
    pub wind_reference_capacity: Option<f64>,
    /// Wind cost reduction per doubling of capacity (%)
    #[serde(default)]
    pub wind_cost_reduction: f64,
    /// Multiple of the reference capacity at which cost reductions start
    #[serde(default = "default_fold_increase")]
    pub wind_fold_increase: f64,
    /// Wind O&M (% of capital cost)
    #[serde(default)]
    pub wind_om: f64,
    /// Wind EPC costs (% of capital cost)
    #[serde(default)]
    pub wind_epc: f64,
    /// Wind land procurement (% of capital cost)
    #[serde(default)]
    pub wind_land_procurement: f64,

    /// Capital cost of a one-hour battery (per kWh)
    pub battery_capex_1h: Option<f64>,
    /// Capital cost of a two-hour battery (per kWh)
    pub battery_capex_2h: Option<f64>,
    /// Capital cost of a four-hour battery (per kWh)
    pub battery_capex_4h: Option<f64>,
    /// Capital cost of an eight-hour battery (per kWh)
    pub battery_capex_8h: Option<f64>,
    /// Battery energy at which the capital cost applies (MWh)
    pub battery_reference_capacity: Option<f64>,
    /// Battery cost reduction per doubling of energy (%)
    #[serde(default)]
    pub battery_cost_reduction: f64,
    /// Multiple of the reference energy at which cost reductions start
    #[serde(default = "default_fold_increase")]
    pub battery_fold_increase: f64,
    /// Battery O&M (% of capital cost)
    #[serde(default)]
    pub battery_om: f64,
    /// Battery EPC costs (% of capital cost)
    #[serde(default)]
    pub battery_epc: f64,
    /// Battery land procurement (% of capital cost)
    #[serde(default)]
    pub battery_land_procurement: f64,

    /// Electrolyser capital cost (per kW)
    pub electrolyser_capex: Option<f64>,
    /// Electrolyser capacity at which `electrolyser_capex` applies (MW)
    pub electrolyser_reference_capacity: Option<f64>,
    /// Electrolyser cost reduction per doubling of capacity (%)
    #[serde(default)]
    pub electrolyser_cost_reduction: f64,
    /// Multiple of the reference capacity at which cost reductions start
    #[serde(default = "default_fold_increase")]
    pub electrolyser_fold_increase: f64,
    /// Electrolyser O&M (% of capital cost)
    #[serde(default)]
    pub electrolyser_om: f64,
    /// Electrolyser EPC costs (% of capital cost)
    #[serde(default)]
    pub electrolyser_epc: f64,
    /// Electrolyser land procurement (% of capital cost)
    #[serde(default)]
    pub electrolyser_land_procurement: f64,

    /// Synthesis plant capital cost (per tonne of fuel per day)
    pub synthesis_capex: Option<f64>,
    /// Synthesis plant size at which `synthesis_capex` applies (t/day)
    pub synthesis_reference_capacity: Option<f64>,
    /// Synthesis plant cost reduction per doubling of size (%)
    #[serde(default)]
    pub synthesis_cost_reduction: f64,
    /// Multiple of the reference size at which cost reductions start
    #[serde(default = "default_fold_increase")]
    pub synthesis_fold_increase: f64,
    /// Synthesis plant O&M (% of capital cost)
    #[serde(default)]
    pub synthesis_om: f64,
    /// Synthesis plant EPC costs (% of capital cost)
    #[serde(default)]
    pub synthesis_epc: f64,
    /// Synthesis plant land procurement (% of capital cost)
    #[serde(default)]
    pub synthesis_land_procurement: f64,

    /// Cost of a stack replacement (% of electrolyser capital cost)
    #[serde(default)]
    pub stack_replacement_cost: f64,
    /// Cost of a battery replacement (% of battery capital cost)
    #[serde(default)]
    pub battery_replacement: f64,
    /// Power purchase agreement price (per MWh). Generation is bought rather than owned if set.
    #[serde(default)]
    pub ppa_price: f64,
    /// Spot electricity price (per MWh)
    #[serde(default)]
    pub spot_price: f64,
    /// Oxygen sale price (per kg)
    #[serde(default)]
    pub oxygen_price: f64,
    /// Water consumed (L per kg of hydrogen)
    #[serde(default)]
    pub water_needs: f64,
    /// Water cost (per kL)
    #[serde(default)]
    pub water_cost: f64,
    /// CO₂ feedstock price (per tonne)
    #[serde(default)]
    pub co2_price: f64,
    /// One-off costs when the plant is built
    #[serde(default)]
    pub additional_upfront_costs: f64,
    /// Costs incurred every year
    #[serde(default)]
    pub additional_annual_costs: f64,

    /// Discount rate (%)
    pub discount_rate: Option<f64>,
    /// Project life (years)
    pub project_life: Option<u32>,
    /// Sale price of fuel (per kg)
    #[serde(default)]
    pub fuel_price: f64,
    /// Share of the upfront investment paid with equity (%)
    #[serde(default = "default_equity_share")]
    pub equity_share: f64,
    /// Loan interest rate (%)
    #[serde(default)]
    pub loan_interest_rate: f64,
    /// Loan term (years)
    #[serde(default)]
    pub loan_term: u32,
    /// Tax rate (%)
    #[serde(default)]
    pub tax_rate: f64,
    /// How capital is depreciated for tax purposes
    #[serde(default)]
    pub depreciation_profile: DepreciationProfileType,
    /// Straight-line depreciation period (years). Defaults to the project life.
    pub depreciation_period: Option<u32>,
    /// Salvage value at the end of the project (% of capital and indirect costs)
    #[serde(default)]
    pub salvage_value: f64,
    /// Decommissioning cost at the end of the project (% of capital and indirect costs)
    #[serde(default)]
    pub decommissioning_cost: f64,
}

/// What triggers a stack replacement
#[derive(DeserializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Default)]
pub enum StackReplacementPolicyType {
    /// Replace after a number of operating hours
    #[default]
    #[string = "cumulative_hours"]
    CumulativeHours,
    /// Replace once performance has degraded by a given amount
    #[string = "max_degradation"]
    MaxDegradation,
}

/// How capital is depreciated
#[derive(DeserializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Default)]
pub enum DepreciationProfileType {
    /// Equal amounts over `depreciation_period`
    #[default]
    #[string = "straight_line"]
    StraightLine,
    /// Five-year MACRS
    #[string = "macrs_5"]
    Macrs5,
    /// Seven-year MACRS
    #[string = "macrs_7"]
    Macrs7,
}

/// Cost keys for one subsystem
struct CostKeys {
    capex: Option<f64>,
    reference_capacity: Option<f64>,
    cost_reduction: f64,
    fold_increase: f64,
    om: f64,
    epc: f64,
    land_procurement: f64,
}

/// Get a required parameter
fn required<T>(value: Option<T>, name: &str) -> EngineResult<T> {
    value.ok_or_else(|| EngineError::MissingParameter(name.into()))
}

/// Convert a percentage which must lie in the range [0, 100]
fn proportion(value: f64, name: &str) -> EngineResult<Dimensionless> {
    ensure_config!(
        (0.0..=100.0).contains(&value),
        "`{name}` must be between 0 and 100%"
    );
    Ok(percent(value))
}

/// Check that a value is finite and not negative
fn non_negative(value: f64, name: &str) -> EngineResult<f64> {
    ensure_config!(
        value.is_finite() && value >= 0.0,
        "`{name}` must be a finite number greater than or equal to zero"
    );
    Ok(value)
}

/// Convert subsystem cost keys into an experience curve and cost rates.
///
/// `unit_scale` converts the capital cost into cost per unit of size.
fn subsystem_costs(
    keys: CostKeys,
    prefix: &str,
    capex_name: &str,
    capex_required: bool,
    unit_scale: f64,
) -> EngineResult<SubsystemCosts> {
    let unit_cost = match keys.capex {
        Some(capex) => non_negative(capex, capex_name)?,
        None if capex_required => return Err(EngineError::MissingParameter(capex_name.into())),
        None => 0.0,
    };
    let cost_reduction = proportion(keys.cost_reduction, &format!("{prefix}_cost_reduction"))?;
    let reference_size = if cost_reduction > Dimensionless(0.0) {
        let name = format!("{prefix}_reference_capacity");
        let size = required(keys.reference_capacity, &name)?;
        ensure_config!(size > 0.0, "`{name}` must be greater than zero");
        size
    } else {
        keys.reference_capacity.unwrap_or(1.0)
    };
    ensure_config!(
        keys.fold_increase > 0.0,
        "`{prefix}_fold_increase` must be greater than zero"
    );

    Ok(SubsystemCosts {
        curve: ExperienceCurve {
            unit_cost: unit_cost * unit_scale,
            reference_size,
            cost_reduction,
            fold_increase: keys.fold_increase,
        },
        om_rate: proportion(keys.om, &format!("{prefix}_om"))?,
        epc_rate: proportion(keys.epc, &format!("{prefix}_epc"))?,
        land_rate: proportion(keys.land_procurement, &format!("{prefix}_land_procurement"))?,
    })
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents and the scenario they describe, or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(
        model_dir: P,
    ) -> Result<(ModelParameters, ScenarioParameters)> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;
        let scenario = model_params
            .to_scenario()
            .with_context(|| input_err_msg(&file_path))?;

        Ok((model_params, scenario))
    }

    /// The location whose traces the model uses
    pub fn location(&self) -> EngineResult<LocationID> {
        self.location
            .clone()
            .ok_or_else(|| EngineError::MissingParameter("location".into()))
    }

    /// Convert the parameters into a scenario, checking that they are valid
    pub fn to_scenario(&self) -> EngineResult<ScenarioParameters> {
        self.location()?;
        let project_life = required(self.project_life, "project_life")?;
        ensure_config!(project_life > 0, "`project_life` must be at least one year");

        let plant = self.plant()?;
        let costs = self.cost_parameters(&plant)?;

        Ok(ScenarioParameters {
            degradation: DegradationRates {
                solar: self.degradation(self.solar_degradation, "solar_degradation")?,
                wind: self.degradation(self.wind_degradation, "wind_degradation")?,
                stack: self.degradation(self.stack_degradation, "stack_degradation")?,
            },
            replacement: ReplacementSchedule {
                stack_policy: self.stack_policy()?,
                battery_lifetime: self.battery_lifetime,
            },
            pathway: self.pathway()?,
            costs,
            financing: self.financing(project_life)?,
            project_life,
            plant,
        })
    }

    fn degradation(&self, value: f64, name: &str) -> EngineResult<Dimensionless> {
        ensure_config!(
            (0.0..100.0).contains(&value),
            "`{name}` must be at least 0% and less than 100%"
        );
        Ok(percent(value))
    }

    fn plant(&self) -> EngineResult<PlantConfiguration> {
        let electrolyser_capacity = required(self.electrolyser_capacity, "electrolyser_capacity")?;
        ensure_config!(
            electrolyser_capacity.is_finite() && electrolyser_capacity > 0.0,
            "`electrolyser_capacity` must be greater than zero"
        );

        let min_load = required(self.electrolyser_min_load, "electrolyser_min_load")?;
        let max_load = required(self.electrolyser_max_load, "electrolyser_max_load")?;
        ensure_config!(
            min_load >= 0.0 && min_load <= max_load && max_load > 0.0,
            "Electrolyser load bounds must satisfy 0 <= min load <= max load, with max load > 0"
        );
        ensure_config!(
            max_load <= 100.0,
            "`electrolyser_max_load` must be at most 100%. Use `electrolyser_max_overload` to run \
            the electrolyser above its rating."
        );
        let load = LoadBounds {
            min: percent(min_load).value(),
            max: percent(max_load).value(),
        };
        let overload = self
            .electrolyser_max_overload
            .map(|max| OverloadSpec {
                max: percent(max).value(),
                recharge_hours: self.overload_recharge_hours,
            })
            .filter(|overload| overload.is_enabled(&load));

        let efficiency = required(self.electrolyser_efficiency, "electrolyser_efficiency")?;
        ensure_config!(
            efficiency > 0.0 && efficiency <= 100.0,
            "`electrolyser_efficiency` must be greater than 0 and at most 100%"
        );
        let specific_energy_consumption =
            required(self.specific_energy_consumption, "specific_energy_consumption")?;
        ensure_config!(
            specific_energy_consumption > 0.0,
            "`specific_energy_consumption` must be greater than zero"
        );
        ensure_config!(
            self.hydrogen_volume_to_mass > 0.0,
            "`hydrogen_volume_to_mass` must be greater than zero"
        );

        Ok(PlantConfiguration {
            solar_capacity: Capacity(non_negative(self.solar_capacity, "solar_capacity")?),
            wind_capacity: Capacity(non_negative(self.wind_capacity, "wind_capacity")?),
            electrolyser_capacity: Capacity(electrolyser_capacity),
            load,
            overload,
            battery: self.battery()?,
            performance: ElectrolyserPerformance {
                efficiency: percent(efficiency),
                specific_energy_consumption,
                hydrogen_volume_to_mass: self.hydrogen_volume_to_mass,
                consumption_type: self.specific_consumption_type,
            },
        })
    }

    fn battery(&self) -> EngineResult<Option<BatterySpec>> {
        if non_negative(self.battery_power, "battery_power")? == 0.0 {
            return Ok(None);
        }

        let round_trip_efficiency = required(
            self.battery_round_trip_efficiency,
            "battery_round_trip_efficiency",
        )?;
        ensure_config!(
            round_trip_efficiency > 0.0 && round_trip_efficiency <= 100.0,
            "`battery_round_trip_efficiency` must be greater than 0 and at most 100%"
        );
        ensure_config!(
            (0.0..100.0).contains(&self.battery_min_soc),
            "`battery_min_soc` must be at least 0% and less than 100%"
        );
        let battery = BatterySpec {
            power: Capacity(self.battery_power),
            duration: self.battery_duration,
            round_trip_efficiency: percent(round_trip_efficiency),
            min_state_of_charge: percent(self.battery_min_soc),
        };
        battery.check_duration()?;

        Ok(Some(battery))
    }

    fn stack_policy(&self) -> EngineResult<StackReplacementPolicy> {
        match self.stack_replacement_policy {
            StackReplacementPolicyType::CumulativeHours => {
                let lifetime_hours = required(self.stack_lifetime, "stack_lifetime")?;
                ensure_config!(lifetime_hours > 0, "`stack_lifetime` must be greater than zero");
                Ok(StackReplacementPolicy::CumulativeHours { lifetime_hours })
            }
            StackReplacementPolicyType::MaxDegradation => {
                let threshold = required(self.stack_max_degradation, "stack_max_degradation")?;
                ensure_config!(
                    threshold > 0.0 && threshold <= 100.0,
                    "`stack_max_degradation` must be greater than 0 and at most 100%"
                );
                Ok(StackReplacementPolicy::MaxDegradation {
                    threshold: percent(threshold),
                })
            }
        }
    }

    fn pathway(&self) -> EngineResult<FuelPathway> {
        if self.fuel == Fuel::Hydrogen {
            return Ok(FuelPathway::Hydrogen);
        }

        ensure_config!(
            self.synthesis_efficiency > 0.0 && self.synthesis_efficiency <= 100.0,
            "`synthesis_efficiency` must be greater than 0 and at most 100%"
        );
        let costs = subsystem_costs(
            CostKeys {
                capex: self.synthesis_capex,
                reference_capacity: self.synthesis_reference_capacity,
                cost_reduction: self.synthesis_cost_reduction,
                fold_increase: self.synthesis_fold_increase,
                om: self.synthesis_om,
                epc: self.synthesis_epc,
                land_procurement: self.synthesis_land_procurement,
            },
            "synthesis",
            "synthesis_capex",
            true,
            1.0,
        )?;

        Ok(FuelPathway::Synthesis(SynthesisPlant {
            fuel: self.fuel,
            efficiency: percent(self.synthesis_efficiency),
            electricity_intensity: non_negative(
                self.synthesis_electricity,
                "synthesis_electricity",
            )?,
            costs,
        }))
    }

    /// The capital cost of the battery for its duration (per kWh)
    fn battery_capex(&self, duration: u32) -> (Option<f64>, String) {
        let capex = match duration {
            1 => self.battery_capex_1h,
            2 => self.battery_capex_2h,
            4 => self.battery_capex_4h,
            8 => self.battery_capex_8h,
            _ => None,
        };
        (capex, format!("battery_capex_{duration}h"))
    }

    fn cost_parameters(&self, plant: &PlantConfiguration) -> EngineResult<CostParameters> {
        let ppa_price = non_negative(self.ppa_price, "ppa_price")?;
        let owns_generation = ppa_price == 0.0;

        let solar = subsystem_costs(
            CostKeys {
                capex: self.solar_capex,
                reference_capacity: self.solar_reference_capacity,
                cost_reduction: self.solar_cost_reduction,
                fold_increase: self.solar_fold_increase,
                om: self.solar_om,
                epc: self.solar_epc,
                land_procurement: self.solar_land_procurement,
            },
            "solar",
            "solar_capex",
            owns_generation && plant.solar_capacity > Capacity(0.0),
            KW_PER_MW,
        )?;
        let wind = subsystem_costs(
            CostKeys {
                capex: self.wind_capex,
                reference_capacity: self.wind_reference_capacity,
                cost_reduction: self.wind_cost_reduction,
                fold_increase: self.wind_fold_increase,
                om: self.wind_om,
                epc: self.wind_epc,
                land_procurement: self.wind_land_procurement,
            },
            "wind",
            "wind_capex",
            owns_generation && plant.wind_capacity > Capacity(0.0),
            KW_PER_MW,
        )?;
        let (battery_capex, battery_capex_name) = self.battery_capex(self.battery_duration);
        let battery = subsystem_costs(
            CostKeys {
                capex: battery_capex,
                reference_capacity: self.battery_reference_capacity,
                cost_reduction: self.battery_cost_reduction,
                fold_increase: self.battery_fold_increase,
                om: self.battery_om,
                epc: self.battery_epc,
                land_procurement: self.battery_land_procurement,
            },
            "battery",
            &battery_capex_name,
            plant.active_battery().is_some(),
            KW_PER_MW,
        )?;
        let electrolyser = subsystem_costs(
            CostKeys {
                capex: self.electrolyser_capex,
                reference_capacity: self.electrolyser_reference_capacity,
                cost_reduction: self.electrolyser_cost_reduction,
                fold_increase: self.electrolyser_fold_increase,
                om: self.electrolyser_om,
                epc: self.electrolyser_epc,
                land_procurement: self.electrolyser_land_procurement,
            },
            "electrolyser",
            "electrolyser_capex",
            true,
            KW_PER_MW,
        )?;

        Ok(CostParameters {
            solar,
            wind,
            battery,
            electrolyser,
            stack_replacement_rate: proportion(
                self.stack_replacement_cost,
                "stack_replacement_cost",
            )?,
            battery_replacement_rate: proportion(self.battery_replacement, "battery_replacement")?,
            ppa_price: MoneyPerEnergy(ppa_price),
            spot_price: MoneyPerEnergy(non_negative(self.spot_price, "spot_price")?),
            oxygen_price: MoneyPerMass(non_negative(self.oxygen_price, "oxygen_price")?),
            water_needs: non_negative(self.water_needs, "water_needs")?,
            water_cost: non_negative(self.water_cost, "water_cost")?,
            co2_price: non_negative(self.co2_price, "co2_price")?,
            additional_upfront_costs: Money(non_negative(
                self.additional_upfront_costs,
                "additional_upfront_costs",
            )?),
            additional_annual_costs: Money(non_negative(
                self.additional_annual_costs,
                "additional_annual_costs",
            )?),
        })
    }

    fn financing(&self, project_life: u32) -> EngineResult<FinancingParameters> {
        let discount_rate = required(self.discount_rate, "discount_rate")?;
        ensure_config!(
            discount_rate.is_finite() && discount_rate > -100.0,
            "`discount_rate` must be a finite number greater than -100%"
        );
        let depreciation = match self.depreciation_profile {
            DepreciationProfileType::StraightLine => DepreciationProfile::StraightLine {
                period: self.depreciation_period.unwrap_or(project_life),
            },
            DepreciationProfileType::Macrs5 => DepreciationProfile::Macrs5,
            DepreciationProfileType::Macrs7 => DepreciationProfile::Macrs7,
        };

        Ok(FinancingParameters {
            discount_rate: percent(discount_rate),
            fuel_price: MoneyPerMass(non_negative(self.fuel_price, "fuel_price")?),
            equity_share: proportion(self.equity_share, "equity_share")?,
            loan_interest_rate: percent(non_negative(
                self.loan_interest_rate,
                "loan_interest_rate",
            )?),
            loan_term: self.loan_term,
            tax_rate: proportion(self.tax_rate, "tax_rate")?,
            depreciation,
            salvage_rate: proportion(self.salvage_value, "salvage_value")?,
            decommissioning_rate: proportion(self.decommissioning_cost, "decommissioning_cost")?,
        })
    }
}
