//! Capital and operating costs of the plant.
use crate::error::{EngineResult, ensure_config};
use crate::fuel::{FuelPathway, OXYGEN_PER_HYDROGEN};
use crate::operation::PlantConfiguration;
use crate::projection::AnnualSummary;
use crate::units::{Dimensionless, Energy, KG_PER_TONNE, Mass, Money, MoneyPerEnergy, MoneyPerMass};
use indexmap::IndexMap;
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Litres in a kilolitre
const LITRES_PER_KILOLITRE: f64 = 1000.0;

/// How the capital cost of a subsystem scales with its size.
///
/// Sizes are in whatever unit the subsystem is measured in: MW for generators and the
/// electrolyser, MWh for the battery and tonnes of fuel per day for a synthesis plant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExperienceCurve {
    /// Cost per unit of size for a reference-sized subsystem
    pub unit_cost: f64,
    /// Size of the reference subsystem
    pub reference_size: f64,
    /// Cost reduction for each doubling of size
    pub cost_reduction: Dimensionless,
    /// Scale of the first size increment which earns a cost reduction
    pub fold_increase: f64,
}

impl Default for ExperienceCurve {
    fn default() -> Self {
        Self {
            unit_cost: 0.0,
            reference_size: 1.0,
            cost_reduction: Dimensionless(0.0),
            fold_increase: 1.0,
        }
    }
}

impl ExperienceCurve {
    /// A curve with no economies of scale
    pub fn linear(unit_cost: f64) -> Self {
        Self {
            unit_cost,
            ..Default::default()
        }
    }

    /// Capital cost of a subsystem of the given size.
    ///
    /// The cost is `unit_cost * size * (1 - cost_reduction)^log2(size / reference_size /
    /// fold_increase)`. A subsystem of zero size costs nothing.
    pub fn capital_cost(&self, size: f64) -> EngineResult<Money> {
        if size == 0.0 {
            return Ok(Money(0.0));
        }

        let base = self.unit_cost * size;
        if self.cost_reduction == Dimensionless(0.0) {
            return Ok(Money(base));
        }

        ensure_config!(
            self.reference_size > 0.0 && self.fold_increase > 0.0,
            "Reference size and fold increase must be greater than zero when a cost reduction is \
            given"
        );
        let doublings = (size / self.reference_size / self.fold_increase).log2();
        Ok(Money(
            base * (1.0 - self.cost_reduction.value()).powf(doublings),
        ))
    }
}

/// Cost parameters for one subsystem
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubsystemCosts {
    /// Capital cost curve
    pub curve: ExperienceCurve,
    /// Annual operation and maintenance cost as a proportion of capital cost
    pub om_rate: Dimensionless,
    /// Engineering, procurement and construction costs as a proportion of capital cost
    pub epc_rate: Dimensionless,
    /// Land procurement costs as a proportion of capital cost
    pub land_rate: Dimensionless,
}

impl SubsystemCosts {
    /// Indirect costs as a proportion of capital cost
    pub fn indirect_rate(&self) -> Dimensionless {
        self.epc_rate + self.land_rate
    }
}

/// A component of the plant with its own capital cost
#[derive(Display, EnumIter, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    /// Solar farm
    Solar,
    /// Wind farm
    Wind,
    /// Battery storage
    Battery,
    /// Electrolyser, including the stack
    Electrolyser,
    /// Plant turning hydrogen into another fuel
    SynthesisPlant,
}

/// A line in a year's operating costs.
///
/// Sales are negative costs.
#[derive(Display, EnumIter, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OperatingCostCategory {
    /// Solar farm operation and maintenance
    SolarOm,
    /// Wind farm operation and maintenance
    WindOm,
    /// Battery operation and maintenance
    BatteryOm,
    /// Electrolyser operation and maintenance
    ElectrolyserOm,
    /// Synthesis plant operation and maintenance
    SynthesisOm,
    /// Electricity bought under a PPA or from the grid
    ElectricityPurchase,
    /// Surplus generation sold at the spot price
    ElectricitySale,
    /// Electrolyser stack replacement
    StackReplacement,
    /// Battery replacement
    BatteryReplacement,
    /// Water consumed by the electrolyser
    Water,
    /// CO₂ feedstock for the synthesis plant
    Feedstock,
    /// Other annual costs
    AdditionalCosts,
    /// Oxygen by-product sold
    OxygenSale,
}

/// Cost and price assumptions for a scenario
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CostParameters {
    /// Solar farm costs (sized in MW)
    pub solar: SubsystemCosts,
    /// Wind farm costs (sized in MW)
    pub wind: SubsystemCosts,
    /// Battery costs (sized in MWh)
    pub battery: SubsystemCosts,
    /// Electrolyser costs (sized in MW)
    pub electrolyser: SubsystemCosts,
    /// Cost of a stack replacement as a proportion of electrolyser capital cost
    pub stack_replacement_rate: Dimensionless,
    /// Cost of a battery replacement as a proportion of battery capital cost
    pub battery_replacement_rate: Dimensionless,
    /// Price of electricity bought under a power purchase agreement (zero for none)
    pub ppa_price: MoneyPerEnergy,
    /// Spot price at which electricity is bought and sold
    pub spot_price: MoneyPerEnergy,
    /// Price at which oxygen is sold
    pub oxygen_price: MoneyPerMass,
    /// Water consumed per kg of hydrogen (L/kg)
    pub water_needs: f64,
    /// Cost of water per kL
    pub water_cost: f64,
    /// Cost of CO₂ feedstock per tonne
    pub co2_price: f64,
    /// One-off costs incurred when the plant is built
    pub additional_upfront_costs: Money,
    /// Costs incurred every operating year
    pub additional_annual_costs: Money,
}

impl CostParameters {
    /// Whether generation is bought under a power purchase agreement rather than owned
    pub fn has_ppa(&self) -> bool {
        self.ppa_price > MoneyPerEnergy(0.0)
    }
}

/// Operating costs for one project year
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualCosts {
    /// Project year, starting at 1
    pub year: u32,
    /// Cost of each category, in [`OperatingCostCategory`] order
    pub costs: IndexMap<OperatingCostCategory, Money>,
}

impl AnnualCosts {
    /// The cost for a category
    pub fn get(&self, category: OperatingCostCategory) -> Money {
        self.costs.get(&category).copied().unwrap_or_default()
    }

    /// Net operating cost for the year
    pub fn total(&self) -> Money {
        self.costs.values().copied().sum()
    }
}

/// All of the plant's costs
#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    /// Capital cost of each subsystem
    pub capex: IndexMap<Subsystem, Money>,
    /// Indirect costs for each subsystem
    pub indirect: IndexMap<Subsystem, Money>,
    /// Additional one-off costs when the plant is built
    pub additional_upfront: Money,
    /// Operating costs for each project year
    pub annual: Vec<AnnualCosts>,
}

impl CostBreakdown {
    /// Total capital cost
    pub fn total_capex(&self) -> Money {
        self.capex.values().copied().sum()
    }

    /// Total indirect costs
    pub fn total_indirect(&self) -> Money {
        self.indirect.values().copied().sum()
    }

    /// Everything spent before the plant starts operating
    pub fn upfront_investment(&self) -> Money {
        self.total_capex() + self.total_indirect() + self.additional_upfront
    }

    /// A copy with every amount rounded to whole currency units, for display
    pub fn rounded(&self) -> Self {
        let round_map = |map: &IndexMap<Subsystem, Money>| {
            map.iter().map(|(key, value)| (*key, value.round())).collect()
        };

        Self {
            capex: round_map(&self.capex),
            indirect: round_map(&self.indirect),
            additional_upfront: self.additional_upfront.round(),
            annual: self
                .annual
                .iter()
                .map(|year| AnnualCosts {
                    year: year.year,
                    costs: year
                        .costs
                        .iter()
                        .map(|(category, value)| (*category, value.round()))
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Calculate capital, indirect and operating costs.
///
/// # Arguments
///
/// * `params` - Cost and price assumptions
/// * `plant` - Plant configuration with nominal capacities
/// * `pathway` - How fuel is made from hydrogen
/// * `annual` - Plant operation in each project year
pub fn calculate_costs(
    params: &CostParameters,
    plant: &PlantConfiguration,
    pathway: &FuelPathway,
    annual: &[AnnualSummary],
) -> EngineResult<CostBreakdown> {
    let ppa = params.has_ppa();
    let battery_energy = plant.active_battery().map_or(Energy(0.0), |b| b.energy());

    // Generators are not owned under a PPA
    let owned = |size: f64| if ppa { 0.0 } else { size };
    let mut subsystems = vec![
        (
            Subsystem::Solar,
            &params.solar,
            owned(plant.solar_capacity.value()),
        ),
        (
            Subsystem::Wind,
            &params.wind,
            owned(plant.wind_capacity.value()),
        ),
        (Subsystem::Battery, &params.battery, battery_energy.value()),
        (
            Subsystem::Electrolyser,
            &params.electrolyser,
            plant.electrolyser_capacity.value(),
        ),
    ];
    let synthesis = pathway.synthesis_plant();
    if let Some(synthesis) = synthesis {
        let size = synthesis.capacity(
            &plant.performance,
            plant.electrolyser_capacity,
            plant.load.max,
        );
        subsystems.push((Subsystem::SynthesisPlant, &synthesis.costs, size));
    }

    let mut capex = IndexMap::new();
    let mut indirect = IndexMap::new();
    let mut om = IndexMap::new();
    for (subsystem, costs, size) in subsystems {
        let cost = costs.curve.capital_cost(size)?;
        capex.insert(subsystem, cost);
        indirect.insert(subsystem, cost * costs.indirect_rate());
        om.insert(subsystem, cost * costs.om_rate);
    }
    let subsystem_cost = |map: &IndexMap<Subsystem, Money>, subsystem| {
        map.get(&subsystem).copied().unwrap_or_default()
    };

    let annual = annual
        .iter()
        .map(|summary| {
            let synthesis_fuel = synthesis.map_or(Mass(0.0), |_| summary.fuel_output);
            let cost_for = |category: OperatingCostCategory| match category {
                OperatingCostCategory::SolarOm => subsystem_cost(&om, Subsystem::Solar),
                OperatingCostCategory::WindOm => subsystem_cost(&om, Subsystem::Wind),
                OperatingCostCategory::BatteryOm => subsystem_cost(&om, Subsystem::Battery),
                OperatingCostCategory::ElectrolyserOm => {
                    subsystem_cost(&om, Subsystem::Electrolyser)
                }
                OperatingCostCategory::SynthesisOm => {
                    subsystem_cost(&om, Subsystem::SynthesisPlant)
                }
                OperatingCostCategory::ElectricityPurchase => {
                    let contracted = if ppa {
                        params.ppa_price * summary.electrolyser_energy
                    } else {
                        Money(0.0)
                    };
                    let grid = synthesis.map_or(Energy(0.0), |synthesis| {
                        synthesis.electricity_demand(synthesis_fuel)
                    });
                    contracted + params.spot_price * grid
                }
                OperatingCostCategory::ElectricitySale if ppa => Money(0.0),
                OperatingCostCategory::ElectricitySale => {
                    -(params.spot_price * summary.surplus_energy)
                }
                OperatingCostCategory::StackReplacement if summary.stack_replacement => {
                    subsystem_cost(&capex, Subsystem::Electrolyser) * params.stack_replacement_rate
                }
                OperatingCostCategory::BatteryReplacement if summary.battery_replacement => {
                    subsystem_cost(&capex, Subsystem::Battery) * params.battery_replacement_rate
                }
                OperatingCostCategory::StackReplacement
                | OperatingCostCategory::BatteryReplacement => Money(0.0),
                OperatingCostCategory::Water => Money(
                    summary.hydrogen_output.value() * params.water_needs / LITRES_PER_KILOLITRE
                        * params.water_cost,
                ),
                OperatingCostCategory::Feedstock => {
                    let co2 = synthesis
                        .map_or(Mass(0.0), |synthesis| synthesis.co2_demand(synthesis_fuel));
                    Money(co2.value() / KG_PER_TONNE * params.co2_price)
                }
                OperatingCostCategory::AdditionalCosts => params.additional_annual_costs,
                OperatingCostCategory::OxygenSale => {
                    -(params.oxygen_price
                        * (summary.hydrogen_output * Dimensionless(OXYGEN_PER_HYDROGEN)))
                }
            };

            AnnualCosts {
                year: summary.year,
                costs: OperatingCostCategory::iter()
                    .map(|category| (category, cost_for(category)))
                    .collect(),
            }
        })
        .collect();

    Ok(CostBreakdown {
        capex,
        indirect,
        additional_upfront: params.additional_upfront_costs,
        annual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{cost_parameters, plant};
    use crate::fuel::{Fuel, SynthesisPlant};
    use crate::operation::PlantConfiguration;
    use crate::units::Capacity;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn summary(year: u32, stack_replacement: bool, battery_replacement: bool) -> AnnualSummary {
        AnnualSummary {
            year,
            solar_capacity: Capacity(15.0),
            wind_capacity: Capacity(10.0),
            generator_cf: 0.3,
            electrolyser_cf: 0.5,
            generation_energy: Energy(70.0),
            electrolyser_energy: Energy(60.0),
            surplus_energy: Energy(10.0),
            operating_hours: 20,
            stack_performance: Dimensionless(1.0),
            hydrogen_output: Mass(1000.0),
            fuel_output: Mass(1000.0),
            stack_replacement,
            battery_replacement,
        }
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(5.0, 1000.0 * 5.0 / 0.9)]
    #[case(10.0, 10000.0)]
    #[case(20.0, 1000.0 * 20.0 * 0.9)]
    #[case(40.0, 1000.0 * 40.0 * 0.81)]
    fn test_capital_cost(#[case] size: f64, #[case] expected: f64) {
        let curve = ExperienceCurve {
            unit_cost: 1000.0,
            reference_size: 10.0,
            cost_reduction: Dimensionless(0.1),
            fold_increase: 1.0,
        };
        assert_approx_eq!(
            Money,
            curve.capital_cost(size).unwrap(),
            Money(expected),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_capital_cost_fold_increase() {
        let curve = ExperienceCurve {
            unit_cost: 1000.0,
            reference_size: 10.0,
            cost_reduction: Dimensionless(0.1),
            fold_increase: 2.0,
        };
        // Needs to be double the reference size before costs come down
        assert_approx_eq!(Money, curve.capital_cost(20.0).unwrap(), Money(20000.0));
    }

    #[test]
    fn test_capital_cost_linear() {
        assert_eq!(
            ExperienceCurve::linear(50.0).capital_cost(3.0).unwrap(),
            Money(150.0)
        );
    }

    #[test]
    fn test_capital_cost_no_reference_size() {
        let curve = ExperienceCurve {
            reference_size: 0.0,
            cost_reduction: Dimensionless(0.1),
            ..ExperienceCurve::linear(1000.0)
        };
        assert!(curve.capital_cost(10.0).is_err());
    }

    #[rstest]
    fn test_capex(cost_parameters: CostParameters, plant: PlantConfiguration) {
        let costs =
            calculate_costs(&cost_parameters, &plant, &FuelPathway::Hydrogen, &[]).unwrap();
        assert_eq!(
            costs.capex.keys().copied().collect::<Vec<_>>(),
            [
                Subsystem::Solar,
                Subsystem::Wind,
                Subsystem::Battery,
                Subsystem::Electrolyser
            ]
        );
        assert_approx_eq!(Money, costs.capex[&Subsystem::Solar], Money(15e6));
        assert_approx_eq!(Money, costs.capex[&Subsystem::Wind], Money(15e6));
        assert_approx_eq!(Money, costs.capex[&Subsystem::Battery], Money(3e6));
        assert_approx_eq!(Money, costs.capex[&Subsystem::Electrolyser], Money(12e6));
        assert_approx_eq!(Money, costs.total_capex(), Money(45e6));

        // 10% EPC and 2% land on the electrolyser only
        assert_approx_eq!(Money, costs.total_indirect(), Money(1.44e6));
        assert_approx_eq!(
            Money,
            costs.upfront_investment(),
            Money(45e6 + 1.44e6 + 250_000.0)
        );
    }

    #[rstest]
    fn test_annual_costs(cost_parameters: CostParameters, plant: PlantConfiguration) {
        let annual = [summary(1, true, false), summary(2, false, false)];
        let costs =
            calculate_costs(&cost_parameters, &plant, &FuelPathway::Hydrogen, &annual).unwrap();
        let year1 = &costs.annual[0];
        let year2 = &costs.annual[1];

        assert_eq!(year1.costs.len(), OperatingCostCategory::iter().count());
        assert_approx_eq!(
            Money,
            year1.get(OperatingCostCategory::ElectrolyserOm),
            Money(360_000.0)
        );
        assert_approx_eq!(
            Money,
            year1.get(OperatingCostCategory::ElectricitySale),
            Money(-400.0)
        );
        assert_eq!(
            year1.get(OperatingCostCategory::ElectricityPurchase),
            Money(0.0)
        );

        // Replacement cost only in the year it happens
        assert_approx_eq!(
            Money,
            year1.get(OperatingCostCategory::StackReplacement),
            Money(3e6)
        );
        assert_eq!(
            year2.get(OperatingCostCategory::StackReplacement),
            Money(0.0)
        );

        // 1000 kg hydrogen * 15 L/kg at 2 per kL
        assert_approx_eq!(Money, year1.get(OperatingCostCategory::Water), Money(30.0));
        assert_approx_eq!(
            Money,
            year1.get(OperatingCostCategory::OxygenSale),
            Money(-793.6)
        );
        assert_eq!(
            year1.get(OperatingCostCategory::AdditionalCosts),
            Money(10_000.0)
        );
        assert_eq!(year1.get(OperatingCostCategory::Feedstock), Money(0.0));
    }

    #[rstest]
    fn test_ppa(cost_parameters: CostParameters, plant: PlantConfiguration) {
        let params = CostParameters {
            ppa_price: MoneyPerEnergy(30.0),
            ..cost_parameters
        };
        let costs =
            calculate_costs(&params, &plant, &FuelPathway::Hydrogen, &[summary(1, false, true)])
                .unwrap();

        assert_eq!(costs.capex[&Subsystem::Solar], Money(0.0));
        assert_eq!(costs.capex[&Subsystem::Wind], Money(0.0));
        let year1 = &costs.annual[0];
        assert_eq!(year1.get(OperatingCostCategory::SolarOm), Money(0.0));
        assert_approx_eq!(
            Money,
            year1.get(OperatingCostCategory::ElectricityPurchase),
            Money(1800.0)
        );
        assert_eq!(year1.get(OperatingCostCategory::ElectricitySale), Money(0.0));
        assert_approx_eq!(
            Money,
            year1.get(OperatingCostCategory::BatteryReplacement),
            Money(1.5e6)
        );
    }

    #[rstest]
    fn test_synthesis_costs(cost_parameters: CostParameters, plant: PlantConfiguration) {
        let pathway = FuelPathway::Synthesis(SynthesisPlant {
            fuel: Fuel::Methanol,
            efficiency: Dimensionless(1.0),
            electricity_intensity: 0.5,
            costs: SubsystemCosts {
                curve: ExperienceCurve::linear(100_000.0),
                om_rate: Dimensionless(0.02),
                ..Default::default()
            },
        });
        let costs = calculate_costs(&cost_parameters, &plant, &pathway, &[summary(1, false, false)])
            .unwrap();

        let size = pathway
            .synthesis_plant()
            .unwrap()
            .capacity(&plant.performance, plant.electrolyser_capacity, 1.0);
        assert_approx_eq!(
            Money,
            costs.capex[&Subsystem::SynthesisPlant],
            Money(100_000.0 * size)
        );

        let year1 = &costs.annual[0];
        assert_approx_eq!(
            Money,
            year1.get(OperatingCostCategory::SynthesisOm),
            Money(2000.0 * size)
        );

        // 1 t of fuel uses 0.5 MWh at the spot price of 40 and 1.3735 t of CO2 at 50
        assert_approx_eq!(
            Money,
            year1.get(OperatingCostCategory::ElectricityPurchase),
            Money(20.0)
        );
        assert_approx_eq!(
            Money,
            year1.get(OperatingCostCategory::Feedstock),
            Money(68.675)
        );
    }

    #[rstest]
    fn test_rounded(cost_parameters: CostParameters, plant: PlantConfiguration) {
        let costs = calculate_costs(
            &cost_parameters,
            &plant,
            &FuelPathway::Hydrogen,
            &[summary(1, false, false)],
        )
        .unwrap();
        let rounded = costs.rounded();
        assert_eq!(
            rounded.annual[0].get(OperatingCostCategory::OxygenSale),
            Money(-794.0)
        );

        // Internal values are untouched
        assert_approx_eq!(
            Money,
            costs.annual[0].get(OperatingCostCategory::OxygenSale),
            Money(-793.6)
        );
    }
}
