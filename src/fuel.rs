//! Converting electrolyser operation into fuel output.
//!
//! Hydrogen output is calculated per hour from the electrolyser capacity factor. Other fuels are
//! made from that hydrogen in a synthesis plant.
use crate::cost::SubsystemCosts;
use crate::units::{Capacity, Dimensionless, Energy, KG_PER_TONNE, KW_PER_MW, Mass};
use serde_string_enum::DeserializeLabeledStringEnum;

/// Default density of hydrogen (kg/Nm³)
pub const DEFAULT_HYDROGEN_VOLUME_TO_MASS: f64 = 0.089;

/// Mass of oxygen produced per unit mass of hydrogen
pub const OXYGEN_PER_HYDROGEN: f64 = 7.936;

/// How the electrolyser's specific energy consumption varies with load
#[derive(DeserializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Default)]
pub enum SpecificConsumptionType {
    /// Consumption is the same at all loads
    #[default]
    #[string = "fixed"]
    Fixed,
    /// Consumption depends on load
    #[string = "variable"]
    Variable,
}

/// The fuel produced by the plant
#[derive(
    DeserializeLabeledStringEnum, strum::Display, Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
)]
#[strum(serialize_all = "snake_case")]
pub enum Fuel {
    /// Hydrogen straight from the electrolyser
    #[default]
    #[string = "hydrogen"]
    Hydrogen,
    /// Ammonia (NH₃)
    #[string = "ammonia"]
    Ammonia,
    /// Methanol (CH₃OH)
    #[string = "methanol"]
    Methanol,
    /// Synthetic methane (CH₄)
    #[string = "methane"]
    Methane,
}

impl Fuel {
    /// Mass of fuel produced per unit mass of hydrogen with perfect conversion
    pub fn stoichiometric_yield(self) -> f64 {
        match self {
            Self::Hydrogen => 1.0,
            Self::Ammonia => 5.632,
            Self::Methanol => 5.298,
            Self::Methane => 1.989,
        }
    }

    /// Mass of CO₂ feedstock consumed per unit mass of fuel
    pub fn co2_intensity(self) -> f64 {
        match self {
            Self::Hydrogen | Self::Ammonia => 0.0,
            Self::Methanol => 1.3735,
            Self::Methane => 2.7433,
        }
    }
}

/// Performance characteristics of the electrolyser
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectrolyserPerformance {
    /// Electrolyser system efficiency
    pub efficiency: Dimensionless,
    /// Specific energy consumption at nominal load (kWh/Nm³)
    pub specific_energy_consumption: f64,
    /// Density of hydrogen (kg/Nm³)
    pub hydrogen_volume_to_mass: f64,
    /// Whether consumption depends on load
    pub consumption_type: SpecificConsumptionType,
}

impl ElectrolyserPerformance {
    /// Hydrogen produced per MW of capacity before dividing by specific consumption
    pub fn hydrogen_output_constant(&self) -> f64 {
        self.hydrogen_volume_to_mass * KW_PER_MW * self.efficiency.value()
    }

    /// Hydrogen produced in one hour per MW of electrolyser capacity (kg), assuming specific
    /// consumption doesn't depend on load
    pub fn fixed_output(&self, electrolyser_cf: f64) -> f64 {
        electrolyser_cf * self.hydrogen_output_constant() / self.specific_energy_consumption
    }

    /// Hydrogen produced in one hour per MW of electrolyser capacity (kg), with specific
    /// consumption depending on load
    pub fn variable_output(&self, electrolyser_cf: f64) -> f64 {
        if electrolyser_cf == 0.0 {
            return 0.0;
        }

        let x = electrolyser_cf;
        let consumption = 1.25 * x.powi(2) - 0.4286 * x + self.specific_energy_consumption - 0.85;
        electrolyser_cf * self.hydrogen_output_constant() / consumption
    }

    /// Hourly hydrogen output for the configured consumption type
    pub fn output(&self, electrolyser_cf: f64) -> f64 {
        match self.consumption_type {
            SpecificConsumptionType::Fixed => self.fixed_output(electrolyser_cf),
            SpecificConsumptionType::Variable => self.variable_output(electrolyser_cf),
        }
    }
}

/// Hourly hydrogen output calculated both ways
#[derive(Debug, Clone, PartialEq)]
pub struct HydrogenOutput {
    /// Output assuming fixed specific consumption
    pub fixed: Vec<Mass>,
    /// Output with load-dependent specific consumption
    pub variable: Vec<Mass>,
}

/// Calculate the hydrogen produced in each hour.
///
/// # Arguments
///
/// * `performance` - Electrolyser performance
/// * `electrolyser_cf` - Hourly electrolyser capacity factors
/// * `electrolyser_capacity` - Electrolyser nameplate capacity
pub fn hydrogen_output(
    performance: &ElectrolyserPerformance,
    electrolyser_cf: &[f64],
    electrolyser_capacity: Capacity,
) -> HydrogenOutput {
    let capacity = electrolyser_capacity.value();
    let (fixed, variable) = electrolyser_cf
        .iter()
        .map(|cf| {
            (
                Mass(performance.fixed_output(*cf) * capacity),
                Mass(performance.variable_output(*cf) * capacity),
            )
        })
        .unzip();

    HydrogenOutput { fixed, variable }
}

/// A plant which turns hydrogen into another fuel
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisPlant {
    /// The fuel produced
    pub fuel: Fuel,
    /// Proportion of the stoichiometric yield which is achieved
    pub efficiency: Dimensionless,
    /// Electricity drawn from the grid per tonne of fuel (MWh/t)
    pub electricity_intensity: f64,
    /// Cost parameters. Plant size is measured in tonnes of fuel per day.
    pub costs: SubsystemCosts,
}

impl SynthesisPlant {
    /// Mass of fuel produced from the given mass of hydrogen
    pub fn fuel_from_hydrogen(&self, hydrogen: Mass) -> Mass {
        hydrogen * Dimensionless(self.fuel.stoichiometric_yield()) * self.efficiency
    }

    /// Plant size (t/day) needed to convert the electrolyser's output at maximum load
    pub fn capacity(
        &self,
        performance: &ElectrolyserPerformance,
        electrolyser_capacity: Capacity,
        max_load: f64,
    ) -> f64 {
        let hydrogen_per_day =
            Mass(performance.fixed_output(max_load) * electrolyser_capacity.value() * 24.0);
        self.fuel_from_hydrogen(hydrogen_per_day).value() / KG_PER_TONNE
    }

    /// Grid electricity used to produce the given mass of fuel
    pub fn electricity_demand(&self, fuel: Mass) -> Energy {
        Energy(fuel.value() / KG_PER_TONNE * self.electricity_intensity)
    }

    /// CO₂ feedstock used to produce the given mass of fuel
    pub fn co2_demand(&self, fuel: Mass) -> Mass {
        fuel * Dimensionless(self.fuel.co2_intensity())
    }
}

/// How the plant's fuel is produced
#[derive(Debug, Clone, PartialEq)]
pub enum FuelPathway {
    /// Hydrogen is the final product
    Hydrogen,
    /// Hydrogen is fed to a synthesis plant
    Synthesis(SynthesisPlant),
}

impl FuelPathway {
    /// The fuel produced
    pub fn fuel(&self) -> Fuel {
        match self {
            Self::Hydrogen => Fuel::Hydrogen,
            Self::Synthesis(plant) => plant.fuel,
        }
    }

    /// Mass of fuel produced from the given mass of hydrogen
    pub fn fuel_output(&self, hydrogen: Mass) -> Mass {
        match self {
            Self::Hydrogen => hydrogen,
            Self::Synthesis(plant) => plant.fuel_from_hydrogen(hydrogen),
        }
    }

    /// The synthesis plant, if there is one
    pub fn synthesis_plant(&self) -> Option<&SynthesisPlant> {
        match self {
            Self::Hydrogen => None,
            Self::Synthesis(plant) => Some(plant),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::ExperienceCurve;
    use crate::fixture::performance;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_hydrogen_output_constant(performance: ElectrolyserPerformance) {
        assert_approx_eq!(f64, performance.hydrogen_output_constant(), 62.3, epsilon = 1e-9);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(0.5, 0.623)]
    #[case(1.0, 1.246)]
    fn test_fixed_output(
        performance: ElectrolyserPerformance,
        #[case] cf: f64,
        #[case] expected: f64,
    ) {
        assert_approx_eq!(f64, performance.fixed_output(cf), expected, epsilon = 1e-9);
    }

    #[rstest]
    fn test_variable_output(performance: ElectrolyserPerformance) {
        assert_eq!(performance.variable_output(0.0), 0.0);
        assert_approx_eq!(
            f64,
            performance.variable_output(1.0),
            62.3 / 49.9714,
            epsilon = 1e-9
        );

        // Specific consumption is lower at part load
        let half = performance.variable_output(0.5);
        assert!(half > performance.fixed_output(0.5));
    }

    #[rstest]
    fn test_variable_output_zero_load_with_degenerate_consumption(
        performance: ElectrolyserPerformance,
    ) {
        // The polynomial would be zero here, but it isn't evaluated
        let performance = ElectrolyserPerformance {
            specific_energy_consumption: 0.85,
            ..performance
        };
        assert_eq!(performance.variable_output(0.0), 0.0);
    }

    #[rstest]
    fn test_hydrogen_output(performance: ElectrolyserPerformance) {
        let output = hydrogen_output(&performance, &[0.0, 0.5, 1.0], Capacity(10.0));
        assert_eq!(output.fixed.len(), 3);
        assert_eq!(output.variable[0], Mass(0.0));
        assert_approx_eq!(Mass, output.fixed[2], Mass(12.46), epsilon = 1e-9);
        assert_approx_eq!(
            Mass,
            output.variable[1],
            Mass(performance.variable_output(0.5) * 10.0)
        );
    }

    #[rstest]
    #[case(Fuel::Hydrogen, 100.0)]
    #[case(Fuel::Ammonia, 506.88)]
    #[case(Fuel::Methanol, 476.82)]
    #[case(Fuel::Methane, 179.01)]
    fn test_fuel_output(#[case] fuel: Fuel, #[case] expected: f64) {
        let pathway = match fuel {
            Fuel::Hydrogen => FuelPathway::Hydrogen,
            fuel => FuelPathway::Synthesis(SynthesisPlant {
                fuel,
                efficiency: Dimensionless(0.9),
                electricity_intensity: 0.5,
                costs: SubsystemCosts::default(),
            }),
        };
        assert_eq!(pathway.fuel(), fuel);
        assert_approx_eq!(
            Mass,
            pathway.fuel_output(Mass(100.0)),
            Mass(expected),
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn test_synthesis_plant(performance: ElectrolyserPerformance) {
        let plant = SynthesisPlant {
            fuel: Fuel::Methanol,
            efficiency: Dimensionless(1.0),
            electricity_intensity: 0.4,
            costs: SubsystemCosts {
                curve: ExperienceCurve {
                    unit_cost: 1.0,
                    reference_size: 1.0,
                    cost_reduction: Dimensionless(0.0),
                    fold_increase: 1.0,
                },
                ..SubsystemCosts::default()
            },
        };

        // 10 MW at full load makes 12.46 kg/h of hydrogen
        let expected = 12.46 * 24.0 * 5.298 / 1000.0;
        assert_approx_eq!(
            f64,
            plant.capacity(&performance, Capacity(10.0), 1.0),
            expected,
            epsilon = 1e-9
        );

        assert_approx_eq!(Energy, plant.electricity_demand(Mass(2000.0)), Energy(0.8));
        assert_approx_eq!(Mass, plant.co2_demand(Mass(2.0)), Mass(2.747));
    }

    #[test]
    fn test_fuel_display() {
        assert_eq!(Fuel::Methanol.to_string(), "methanol");
    }
}
