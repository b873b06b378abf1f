//! Fixtures for tests
use crate::cost::{CostParameters, ExperienceCurve, SubsystemCosts};
use crate::dispatch::{BatterySpec, LoadBounds, OverloadSpec};
use crate::fuel::{ElectrolyserPerformance, FuelPathway, SpecificConsumptionType};
use crate::generation::{GenerationTrace, GenerationTraces};
use crate::levelised::{DepreciationProfile, FinancingParameters};
use crate::operation::PlantConfiguration;
use crate::projection::{
    AnnualSummary, DegradationRates, ReplacementSchedule, StackReplacementPolicy,
};
use crate::simulation::ScenarioParameters;
use crate::units::{
    Capacity, Dimensionless, Energy, Mass, Money, MoneyPerEnergy, MoneyPerMass,
};
use rstest::fixture;
use std::f64::consts::PI;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Two days of synthetic solar and wind data
#[fixture]
pub fn traces() -> GenerationTraces {
    let solar = (0..48)
        .map(|hour| {
            let hour_of_day = (hour % 24) as f64;
            (0.9 * (PI * (hour_of_day - 6.0) / 12.0).sin()).max(0.0)
        })
        .collect();
    let wind = (0..48)
        .map(|hour| (0.35 + 0.3 * (0.7 * hour as f64).sin()).clamp(0.0, 1.0))
        .collect();

    GenerationTraces::new(GenerationTrace::new(solar), GenerationTrace::new(wind)).unwrap()
}

#[fixture]
pub fn load_bounds() -> LoadBounds {
    LoadBounds { min: 0.1, max: 1.0 }
}

#[fixture]
pub fn battery() -> BatterySpec {
    BatterySpec {
        power: Capacity(5.0),
        duration: 2,
        round_trip_efficiency: Dimensionless(0.9),
        min_state_of_charge: Dimensionless(0.0),
    }
}

#[fixture]
pub fn performance() -> ElectrolyserPerformance {
    ElectrolyserPerformance {
        efficiency: Dimensionless(0.7),
        specific_energy_consumption: 50.0,
        hydrogen_volume_to_mass: 0.089,
        consumption_type: SpecificConsumptionType::Fixed,
    }
}

#[fixture]
pub fn plant(
    load_bounds: LoadBounds,
    battery: BatterySpec,
    performance: ElectrolyserPerformance,
) -> PlantConfiguration {
    PlantConfiguration {
        solar_capacity: Capacity(15.0),
        wind_capacity: Capacity(10.0),
        electrolyser_capacity: Capacity(10.0),
        load: load_bounds,
        overload: Some(OverloadSpec {
            max: 1.2,
            recharge_hours: 3,
        }),
        battery: Some(battery),
        performance,
    }
}

/// Linear capital costs with indirect costs on the electrolyser only
#[fixture]
pub fn cost_parameters() -> CostParameters {
    CostParameters {
        solar: SubsystemCosts {
            curve: ExperienceCurve::linear(1e6),
            ..Default::default()
        },
        wind: SubsystemCosts {
            curve: ExperienceCurve::linear(1.5e6),
            ..Default::default()
        },
        battery: SubsystemCosts {
            curve: ExperienceCurve::linear(300_000.0),
            ..Default::default()
        },
        electrolyser: SubsystemCosts {
            curve: ExperienceCurve::linear(1.2e6),
            om_rate: Dimensionless(0.03),
            epc_rate: Dimensionless(0.1),
            land_rate: Dimensionless(0.02),
        },
        stack_replacement_rate: Dimensionless(0.25),
        battery_replacement_rate: Dimensionless(0.5),
        ppa_price: MoneyPerEnergy(0.0),
        spot_price: MoneyPerEnergy(40.0),
        oxygen_price: MoneyPerMass(0.1),
        water_needs: 15.0,
        water_cost: 2.0,
        co2_price: 50.0,
        additional_upfront_costs: Money(250_000.0),
        additional_annual_costs: Money(10_000.0),
    }
}

#[fixture]
pub fn financing() -> FinancingParameters {
    FinancingParameters {
        discount_rate: Dimensionless(0.07),
        fuel_price: MoneyPerMass(6.0),
        equity_share: Dimensionless(0.6),
        loan_interest_rate: Dimensionless(0.05),
        loan_term: 5,
        tax_rate: Dimensionless(0.3),
        depreciation: DepreciationProfile::Macrs5,
        salvage_rate: Dimensionless(0.05),
        decommissioning_rate: Dimensionless(0.02),
    }
}

#[fixture]
pub fn scenario(
    plant: PlantConfiguration,
    cost_parameters: CostParameters,
    financing: FinancingParameters,
) -> ScenarioParameters {
    ScenarioParameters {
        plant,
        degradation: DegradationRates {
            solar: Dimensionless(0.005),
            wind: Dimensionless(0.01),
            stack: Dimensionless(0.02),
        },
        replacement: ReplacementSchedule {
            stack_policy: StackReplacementPolicy::CumulativeHours {
                lifetime_hours: 60,
            },
            battery_lifetime: 4,
        },
        pathway: FuelPathway::Hydrogen,
        costs: cost_parameters,
        financing,
        project_life: 8,
    }
}

/// A year of operation producing the given quantity of fuel
pub fn annual_summary(year: u32, fuel_output: Mass) -> AnnualSummary {
    AnnualSummary {
        year,
        solar_capacity: Capacity(15.0),
        wind_capacity: Capacity(10.0),
        generator_cf: 0.3,
        electrolyser_cf: 0.5,
        generation_energy: Energy(65_700.0),
        electrolyser_energy: Energy(43_800.0),
        surplus_energy: Energy(10_000.0),
        operating_hours: 6000,
        stack_performance: Dimensionless(1.0),
        hydrogen_output: fuel_output,
        fuel_output,
        stack_replacement: false,
        battery_replacement: false,
    }
}
