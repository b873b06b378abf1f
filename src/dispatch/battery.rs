//! Buffering surplus generation with a battery.
//!
//! The battery is dispatched hour by hour as a state machine. At the start of each hour, the
//! battery's state of charge, the generation spilled by the electrolyser and the energy the battery
//! could deliver determine which [`BatteryAction`] is taken. Actions are checked in priority order
//! and the first that applies wins.
use super::{BatterySpec, Dispatch, DispatchInputs};
use crate::error::{EngineError, EngineResult};
use crate::units::Energy;

/// What the battery does in a given hour.
///
/// Energies are in MWh. "Delivered" energy is what reaches the electrolyser after discharge
/// losses, "stored" energy is what ends up in the battery after charge losses.
#[derive(Debug, Clone, Copy, PartialEq)]
enum BatteryAction {
    /// Discharge to bring an idle electrolyser up to its minimum load
    StartUp { delivered: f64 },
    /// Spill is enough to fill the battery, so charge it exactly to capacity
    FillToCapacity,
    /// Charge with spill, limited by rated power
    Charge { stored: f64 },
    /// Even with the battery, the electrolyser can't reach minimum load
    Insufficient,
    /// Discharge to push an operating electrolyser towards its maximum load
    TopUp { delivered: f64 },
    /// No spill and the electrolyser is not running
    Idle,
}

/// Conditions at the start of an hour
#[derive(Debug, Clone, Copy)]
struct HourState {
    /// State of charge at the end of the previous hour
    soc: f64,
    /// Generation not used by the electrolyser
    spill: f64,
    /// Electrolyser consumption from generation alone
    load: f64,
    /// Energy the battery could deliver to the electrolyser this hour
    discharge_potential: f64,
    /// Whether the electrolyser ran in the previous hour
    was_operating: bool,
}

/// Outcome of an hour of battery dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
struct HourOutcome {
    soc: f64,
    electrolyser_energy: f64,
    surplus: f64,
}

/// Battery and electrolyser limits in energy terms for a one-hour step
struct BatteryModel {
    energy: f64,
    power: f64,
    leg_efficiency: f64,
    min_soc: f64,
    min_load: f64,
    max_load: f64,
}

impl BatteryModel {
    fn new(inputs: &DispatchInputs, battery: &BatterySpec) -> Self {
        let capacity = inputs.electrolyser_capacity.value();
        Self {
            energy: battery.energy().value(),
            power: battery.power.value(),
            leg_efficiency: battery.leg_efficiency(),
            min_soc: battery.min_state_of_charge.value(),
            min_load: inputs.load.min * capacity,
            max_load: inputs.load.max * capacity,
        }
    }

    /// Energy needed to fill the battery
    fn headroom(&self, soc: f64) -> f64 {
        (1.0 - soc) * self.energy
    }

    /// Energy which could be stored from the given spill
    fn chargeable(&self, spill: f64) -> f64 {
        (spill * self.leg_efficiency).min(self.power)
    }

    /// Energy which could be delivered to the electrolyser
    fn discharge_potential(&self, soc: f64) -> f64 {
        self.power
            .min((soc - self.min_soc) * self.energy)
            .max(0.0)
            * self.leg_efficiency
    }

    /// Choose an action for the first hour, when the battery can only be charged
    fn first_hour_action(&self, state: &HourState) -> BatteryAction {
        if state.spill > 0.0 && self.chargeable(state.spill) >= self.headroom(state.soc) {
            BatteryAction::FillToCapacity
        } else if state.spill > 0.0 {
            BatteryAction::Charge {
                stored: self.chargeable(state.spill),
            }
        } else {
            BatteryAction::Idle
        }
    }

    /// Choose an action for any hour after the first
    fn choose_action(&self, hour: usize, state: &HourState) -> EngineResult<BatteryAction> {
        let operating = state.load > 0.0 || state.was_operating;

        let action = if state.load == 0.0
            && !state.was_operating
            && self.min_load > state.spill
            && state.spill + state.discharge_potential >= self.min_load
        {
            BatteryAction::StartUp {
                delivered: self.min_load - state.spill,
            }
        } else if state.spill > 0.0 && self.chargeable(state.spill) >= self.headroom(state.soc) {
            BatteryAction::FillToCapacity
        } else if state.spill > 0.0 {
            BatteryAction::Charge {
                stored: self.chargeable(state.spill),
            }
        } else if state.load + state.spill + state.discharge_potential < self.min_load {
            BatteryAction::Insufficient
        } else if state.spill == 0.0 && operating {
            BatteryAction::TopUp {
                delivered: (self.max_load - state.load)
                    .max(0.0)
                    .min(state.discharge_potential),
            }
        } else if state.spill == 0.0 {
            BatteryAction::Idle
        } else {
            return Err(EngineError::UnhandledBatteryState {
                hour,
                state_of_charge: state.soc,
                spill: state.spill,
            });
        };

        Ok(action)
    }

    /// Apply an action, returning the end-of-hour state
    fn apply(&self, action: BatteryAction, state: &HourState) -> HourOutcome {
        let unchanged = HourOutcome {
            soc: state.soc,
            electrolyser_energy: state.load,
            surplus: state.spill,
        };

        match action {
            BatteryAction::StartUp { delivered } => HourOutcome {
                soc: state.soc - delivered / self.leg_efficiency / self.energy,
                electrolyser_energy: state.spill + delivered,
                surplus: 0.0,
            },
            BatteryAction::FillToCapacity => HourOutcome {
                soc: 1.0,
                surplus: (state.spill - self.headroom(state.soc) / self.leg_efficiency).max(0.0),
                ..unchanged
            },
            BatteryAction::Charge { stored } => HourOutcome {
                soc: state.soc + stored / self.energy,
                surplus: (state.spill - stored / self.leg_efficiency).max(0.0),
                ..unchanged
            },
            BatteryAction::TopUp { delivered } => HourOutcome {
                soc: state.soc - delivered / self.leg_efficiency / self.energy,
                electrolyser_energy: state.load + delivered,
                ..unchanged
            },
            BatteryAction::Insufficient | BatteryAction::Idle => unchanged,
        }
    }
}

/// Use a battery to store surplus generation and keep the electrolyser running.
///
/// The battery starts empty and is charged opportunistically in the first hour.
///
/// # Arguments
///
/// * `inputs` - Dispatch inputs
/// * `battery` - The battery, which must have a supported duration
/// * `electrolyser_cf` - Electrolyser capacity factors before the battery is considered
///
/// # Returns
///
/// The dispatch result or an error if an hour is reached which no battery action covers.
pub fn buffer_with_battery(
    inputs: &DispatchInputs,
    battery: &BatterySpec,
    electrolyser_cf: &[f64],
) -> EngineResult<Dispatch> {
    let model = BatteryModel::new(inputs, battery);
    let capacity = inputs.electrolyser_capacity.value();

    let hours = electrolyser_cf.len();
    let mut result = Dispatch {
        electrolyser_cf: Vec::with_capacity(hours),
        battery_soc: Vec::with_capacity(hours),
        surplus: Vec::with_capacity(hours),
    };

    let mut soc = 0.0;
    let mut was_operating = false;
    for (hour, cf) in electrolyser_cf.iter().enumerate() {
        let state = HourState {
            soc,
            spill: inputs.spill(hour, *cf).value(),
            load: cf * capacity,
            discharge_potential: model.discharge_potential(soc),
            was_operating,
        };

        let action = if hour == 0 {
            model.first_hour_action(&state)
        } else {
            model.choose_action(hour, &state)?
        };
        let outcome = model.apply(action, &state);

        let final_cf = outcome.electrolyser_energy / capacity;
        result.electrolyser_cf.push(final_cf);
        result.battery_soc.push(outcome.soc);
        result.surplus.push(Energy(outcome.surplus));

        soc = outcome.soc;
        was_operating = final_cf > 0.0;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{LoadBounds, OverloadSpec, clip_to_load_bounds, dispatch};
    use crate::fixture::{battery, load_bounds};
    use crate::units::Capacity;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    /// Run the battery pass with an oversize ratio of one and a 10 MW electrolyser
    fn run(generator_cf: &[f64], battery: &BatterySpec) -> EngineResult<Dispatch> {
        let inputs = DispatchInputs {
            generator_cf,
            oversize_ratio: 1.0,
            electrolyser_capacity: Capacity(10.0),
            load: load_bounds(),
            overload: None,
            battery: Some(*battery),
        };
        let clipped = clip_to_load_bounds(generator_cf, 1.0, &inputs.load);
        buffer_with_battery(&inputs, battery, &clipped)
    }

    #[rstest]
    fn test_first_hour_charges(battery: BatterySpec) {
        // 5 MWh of spill, of which 95% can be stored
        let result = run(&[1.5], &battery).unwrap();
        assert_eq!(result.electrolyser_cf, [1.0]);
        assert_approx_eq!(f64, result.battery_soc[0], 0.475, epsilon = 1e-9);
        assert_approx_eq!(f64, result.surplus[0].value(), 0.0, epsilon = 1e-12);
    }

    #[rstest]
    fn test_charge_limited_by_power(battery: BatterySpec) {
        // 10 MWh of spill, but only 5 MW of charging power
        let result = run(&[1.5, 2.0], &battery).unwrap();
        assert_approx_eq!(f64, result.battery_soc[1], 0.975, epsilon = 1e-9);
        assert_approx_eq!(f64, result.surplus[1].value(), 10.0 - 5.0 / 0.95, epsilon = 1e-9);
    }

    #[rstest]
    fn test_fill_to_capacity_exactly(battery: BatterySpec) {
        let result = run(&[1.5, 2.0, 2.0], &battery).unwrap();
        assert_eq!(result.battery_soc[2], 1.0);

        // Only the remaining headroom is taken from the spill
        let headroom = 10.0 * (1.0 - result.battery_soc[1]);
        assert_approx_eq!(f64, result.surplus[2].value(), 10.0 - headroom / 0.95, epsilon = 1e-9);
    }

    #[rstest]
    fn test_fill_when_already_full(battery: BatterySpec) {
        let result = run(&[1.5, 2.0, 2.0, 2.0], &battery).unwrap();
        assert_eq!(result.battery_soc[3], 1.0);
        assert_approx_eq!(f64, result.surplus[3].value(), 10.0, epsilon = 1e-9);
    }

    #[rstest]
    fn test_top_up_operating_electrolyser(battery: BatterySpec) {
        let result = run(&[1.5, 1.5, 0.5, 0.5], &battery).unwrap();

        // All 4.75 MWh the battery can deliver is used, as it doesn't reach max load
        assert_approx_eq!(f64, result.electrolyser_cf[2], 0.975, epsilon = 1e-9);
        assert_approx_eq!(f64, result.battery_soc[2], 0.45, epsilon = 1e-9);

        // Now limited by the remaining state of charge
        assert_approx_eq!(
            f64,
            result.electrolyser_cf[3],
            0.5 + 0.045 * 0.95 * 10.0,
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn test_top_up_limited_by_max_load(battery: BatterySpec) {
        let result = run(&[1.5, 1.5, 0.9], &battery).unwrap();
        assert_approx_eq!(f64, result.electrolyser_cf[2], 1.0, epsilon = 1e-9);
        assert_approx_eq!(f64, result.battery_soc[2], 0.95 - 1.0 / 0.95 / 10.0, epsilon = 1e-9);
    }

    #[rstest]
    fn test_start_up_idle_electrolyser(battery: BatterySpec) {
        let result = run(&[1.5, 1.5, 0.05, 0.05], &battery).unwrap();

        // Electrolyser was running in the previous hour, so spill charges the battery instead
        assert_eq!(result.electrolyser_cf[2], 0.0);
        assert!(result.battery_soc[2] > result.battery_soc[1]);

        // From idle, spill plus battery brings the electrolyser to exactly its minimum load
        assert_approx_eq!(f64, result.electrolyser_cf[3], 0.1, epsilon = 1e-12);
        assert_eq!(result.surplus[3], Energy(0.0));
        assert_approx_eq!(
            f64,
            result.battery_soc[3],
            result.battery_soc[2] - 0.5 / 0.95 / 10.0,
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn test_insufficient_energy(battery: BatterySpec) {
        let result = run(&[0.0, 0.0, 0.02], &battery).unwrap();
        assert_eq!(result.electrolyser_cf, [0.0, 0.0, 0.0]);
        assert_eq!(result.battery_soc[1], 0.0);
    }

    #[rstest]
    fn test_respects_min_state_of_charge(battery: BatterySpec) {
        let battery = BatterySpec {
            min_state_of_charge: crate::units::Dimensionless(0.5),
            ..battery
        };
        let result = run(&[1.5, 1.5, 0.0, 0.0], &battery).unwrap();

        // Only (0.95 - 0.5) * 10 MWh can be drawn
        assert_approx_eq!(f64, result.electrolyser_cf[2], 0.45 * 0.95, epsilon = 1e-12);
        assert_approx_eq!(f64, result.battery_soc[2], 0.5, epsilon = 1e-12);
        assert_eq!(result.electrolyser_cf[3], 0.0);
    }

    #[rstest]
    fn test_unhandled_state(battery: BatterySpec) {
        assert_eq!(
            run(&[0.5, f64::NAN], &battery).unwrap_err().to_string(),
            "Unhandled battery state at hour 1 (state of charge: 0, spill: NaN MWh)"
        );
    }

    #[rstest]
    fn test_capacity_factor_bounds(battery: BatterySpec) {
        // A deterministic, irregular trace
        let generator_cf: Vec<f64> = (0..500)
            .map(|hour| {
                let hour = hour as f64;
                ((hour * 0.26).sin() * 0.6 + (hour * 0.041).cos() * 0.5).max(0.0)
            })
            .collect();
        let load = LoadBounds { min: 0.2, max: 0.9 };
        let overload = OverloadSpec {
            max: 1.1,
            recharge_hours: 3,
        };
        let inputs = DispatchInputs {
            generator_cf: &generator_cf,
            oversize_ratio: 1.8,
            electrolyser_capacity: Capacity(20.0),
            load,
            overload: Some(overload),
            battery: Some(battery),
        };

        let result = dispatch(&inputs).unwrap();
        for (cf, soc) in result.electrolyser_cf.iter().zip(&result.battery_soc) {
            assert!((0.0..=1.1).contains(cf), "capacity factor out of range: {cf}");
            assert!((-1e-9..=1.0).contains(soc), "state of charge out of range: {soc}");
        }
        for surplus in &result.surplus {
            assert!(surplus.value() >= 0.0);
        }
    }
}
