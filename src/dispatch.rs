//! Hourly dispatch of the electrolyser against a blended generator trace.
//!
//! Dispatch happens in up to three passes:
//!
//! 1. The generator output is clipped to the electrolyser's load bounds
//! 2. If enabled, the electrolyser may run above its maximum load for short bursts
//! 3. If a battery is present, surplus generation is stored and used to keep the electrolyser
//!    running
use crate::error::{EngineError, EngineResult};
use crate::units::{Capacity, Dimensionless, Energy, Hours};

pub mod battery;
pub mod overload;
use battery::buffer_with_battery;
use overload::apply_overload;

/// The battery durations (in hours) for which a battery can be simulated
pub const SUPPORTED_BATTERY_DURATIONS: [u32; 4] = [1, 2, 4, 8];

/// The range of loads at which the electrolyser can run, as proportions of nameplate capacity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadBounds {
    /// Minimum load. Below this the electrolyser is switched off.
    pub min: f64,
    /// Maximum load during normal operation
    pub max: f64,
}

/// Parameters for running the electrolyser above its maximum load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverloadSpec {
    /// Maximum load while overloading, as a proportion of nameplate capacity
    pub max: f64,
    /// Number of hours after an overload during which the electrolyser cannot overload again
    pub recharge_hours: usize,
}

impl OverloadSpec {
    /// Whether overloading has any effect for the given load bounds
    pub fn is_enabled(&self, load: &LoadBounds) -> bool {
        self.max > load.max && self.recharge_hours > 0
    }
}

/// A battery used to buffer surplus generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatterySpec {
    /// Rated charge/discharge power
    pub power: Capacity,
    /// Storage duration at rated power
    pub duration: u32,
    /// Round-trip efficiency
    pub round_trip_efficiency: Dimensionless,
    /// Minimum state of charge the battery may be discharged to
    pub min_state_of_charge: Dimensionless,
}

impl BatterySpec {
    /// Whether the battery takes part in dispatch
    pub fn is_enabled(&self) -> bool {
        self.power > Capacity(0.0)
    }

    /// Total energy storage capacity
    pub fn energy(&self) -> Energy {
        self.power * Hours(self.duration as f64)
    }

    /// Efficiency of a single charge or discharge leg.
    ///
    /// Round-trip losses are split evenly between the two legs.
    pub fn leg_efficiency(&self) -> f64 {
        1.0 - (1.0 - self.round_trip_efficiency.value()) / 2.0
    }

    /// Check that the battery duration is supported
    pub fn check_duration(&self) -> EngineResult<()> {
        if SUPPORTED_BATTERY_DURATIONS.contains(&self.duration) {
            Ok(())
        } else {
            Err(EngineError::UnsupportedBatteryDuration(self.duration))
        }
    }
}

/// Everything needed to dispatch the electrolyser for one capacity configuration
#[derive(Debug, Clone, Copy)]
pub struct DispatchInputs<'a> {
    /// Blended generator capacity factors
    pub generator_cf: &'a [f64],
    /// Ratio of generation capacity to electrolyser capacity
    pub oversize_ratio: f64,
    /// Electrolyser nameplate capacity
    pub electrolyser_capacity: Capacity,
    /// Electrolyser load bounds
    pub load: LoadBounds,
    /// Overload parameters, if the electrolyser may be overloaded
    pub overload: Option<OverloadSpec>,
    /// Battery parameters, if there is a battery
    pub battery: Option<BatterySpec>,
}

impl DispatchInputs<'_> {
    /// Generator output in the given hour as a proportion of electrolyser capacity
    fn candidate_load(&self, hour: usize) -> f64 {
        self.generator_cf[hour] * self.oversize_ratio
    }

    /// Generation not used by the electrolyser at the given load
    fn spill(&self, hour: usize, electrolyser_cf: f64) -> Energy {
        self.electrolyser_capacity * Hours(self.candidate_load(hour) - electrolyser_cf)
    }
}

/// Hourly result of dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    /// Electrolyser capacity factor
    pub electrolyser_cf: Vec<f64>,
    /// Battery state of charge at the end of each hour (zero if there is no battery)
    pub battery_soc: Vec<f64>,
    /// Generation used by neither the electrolyser nor the battery
    pub surplus: Vec<Energy>,
}

/// Clip generator output to the electrolyser's load bounds.
///
/// Output above the maximum load is capped. Output below the minimum load cannot be used at all,
/// so the electrolyser is off for that hour.
pub fn clip_to_load_bounds(generator_cf: &[f64], oversize_ratio: f64, load: &LoadBounds) -> Vec<f64> {
    generator_cf
        .iter()
        .map(|cf| {
            let candidate = cf * oversize_ratio;
            if candidate > load.max {
                load.max
            } else if candidate < load.min {
                0.0
            } else {
                candidate
            }
        })
        .collect()
}

/// Dispatch the electrolyser for every hour of the generator trace.
///
/// The battery duration is checked before any hourly computation takes place.
pub fn dispatch(inputs: &DispatchInputs) -> EngineResult<Dispatch> {
    let battery = inputs.battery.filter(BatterySpec::is_enabled);
    if let Some(battery) = &battery {
        battery.check_duration()?;
    }

    let mut electrolyser_cf =
        clip_to_load_bounds(inputs.generator_cf, inputs.oversize_ratio, &inputs.load);

    if let Some(overload) = inputs.overload.filter(|o| o.is_enabled(&inputs.load)) {
        electrolyser_cf = apply_overload(
            inputs.generator_cf,
            inputs.oversize_ratio,
            &inputs.load,
            &overload,
            &electrolyser_cf,
        );
    }

    match battery {
        Some(battery) => buffer_with_battery(inputs, &battery, &electrolyser_cf),
        None => {
            let surplus = electrolyser_cf
                .iter()
                .enumerate()
                .map(|(hour, cf)| inputs.spill(hour, *cf))
                .collect();
            Ok(Dispatch {
                battery_soc: vec![0.0; electrolyser_cf.len()],
                electrolyser_cf,
                surplus,
            })
        }
    }
}
