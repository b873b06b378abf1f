//! Tests of the full calculation chain for the example models, without the command line.
use float_cmp::approx_eq;
use powerfuel::error::EngineError;
use powerfuel::model::Model;
use powerfuel::simulation::run_scenario;
use powerfuel::units::{Mass, MoneyPerMass};
use rstest::rstest;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Copy an example model into `dest`, replacing lines of its model file
fn copy_model(name: &str, dest: &Path, replacements: &[(&str, &str)]) {
    fs::create_dir(dest).unwrap();
    let src = Path::new("demos").join(name);
    for entry in fs::read_dir(&src).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, dest.join(path.file_name().unwrap())).unwrap();
    }

    let model_path = dest.join("model.toml");
    let mut contents = fs::read_to_string(&model_path).unwrap();
    for (from, to) in replacements {
        assert!(contents.contains(from), "{from} not in model file");
        contents = contents.replace(from, to);
    }
    fs::write(model_path, contents).unwrap();
}

#[rstest]
#[case("solar_hydrogen", 20)]
#[case("hybrid_ammonia", 25)]
fn test_example_results_consistent(#[case] name: &str, #[case] project_life: usize) {
    let model = Model::from_path(Path::new("demos").join(name)).unwrap();
    let result = run_scenario(&model.scenario, &model.traces).unwrap();

    assert_eq!(result.projection.annual.len(), project_life);
    assert_eq!(result.financial.cash_flows.len(), project_life + 1);
    assert_eq!(result.projection.first_year.hours(), model.traces.hours());

    // Every year produces fuel and capacity factors are proportions
    for summary in &result.projection.annual {
        assert!(summary.fuel_output > Mass(0.0));
        assert!((0.0..=1.0).contains(&summary.generator_cf));
        assert!(summary.electrolyser_cf >= 0.0);
    }

    // The waterfall accounts for the whole levelised cost
    let levelised_cost = result.financial.levelised_cost;
    assert!(levelised_cost > MoneyPerMass(0.0));
    let total: MoneyPerMass = result.financial.waterfall.values().copied().sum();
    assert!(approx_eq!(
        f64,
        total.value(),
        levelised_cost.value(),
        epsilon = 1e-6
    ));

    // The final cumulative cash flow is the net profit
    let last = result.financial.cash_flows.last().unwrap();
    assert_eq!(last.cumulative_discounted_cash_flow, result.financial.net_profit);
}

#[test]
fn test_unsupported_battery_duration() {
    let dir = tempdir().unwrap();
    let model_dir = dir.path().join("model");
    copy_model(
        "hybrid_ammonia",
        &model_dir,
        &[("battery_duration = 4", "battery_duration = 3")],
    );

    let err = Model::from_path(&model_dir).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::UnsupportedBatteryDuration(3))
    ));
}

#[test]
fn test_missing_location() {
    let dir = tempdir().unwrap();
    let model_dir = dir.path().join("model");
    copy_model(
        "solar_hydrogen",
        &model_dir,
        &[("location = \"pilbara\"", "location = \"hobart\"")],
    );

    let err = Model::from_path(&model_dir).err().unwrap();
    assert_eq!(
        err.chain().last().unwrap().to_string(),
        "Location hobart not found"
    );
}

#[test]
fn test_higher_fuel_price_improves_profit() {
    let dir = tempdir().unwrap();
    let model_dir = dir.path().join("model");
    copy_model("solar_hydrogen", &model_dir, &[("fuel_price = 6", "fuel_price = 8")]);

    let base = Model::from_path("demos/solar_hydrogen").unwrap();
    let base = run_scenario(&base.scenario, &base.traces).unwrap();
    let dearer = Model::from_path(&model_dir).unwrap();
    let dearer = run_scenario(&dearer.scenario, &dearer.traces).unwrap();

    // The levelised cost does not depend on the sale price
    assert_eq!(base.financial.levelised_cost, dearer.financial.levelised_cost);
    assert!(dearer.financial.net_profit > base.financial.net_profit);
}
