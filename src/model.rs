//! The model represents the static input data provided by the user.
use crate::generation::GenerationTraces;
use crate::id::LocationID;
use crate::input::read_traces;
use crate::simulation::ScenarioParameters;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// The scenario described by the model file
    pub scenario: ScenarioParameters,
    /// Location of the plant
    pub location: LocationID,
    /// Solar and wind traces for the plant's location
    pub traces: GenerationTraces,
}

impl Model {
    /// Read a model from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let model_dir = model_dir.as_ref();
        let (parameters, scenario) = ModelParameters::from_path(model_dir)?;
        let location = parameters.location()?;
        let traces = read_traces(model_dir, &location)?;

        Ok(Model {
            model_path: model_dir.to_path_buf(),
            scenario,
            location,
            traces,
        })
    }
}
