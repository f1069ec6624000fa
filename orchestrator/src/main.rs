use std::{env, fs};

use orchestrator::{
    OrchestratorError,
    configs::{ModelConfig, TrainingConfig},
    evaluate,
};

fn main() -> Result<(), OrchestratorError> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let (Some(model_path), Some(training_path)) = (args.next(), args.next()) else {
        return Err(OrchestratorError::InvalidConfig(
            "usage: orchestrator <model.json> <training.json>".into(),
        ));
    };

    let model: ModelConfig = serde_json::from_str(&fs::read_to_string(model_path)?)?;
    let training: TrainingConfig = serde_json::from_str(&fs::read_to_string(training_path)?)?;

    let report = evaluate(model, training)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
