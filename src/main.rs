use anyhow::{bail, Context};
use std::sync::Arc;
use tradegene::{
    config::ConfigManager,
    data::CsvDirectoryProvider,
    engines::{
        evaluation::Market,
        generation::{ConsoleProgressCallback, EvolutionEngine},
        Experiment,
    },
    functions::RuleRegistry,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let manager = ConfigManager::new();
    if let Some(path) = std::env::args().nth(1) {
        manager
            .load_from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?;
    }
    let config = manager.get()?;

    let provider = CsvDirectoryProvider::new(&config.market.data_dir);
    let symbols = if config.market.symbols.is_empty() {
        provider.list_symbols().with_context(|| {
            format!("Failed to list symbols in {}", config.market.data_dir.display())
        })?
    } else {
        config.market.symbols.clone()
    };
    if symbols.is_empty() {
        bail!("No symbols to trade in {}", config.market.data_dir.display());
    }
    log::info!("Trading {} symbols", symbols.len());

    let options = config.market.options();
    let train = Market::new(&provider, &symbols, config.market.train.start, config.market.train.end, options)
        .context("Failed to build the training market")?;
    let test = Market::new(&provider, &symbols, config.market.test.start, config.market.test.end, options)
        .context("Failed to build the test market")?;

    let engine = EvolutionEngine::new(config.evolution, Arc::new(RuleRegistry::standard()))?;
    let mut experiment = Experiment::from_settings(&config.experiment, engine, train)?;

    let report = experiment.run(config.experiment.generations, &mut ConsoleProgressCallback)?;
    let test_summary = experiment.evaluate_on(&test);
    log::info!("Test fitness: best {:.4}, average {:.4}", test_summary.best, test_summary.avg);

    let output = serde_json::json!({
        "train": report,
        "test": test_summary,
        "skipped": {
            "train": experiment.market().skipped(),
            "test": test.skipped(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
