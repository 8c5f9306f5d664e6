use chrono::{Days, NaiveDate};
use std::io::Write;
use std::path::Path;
use std::sync::{mpsc, Arc};
use tradegene::{
    config::{ConfigManager, EvolutionSettings, ExperimentSettings},
    data::{CsvDirectoryProvider, PriceDataProvider},
    engines::evaluation::{Agent, Market, MarketOptions},
    TradegeneError,
    engines::generation::{ChannelProgressCallback, EvolutionEngine, GenotypeKind, ProgressMessage},
    engines::Experiment,
    functions::RuleRegistry,
};

fn first_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 4).unwrap()
}

/// Writes `<dir>/<symbol>.csv` newest-first, the way the raw exports are laid out
fn write_csv(dir: &Path, symbol: &str, days: u64, phase: f64) {
    let mut file = std::fs::File::create(dir.join(format!("{}.csv", symbol))).unwrap();
    writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
    for i in (0..days).rev() {
        let date = first_day() + Days::new(i);
        let close = 50.0 + ((i as f64 + phase) * 0.25).sin() * 5.0 + i as f64 * 0.02;
        writeln!(
            file,
            "{},{:.4},{:.4},{:.4},{:.4},{}",
            date.format("%Y-%m-%d"),
            close - 0.3,
            close + 0.8,
            close - 0.9,
            close,
            1000 + i * 10
        )
        .unwrap();
    }
}

fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_csv(dir.path(), "AAA", 200, 0.0);
    write_csv(dir.path(), "BBB", 200, 1.7);
    write_csv(dir.path(), "CCC", 200, 3.1);
    dir
}

fn train_window() -> (NaiveDate, NaiveDate) {
    (first_day() + Days::new(30), first_day() + Days::new(120))
}

fn test_window() -> (NaiveDate, NaiveDate) {
    (first_day() + Days::new(120), first_day() + Days::new(190))
}

fn evolution_engine() -> EvolutionEngine {
    EvolutionEngine::new(
        EvolutionSettings::new(0.5, 0.5, 0.2, 0.2, 0.5),
        Arc::new(RuleRegistry::standard()),
    )
    .unwrap()
}

fn experiment(dir: &Path, settings: &ExperimentSettings) -> (Experiment, Market) {
    let provider = CsvDirectoryProvider::new(dir);
    let symbols = provider.list_symbols().unwrap();
    assert_eq!(symbols, vec!["AAA", "BBB", "CCC"]);

    let (train_start, train_end) = train_window();
    let (test_start, test_end) = test_window();
    let train = Market::new(&provider, &symbols, train_start, train_end, MarketOptions::default()).unwrap();
    let test = Market::new(&provider, &symbols, test_start, test_end, MarketOptions::default()).unwrap();

    (Experiment::from_settings(settings, evolution_engine(), train).unwrap(), test)
}

fn settings(genotype: GenotypeKind) -> ExperimentSettings {
    ExperimentSettings {
        population_size: 10,
        generations: 3,
        genotype,
        seed: Some(2024),
    }
}

#[test]
fn test_csv_provider_sorts_newest_first_files() {
    let dir = fixture_dir();
    let provider = CsvDirectoryProvider::new(dir.path());
    let series = provider.read("AAA").unwrap();
    assert_eq!(series.len(), 200);
    assert_eq!(series.first_date(), Some(first_day()));
    assert!(series.bars().windows(2).all(|w| w[0].date < w[1].date));
    assert!(provider.read("ZZZ").is_err());
}

#[test]
fn test_run_reports_every_generation_plus_final() {
    let dir = fixture_dir();
    let (mut experiment, test) = experiment(dir.path(), &settings(GenotypeKind::Real));

    let (sender, receiver) = mpsc::channel();
    let mut callback = ChannelProgressCallback::new(sender);
    let report = experiment.run(3, &mut callback).unwrap();

    assert_eq!(report.history.len(), 4);
    for (i, record) in report.history.iter().enumerate() {
        assert_eq!(record.generation, i);
        assert!(record.best >= record.avg);
        assert!(record.best <= 1.0 + 1e-12);
    }
    assert_eq!(report.final_fitness.len(), 10);
    assert_eq!(experiment.population().len(), 10);
    assert!(report.best_genotype.is_some());

    let messages: Vec<ProgressMessage> = receiver.try_iter().collect();
    assert_eq!(messages.len(), 7);
    assert_eq!(messages[0], ProgressMessage::GenerationStart(0));
    assert_eq!(messages[6], ProgressMessage::FinalEvaluation(report.history[3]));

    let summary = experiment.evaluate_on(&test);
    assert!(summary.best >= summary.avg);
    assert!(summary.best <= 1.0 + 1e-12);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["history"].as_array().unwrap().len(), 4);
}

#[test]
fn test_seeded_experiments_repeat() {
    let dir = fixture_dir();
    let run = || {
        let (mut experiment, _) = experiment(dir.path(), &settings(GenotypeKind::Complex));
        let mut callback = ChannelProgressCallback::new(mpsc::channel().0);
        experiment.run(2, &mut callback).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.history, second.history);
    assert_eq!(first.best_genotype, second.best_genotype);
}

#[test]
fn test_config_file_drives_settings() {
    let dir = fixture_dir();
    let config_path = dir.path().join("tradegene.toml");
    std::fs::write(
        &config_path,
        format!(
            "[market]\ndata_dir = {:?}\nworkers = 2\n\n[experiment]\npopulation_size = 8\ngenotype = \"Bit\"\n",
            dir.path().display().to_string()
        ),
    )
    .unwrap();

    let manager = ConfigManager::new();
    manager.load_from_file(&config_path).unwrap();
    let config = manager.get().unwrap();
    assert_eq!(config.market.workers, 2);
    assert_eq!(config.experiment.genotype, GenotypeKind::Bit);

    let (mut experiment, _) = experiment(&config.market.data_dir, &config.experiment);
    assert_eq!(experiment.population().len(), 8);
    assert!(experiment.population().iter().all(|a| a.kind() == GenotypeKind::Bit));
    let report = experiment.run(1, &mut ChannelProgressCallback::new(mpsc::channel().0)).unwrap();
    assert_eq!(report.history.len(), 2);
}

#[test]
fn test_unevolvable_population_is_rejected_up_front() {
    let dir = fixture_dir();
    let provider = CsvDirectoryProvider::new(dir.path());
    let (start, end) = train_window();
    let market = || Market::new(&provider, &symbols(), start, end, MarketOptions::default()).unwrap();

    // 6 agents: 3 survivors but a single crossover parent for 3 children
    let small = ExperimentSettings {
        population_size: 6,
        ..settings(GenotypeKind::Bit)
    };
    let result = Experiment::from_settings(&small, evolution_engine(), market());
    assert!(matches!(result, Err(TradegeneError::Configuration(_))));

    let registry = RuleRegistry::standard();
    let agents = (0..6)
        .map(|i| Agent::bit(vec![(i % 2) as f64; 10], &registry).unwrap())
        .collect();
    let result = Experiment::new(agents, evolution_engine(), market(), Some(1));
    assert!(matches!(result, Err(TradegeneError::Configuration(_))));
}

#[test]
fn test_short_files_are_skipped_by_the_market() {
    let dir = fixture_dir();
    write_csv(dir.path(), "SHORT", 150, 0.5);
    let provider = CsvDirectoryProvider::new(dir.path()).with_min_rows(180);
    assert!(matches!(provider.read("SHORT"), Err(TradegeneError::DataLoading(_))));

    let (start, end) = train_window();
    let names = provider.list_symbols().unwrap();
    let market = Market::new(&provider, &names, start, end, MarketOptions::default()).unwrap();
    assert_eq!(market.symbols(), vec!["AAA", "BBB", "CCC"]);
    assert_eq!(market.skipped(), &["SHORT".to_string()]);
}

fn symbols() -> Vec<String> {
    vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()]
}
