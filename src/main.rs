use anyhow::{Context, Result};
use treevolve::config::ConfigManager;
use treevolve::engines::evaluation::accuracy_report;
use treevolve::engines::generation::LogProgressCallback;
use treevolve::runner;

fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "treevolve.toml".to_string());
    let manager = ConfigManager::new();
    manager
        .load_layered(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    let config = manager.get();

    let (mut engine, data) = runner::build_engine(&config)?;
    let summary = engine.run(&mut LogProgressCallback)?;
    println!(
        "Finished at generation {} ({} run now): best fitness {:.4}, average {:.4}",
        summary.final_generation, summary.generations_run, summary.best_fitness, summary.avg_fitness
    );

    if !data.testing.is_empty() {
        let history = engine.store().load_history()?;
        for point in accuracy_report(&history, &data.testing)? {
            println!(
                "Generation {:>4}: held-out accuracy {:.2}%",
                point.generation,
                point.accuracy * 100.0
            );
        }
    }
    Ok(())
}
