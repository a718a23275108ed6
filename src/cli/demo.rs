use crate::cli::DemoArgs;
use crate::config::Config;
use crate::llm::ScenarioGenerator;
use crate::telemetry;
use anyhow::Result;

/// Handle demo command - run the instrumented scenario generation
pub fn handle(cmd: &DemoArgs, config: &Config) -> Result<()> {
    // Handle --dry-run: show what telemetry would be set up
    if cmd.dry_run {
        println!("[DRY-RUN] Would initialize telemetry with:");
        println!("  app_name: {}", config.app_name);
        println!("  project_id: {:?}", config.project_id);
        println!("  trace: {} ({})", config.trace.enabled, config.trace.otlp_endpoint);
        println!("  metrics: {}", config.metrics.enabled);
        println!("  logging: {}", config.logging.enabled);
        println!("  image uploading: {}", config.images.enabled);
        println!("  model: {} ({:?})", config.model.name, config.model.endpoint);
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let guard = telemetry::init(config)?;

        let generator = ScenarioGenerator::new(config);
        let scenario = generator.generate(&guard.metrics).await?;

        match cmd.format.as_str() {
            "json" => {
                let output = serde_json::json!({
                    "app_name": config.app_name,
                    "model": config.model.name,
                    "scenario": scenario,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                println!("{}", scenario);
            }
        }

        guard.shutdown().await;
        Ok(())
    })
}
