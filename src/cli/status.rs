use crate::cli::StatusArgs;
use crate::config::Config;
use anyhow::Result;

/// Handle status command - show resolved telemetry configuration
pub fn handle(cmd: &StatusArgs, config: &Config) -> Result<()> {
    if cmd.format == "json" {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("llmwatch Telemetry Status");
    println!("{}", "=".repeat(50));

    println!("\nApp name: {}", config.app_name);
    match config.project_id {
        Some(ref project) => println!("Project: {}", project),
        None => println!("Project: (unset - set GOOGLE_CLOUD_PROJECT)"),
    }

    println!("\nSignals:");
    println!("  Traces:  {} (OTLP {})", onoff(config.trace.enabled), config.trace.otlp_endpoint);
    println!("  Metrics: {} (Prometheus: {})", onoff(config.metrics.enabled), onoff(config.metrics.prometheus));
    match config.log_name() {
        Some(ref log_name) if config.logging.enabled => {
            println!("  Logs:    enabled ({})", log_name)
        }
        _ => println!("  Logs:    {}", onoff(config.logging.enabled)),
    }

    println!("\nImage uploading: {}", onoff(config.images.enabled));
    if let Some(ref prefix) = config.images.uri_prefix {
        println!("  Prefix: {}", prefix);
    }

    println!("\nModel: {}", config.model.name);
    match config.model.endpoint {
        Some(ref endpoint) => println!("  Endpoint: {}", endpoint),
        None => println!("  Endpoint: (offline generation)"),
    }

    Ok(())
}

fn onoff(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
