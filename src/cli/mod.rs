use clap::{Args, Parser, Subcommand};

/// llmwatch - observability for generative-AI workloads on Google Cloud
#[derive(Parser, Debug)]
#[command(name = "llmwatch")]
#[command(version = "0.1.0")]
#[command(about = "Observability for GenAI workloads on Google Cloud", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

// CLI submodule declarations
pub mod demo;
pub mod server;
pub mod status;
pub mod upload;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the instrumented GenAI demo
    Demo(DemoArgs),

    /// Show resolved telemetry configuration
    Status(StatusArgs),

    /// Run the local HTTP server (health, status, Prometheus metrics)
    Server(ServerArgs),

    /// Upload one image artifact, as the tracing pipeline would
    Upload(UploadArgs),
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Output format: cli, json
    #[arg(long, default_value = "cli")]
    pub format: String,
    /// Print the telemetry plan without exporting anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format: cli, json
    #[arg(long, default_value = "cli")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Path to the image file, or a data: URI
    pub image: String,
    /// Trace ID to associate with the upload
    #[arg(long, default_value = "00000000000000000000000000000000")]
    pub trace_id: String,
    /// Span ID to associate with the upload
    #[arg(long, default_value = "0000000000000000")]
    pub span_id: String,
    /// Object name recorded in metadata (defaults to the file name)
    #[arg(long)]
    pub name: Option<String>,
}
