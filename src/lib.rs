// llmwatch - observability for GenAI workloads on Google Cloud

pub mod cli;
pub mod config;
pub mod gcp;
pub mod llm;
pub mod server;
pub mod telemetry;
