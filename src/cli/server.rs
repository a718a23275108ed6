use crate::cli::ServerArgs;
use crate::config::Config;
use crate::server::{serve, ServerConfig};
use crate::telemetry;
use anyhow::Result;

/// Handle server command - run the local HTTP surface
pub fn handle(cmd: &ServerArgs, config: &Config) -> Result<()> {
    let server_config = ServerConfig {
        host: cmd.host.clone(),
        port: cmd.port,
    };

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let guard = telemetry::init(config)?;
        let result = serve(&server_config, config, &guard).await;
        guard.shutdown().await;
        result
    })
}
