// The demo GenAI workload: the code you would otherwise write, with
// instrumentation riding on the telemetry layer. Works against any
// OpenAI-compatible chat endpoint; with no endpoint configured it falls
// back to an offline generator so the demo runs without credentials.

use crate::config::Config;
use crate::telemetry::Metrics;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// The Dungeon Master scenario prompt the demo sends to the model.
pub const SCENARIO_SYSTEM_PROMPT: &str = "\
You are a sci-fi and fantasy afficionado who loves to \
play Dungeons and Dragons. You have been made a \
Dungeon Master and need to come up with a fantasy \
setting, villain, list of character names, and \
plot line for your upcoming DnD game.

Please jot down:

 1. A place name.
 2. A villain name.
 3. A two-line plot description.
";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

/// Remote chat provider (OpenAI-compatible endpoint)
pub struct RemoteChat {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl RemoteChat {
    pub fn new(endpoint: &str, model: &str) -> Self {
        let api_key = std::env::var("LLMWATCH_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok();
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: Vec<ChatMessage>, metrics: &Metrics) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?.error_for_status()?;
        let body: ChatResponse = response.json().await?;

        if let Some(usage) = body.usage {
            metrics.record_llm_tokens(usage.prompt_tokens, usage.completion_tokens);
        }

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("Model returned no choices"))
    }
}

/// Generates the DnD scenario, remote when configured, offline otherwise.
pub struct ScenarioGenerator {
    remote: Option<RemoteChat>,
    model: String,
}

impl ScenarioGenerator {
    pub fn new(config: &Config) -> Self {
        let remote = config
            .model
            .endpoint
            .as_deref()
            .map(|endpoint| RemoteChat::new(endpoint, &config.model.name));
        Self {
            remote,
            model: config.model.name.clone(),
        }
    }

    /// Run one scenario generation inside an instrumented span.
    pub async fn generate(&self, metrics: &Metrics) -> Result<String> {
        let span = tracing::info_span!(
            "dnd_scenario_generation",
            gen_ai.system = "llmwatch",
            gen_ai.operation.name = "chat",
            gen_ai.request.model = %self.model,
        );

        async {
            metrics.inc_llm_requests();

            if let Some(ref remote) = self.remote {
                let messages = vec![ChatMessage {
                    role: "system".to_string(),
                    content: SCENARIO_SYSTEM_PROMPT.to_string(),
                }];
                match remote.chat(messages, metrics).await {
                    Ok(content) => {
                        tracing::info!(model = remote.model_name(), "Scenario generated");
                        return Ok(content);
                    }
                    Err(e) => {
                        metrics.inc_llm_errors();
                        tracing::warn!("Remote generation failed: {}, using offline scenario", e);
                    }
                }
            }

            Ok(offline_scenario())
        }
        .instrument(span)
        .await
    }
}

/// Canned scenario for running the demo with no model endpoint.
pub fn offline_scenario() -> String {
    use rand::seq::SliceRandom;

    const PLACES: &[&str] = &["Duskmere Hollow", "The Shattered Spire", "Varnwick-upon-Ash"];
    const VILLAINS: &[&str] = &["Malachar the Unwoven", "Queen Sylvexa of Thorns", "The Pale Cartographer"];
    const PLOTS: &[&str] = &[
        "A forgotten seal beneath the town square has begun to crack.\nThe party must find the three wardens before the next new moon.",
        "Maps of the region are rewriting themselves overnight.\nWhoever holds the master chart holds every road in the realm.",
        "The harvest festival ends with every lantern burning green.\nSomething in the old forest is calling its debts due.",
    ];

    let mut rng = rand::thread_rng();
    let place = PLACES.choose(&mut rng).unwrap_or(&PLACES[0]);
    let villain = VILLAINS.choose(&mut rng).unwrap_or(&VILLAINS[0]);
    let plot = PLOTS.choose(&mut rng).unwrap_or(&PLOTS[0]);

    format!(
        "1. Place: {}\n2. Villain: {}\n3. Plot:\n{}\n",
        place, villain, plot
    )
}
