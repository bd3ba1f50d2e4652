//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use whiskers_engine::agent::AgentContext;
use whiskers_engine::agent::components::Viewport;
use whiskers_engine::config::{Arguments, EngineConfig};
use whiskers_engine::random::SeededRandom;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_level(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            tracing::debug!("Loading environment variables from file: {}", env_file);
            dotenv::from_filename(env_file).ok();
        }
    } else {
        tracing::debug!("Loading environment variables from default file");
        dotenv::dotenv().ok();
    }

    // Load configuration, falling back to the built in tunables
    let config = match arguments.config_file {
        Some(ref path) => {
            tracing::info!("Loading configuration from {}", path);
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };
    tracing::debug!("Configuration loaded: {:?}", config);

    let seed = arguments.seed.unwrap_or(*config.simulation.seed);
    let viewport = Viewport::new(
        arguments.width.unwrap_or(config.simulation.width),
        arguments.height.unwrap_or(config.simulation.height),
        config.simulation.scroll_y,
    );
    if viewport.is_degenerate() {
        tracing::warn!("Viewport {:?} has no area, the cat will stay put", viewport);
    }

    tracing::info!(
        "Starting Whiskers simulation: seed {}, {}s at {}ms frames",
        seed,
        arguments.duration_secs,
        arguments.frame_ms
    );

    let mut context = AgentContext::new(config, viewport, Box::new(SeededRandom::new(seed)));
    context.event_bus().subscribe(|event| {
        tracing::info!("[{}] {:?}", event.event_type(), event);
    });

    let frame = Duration::from_millis(arguments.frame_ms.max(1));
    let end = arguments.duration_secs.saturating_mul(1000);
    let activate_every = arguments.activate_every_secs.map(|secs| secs.saturating_mul(1000));
    let mut next_activation = activate_every;
    let mut next_snapshot = 0;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    while context.now() < end {
        context.advance(frame);
        let now = context.now();

        if let (Some(every), Some(due)) = (activate_every, next_activation) {
            if now >= due {
                tracing::info!("Activating the cat at {}ms", now);
                context.on_activate();
                next_activation = Some(due.saturating_add(every.max(1)));
            }
        }

        if now >= next_snapshot {
            let line = serde_json::to_string(&serde_json::json!({
                "time_ms": now,
                "agent": context.snapshot(),
            }))?;
            writeln!(out, "{}", line)?;
            next_snapshot = now.saturating_add(arguments.snapshot_every_ms.max(1));
        }
    }

    tracing::info!(
        "Simulation finished after {}ms: {} decision ticks, {} activations, {} relocations",
        context.now(),
        context.behavior_system().ticks(),
        context.interaction_system().activations(),
        context.visibility_guard().relocations()
    );
    Ok(())
}
