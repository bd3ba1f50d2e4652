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

//! Engine tunables and simulator command line arguments
//!
//! Every timing, probability gate and spring constant the agent uses lives here
//! so hosts can retune the cat without touching the systems. All sections are
//! optional in the YAML file and fall back to the defaults below.

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use thiserror::Error;
use whiskers_common::{Behavior, Facing};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(short = 'c', long = "config", help = "Path to configuration file")]
    pub config_file: Option<String>,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "engine/.env"
    )]
    pub env_file: Option<String>,

    #[arg(long, help = "Random seed, overrides simulation.seed")]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 60, help = "Simulated session length in seconds")]
    pub duration_secs: u64,

    #[arg(long, default_value_t = 16, help = "Host frame length in milliseconds")]
    pub frame_ms: u64,

    #[arg(long, help = "Viewport width, overrides simulation.width")]
    pub width: Option<f64>,

    #[arg(long, help = "Viewport height, overrides simulation.height")]
    pub height: Option<f64>,

    #[arg(long, help = "Click the cat every N seconds")]
    pub activate_every_secs: Option<u64>,

    #[arg(
        long,
        default_value_t = 1000,
        help = "Print a JSON snapshot every N milliseconds"
    )]
    pub snapshot_every_ms: u64,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: None,
            env_file: Some("engine/.env".to_string()),
            seed: None,
            duration_secs: 60,
            frame_ms: 16,
            width: None,
            height: None,
            activate_every_secs: None,
            snapshot_every_ms: 1000,
        }
    }
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be opened.
    #[error("Failed to open config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML for this schema.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A tunable is outside its legal range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub decision: DecisionConfig,
    pub interaction: InteractionConfig,
    pub visibility: VisibilityConfig,
    pub motion: MotionConfig,
    pub thoughts: ThoughtConfig,
    pub simulation: SimulationConfig,
}

impl EngineConfig {
    pub fn load(path: &str) -> Result<EngineConfig, ConfigError> {
        let conf: EngineConfig = serde_yaml::from_reader(std::fs::File::open(path)?)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Reject tunables the systems cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.decision;
        let probabilities = [
            ("decision.sleep_gate", d.sleep_gate),
            ("decision.mood_gate", d.mood_gate),
            ("decision.thought_gate", d.thought_gate),
            ("decision.wake_gate", d.wake_gate),
            ("decision.walk_band", d.walk_band),
            ("decision.idle_band", d.idle_band),
            ("decision.curious_band", d.curious_band),
            ("decision.play_band", d.play_band),
            ("interaction.pointer_gate", self.interaction.pointer_gate),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if !(d.walk_band <= d.idle_band && d.idle_band <= d.curious_band && d.curious_band <= d.play_band) {
            return Err(ConfigError::Invalid(
                "decision bands must be ascending: walk <= idle <= curious <= play".to_string(),
            ));
        }

        let intervals = [
            ("decision.interval_ms", d.interval_ms),
            ("visibility.interval_ms", self.visibility.interval_ms),
            ("thoughts.display_ms", self.thoughts.display_ms),
            ("motion.max_physics_step_ms", self.motion.max_physics_step_ms),
            ("motion.bounce_half_period_ms", self.motion.bounce_half_period_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be non-zero", name)));
            }
        }

        let springs = [
            ("motion.walk_spring", self.motion.walk_spring),
            ("motion.approach_spring", self.motion.approach_spring),
            ("motion.hop_spring", self.motion.hop_spring),
        ];
        let step = self.motion.max_physics_step_ms as f64 / 1000.0;
        for (name, spring) in springs {
            if !(spring.stiffness.is_finite()
                && spring.damping.is_finite()
                && spring.stiffness > 0.0
                && spring.damping > 0.0)
            {
                return Err(ConfigError::Invalid(format!(
                    "{} needs positive stiffness and damping",
                    name
                )));
            }
            if !spring.is_stable(step) {
                return Err(ConfigError::Invalid(format!(
                    "motion.max_physics_step_ms of {} is too coarse for {}, at most {} allowed",
                    self.motion.max_physics_step_ms,
                    name,
                    spring.max_stable_step_ms()
                )));
            }
        }

        let thresholds = [
            ("motion.rest_delta", self.motion.rest_delta),
            ("motion.rest_speed", self.motion.rest_speed),
        ];
        for (name, value) in thresholds {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Behavior state machine tick settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub interval_ms: u64,
    /// Idle time before the cat may doze off
    pub sleep_after_ms: u64,
    /// A draw above this sends a bored cat to sleep
    pub sleep_gate: f64,
    pub mood_refresh_ms: u64,
    pub mood_gate: f64,
    pub thought_gate: f64,
    /// A draw above this wakes a sleeping cat
    pub wake_gate: f64,
    pub walk_band: f64,
    pub idle_band: f64,
    pub curious_band: f64,
    pub play_band: f64,
    /// Playfulness must exceed this before the cat plays on its own
    pub playfulness_threshold: u32,
    /// Distance kept from the visible window edges when wandering
    pub walk_margin: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3000,
            sleep_after_ms: 30_000,
            sleep_gate: 0.7,
            mood_refresh_ms: 15_000,
            mood_gate: 0.6,
            thought_gate: 0.7,
            wake_gate: 0.8,
            walk_band: 0.3,
            idle_band: 0.5,
            curious_band: 0.7,
            play_band: 0.9,
            playfulness_threshold: 5,
            walk_margin: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// A draw below this lets a pointer move catch the cat's attention
    pub pointer_gate: f64,
    pub proximity_radius: f64,
    pub activation_hop: f64,
    pub hop_settle_ms: u64,
    pub celebration_ms: u64,
    pub play_fallback_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            pointer_gate: 0.05,
            proximity_radius: 300.0,
            activation_hop: 30.0,
            hop_settle_ms: 300,
            celebration_ms: 2000,
            play_fallback_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    pub interval_ms: u64,
    pub margin: f64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            margin: 300.0,
        }
    }
}

/// Damped spring constants, unit mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
}

impl SpringParams {
    pub const fn new(stiffness: f64, damping: f64) -> Self {
        Self { stiffness, damping }
    }

    /// Semi-implicit Euler stays well behaved while both `sqrt(k)·dt` and
    /// `c·dt` stay below one
    pub fn is_stable(&self, dt: f64) -> bool {
        self.stiffness.sqrt() * dt < 1.0 && self.damping * dt < 1.0
    }

    /// Longest whole-millisecond step [`Self::is_stable`] accepts, never below 1
    pub fn max_stable_step_ms(&self) -> u64 {
        let rate = self.stiffness.sqrt().max(self.damping);
        if !(rate.is_finite() && rate > 0.0) {
            return 1;
        }
        ((1000.0 / rate).ceil() as u64).saturating_sub(1).max(1)
    }
}

/// One beat of the curious look-around
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookStep {
    pub facing: Facing,
    pub hold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub walk_spring: SpringParams,
    pub approach_spring: SpringParams,
    pub hop_spring: SpringParams,
    pub bounce_height: f64,
    pub bounce_half_period_ms: u64,
    pub bounce_repeats: u32,
    pub curious_look: Vec<LookStep>,
    /// Distance from target under which the agent counts as arrived
    pub rest_delta: f64,
    pub rest_speed: f64,
    pub max_physics_step_ms: u64,
}

impl MotionConfig {
    /// Physics step actually used: the configured step, shortened to what
    /// every spring can integrate without blowing up
    pub fn physics_step_ms(&self) -> u64 {
        [self.walk_spring, self.approach_spring, self.hop_spring]
            .iter()
            .map(SpringParams::max_stable_step_ms)
            .fold(self.max_physics_step_ms, u64::min)
            .max(1)
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            walk_spring: SpringParams::new(100.0, 20.0),
            approach_spring: SpringParams::new(200.0, 30.0),
            hop_spring: SpringParams::new(300.0, 10.0),
            bounce_height: 40.0,
            bounce_half_period_ms: 400,
            bounce_repeats: 3,
            curious_look: vec![
                LookStep { facing: Facing::Right, hold_ms: 1000 },
                LookStep { facing: Facing::Left, hold_ms: 1500 },
                LookStep { facing: Facing::Right, hold_ms: 800 },
            ],
            rest_delta: 0.5,
            rest_speed: 2.0,
            max_physics_step_ms: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThoughtConfig {
    pub display_ms: u64,
    pub idle: Vec<String>,
    pub walking: Vec<String>,
    pub playing: Vec<String>,
    pub sleeping: Vec<String>,
    pub curious: Vec<String>,
    pub waking: String,
    pub happy: Vec<String>,
}

impl ThoughtConfig {
    /// Phrases the cat muses about while in `behavior`
    pub fn phrases(&self, behavior: Behavior) -> &[String] {
        match behavior {
            Behavior::Idle => &self.idle,
            Behavior::Walking => &self.walking,
            Behavior::Playing => &self.playing,
            Behavior::Sleeping => &self.sleeping,
            Behavior::Curious => &self.curious,
        }
    }
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ThoughtConfig {
    fn default() -> Self {
        Self {
            display_ms: 3000,
            idle: phrases(&["Just chillin'", "This spot is nice", "What's that over there?"]),
            walking: phrases(&["Exploring time!", "I wonder what's ahead", "So much to see"]),
            playing: phrases(&["This is fun!", "Wheee!", "Chase me!"]),
            sleeping: phrases(&["Zzz...", "Purrrr...", "*dreaming of fish*"]),
            curious: phrases(&["Hmm, what's that?", "Interesting...", "Should I touch it?"]),
            waking: "Oh! I'm awake!".to_string(),
            happy: phrases(&["Pet me more!", "Purrrr!", "That's the spot!", "I like you!"]),
        }
    }
}

/// Settings for the headless simulator
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: EnvField<u64>,
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: Default::default(),
            width: 1280.0,
            height: 800.0,
            scroll_y: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_arguments_default() {
        let args = Arguments::default();
        assert_eq!(args.config_file, None);
        assert_eq!(args.env_file, Some("engine/.env".to_string()));
        assert_eq!(args.frame_ms, 16);
    }

    #[test]
    fn test_arguments_parse_defaults_match_default() {
        let parsed = Arguments::parse_from(["whiskers-sim"]);
        let default = Arguments::default();
        assert_eq!(parsed.env_file, default.env_file);
        assert_eq!(parsed.config_file, default.config_file);
        assert_eq!(parsed.duration_secs, default.duration_secs);
        assert_eq!(parsed.frame_ms, default.frame_ms);
        assert_eq!(parsed.snapshot_every_ms, default.snapshot_every_ms);
    }

    #[test]
    fn test_arguments_parse() {
        let args = Arguments::parse_from([
            "whiskers-sim",
            "--seed",
            "7",
            "--duration-secs",
            "5",
            "--activate-every-secs",
            "2",
        ]);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.duration_secs, 5);
        assert_eq!(args.activate_every_secs, Some(2));
        assert_eq!(args.snapshot_every_ms, 1000);
    }

    #[test]
    fn test_engine_config_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.decision.interval_ms, 3000);
        assert_eq!(config.visibility.margin, 300.0);
        assert_eq!(config.motion.curious_look.len(), 3);
        assert_eq!(config.thoughts.phrases(Behavior::Sleeping)[0], "Zzz...");
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let mut config = EngineConfig::default();
        config.decision.sleep_gate = 1.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("sleep_gate")));
    }

    #[test]
    fn test_validate_rejects_unordered_bands() {
        let mut config = EngineConfig::default();
        config.decision.idle_band = 0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = EngineConfig::default();
        config.decision.interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_limp_spring() {
        let mut config = EngineConfig::default();
        config.motion.walk_spring = SpringParams::new(0.0, 20.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_non_positive_rest_thresholds() {
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut config = EngineConfig::default();
            config.motion.rest_delta = value;
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("rest_delta")));

            let mut config = EngineConfig::default();
            config.motion.rest_speed = value;
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("rest_speed")));
        }
    }

    #[test]
    fn test_validate_rejects_nan_spring() {
        let mut config = EngineConfig::default();
        config.motion.hop_spring = SpringParams::new(f64::NAN, 10.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_coarse_physics_step() {
        let mut config = EngineConfig::default();
        config.motion.max_physics_step_ms = 200;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("max_physics_step_ms")));

        // The approach spring's damping is the tightest bound
        config.motion.max_physics_step_ms = 34;
        assert!(config.validate().is_err());
        config.motion.max_physics_step_ms = 33;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_spring_stable_step() {
        let hop = SpringParams::new(300.0, 10.0);
        assert_eq!(hop.max_stable_step_ms(), 57);
        assert!(hop.is_stable(0.057));
        assert!(!hop.is_stable(0.058));

        let walk = SpringParams::new(100.0, 20.0);
        assert_eq!(walk.max_stable_step_ms(), 49);
        assert!(!walk.is_stable(0.050));

        assert_eq!(SpringParams::new(f64::NAN, f64::NAN).max_stable_step_ms(), 1);
    }

    #[test]
    fn test_physics_step_is_capped_by_springs() {
        let mut motion = MotionConfig::default();
        assert_eq!(motion.physics_step_ms(), 8);
        motion.max_physics_step_ms = 200;
        assert_eq!(motion.physics_step_ms(), 33);
        motion.max_physics_step_ms = 0;
        assert_eq!(motion.physics_step_ms(), 1);
    }

    #[test]
    fn test_configuration_load_missing_file() {
        let result = EngineConfig::load("non_existent.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_configuration_load_from_file() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &file_path,
            "decision:\n  interval_ms: 1000\n  playfulness_threshold: 2\nvisibility:\n  margin: 150.0\nsimulation:\n  seed: \"42\"\n  width: 640.0\n",
        )
        .unwrap();

        let config = EngineConfig::load(file_path.to_str().unwrap()).unwrap();
        assert_eq!(config.decision.interval_ms, 1000);
        assert_eq!(config.decision.playfulness_threshold, 2);
        // Untouched fields keep their defaults
        assert_eq!(config.decision.sleep_after_ms, 30_000);
        assert_eq!(config.visibility.margin, 150.0);
        assert_eq!(config.visibility.interval_ms, 2000);
        assert_eq!(*config.simulation.seed, 42);
        assert_eq!(config.simulation.width, 640.0);
        assert_eq!(config.simulation.height, 800.0);
    }

    #[test]
    fn test_configuration_seed_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("config.yaml");
        std::fs::write(&file_path, "simulation:\n  seed: ${WHISKERS_TEST_SEED}\n").unwrap();

        unsafe {
            std::env::set_var("WHISKERS_TEST_SEED", "1234");
        }

        let config = EngineConfig::load(file_path.to_str().unwrap()).unwrap();

        unsafe {
            std::env::remove_var("WHISKERS_TEST_SEED");
        }

        assert_eq!(*config.simulation.seed, 1234);
    }

    #[test]
    fn test_sample_configuration_is_valid() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.yaml");

        unsafe {
            std::env::remove_var("WHISKERS_SEED");
        }
        let config = EngineConfig::load(path).unwrap();
        assert_eq!(config.decision.interval_ms, 3000);
        assert_eq!(config.motion.curious_look.len(), 3);
        assert_eq!(*config.simulation.seed, 42);

        unsafe {
            std::env::set_var("WHISKERS_SEED", "7");
        }
        let config = EngineConfig::load(path);
        unsafe {
            std::env::remove_var("WHISKERS_SEED");
        }
        assert_eq!(*config.unwrap().simulation.seed, 7);
    }

    #[test]
    fn test_configuration_load_invalid_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("config.yaml");
        std::fs::write(&file_path, "decision: [not, a, map]\n").unwrap();

        let result = EngineConfig::load(file_path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_configuration_load_rejects_invalid_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("config.yaml");
        std::fs::write(&file_path, "interaction:\n  pointer_gate: -0.5\n").unwrap();

        let result = EngineConfig::load(file_path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
