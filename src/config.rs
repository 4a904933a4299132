/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete,
/// and replaces out-of-range values with their defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::geometry::Viewport;
use crate::domain::motion::DEFAULT_DAMPING;
use crate::domain::rules::WallPolicy;
use crate::sim::session::{Tuning, DEFAULT_TOKEN_DIVISOR};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub sample_interval: Duration,
    pub tuning: Tuning,
    pub viewport: Viewport,
    pub tilt: TiltConfig,
    pub gamepad: GamepadConfig,
    pub maze_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct TiltConfig {
    /// Acceleration while a direction key is held.
    pub key_strength: f64,
    /// Acceleration at full stick deflection.
    pub stick_scale: f64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub retry: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    motion: TomlMotion,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    collision: TomlCollision,
    #[serde(default)]
    viewport: TomlViewport,
    #[serde(default)]
    tilt: TomlTilt,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlMotion {
    #[serde(default = "default_sample_interval")]
    sample_interval_ms: i64,
    #[serde(default = "default_damping")]
    damping: f64,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_token_divisor")]
    token_divisor: f64,
}

#[derive(Deserialize, Debug)]
struct TomlCollision {
    #[serde(default = "default_wall_policy")]
    wall_policy: String,
}

#[derive(Deserialize, Debug)]
struct TomlViewport {
    #[serde(default = "default_viewport_width")]
    width: f64,
    #[serde(default = "default_viewport_height")]
    height: f64,
}

#[derive(Deserialize, Debug)]
struct TomlTilt {
    #[serde(default = "default_key_strength")]
    key_strength: f64,
    #[serde(default = "default_stick_scale")]
    stick_scale: f64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_retry")]
    retry: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    maze_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_sample_interval() -> i64 { 20 }   // 50 Hz
fn default_damping() -> f64 { DEFAULT_DAMPING }
fn default_token_divisor() -> f64 { DEFAULT_TOKEN_DIVISOR }
fn default_wall_policy() -> String { "contain".into() }
fn default_viewport_width() -> f64 { 360.0 }
fn default_viewport_height() -> f64 { 600.0 }
fn default_key_strength() -> f64 { 0.35 }
fn default_stick_scale() -> f64 { 1.0 }

fn default_retry() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "tiltmaze.log".into() }

impl Default for TomlMotion {
    fn default() -> Self {
        TomlMotion {
            sample_interval_ms: default_sample_interval(),
            damping: default_damping(),
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer { token_divisor: default_token_divisor() }
    }
}

impl Default for TomlCollision {
    fn default() -> Self {
        TomlCollision { wall_policy: default_wall_policy() }
    }
}

impl Default for TomlViewport {
    fn default() -> Self {
        TomlViewport {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl Default for TomlTilt {
    fn default() -> Self {
        TomlTilt {
            key_strength: default_key_strength(),
            stick_scale: default_stick_scale(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            retry: default_retry(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            maze_file: String::new(),
            log_file: default_log_file(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    ///
    /// Runs before the logger exists, so problems are returned as warnings
    /// for the caller to log once logging is up.
    pub fn load() -> (Self, Vec<String>) {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        let cfg = GameConfig::from_toml(toml_cfg, &search_dirs, &mut warnings);
        (cfg, warnings)
    }

    /// Parse config text directly (no file search; relative paths stay relative).
    pub fn from_toml_str(text: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        let mut warnings = vec![];
        let cfg = GameConfig::from_toml(toml_cfg, &[], &mut warnings);
        Ok((cfg, warnings))
    }

    fn from_toml(t: TomlConfig, search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> Self {
        let interval_ms = match u64::try_from(t.motion.sample_interval_ms) {
            Ok(ms) if ms > 0 => ms,
            _ => {
                warnings.push(format!(
                    "motion.sample_interval_ms must be > 0 (got {}); using {}",
                    t.motion.sample_interval_ms, default_sample_interval(),
                ));
                default_sample_interval() as u64
            }
        };

        let wall_policy = WallPolicy::from_name(&t.collision.wall_policy).unwrap_or_else(|| {
            warnings.push(format!(
                "collision.wall_policy {:?} is not \"contain\" or \"intersect\"; using contain",
                t.collision.wall_policy,
            ));
            WallPolicy::Contain
        });

        GameConfig {
            sample_interval: Duration::from_millis(interval_ms),
            tuning: Tuning {
                damping: positive_or(t.motion.damping, default_damping(), "motion.damping", warnings),
                token_divisor: positive_or(
                    t.player.token_divisor, default_token_divisor(), "player.token_divisor", warnings,
                ),
                wall_policy,
            },
            viewport: Viewport::new(
                positive_or(t.viewport.width, default_viewport_width(), "viewport.width", warnings),
                positive_or(t.viewport.height, default_viewport_height(), "viewport.height", warnings),
            ),
            tilt: TiltConfig {
                key_strength: non_negative_or(
                    t.tilt.key_strength, default_key_strength(), "tilt.key_strength", warnings,
                ),
                stick_scale: non_negative_or(
                    t.tilt.stick_scale, default_stick_scale(), "tilt.stick_scale", warnings,
                ),
            },
            gamepad: GamepadConfig {
                retry: t.gamepad.retry,
                quit: t.gamepad.quit,
            },
            maze_file: resolve_path(&t.general.maze_file, search_dirs, true),
            log_file: resolve_path(&t.general.log_file, search_dirs, false),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[], &mut vec![])
    }
}

fn positive_or(v: f64, default: f64, key: &str, warnings: &mut Vec<String>) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        warnings.push(format!("{key} must be a positive number (got {v}); using {default}"));
        default
    }
}

fn non_negative_or(v: f64, default: f64, key: &str, warnings: &mut Vec<String>) -> f64 {
    if v.is_finite() && v >= 0.0 {
        v
    } else {
        warnings.push(format!("{key} must be >= 0 (got {v}); using {default}"));
        default
    }
}

/// Empty string → None. Absolute paths are kept. Relative paths are looked
/// up in the search dirs when `must_exist`; otherwise they land in the first
/// search dir (or stay relative to the CWD).
fn resolve_path(s: &str, search_dirs: &[PathBuf], must_exist: bool) -> Option<PathBuf> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let p = Path::new(s);
    if p.is_absolute() {
        return Some(p.to_path_buf());
    }
    if must_exist {
        if let Some(found) = search_dirs.iter().map(|d| d.join(p)).find(|c| c.is_file()) {
            return Some(found);
        }
    } else if let Some(first) = search_dirs.first() {
        return Some(first.join(p));
    }
    Some(p.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warnings.push(format!("config.toml parse error: {e}; using default settings"));
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let (cfg, warnings) = GameConfig::from_toml_str("").unwrap();
        assert!(warnings.is_empty());
        assert_eq!(cfg.sample_interval, Duration::from_millis(20));
        assert_eq!(cfg.tuning.damping, 3.0);
        assert_eq!(cfg.tuning.token_divisor, 6.0);
        assert_eq!(cfg.tuning.wall_policy, WallPolicy::Contain);
        assert_eq!(cfg.viewport, Viewport::new(360.0, 600.0));
        assert_eq!(cfg.gamepad.retry, vec!["Start".to_string(), "A".to_string()]);
        assert_eq!(cfg.maze_file, None);
        assert_eq!(cfg.log_file, Some(PathBuf::from("tiltmaze.log")));
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let (cfg, warnings) = GameConfig::from_toml_str(
            "[motion]\nsample_interval_ms = 10\n\n[collision]\nwall_policy = \"intersect\"\n",
        ).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(cfg.sample_interval, Duration::from_millis(10));
        assert_eq!(cfg.tuning.damping, 3.0);
        assert_eq!(cfg.tuning.wall_policy, WallPolicy::Intersect);
        assert_eq!(cfg.tilt.key_strength, 0.35);
    }

    #[test]
    fn invalid_values_fall_back_with_warnings() {
        let (cfg, warnings) = GameConfig::from_toml_str(
            "[motion]\nsample_interval_ms = 0\ndamping = -1.0\n\
             [viewport]\nwidth = 0.0\n\
             [collision]\nwall_policy = \"bounce\"\n",
        ).unwrap();
        assert_eq!(cfg.sample_interval, Duration::from_millis(20));
        assert_eq!(cfg.tuning.damping, 3.0);
        assert_eq!(cfg.viewport.width, 360.0);
        assert_eq!(cfg.tuning.wall_policy, WallPolicy::Contain);
        assert_eq!(warnings.len(), 4);
    }

    #[test]
    fn negative_interval_only_resets_that_key() {
        let (cfg, warnings) = GameConfig::from_toml_str(
            "[motion]\nsample_interval_ms = -5\n\n[collision]\nwall_policy = \"intersect\"\n",
        ).unwrap();
        assert_eq!(cfg.sample_interval, Duration::from_millis(20));
        assert_eq!(cfg.tuning.wall_policy, WallPolicy::Intersect);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("sample_interval_ms"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(GameConfig::from_toml_str("[motion\n").is_err());
    }

    #[test]
    fn empty_paths_disable_features() {
        let (cfg, _) = GameConfig::from_toml_str("[general]\nmaze_file = \"\"\nlog_file = \"\"\n").unwrap();
        assert_eq!(cfg.maze_file, None);
        assert_eq!(cfg.log_file, None);
    }

    #[test]
    fn default_matches_empty_file() {
        let d = GameConfig::default();
        assert_eq!(d.viewport, Viewport::new(360.0, 600.0));
        assert_eq!(d.sample_interval, Duration::from_millis(20));
    }
}
