//! Environment-driven demo configuration.
//!
//! | variable           | values                                    |
//! |--------------------|-------------------------------------------|
//! | `PRISM_BACKEND`    | `gl`, `vulkan`, `metal`, `dx12`, `primary`, `all` |
//! | `PRISM_GPU_DEBUG`  | `log`, `strict`                           |
//! | `PRISM_LOOP`       | `poll`, `callback`                        |
//! | `PRISM_SHADER_DIR` | directory whose files shadow bundled shaders |
//! | `PRISM_FRAMES`     | stop after N frames (`0` = until closed)  |

use std::path::PathBuf;

use crate::device::{parse_backends, DebugMode};
use crate::window::RuntimeConfig;

pub const BACKEND_VAR: &str = "PRISM_BACKEND";
pub const GPU_DEBUG_VAR: &str = "PRISM_GPU_DEBUG";
pub const LOOP_VAR: &str = "PRISM_LOOP";
pub const SHADER_DIR_VAR: &str = "PRISM_SHADER_DIR";
pub const FRAMES_VAR: &str = "PRISM_FRAMES";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not valid; expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Which driver runs the frame loop.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LoopMode {
    /// Caller-owned loop pumping events with a zero timeout.
    #[default]
    Poll,
    /// winit-owned loop calling back on every redraw.
    Callback,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoConfig {
    pub backends: Option<wgpu::Backends>,
    pub debug_mode: Option<DebugMode>,
    pub loop_mode: LoopMode,
    pub shader_dir: Option<PathBuf>,
    pub frames: u64,
}

impl DemoConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads every variable through `lookup`. Unset and empty values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(BACKEND_VAR) {
            config.backends = Some(parse_backends(&value).ok_or(ConfigError::Invalid {
                var: BACKEND_VAR,
                value,
                expected: "gl, vulkan, metal, dx12, primary or all",
            })?);
        }

        if let Some(value) = get(GPU_DEBUG_VAR) {
            config.debug_mode = Some(match value.trim().to_ascii_lowercase().as_str() {
                "log" => DebugMode::Log,
                "strict" => DebugMode::Strict,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: GPU_DEBUG_VAR,
                        value,
                        expected: "log or strict",
                    });
                }
            });
        }

        if let Some(value) = get(LOOP_VAR) {
            config.loop_mode = match value.trim().to_ascii_lowercase().as_str() {
                "poll" => LoopMode::Poll,
                "callback" => LoopMode::Callback,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: LOOP_VAR,
                        value,
                        expected: "poll or callback",
                    });
                }
            };
        }

        config.shader_dir = get(SHADER_DIR_VAR).map(PathBuf::from);

        if let Some(value) = get(FRAMES_VAR) {
            config.frames = value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: FRAMES_VAR,
                value: value.clone(),
                expected: "a non-negative frame count",
            })?;
        }

        Ok(config)
    }

    /// Runtime settings for a `width`x`height` window titled `title`.
    pub fn runtime_config(&self, title: &str, width: u32, height: u32) -> RuntimeConfig {
        let mut runtime = RuntimeConfig {
            title: title.to_string(),
            width,
            height,
            frame_limit: self.frames,
            ..RuntimeConfig::default()
        };
        if let Some(backends) = self.backends {
            runtime.gpu.backends = backends;
        }
        if let Some(mode) = self.debug_mode {
            runtime.gpu.debug_mode = mode;
        }
        runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = DemoConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.loop_mode, LoopMode::Poll);
    }

    #[test]
    fn all_variables_are_read() {
        let config = DemoConfig::from_lookup(lookup(&[
            (BACKEND_VAR, "gl"),
            (GPU_DEBUG_VAR, "Strict"),
            (LOOP_VAR, "callback"),
            (SHADER_DIR_VAR, "/tmp/shaders"),
            (FRAMES_VAR, "120"),
        ]))
        .unwrap();

        assert_eq!(config.backends, Some(wgpu::Backends::GL));
        assert_eq!(config.debug_mode, Some(DebugMode::Strict));
        assert_eq!(config.loop_mode, LoopMode::Callback);
        assert_eq!(config.shader_dir, Some(PathBuf::from("/tmp/shaders")));
        assert_eq!(config.frames, 120);
    }

    #[test]
    fn bad_value_names_the_variable() {
        let err = DemoConfig::from_lookup(lookup(&[(FRAMES_VAR, "lots")])).unwrap_err();
        assert!(err.to_string().contains(FRAMES_VAR));

        let err = DemoConfig::from_lookup(lookup(&[(LOOP_VAR, "spin")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: LOOP_VAR, .. }));
    }

    #[test]
    fn runtime_config_applies_overrides() {
        let config = DemoConfig {
            backends: Some(wgpu::Backends::VULKAN),
            debug_mode: Some(DebugMode::Log),
            frames: 10,
            ..Default::default()
        };
        let runtime = config.runtime_config("t", 640, 480);

        assert_eq!(runtime.gpu.backends, wgpu::Backends::VULKAN);
        assert_eq!(runtime.gpu.debug_mode, DebugMode::Log);
        assert_eq!(runtime.frame_limit, 10);
        assert_eq!((runtime.width, runtime.height), (640, 480));
    }
}
