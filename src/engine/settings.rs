//! ### English
//! Settings loaded once at start-up from an optional TOML file.
//!
//! ### 中文
//! 启动时从可选 TOML 文件加载一次的设置。

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::Result;
use super::flags;
use super::frame::DEFAULT_SLOT_COUNT;

/// ### English
/// Default bound on the producer's wait for the display thread (milliseconds).
///
/// ### 中文
/// 生产者等待显示线程的默认上限（毫秒）。
pub const DEFAULT_DISPLAY_TIMEOUT_MS: u64 = 1000;

/// ### English
/// Bridge configuration. Missing keys take their defaults.
///
/// ### 中文
/// 桥接配置；缺失的键使用默认值。
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// ### English
    /// `tracing` filter directive used when `RUST_LOG` is unset (e.g. `"info"`, `"stereo_bridge=trace"`).
    ///
    /// ### 中文
    /// 未设置 `RUST_LOG` 时使用的 `tracing` 过滤指令（例如 `"info"`、`"stereo_bridge=trace"`）。
    pub log_level: String,
    /// ### English
    /// Register slots as textures instead of renderbuffers.
    ///
    /// ### 中文
    /// 以纹理而不是 renderbuffer 注册槽位。
    pub use_texture: bool,
    /// ### English
    /// Request the producer's multisample count for the display surface.
    ///
    /// ### 中文
    /// 为显示表面请求与生产者一致的多重采样数。
    pub match_original_msaa: bool,
    pub stereo_indicator: bool,
    pub slot_count: usize,
    pub display_timeout_ms: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            use_texture: false,
            match_original_msaa: true,
            stereo_indicator: false,
            slot_count: DEFAULT_SLOT_COUNT,
            display_timeout_ms: DEFAULT_DISPLAY_TIMEOUT_MS,
        }
    }
}

impl BridgeSettings {
    /// ### English
    /// Loads settings from `path`. A missing file yields the defaults.
    ///
    /// ### 中文
    /// 从 `path` 加载设置；文件不存在时返回默认值。
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings file not found, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        Ok(settings.normalized())
    }

    /// ### English
    /// Applies `STEREO_BRIDGE_FLAG_*` overrides.
    ///
    /// ### 中文
    /// 应用 `STEREO_BRIDGE_FLAG_*` 覆盖项。
    pub fn with_flags(mut self, bits: u32) -> Self {
        if bits & flags::STEREO_BRIDGE_FLAG_USE_TEXTURE != 0 {
            self.use_texture = true;
        }
        if bits & flags::STEREO_BRIDGE_FLAG_NO_MATCH_MSAA != 0 {
            self.match_original_msaa = false;
        }
        if bits & flags::STEREO_BRIDGE_FLAG_STEREO_INDICATOR != 0 {
            self.stereo_indicator = true;
        }
        self
    }

    fn normalized(mut self) -> Self {
        self.slot_count = self.slot_count.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = BridgeSettings::default();
        assert_eq!(settings.slot_count, 2);
        assert_eq!(settings.display_timeout_ms, 1000);
        assert!(settings.match_original_msaa);
        assert!(!settings.use_texture);
        assert!(!settings.stereo_indicator);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = BridgeSettings::from_toml("use_texture = true\nslot_count = 0\n").unwrap();
        assert!(settings.use_texture);
        assert_eq!(settings.slot_count, 1);
        assert_eq!(settings.display_timeout_ms, 1000);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(BridgeSettings::from_toml("use_texture = \"yes\"").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("stereo-bridge-settings-that-does-not-exist.toml");
        assert_eq!(BridgeSettings::load(&path).unwrap(), BridgeSettings::default());
    }

    #[test]
    fn test_flags_override_file() {
        let settings = BridgeSettings::default().with_flags(
            flags::STEREO_BRIDGE_FLAG_USE_TEXTURE
                | flags::STEREO_BRIDGE_FLAG_NO_MATCH_MSAA
                | flags::STEREO_BRIDGE_FLAG_STEREO_INDICATOR,
        );
        assert!(settings.use_texture);
        assert!(!settings.match_original_msaa);
        assert!(settings.stereo_indicator);
    }
}
