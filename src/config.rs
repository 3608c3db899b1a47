//! 設定ファイル管理モジュール
//!
//! エミュレータの設定をJSON形式で永続化

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 設定ファイルのデフォルトファイル名
const CONFIG_FILENAME: &str = "ttyrs_config.json";

/// 実行ファイルのディレクトリを取得
pub fn get_exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// 設定ファイルのパスを取得
pub fn get_config_path() -> PathBuf {
    get_exe_dir().join(CONFIG_FILENAME)
}

fn default_cps() -> u32 {
    10
}

fn default_screenshot_dir() -> String {
    "screenshots".to_string()
}

/// エミュレータ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 最後に印字したテキストファイルのパス
    pub last_text: Option<String>,
    /// 送信速度（文字/秒）
    #[serde(default = "default_cps")]
    pub chars_per_second: u32,
    /// スクリーンショットの保存先ディレクトリ
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: String,
    /// 起動時に全消去を行うか
    #[serde(default)]
    pub erase_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            last_text: None,
            chars_per_second: default_cps(),
            screenshot_dir: default_screenshot_dir(),
            erase_on_start: false,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込む（実行ファイルと同じディレクトリから）
    pub fn load() -> Self {
        Self::load_from(get_config_path())
    }

    /// 指定したパスから設定を読み込む
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to parse config {:?}: {}, using defaults", path.as_ref(), e);
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    /// 設定ファイルを保存する（実行ファイルと同じディレクトリに）
    pub fn save(&self) -> Result<(), String> {
        self.save_to(get_config_path())
    }

    /// 指定したパスに設定を保存する
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(&path, json).map_err(|e| format!("Failed to write config: {}", e))?;
        log::info!("Saved config to {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut config = Config::default();
        config.last_text = Some("banner.txt".to_string());
        config.chars_per_second = 45;

        let path = std::env::temp_dir().join("ttyrs_config_test.json");
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path);
        assert_eq!(loaded.last_text.as_deref(), Some("banner.txt"));
        assert_eq!(loaded.chars_per_second, 45);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_from("/nonexistent/ttyrs_config.json");
        assert_eq!(config.chars_per_second, default_cps());
        assert!(config.last_text.is_none());
    }
}
