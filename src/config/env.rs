use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ImgGenError, Result};

/// 环境变量配置管理
pub struct EnvConfig;

impl EnvConfig {
    /// 从环境变量获取值，未设置或为空都视为缺失
    pub fn get_env(key: &str) -> Result<String> {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ImgGenError::Config(format!(
                "{key} environment variable is required"
            ))),
        }
    }

    /// 获取可选的环境变量
    pub fn get_env_optional(key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// 检查是否启用调试模式
    pub fn is_debug_mode() -> bool {
        env::var("IMGGEN_DEBUG").is_ok()
    }

    /// 展开路径开头的 `~`，其余路径原样返回
    pub fn expand_home(path: &str) -> PathBuf {
        Self::expand_home_with(path, env::var_os("HOME").map(PathBuf::from).as_deref())
    }

    fn expand_home_with(path: &str, home: Option<&Path>) -> PathBuf {
        let Some(home) = home else {
            return PathBuf::from(path);
        };
        if path == "~" {
            return home.to_path_buf();
        }
        match path.strip_prefix("~/") {
            Some(rest) => home.join(rest),
            None => PathBuf::from(path),
        }
    }
}
