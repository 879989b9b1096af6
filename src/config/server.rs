use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::env::EnvConfig;
use crate::error::{ImgGenError, Result};

pub const SERVER_NAME: &str = "gemini-image-generator";
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";
pub const API_BASE_ENV: &str = "GEMINI_API_BASE";

/// 进程级配置，启动时构建一次，之后只读
#[derive(Clone)]
pub struct ServerConfig {
    pub api_key: String,
    pub output_dir: PathBuf,
    pub api_base: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("api_key", &"<redacted>")
            .field("output_dir", &self.output_dir)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl ServerConfig {
    pub fn new(api_key: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_key: api_key.into(),
            output_dir: output_dir.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// 读取 `.env` 与环境变量，并准备输出目录
    ///
    /// 必需：
    /// - GEMINI_API_KEY
    /// - OUTPUT_DIR（支持 `~`）
    ///
    /// 可选：
    /// - GEMINI_API_BASE
    pub fn from_env() -> Result<Self> {
        match dotenv::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env file"),
            Err(_) => debug!("no .env file found, using process environment"),
        }

        let api_key = EnvConfig::get_env(API_KEY_ENV)?;
        let output_dir = EnvConfig::expand_home(&EnvConfig::get_env(OUTPUT_DIR_ENV)?);

        let mut config = Self::new(api_key, output_dir);
        if let Some(api_base) = EnvConfig::get_env_optional(API_BASE_ENV) {
            config = config.with_api_base(api_base);
        }
        config.prepare_output_dir()
    }

    /// 创建输出目录（含父目录），并将其固定为规范化的绝对路径
    pub fn prepare_output_dir(mut self) -> Result<Self> {
        self.output_dir = self.resolved_output_dir()?;
        info!(output_dir = %self.output_dir.display(), "output directory ready");
        Ok(self)
    }

    /// 确保输出目录存在并返回其绝对路径，可重复调用
    pub fn resolved_output_dir(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|err| {
            ImgGenError::Config(format!(
                "cannot create output directory {}: {err}",
                self.output_dir.display()
            ))
        })?;
        fs::canonicalize(&self.output_dir).map_err(|err| {
            ImgGenError::Config(format!(
                "cannot resolve output directory {}: {err}",
                self.output_dir.display()
            ))
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
