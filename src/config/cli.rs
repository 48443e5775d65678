use crate::config::toml_config::{MergeConfig, SourceConfig, StoreConfig};
use crate::utils::error::{AreaError, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Parser)]
#[command(name = "area-merge")]
#[command(about = "Merge area selectors into a single boundary polygon")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Polygon API base URL (overrides the config file)")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Polygon API auth token (overrides the config file)")]
    pub auth_token: Option<String>,

    #[arg(long, help = "Directory for boundary records (overrides the config file)")]
    pub store_path: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit structured JSON logs")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 合併區域並寫入邊界紀錄
    Merge {
        #[arg(long, help = "Area JSON file")]
        area: PathBuf,
    },
    /// 顯示目前儲存的邊界紀錄
    Show {
        #[arg(long)]
        area_id: Uuid,
    },
    /// 刪除邊界紀錄
    Delete {
        #[arg(long)]
        area_id: Uuid,
    },
}

impl CliConfig {
    /// 設定檔為基礎，命令列參數覆蓋
    pub fn merge_config(&self) -> Result<MergeConfig> {
        let mut config = match &self.config {
            Some(path) => MergeConfig::from_file(path)?,
            None => MergeConfig {
                source: SourceConfig {
                    endpoint: self.endpoint.clone().ok_or_else(|| {
                        AreaError::MissingConfigError {
                            field: "endpoint".to_string(),
                        }
                    })?,
                    auth_token: None,
                    timeout_seconds: None,
                },
                fetch: Default::default(),
                merge: Default::default(),
                store: StoreConfig {
                    path: "./boundaries".to_string(),
                },
            },
        };

        if let Some(endpoint) = &self.endpoint {
            config.source.endpoint = endpoint.clone();
        }
        if let Some(token) = &self.auth_token {
            config.source.auth_token = Some(token.clone());
        }
        if let Some(path) = &self.store_path {
            config.store.path = path.clone();
        }

        Ok(config)
    }
}
