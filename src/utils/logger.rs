//! tracing 訂閱器安裝。兩種輸出共用同一套過濾規則：
//! `RUST_LOG` 優先，否則只開本 crate 的日誌。

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "area_merge=info";
const VERBOSE_DIRECTIVE: &str = "area_merge=debug,info";

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// 終端機用的精簡格式；verbose 時顯示批次層級的 debug 訊息
pub fn init_cli_logger(verbose: bool) {
    let directive = if verbose {
        VERBOSE_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    };

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(env_filter(directive))
        .with(layer)
        .init();
}

/// 每行一筆 JSON，保留 target 與 thread id 方便依 area 或批次追查
pub fn init_json_logger() {
    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(false)
        .with_target(true)
        .with_thread_ids(true);

    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_DIRECTIVE))
        .with(layer)
        .init();
}
