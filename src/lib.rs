//! # Suite Runner Library / Suite Runner 库
//!
//! This library provides the core functionality for the Suite Runner tool,
//! which expands a collection/facet configuration tree into a matrix of jobs,
//! queues every job, and reports pass/fail/hung results for the whole suite.
//!
//! 此库为 Suite Runner 工具提供核心功能：
//! 将 collection/facet 配置树展开为作业矩阵，提交每个作业，
//! 并为整个套件生成通过/失败/挂起的结果报告。
//!
//! ## Modules / 模块
//!
//! - `core` - Matrix expansion, dispatch, result watching and classification
//! - `infra` - External processes, the filesystem result store and logging
//! - `reporting` - Suite report, console listing and notification side effects
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 矩阵展开、作业分发、结果监视与分类
//! - `infra` - 外部进程、文件系统结果存储和日志
//! - `reporting` - 套件报告、控制台列表和通知副作用
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::models;
pub use core::planner;

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for the application's user interface. It attempts to match the full
/// locale (e.g., "zh-CN"), then just the language code (e.g., "en"), and
/// finally falls back to the default language ("en").
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    rust_i18n::set_locale(resolve_locale(&locale));
}

/// Maps a requested locale onto one that ships with the binary.
/// 将请求的语言区域映射到随程序提供的语言区域。
pub fn resolve_locale(requested: &str) -> &str {
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&requested) {
        requested
    } else {
        requested
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    }
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
