//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `analyze`: 轨迹缺陷分析（位错核提取 + 占位普查）
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: analyze

pub mod analyze;

use clap::{Parser, Subcommand};

/// Dislokit - 分子动力学轨迹缺陷分析工具箱
#[derive(Parser)]
#[command(name = "dislokit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "A parallel trajectory defect analysis toolkit for molecular dynamics", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Analyze dump frames for dislocation cores and point defects
    Analyze(analyze::AnalyzeArgs),
}
