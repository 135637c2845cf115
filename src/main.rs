//! # Dislokit - 分子动力学轨迹缺陷分析工具箱
//!
//! 将 LAMMPS dump 轨迹的缺陷分析流程用 Rust 重构，统一成单一
//! 可执行文件：按帧并行做位错核提取（公共近邻分析）与点缺陷
//! 占位普查（Wigner-Seitz 法）。
//!
//! ## 子命令
//! - `analyze` - 轨迹缺陷分析（位错核 + 空位 / 间隙原子）
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (帧编目与 SPMD 工作组)
//!   │     ├── parsers/   (dump 格式解析器)
//!   │     ├── defects/   (缺陷分析算法与导出)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod defects;
mod error;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
