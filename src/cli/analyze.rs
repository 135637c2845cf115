//! # analyze 子命令 CLI 定义
//!
//! 轨迹缺陷分析入口：对一个目录下的 LAMMPS dump 帧做并行的
//! 位错核提取与 Wigner-Seitz 占位普查。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/analyze.rs`

use clap::Args;
use std::path::PathBuf;

/// analyze 子命令参数
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Directory containing LAMMPS text dump frames
    pub dump_dir: PathBuf,

    /// Reference lattice dump file for Wigner-Seitz occupancy analysis
    #[arg(short, long)]
    pub reference: PathBuf,

    /// BCC lattice constant in Angstrom (sets the CNA neighbor cutoff)
    #[arg(short = 'a', long)]
    pub lattice_constant: f64,

    /// Output directory for per-frame exports and the run summary
    #[arg(short, long, default_value = "analysis")]
    pub output: PathBuf,

    /// Glob pattern matched against dump file names
    #[arg(long, default_value = "*")]
    pub pattern: String,

    /// Number of worker threads (0 = auto)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub workers: usize,

    /// Tolerance in Angstrom when comparing frame and reference box bounds
    #[arg(long, default_value_t = 1e-3)]
    pub box_tolerance: f64,

    /// Per-atom energy column carried into the dislocation core export
    #[arg(long, default_value = "c_peratom")]
    pub energy_column: String,

    /// Skip the per-cluster geometry summary export
    #[arg(long, default_value_t = false)]
    pub no_mesh: bool,

    /// Generate a defect evolution plot (PNG) from the run summary
    #[arg(long, default_value_t = false)]
    pub plot: bool,
}
