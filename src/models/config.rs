//! # 运行配置
//!
//! 从命令行参数一次性构建的不可变配置，按引用贯穿协调器、
//! 提取器、分类器与导出器，任何阶段不读全局状态。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 构建并传递
//! - 无外部模块依赖

use std::path::PathBuf;

/// 轨迹缺陷分析运行配置
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// 帧文件目录
    pub dump_dir: PathBuf,

    /// 参考晶格 dump 文件
    pub reference_path: PathBuf,

    /// 输出根目录
    pub output_dir: PathBuf,

    /// 帧文件名 glob 过滤模式
    pub pattern: String,

    /// worker 数量（0 = 按逻辑 CPU 数）
    pub workers: usize,

    /// BCC 晶格常数 (Å)
    pub lattice_constant: f64,

    /// 帧与参考盒边界比较容差 (Å)
    pub box_tolerance: f64,

    /// 随位错核原子一并导出的每原子能量列名
    pub energy_column: String,

    /// 是否导出缺陷网络概要
    pub mesh: bool,

    /// 是否绘制缺陷演化图
    pub plot: bool,
}

impl RunConfig {
    /// 位错核原子输出目录
    pub fn defect_atoms_dir(&self) -> PathBuf {
        self.output_dir.join("dxa_atoms")
    }

    /// 缺陷网络概要输出目录
    pub fn mesh_dir(&self) -> PathBuf {
        self.output_dir.join("dxa")
    }

    /// 空位位点输出目录
    pub fn vacancy_dir(&self) -> PathBuf {
        self.output_dir.join("wigner_seitz_vacs")
    }

    /// 间隙原子输出目录
    pub fn interstitial_dir(&self) -> PathBuf {
        self.output_dir.join("wigner_seitz_sias")
    }

    /// 运行摘要 CSV 路径
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join("summary.csv")
    }

    /// 缺陷演化图路径
    pub fn plot_path(&self) -> PathBuf {
        self.output_dir.join("defect_evolution.png")
    }
}
