//! # 帧处理摘要
//!
//! 单帧分析结果的统计记录，屏障汇合后排序写入 summary.csv。
//!
//! ## 依赖关系
//! - 被 `batch/worker.rs` 和 `commands/analyze.rs` 使用
//! - 使用 `serde` 派生，配合 `csv` 序列化

use serde::Serialize;

/// 单帧分析结果摘要
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    /// 时间步
    pub timestep: i64,

    /// 帧文件名
    pub file: String,

    /// 帧内原子总数
    pub atoms: usize,

    /// 位错核（非完美环境）原子数
    pub defect_atoms: usize,

    /// 缺陷簇数量
    pub defect_clusters: usize,

    /// 空位位点数
    pub vacancies: usize,

    /// 间隙原子数
    pub interstitial_atoms: usize,

    /// 占位数大于 2 的简并位点数
    pub degenerate_sites: usize,
}
