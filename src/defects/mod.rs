//! # 缺陷分析模块
//!
//! 单帧缺陷分析的核心算法与结果导出：
//! - `neighbor`: 周期性盒子内的链表元胞近邻搜索
//! - `structure`: 公共近邻分析提取位错核原子并聚簇
//! - `occupancy`: Wigner-Seitz 占位普查（空位 / 间隙原子）
//! - `export`: 逐帧结果文本导出
//! - `plot`: 缺陷演化图表
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 调用
//! - 使用 `models/` 的数据结构
//! - 子模块: neighbor, structure, occupancy, export, plot

pub mod export;
pub mod neighbor;
pub mod occupancy;
pub mod plot;
pub mod structure;

pub use neighbor::CellGrid;
pub use occupancy::{OccupancyClassifier, SiteOccupancy};
pub use structure::{DefectExtractor, StructureAnalysis, StructureType};
