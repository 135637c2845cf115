//! # 批量处理模块
//!
//! 帧目录编排、区间划分与 SPMD 工作组。
//!
//! ## 功能
//! - 按自然顺序枚举帧文件
//! - 连续均衡的 rank 区间划分
//! - worker 线程组：目录广播 + 屏障汇合
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 使用
//! - 使用 `walkdir`/`glob`/`regex` 编排目录
//! - 使用 `num_cpus` 推断默认 worker 数

pub mod catalog;
pub mod partition;
pub mod worker;

pub use catalog::{list_frames, natural_cmp};
pub use partition::rank_range;
pub use worker::{FrameFailure, WorkerContext, WorkerGroup, WorkerReport};
