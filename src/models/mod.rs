//! # 数据模型模块
//!
//! 定义帧、参考晶格、运行配置与摘要的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`defects/` 和 `commands/` 使用
//! - 子模块: frame, reference, config, summary

pub mod config;
pub mod frame;
pub mod reference;
pub mod summary;

pub use config::RunConfig;
pub use frame::{Atom, BoxBounds, Frame};
pub use reference::{ReferenceLattice, Site};
pub use summary::FrameSummary;
