//! # 解析器模块
//!
//! LAMMPS dump 文本格式解析。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `models/reference.rs` 使用
//! - 使用 `models/frame.rs`
//! - 子模块: dump

pub mod dump;

pub use dump::{parse_dump_content, parse_dump_file};
