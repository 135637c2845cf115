//! # 统一错误处理模块
//!
//! 定义 Dislokit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// Dislokit 统一错误类型
#[derive(Error, Debug)]
pub enum DislokitError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { column: String, path: String },

    // ─────────────────────────────────────────────────────────────
    // 批处理错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to build frame catalog for {path}\nReason: {reason}")]
    CatalogError { path: String, reason: String },

    #[error("Failed to deliver frame catalog to worker {rank}")]
    DistributeError { rank: usize },

    // ─────────────────────────────────────────────────────────────
    // 分析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to load reference lattice: {path}\nReason: {reason}")]
    ReferenceLoadError { path: String, reason: String },

    #[error("Occupancy classification failed at timestep {timestep}\nReason: {reason}")]
    ClassificationError { timestep: i64, reason: String },

    #[error("Failed to export results to {path}")]
    ExportError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, DislokitError>;
