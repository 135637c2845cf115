//! # 参考晶格模型
//!
//! 占位普查的基准点阵。每个 worker 加载一次，之后只读共享整个区间。
//!
//! ## 依赖关系
//! - 被 `defects/occupancy.rs` 和 `commands/analyze.rs` 使用
//! - 使用 `parsers/dump.rs` 读取文件

use crate::error::{DislokitError, Result};
use crate::models::frame::BoxBounds;
use crate::parsers;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 参考晶格位点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// 位点编号，沿用参考文件中的原子编号
    pub id: i64,

    /// 位点坐标 (Å)
    pub position: [f64; 3],
}

/// 参考晶格：固定位点集合及其模拟盒
#[derive(Debug, Clone)]
pub struct ReferenceLattice {
    /// 参考模拟盒
    pub bounds: BoxBounds,

    /// 位点列表，顺序与参考文件一致
    pub sites: Vec<Site>,
}

impl ReferenceLattice {
    /// 从 LAMMPS dump 文件加载参考晶格
    pub fn load(path: &Path) -> Result<Self> {
        let frame =
            parsers::parse_dump_file(path).map_err(|e| DislokitError::ReferenceLoadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if frame.atoms.is_empty() {
            return Err(DislokitError::ReferenceLoadError {
                path: path.display().to_string(),
                reason: "reference contains no atoms".to_string(),
            });
        }

        let sites = frame
            .atoms
            .iter()
            .map(|a| Site {
                id: a.id,
                position: a.position,
            })
            .collect();

        Ok(ReferenceLattice {
            bounds: frame.bounds,
            sites,
        })
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
