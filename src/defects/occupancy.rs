//! # 占位分类（Wigner-Seitz 法）
//!
//! 将帧内每个原子划归参考晶格中最近的格位，按格位占据数分类：
//! 0 = 空位，1 = 正常占据，≥2 = 间隙原子（该格位全部原子记为
//! 间隙原子，占据数 > 2 视为退化格位，上报但不拒绝）。
//!
//! 最近格位在帧自身的周期性度量下求取，距离相等时取格位索引
//! 较小者。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 调用
//! - 使用 `defects/neighbor.rs` 的格位网格
//! - 使用 `rayon` 并行分派原子

use crate::defects::neighbor::CellGrid;
use crate::error::{DislokitError, Result};
use crate::models::{Frame, ReferenceLattice};

use rayon::prelude::*;

/// 单帧占位普查结果
#[derive(Debug)]
pub struct SiteOccupancy {
    /// 每个参考格位的占据数
    pub counts: Vec<u32>,
    /// 每个原子划归的格位索引
    pub assignments: Vec<u32>,
}

impl SiteOccupancy {
    /// 占据数为 0 的格位索引（升序）
    pub fn vacancy_sites(&self) -> Vec<usize> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == 0)
            .map(|(s, _)| s)
            .collect()
    }

    /// 划归到多重占据格位的原子索引（升序）
    pub fn interstitial_atoms(&self) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, &s)| self.counts[s as usize] >= 2)
            .map(|(i, _)| i)
            .collect()
    }

    /// 占据数超过 2 的退化格位索引（升序）
    pub fn degenerate_sites(&self) -> Vec<usize> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 2)
            .map(|(s, _)| s)
            .collect()
    }
}

/// Wigner-Seitz 占位分类器
pub struct OccupancyClassifier<'a> {
    reference: &'a ReferenceLattice,
    box_tolerance: f64,
}

impl<'a> OccupancyClassifier<'a> {
    pub fn new(reference: &'a ReferenceLattice, box_tolerance: f64) -> Self {
        OccupancyClassifier {
            reference,
            box_tolerance,
        }
    }

    /// 对单帧做占位普查
    ///
    /// 帧与参考晶格的盒子边界、周期性标志必须一致（边界允许
    /// `box_tolerance` 偏差），否则返回 `ClassificationError`。
    pub fn classify(&self, frame: &Frame) -> Result<SiteOccupancy> {
        self.check_compatibility(frame)?;

        let site_positions: Vec<[f64; 3]> =
            self.reference.sites.iter().map(|s| s.position).collect();
        let volume = frame.bounds.volume();
        let target_cell = (volume / site_positions.len() as f64).cbrt();
        let grid = CellGrid::build(&frame.bounds, &site_positions, target_cell);

        let assignments: Vec<u32> = frame
            .atoms
            .par_iter()
            .map(|atom| {
                grid.nearest(atom.position)
                    .map(|(site, _)| site)
                    .ok_or_else(|| DislokitError::ClassificationError {
                        timestep: frame.timestep,
                        reason: format!("no reference site found for atom {}", atom.id),
                    })
            })
            .collect::<Result<Vec<u32>>>()?;

        let mut counts = vec![0u32; self.reference.len()];
        for &s in &assignments {
            counts[s as usize] += 1;
        }

        Ok(SiteOccupancy {
            counts,
            assignments,
        })
    }

    fn check_compatibility(&self, frame: &Frame) -> Result<()> {
        let err = |reason: String| {
            Err(DislokitError::ClassificationError {
                timestep: frame.timestep,
                reason,
            })
        };

        if frame.atoms.is_empty() {
            return err("frame contains no atoms".to_string());
        }
        if self.reference.is_empty() {
            return err("reference lattice contains no sites".to_string());
        }
        if frame.bounds.periodic != self.reference.bounds.periodic {
            return err(format!(
                "periodicity mismatch: frame {:?}, reference {:?}",
                frame.bounds.periodic, self.reference.bounds.periodic
            ));
        }
        if !frame.bounds.matches(&self.reference.bounds, self.box_tolerance) {
            return err(format!(
                "box mismatch beyond tolerance {}: frame {:?}..{:?}, reference {:?}..{:?}",
                self.box_tolerance,
                frame.bounds.lo,
                frame.bounds.hi,
                self.reference.bounds.lo,
                self.reference.bounds.hi
            ));
        }
        Ok(())
    }
}
