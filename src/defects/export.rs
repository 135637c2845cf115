//! # 缺陷结果导出
//!
//! 将单帧分析结果写成文本文件：缺陷原子与空位、间隙原子沿用
//! LAMMPS dump 版式（可被下游工具直接读回），簇概要为 `#` 注释
//! 开头的表格文本。
//!
//! 全部导出先在内存拼好字符串再一次写盘，重复运行覆盖旧文件。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 调用
//! - 使用 `defects/structure.rs` 的分析结果
//! - 使用 `models/frame.rs` 与 `models/reference.rs` 的数据结构

use crate::defects::structure::StructureAnalysis;
use crate::error::{DislokitError, Result};
use crate::models::{BoxBounds, Frame, ReferenceLattice};

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// 单个缺陷簇的几何概要
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    pub cluster: u32,
    pub size: usize,
    pub centroid: [f64; 3],
    pub extent: f64,
}

/// 写缺陷原子 dump 文件（跳过完美环境原子）
///
/// 列为 `id x y z <energy_column> cluster`，能量取自帧的附加列。
pub fn write_defect_atoms(
    path: &Path,
    frame: &Frame,
    analysis: &StructureAnalysis,
    energy_column: &str,
    energies: &[f64],
) -> Result<()> {
    let defect_count = analysis.defect_atom_count();
    let columns = format!("id x y z {} cluster", energy_column);
    let mut out = dump_header(frame.timestep, &frame.bounds, defect_count, &columns);

    for (i, atom) in frame.atoms.iter().enumerate() {
        if analysis.clusters[i] == 0 {
            continue;
        }
        let p = atom.position;
        writeln!(
            out,
            "{} {} {} {} {} {}",
            atom.id, p[0], p[1], p[2], energies[i], analysis.clusters[i]
        )
        .ok();
    }

    write_file(path, &out)
}

/// 写缺陷簇概要文件
///
/// 每簇一行：编号、原子数、质心坐标、最大回转半径。质心在帧的
/// 周期性度量下计算并回卷到盒内。
pub fn write_mesh_summary(path: &Path, frame: &Frame, analysis: &StructureAnalysis) -> Result<()> {
    let summaries = cluster_summaries(frame, analysis);

    let mut out = String::new();
    writeln!(out, "# defect cluster summary for timestep {}", frame.timestep).ok();
    writeln!(out, "# cluster size cx cy cz extent").ok();
    for s in &summaries {
        writeln!(
            out,
            "{} {} {} {} {} {}",
            s.cluster, s.size, s.centroid[0], s.centroid[1], s.centroid[2], s.extent
        )
        .ok();
    }

    write_file(path, &out)
}

/// 写空位格位 dump 文件（列 `id x y z`，id 为参考格位编号）
pub fn write_vacancies(
    path: &Path,
    timestep: i64,
    reference: &ReferenceLattice,
    vacancy_sites: &[usize],
) -> Result<()> {
    let mut out = dump_header(timestep, &reference.bounds, vacancy_sites.len(), "id x y z");
    for &s in vacancy_sites {
        let site = &reference.sites[s];
        let p = site.position;
        writeln!(out, "{} {} {} {}", site.id, p[0], p[1], p[2]).ok();
    }
    write_file(path, &out)
}

/// 写间隙原子 dump 文件（列 `id x y z`，id 为原子编号）
pub fn write_interstitials(path: &Path, frame: &Frame, interstitial_atoms: &[usize]) -> Result<()> {
    let mut out = dump_header(
        frame.timestep,
        &frame.bounds,
        interstitial_atoms.len(),
        "id x y z",
    );
    for &i in interstitial_atoms {
        let atom = &frame.atoms[i];
        let p = atom.position;
        writeln!(out, "{} {} {} {}", atom.id, p[0], p[1], p[2]).ok();
    }
    write_file(path, &out)
}

/// 逐簇几何概要，按簇号升序
pub fn cluster_summaries(frame: &Frame, analysis: &StructureAnalysis) -> Vec<ClusterSummary> {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); analysis.cluster_count];
    for (i, &c) in analysis.clusters.iter().enumerate() {
        if c > 0 {
            members[c as usize - 1].push(i);
        }
    }

    members
        .iter()
        .enumerate()
        .map(|(k, atoms)| {
            // 以首原子为锚点求最小镜像平均位移，避免跨界簇质心失真
            let anchor = frame.atoms[atoms[0]].position;
            let mut mean = [0.0f64; 3];
            for &i in atoms {
                let d = frame.bounds.min_image_delta(frame.atoms[i].position, anchor);
                for axis in 0..3 {
                    mean[axis] += d[axis];
                }
            }
            let inv = 1.0 / atoms.len() as f64;
            let centroid = frame.bounds.wrap([
                anchor[0] + mean[0] * inv,
                anchor[1] + mean[1] * inv,
                anchor[2] + mean[2] * inv,
            ]);

            let extent = atoms
                .iter()
                .map(|&i| {
                    frame
                        .bounds
                        .distance_sq(centroid, frame.atoms[i].position)
                        .sqrt()
                })
                .fold(0.0f64, f64::max);

            ClusterSummary {
                cluster: k as u32 + 1,
                size: atoms.len(),
                centroid,
                extent,
            }
        })
        .collect()
}

/// LAMMPS dump 头部（TIMESTEP / NUMBER OF ATOMS / BOX BOUNDS / ATOMS）
fn dump_header(timestep: i64, bounds: &BoxBounds, natoms: usize, columns: &str) -> String {
    let flags: Vec<&str> = bounds
        .periodic
        .iter()
        .map(|&p| if p { "pp" } else { "ff" })
        .collect();

    let mut out = String::new();
    writeln!(out, "ITEM: TIMESTEP").ok();
    writeln!(out, "{}", timestep).ok();
    writeln!(out, "ITEM: NUMBER OF ATOMS").ok();
    writeln!(out, "{}", natoms).ok();
    writeln!(out, "ITEM: BOX BOUNDS {}", flags.join(" ")).ok();
    for axis in 0..3 {
        writeln!(out, "{} {}", bounds.lo[axis], bounds.hi[axis]).ok();
    }
    writeln!(out, "ITEM: ATOMS {}", columns).ok();
    out
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| DislokitError::ExportError {
        path: path.display().to_string(),
        source,
    })
}
