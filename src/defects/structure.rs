//! # 结构缺陷提取
//!
//! 公共近邻分析（CNA）逐原子判别局部晶体环境，当前只配置 BCC
//! 对称性。非完美环境的原子再按近邻图连通性聚簇，形成位错核
//! 与其他缺陷的原子集合。
//!
//! ## 判据
//! 截断半径取 (1 + √2) / 2 · a，位于 BCC 第二、三近邻壳层之间，
//! 完美 BCC 原子恰有 14 个近邻，其中 8 根键的公共近邻签名为
//! (6,6,6)，6 根键为 (4,4,4)。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 调用
//! - 使用 `defects/neighbor.rs` 构建近邻表
//! - 使用 `rayon` 并行逐原子计算

use crate::defects::neighbor::CellGrid;
use crate::models::Frame;

use rayon::prelude::*;
use std::collections::VecDeque;

/// 原子局部结构类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureType {
    /// 完美 BCC 环境
    Bcc,
    /// 非完美（缺陷）环境
    Defect,
}

/// 单帧结构分析结果
#[derive(Debug)]
pub struct StructureAnalysis {
    /// 每原子结构类型
    pub types: Vec<StructureType>,
    /// 每原子簇编号：0 = 完美环境，缺陷簇按首次出现顺序从 1 起编号
    pub clusters: Vec<u32>,
    /// 缺陷簇数量
    pub cluster_count: usize,
}

impl StructureAnalysis {
    /// 缺陷原子总数
    pub fn defect_atom_count(&self) -> usize {
        self.types
            .iter()
            .filter(|t| **t == StructureType::Defect)
            .count()
    }
}

/// BCC 结构缺陷提取器
pub struct DefectExtractor {
    cutoff: f64,
}

impl DefectExtractor {
    pub fn new(lattice_constant: f64) -> Self {
        DefectExtractor {
            cutoff: 0.5 * (1.0 + std::f64::consts::SQRT_2) * lattice_constant,
        }
    }

    /// 近邻截断半径 (Å)
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// 对单帧做 CNA 分类与缺陷聚簇
    pub fn analyze(&self, frame: &Frame) -> StructureAnalysis {
        let positions = frame.positions();
        let grid = CellGrid::build(&frame.bounds, &positions, self.cutoff);

        let neighbors: Vec<Vec<u32>> = positions
            .par_iter()
            .enumerate()
            .map(|(i, p)| {
                grid.neighbors_within(*p, self.cutoff)
                    .into_iter()
                    .filter(|&j| j as usize != i)
                    .collect()
            })
            .collect();

        let types: Vec<StructureType> = (0..positions.len())
            .into_par_iter()
            .map(|i| classify_bcc(i, &neighbors))
            .collect();

        let (clusters, cluster_count) = cluster_defects(&types, &neighbors);

        StructureAnalysis {
            types,
            clusters,
            cluster_count,
        }
    }
}

/// 用 CNA 签名判别原子 i 是否处于完美 BCC 环境
fn classify_bcc(i: usize, neighbors: &[Vec<u32>]) -> StructureType {
    let nl = &neighbors[i];
    if nl.len() != 14 {
        return StructureType::Defect;
    }

    let mut n_666 = 0;
    let mut n_444 = 0;

    for &j in nl {
        let common = intersect_sorted(nl, &neighbors[j as usize]);
        let ncn = common.len();
        if ncn != 6 && ncn != 4 {
            return StructureType::Defect;
        }

        // 公共近邻之间的键，顶点重映射到 0..ncn
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for a in 0..ncn {
            for b in (a + 1)..ncn {
                if neighbors[common[a] as usize]
                    .binary_search(&common[b])
                    .is_ok()
                {
                    edges.push((a, b));
                }
            }
        }

        match (ncn, edges.len()) {
            (6, 6) if longest_chain(6, &edges) == 6 => n_666 += 1,
            (4, 4) if longest_chain(4, &edges) == 4 => n_444 += 1,
            _ => return StructureType::Defect,
        }
    }

    if n_666 == 8 && n_444 == 6 {
        StructureType::Bcc
    } else {
        StructureType::Defect
    }
}

/// 两个升序列表的交集
fn intersect_sorted(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let (mut ia, mut ib) = (0, 0);
    while ia < a.len() && ib < b.len() {
        match a[ia].cmp(&b[ib]) {
            std::cmp::Ordering::Less => ia += 1,
            std::cmp::Ordering::Greater => ib += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[ia]);
                ia += 1;
                ib += 1;
            }
        }
    }
    out
}

/// 边不重复的最长链包含的键数（环走满一圈计环长）
fn longest_chain(n_vertices: usize, edges: &[(usize, usize)]) -> usize {
    let mut adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n_vertices];
    for (e, &(a, b)) in edges.iter().enumerate() {
        adj[a].push((b, e));
        adj[b].push((a, e));
    }

    let mut used = vec![false; edges.len()];
    let mut best = 0;
    for start in 0..n_vertices {
        chain_dfs(start, 0, &adj, &mut used, &mut best);
    }
    best
}

fn chain_dfs(
    v: usize,
    depth: usize,
    adj: &[Vec<(usize, usize)>],
    used: &mut [bool],
    best: &mut usize,
) {
    if depth > *best {
        *best = depth;
    }
    for &(w, e) in &adj[v] {
        if !used[e] {
            used[e] = true;
            chain_dfs(w, depth + 1, adj, used, best);
            used[e] = false;
        }
    }
}

/// 缺陷原子按近邻连通性聚簇，簇号按首次出现顺序从 1 递增
fn cluster_defects(types: &[StructureType], neighbors: &[Vec<u32>]) -> (Vec<u32>, usize) {
    let n = types.len();
    let mut clusters = vec![0u32; n];
    let mut cluster_count = 0u32;

    for i in 0..n {
        if types[i] != StructureType::Defect || clusters[i] != 0 {
            continue;
        }
        cluster_count += 1;
        clusters[i] = cluster_count;

        let mut queue = VecDeque::new();
        queue.push_back(i);
        while let Some(v) = queue.pop_front() {
            for &w in &neighbors[v] {
                let w = w as usize;
                if types[w] == StructureType::Defect && clusters[w] == 0 {
                    clusters[w] = cluster_count;
                    queue.push_back(w);
                }
            }
        }
    }

    (clusters, cluster_count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, BoxBounds, Frame};

    /// nx³ 个常规晶胞的 BCC 晶格（角位 + 体心），全周期
    fn bcc_frame(nx: usize, a: f64) -> Frame {
        let edge = nx as f64 * a;
        let bounds = BoxBounds::new([0.0; 3], [edge; 3], [true; 3]);
        let mut atoms = Vec::new();
        let mut id = 1i64;
        for z in 0..nx {
            for y in 0..nx {
                for x in 0..nx {
                    let base = [x as f64 * a, y as f64 * a, z as f64 * a];
                    atoms.push(Atom {
                        id,
                        type_id: 1,
                        position: base,
                    });
                    atoms.push(Atom {
                        id: id + 1,
                        type_id: 1,
                        position: [base[0] + 0.5 * a, base[1] + 0.5 * a, base[2] + 0.5 * a],
                    });
                    id += 2;
                }
            }
        }
        Frame {
            timestep: 0,
            bounds,
            atoms,
            extra_columns: vec![],
            extras: vec![],
        }
    }

    #[test]
    fn test_cutoff_between_second_and_third_shell() {
        let a = 2.87;
        let extractor = DefectExtractor::new(a);
        // 第二壳层 a，第三壳层 √2 a
        assert!(extractor.cutoff() > a);
        assert!(extractor.cutoff() < std::f64::consts::SQRT_2 * a);
    }

    #[test]
    fn test_perfect_bcc_has_no_defects() {
        let frame = bcc_frame(4, 2.87);
        let analysis = DefectExtractor::new(2.87).analyze(&frame);

        assert_eq!(analysis.types.len(), 128);
        assert!(analysis
            .types
            .iter()
            .all(|t| *t == StructureType::Bcc));
        assert_eq!(analysis.cluster_count, 0);
        assert!(analysis.clusters.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_vacancy_marks_neighbor_shell_as_one_cluster() {
        let mut frame = bcc_frame(4, 2.87);
        // 挖掉一个体心原子，其 14 个近邻失去一个近邻
        frame.atoms.remove(1);

        let analysis = DefectExtractor::new(2.87).analyze(&frame);
        assert_eq!(analysis.defect_atom_count(), 14);
        assert_eq!(analysis.cluster_count, 1);

        for (i, t) in analysis.types.iter().enumerate() {
            match t {
                StructureType::Defect => assert_eq!(analysis.clusters[i], 1),
                StructureType::Bcc => assert_eq!(analysis.clusters[i], 0),
            }
        }
    }

    #[test]
    fn test_isolated_atoms_are_defects() {
        let bounds = BoxBounds::new([0.0; 3], [50.0; 3], [true; 3]);
        let frame = Frame {
            timestep: 0,
            bounds,
            atoms: vec![
                Atom {
                    id: 1,
                    type_id: 1,
                    position: [10.0, 10.0, 10.0],
                },
                Atom {
                    id: 2,
                    type_id: 1,
                    position: [40.0, 40.0, 40.0],
                },
            ],
            extra_columns: vec![],
            extras: vec![],
        };

        let analysis = DefectExtractor::new(2.87).analyze(&frame);
        assert_eq!(analysis.defect_atom_count(), 2);
        // 互不相邻，各自成簇
        assert_eq!(analysis.cluster_count, 2);
        assert_eq!(analysis.clusters, vec![1, 2]);
    }

    #[test]
    fn test_longest_chain_counts_ring_edges() {
        // 六元环
        let ring6 = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)];
        assert_eq!(longest_chain(6, &ring6), 6);

        // 四元环
        let ring4 = [(0, 1), (1, 2), (2, 3), (3, 0)];
        assert_eq!(longest_chain(4, &ring4), 4);

        // 链
        let path = [(0, 1), (1, 2)];
        assert_eq!(longest_chain(3, &path), 2);
    }

    #[test]
    fn test_intersect_sorted() {
        assert_eq!(intersect_sorted(&[1, 3, 5, 7], &[3, 4, 5]), vec![3, 5]);
        assert_eq!(intersect_sorted(&[], &[1, 2]), Vec::<u32>::new());
    }
}
