//! # 空间网格近邻搜索
//!
//! 均匀网格加速的近邻查询，距离一律采用盒子周期性下的最小镜像
//! 度量。半径查询服务近邻图构建，最近点查询服务占位普查。
//!
//! ## 依赖关系
//! - 被 `defects/structure.rs` 和 `defects/occupancy.rs` 使用
//! - 使用 `models/frame.rs` 的 BoxBounds

use crate::models::BoxBounds;

/// 均匀空间网格
///
/// 网格只借用坐标数组，不复制点数据；周期轴上的网格索引取模
/// 折叠，非周期轴越界索引钳制到边缘格。
pub struct CellGrid<'a> {
    bounds: &'a BoxBounds,
    positions: &'a [[f64; 3]],
    /// 各轴网格数
    n_cells: [usize; 3],
    /// 各轴网格边长
    cell_len: [f64; 3],
    /// 扁平网格编号 -> 点索引
    cells: Vec<Vec<u32>>,
}

impl<'a> CellGrid<'a> {
    /// 构建网格，target_cell 为期望网格边长（每轴至少 1 格）
    pub fn build(bounds: &'a BoxBounds, positions: &'a [[f64; 3]], target_cell: f64) -> Self {
        let lengths = bounds.lengths();
        let mut n_cells = [1usize; 3];
        let mut cell_len = [0.0f64; 3];
        for axis in 0..3 {
            let n = if target_cell > 0.0 {
                (lengths[axis] / target_cell).floor() as usize
            } else {
                1
            };
            n_cells[axis] = n.max(1);
            cell_len[axis] = lengths[axis] / n_cells[axis] as f64;
        }

        let total = n_cells[0] * n_cells[1] * n_cells[2];
        let mut grid = CellGrid {
            bounds,
            positions,
            n_cells,
            cell_len,
            cells: vec![Vec::new(); total],
        };

        for (i, p) in positions.iter().enumerate() {
            let cell = grid.cell_of(*p);
            let flat = grid.flat(cell);
            grid.cells[flat].push(i as u32);
        }

        grid
    }

    /// 返回与 query 最小镜像距离不超过 cutoff 的所有点索引（升序）
    ///
    /// query 自身在点集中时也会出现在结果里，由调用方剔除。
    pub fn neighbors_within(&self, query: [f64; 3], cutoff: f64) -> Vec<u32> {
        let cutoff_sq = cutoff * cutoff;
        let center = self.cell_of(query);

        let xs = self.axis_candidates(0, center[0], cutoff);
        let ys = self.axis_candidates(1, center[1], cutoff);
        let zs = self.axis_candidates(2, center[2], cutoff);

        let mut result = Vec::new();
        for &cz in &zs {
            for &cy in &ys {
                for &cx in &xs {
                    let flat = self.flat([cx, cy, cz]);
                    for &j in &self.cells[flat] {
                        let d2 = self.bounds.distance_sq(query, self.positions[j as usize]);
                        if d2 <= cutoff_sq {
                            result.push(j);
                        }
                    }
                }
            }
        }

        result.sort_unstable();
        result
    }

    /// 返回距 query 最近的点及其距离平方，距离相等取较小索引
    pub fn nearest(&self, query: [f64; 3]) -> Option<(u32, f64)> {
        if self.positions.is_empty() {
            return None;
        }

        let center = self.cell_of(query);
        let mut visited = vec![false; self.cells.len()];
        let mut best: Option<(u32, f64)> = None;

        let min_cell = self.cell_len[0].min(self.cell_len[1]).min(self.cell_len[2]);
        let max_shell = self.n_cells[0].max(self.n_cells[1]).max(self.n_cells[2]);

        for shell in 0..=max_shell {
            for flat in self.shell_cells(center, shell) {
                if visited[flat] {
                    continue;
                }
                visited[flat] = true;

                for &j in &self.cells[flat] {
                    let d2 = self.bounds.distance_sq(query, self.positions[j as usize]);
                    match best {
                        None => best = Some((j, d2)),
                        Some((bj, bd2)) => {
                            if d2 < bd2 || (d2 == bd2 && j < bj) {
                                best = Some((j, d2));
                            }
                        }
                    }
                }
            }

            // 更远壳层的点距查询点至少 shell * min_cell，当前最优
            // 严格小于该下界时不可能再被超越（相等时多扫一层保住并列判定）
            if let Some((_, bd2)) = best {
                if min_cell > 0.0 && bd2.sqrt() < shell as f64 * min_cell {
                    break;
                }
            }
        }

        best
    }

    /// 点所在网格坐标
    fn cell_of(&self, p: [f64; 3]) -> [usize; 3] {
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            let n = self.n_cells[axis] as isize;
            let rel = if self.cell_len[axis] > 0.0 {
                (p[axis] - self.bounds.lo[axis]) / self.cell_len[axis]
            } else {
                0.0
            };
            let idx = rel.floor() as isize;
            cell[axis] = if self.bounds.periodic[axis] {
                idx.rem_euclid(n) as usize
            } else {
                idx.clamp(0, n - 1) as usize
            };
        }
        cell
    }

    fn flat(&self, cell: [usize; 3]) -> usize {
        cell[0] + self.n_cells[0] * (cell[1] + self.n_cells[1] * cell[2])
    }

    /// 某轴上 cutoff 覆盖范围内的候选网格索引（去重后升序）
    fn axis_candidates(&self, axis: usize, center: usize, cutoff: f64) -> Vec<usize> {
        let n = self.n_cells[axis] as isize;
        let reach = if self.cell_len[axis] > 0.0 {
            ((cutoff / self.cell_len[axis]).ceil() as isize).min(n)
        } else {
            0
        };

        let mut out = Vec::with_capacity((2 * reach + 1) as usize);
        for off in -reach..=reach {
            let idx = center as isize + off;
            let idx = if self.bounds.periodic[axis] {
                idx.rem_euclid(n)
            } else {
                idx.clamp(0, n - 1)
            };
            out.push(idx as usize);
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// 与 center 的切比雪夫距离恰为 shell 的网格（扁平编号，去重）
    fn shell_cells(&self, center: [usize; 3], shell: usize) -> Vec<usize> {
        let s = shell as isize;
        let mut out = Vec::new();
        for dz in -s..=s {
            for dy in -s..=s {
                for dx in -s..=s {
                    if dx.abs().max(dy.abs()).max(dz.abs()) != s {
                        continue;
                    }
                    if let Some(flat) = self.offset_cell(center, [dx, dy, dz]) {
                        out.push(flat);
                    }
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// center 加偏移后的网格：周期轴取模，非周期轴越界返回 None
    fn offset_cell(&self, center: [usize; 3], offset: [isize; 3]) -> Option<usize> {
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            let n = self.n_cells[axis] as isize;
            let idx = center[axis] as isize + offset[axis];
            if self.bounds.periodic[axis] {
                cell[axis] = idx.rem_euclid(n) as usize;
            } else if idx < 0 || idx >= n {
                return None;
            } else {
                cell[axis] = idx as usize;
            }
        }
        Some(self.flat(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(edge: f64, periodic: bool) -> BoxBounds {
        BoxBounds::new([0.0; 3], [edge; 3], [periodic; 3])
    }

    #[test]
    fn test_neighbors_within_simple_cubic() {
        let bounds = cube(5.0, true);
        let mut positions = Vec::new();
        for z in 0..5 {
            for y in 0..5 {
                for x in 0..5 {
                    positions.push([x as f64, y as f64, z as f64]);
                }
            }
        }
        let grid = CellGrid::build(&bounds, &positions, 1.1);

        // 简单立方：自身 + 6 个第一近邻
        let result = grid.neighbors_within([2.0, 2.0, 2.0], 1.1);
        assert_eq!(result.len(), 7);
    }

    #[test]
    fn test_neighbors_within_periodic_wrap() {
        let bounds = cube(5.0, true);
        let positions = vec![[0.5, 0.5, 0.5], [4.5, 0.5, 0.5]];
        let grid = CellGrid::build(&bounds, &positions, 1.0);

        let result = grid.neighbors_within([0.5, 0.5, 0.5], 1.1);
        assert_eq!(result, vec![0, 1]);
    }

    #[test]
    fn test_neighbors_within_respects_open_boundary() {
        let bounds = cube(5.0, false);
        let positions = vec![[0.5, 0.5, 0.5], [4.5, 0.5, 0.5]];
        let grid = CellGrid::build(&bounds, &positions, 1.0);

        let result = grid.neighbors_within([0.5, 0.5, 0.5], 1.1);
        assert_eq!(result, vec![0]);
    }

    #[test]
    fn test_neighbors_within_small_grid_no_double_count() {
        // 每轴只有 2 格时，周期折叠后的候选格必须去重
        let bounds = cube(2.0, true);
        let positions = vec![[0.25, 0.25, 0.25], [1.25, 0.25, 0.25]];
        let grid = CellGrid::build(&bounds, &positions, 1.0);

        let result = grid.neighbors_within([0.25, 0.25, 0.25], 1.1);
        assert_eq!(result, vec![0, 1]);
    }

    #[test]
    fn test_nearest_basic() {
        let bounds = cube(10.0, true);
        let positions = vec![[1.0, 1.0, 1.0], [8.0, 2.0, 3.0], [5.0, 5.0, 5.0]];
        let grid = CellGrid::build(&bounds, &positions, 2.0);

        let (idx, d2) = grid.nearest([5.2, 5.0, 5.0]).unwrap();
        assert_eq!(idx, 2);
        assert!((d2 - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_through_periodic_boundary() {
        let bounds = cube(10.0, true);
        let positions = vec![[0.1, 0.0, 0.0], [5.0, 5.0, 5.0]];
        let grid = CellGrid::build(&bounds, &positions, 1.0);

        let (idx, d2) = grid.nearest([9.9, 0.0, 0.0]).unwrap();
        assert_eq!(idx, 0);
        assert!((d2 - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_tie_prefers_lower_index() {
        let bounds = BoxBounds::new([0.0; 3], [2.0, 1.0, 1.0], [false; 3]);
        let positions = vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let grid = CellGrid::build(&bounds, &positions, 0.5);

        let (idx, d2) = grid.nearest([1.0, 0.0, 0.0]).unwrap();
        assert_eq!(idx, 0);
        assert!((d2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_expands_past_empty_shells() {
        let bounds = cube(10.0, true);
        let positions = vec![[8.0, 8.0, 8.0]];
        let grid = CellGrid::build(&bounds, &positions, 1.0);

        let (idx, d2) = grid.nearest([1.0, 1.0, 1.0]).unwrap();
        assert_eq!(idx, 0);
        assert!((d2 - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_empty_positions() {
        let bounds = cube(1.0, true);
        let positions: Vec<[f64; 3]> = Vec::new();
        let grid = CellGrid::build(&bounds, &positions, 1.0);
        assert!(grid.nearest([0.5, 0.5, 0.5]).is_none());
    }
}
