//! # 模拟帧数据模型
//!
//! 定义 LAMMPS dump 单帧的统一表示：正交模拟盒、原子与额外每原子数据列。
//! 帧一经解析不再修改，逐帧处理后即丢弃。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `defects/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 正交模拟盒：各轴上下界与周期性标志
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxBounds {
    /// 各轴下界 [xlo, ylo, zlo]
    pub lo: [f64; 3],

    /// 各轴上界 [xhi, yhi, zhi]
    pub hi: [f64; 3],

    /// 各轴是否周期性
    pub periodic: [bool; 3],
}

impl BoxBounds {
    pub fn new(lo: [f64; 3], hi: [f64; 3], periodic: [bool; 3]) -> Self {
        BoxBounds { lo, hi, periodic }
    }

    /// 各轴边长
    pub fn lengths(&self) -> [f64; 3] {
        [
            self.hi[0] - self.lo[0],
            self.hi[1] - self.lo[1],
            self.hi[2] - self.lo[2],
        ]
    }

    /// 盒体积
    pub fn volume(&self) -> f64 {
        let l = self.lengths();
        l[0] * l[1] * l[2]
    }

    /// 最小镜像位移 a - b：周期轴折叠到 [-L/2, L/2]，非周期轴原样返回
    pub fn min_image_delta(&self, a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
        let l = self.lengths();
        let mut d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
        for axis in 0..3 {
            if self.periodic[axis] && l[axis] > 0.0 {
                d[axis] -= l[axis] * (d[axis] / l[axis]).round();
            }
        }
        d
    }

    /// 最小镜像距离平方
    pub fn distance_sq(&self, a: [f64; 3], b: [f64; 3]) -> f64 {
        let d = self.min_image_delta(a, b);
        d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
    }

    /// 将位置折叠回盒内（非周期轴原样保留）
    pub fn wrap(&self, p: [f64; 3]) -> [f64; 3] {
        let l = self.lengths();
        let mut w = p;
        for axis in 0..3 {
            if self.periodic[axis] && l[axis] > 0.0 {
                w[axis] = self.lo[axis] + (w[axis] - self.lo[axis]).rem_euclid(l[axis]);
            }
        }
        w
    }

    /// 判断两个盒子的上下界在容差内一致（不比较周期性标志）
    pub fn matches(&self, other: &BoxBounds, tolerance: f64) -> bool {
        for axis in 0..3 {
            if (self.lo[axis] - other.lo[axis]).abs() > tolerance
                || (self.hi[axis] - other.hi[axis]).abs() > tolerance
            {
                return false;
            }
        }
        true
    }
}

/// 单个原子
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    /// 帧内唯一原子编号
    pub id: i64,

    /// 原子类型
    pub type_id: i32,

    /// 笛卡尔坐标 (Å)
    pub position: [f64; 3],
}

/// 单个时间步的模拟帧
#[derive(Debug, Clone)]
pub struct Frame {
    /// 时间步
    pub timestep: i64,

    /// 模拟盒
    pub bounds: BoxBounds,

    /// 原子列表，顺序与 dump 文件一致
    pub atoms: Vec<Atom>,

    /// id/type/坐标之外的额外列名
    pub extra_columns: Vec<String>,

    /// 额外列数据，按列存储，与 `extra_columns` 一一对应
    pub extras: Vec<Vec<f64>>,
}

impl Frame {
    /// 按列名取额外数据列
    pub fn extra_column(&self, name: &str) -> Option<&[f64]> {
        self.extra_columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.extras[i].as_slice())
    }

    /// 所有原子坐标
    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.atoms.iter().map(|a| a.position).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(edge: f64, periodic: [bool; 3]) -> BoxBounds {
        BoxBounds::new([0.0; 3], [edge; 3], periodic)
    }

    #[test]
    fn test_min_image_across_boundary() {
        let bounds = cube(10.0, [true, true, true]);
        let d = bounds.min_image_delta([9.5, 0.0, 0.0], [0.5, 0.0, 0.0]);
        assert!((d[0] - (-1.0)).abs() < 1e-12);
        assert_eq!(d[1], 0.0);
        assert_eq!(d[2], 0.0);
    }

    #[test]
    fn test_min_image_respects_nonperiodic_axis() {
        let bounds = cube(10.0, [false, true, true]);
        let d = bounds.min_image_delta([9.5, 0.0, 0.0], [0.5, 0.0, 0.0]);
        assert!((d[0] - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_sq() {
        let bounds = cube(10.0, [true, true, true]);
        let d2 = bounds.distance_sq([0.5, 0.5, 0.5], [9.5, 0.5, 0.5]);
        assert!((d2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_folds_into_box() {
        let bounds = cube(10.0, [true, true, false]);
        let w = bounds.wrap([12.5, -0.5, 12.5]);
        assert!((w[0] - 2.5).abs() < 1e-12);
        assert!((w[1] - 9.5).abs() < 1e-12);
        assert!((w[2] - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_matches_with_tolerance() {
        let a = cube(10.0, [true, true, true]);
        let mut b = cube(10.0, [true, true, true]);
        b.hi[0] = 10.0005;
        assert!(a.matches(&b, 1e-3));
        assert!(!a.matches(&b, 1e-4));
    }

    #[test]
    fn test_extra_column_lookup() {
        let frame = Frame {
            timestep: 0,
            bounds: cube(1.0, [true, true, true]),
            atoms: vec![],
            extra_columns: vec!["c_peratom".to_string(), "c_stress[4]".to_string()],
            extras: vec![vec![1.0], vec![2.0]],
        };
        assert_eq!(frame.extra_column("c_stress[4]"), Some(&[2.0][..]));
        assert!(frame.extra_column("missing").is_none());
    }
}
