//! # 工作区间划分
//!
//! 将 n 个帧按 rank 划分为连续均衡区间，所有 rank 上的区间
//! 恰好无重叠无遗漏地覆盖 [0, n)。
//!
//! ## 依赖关系
//! - 被 `batch/worker.rs` 使用
//! - 无外部模块依赖

/// 计算 rank 分得的 [start, end) 区间
///
/// 前 n % size 个 rank 各分得 n / size + 1 个，其余各分得 n / size 个。
/// n < size 时靠后的 rank 分得空区间。
pub fn rank_range(n: usize, rank: usize, size: usize) -> (usize, usize) {
    assert!(size >= 1, "worker group size must be at least 1");
    assert!(rank < size, "rank {} out of range for size {}", rank, size);

    let q = n / size;
    let r = n % size;

    if rank < r {
        let start = rank * (q + 1);
        (start, start + q + 1)
    } else {
        let start = rank * q + r;
        (start, start + q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_range_37_frames_4_workers() {
        assert_eq!(rank_range(37, 0, 4), (0, 10));
        assert_eq!(rank_range(37, 1, 4), (10, 19));
        assert_eq!(rank_range(37, 2, 4), (19, 28));
        assert_eq!(rank_range(37, 3, 4), (28, 37));
    }

    #[test]
    fn test_rank_range_partitions_exactly() {
        for n in 0..50 {
            for size in 1..10 {
                let mut next = 0;
                for rank in 0..size {
                    let (start, end) = rank_range(n, rank, size);
                    assert_eq!(start, next, "gap or overlap at n={} size={}", n, size);
                    assert!(end >= start);
                    next = end;
                }
                assert_eq!(next, n, "ranges must cover [0, {})", n);
            }
        }
    }

    #[test]
    fn test_rank_range_balanced() {
        for n in 0..50 {
            for size in 1..10 {
                let sizes: Vec<usize> = (0..size)
                    .map(|rank| {
                        let (start, end) = rank_range(n, rank, size);
                        end - start
                    })
                    .collect();
                let max = sizes.iter().max().unwrap();
                let min = sizes.iter().min().unwrap();
                assert!(max - min <= 1, "n={} size={} sizes={:?}", n, size, sizes);
            }
        }
    }

    #[test]
    fn test_rank_range_fewer_frames_than_workers() {
        assert_eq!(rank_range(2, 0, 4), (0, 1));
        assert_eq!(rank_range(2, 1, 4), (1, 2));
        assert_eq!(rank_range(2, 2, 4), (2, 2));
        assert_eq!(rank_range(2, 3, 4), (2, 2));
    }

    #[test]
    fn test_rank_range_single_worker() {
        assert_eq!(rank_range(37, 0, 1), (0, 37));
        assert_eq!(rank_range(0, 0, 1), (0, 0));
    }

    #[test]
    #[should_panic]
    fn test_rank_range_rejects_zero_size() {
        rank_range(10, 0, 0);
    }

    #[test]
    #[should_panic]
    fn test_rank_range_rejects_rank_out_of_range() {
        rank_range(10, 4, 4);
    }
}
