//! # SPMD 工作组
//!
//! 固定规模的 worker 线程组。rank 0（主线程）把帧目录经每个
//! rank 专属的消息通道广播出去，各 worker 按自身 rank 划分
//! 连续区间并处理，最后全体在屏障处汇合。
//!
//! worker 内部把帧级错误消化为报告记录，所有路径都必须到达
//! 屏障，因此单帧失败或 worker 级失败不会阻塞同伴。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 调用
//! - 使用 `batch/partition.rs` 划分区间
//! - 使用 `num_cpus` 推断默认规模

use crate::batch::partition::rank_range;
use crate::error::{DislokitError, Result};
use crate::models::FrameSummary;

use std::sync::mpsc;
use std::sync::Barrier;
use std::thread;

/// 单帧处理失败记录
#[derive(Debug, Clone)]
pub struct FrameFailure {
    /// 帧文件名
    pub file: String,
    /// 时间步（解析失败时未知）
    pub timestep: Option<i64>,
    /// 错误信息
    pub error: String,
}

/// worker 处理上下文：rank、组规模与分得的帧区间
#[derive(Debug)]
pub struct WorkerContext {
    pub rank: usize,
    pub size: usize,
    /// 全量帧目录（广播副本，本 worker 独占）
    pub files: Vec<String>,
    /// 本 rank 的 [start, end) 区间
    pub range: (usize, usize),
}

impl WorkerContext {
    /// 本 rank 负责的帧文件名
    pub fn slice(&self) -> &[String] {
        &self.files[self.range.0..self.range.1]
    }
}

/// 单个 worker 的处理报告
#[derive(Debug)]
pub struct WorkerReport {
    pub rank: usize,
    /// 分得的帧数
    pub assigned: usize,
    /// 成功处理的帧数
    pub processed: usize,
    /// 成功帧的摘要
    pub summaries: Vec<FrameSummary>,
    /// 帧级失败记录
    pub failures: Vec<FrameFailure>,
    /// worker 级致命错误，整个区间被跳过
    pub fatal: Option<String>,
}

impl WorkerReport {
    pub fn new(rank: usize, assigned: usize) -> Self {
        WorkerReport {
            rank,
            assigned,
            processed: 0,
            summaries: Vec::new(),
            failures: Vec::new(),
            fatal: None,
        }
    }

    fn aborted(rank: usize, reason: &str) -> Self {
        let mut report = Self::new(rank, 0);
        report.fatal = Some(reason.to_string());
        report
    }
}

/// 固定规模 SPMD 工作组
pub struct WorkerGroup {
    size: usize,
}

impl WorkerGroup {
    /// 创建工作组，size 为 0 时取逻辑 CPU 数
    pub fn new(size: usize) -> Self {
        let size = if size == 0 { num_cpus::get() } else { size };
        WorkerGroup { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// 广播帧目录并运行所有 worker，屏障汇合后按 rank 顺序收集报告
    ///
    /// `work` 在每个 worker 线程上以各自的 `WorkerContext` 调用一次，
    /// 必须把帧级错误消化进报告而不是 panic。
    pub fn run<F>(&self, catalog: &[String], work: F) -> Result<Vec<WorkerReport>>
    where
        F: Fn(WorkerContext) -> WorkerReport + Sync,
    {
        let size = self.size;
        let barrier = Barrier::new(size);
        let barrier = &barrier;
        let work = &work;

        thread::scope(|scope| {
            let mut senders = Vec::with_capacity(size);
            let mut handles = Vec::with_capacity(size);

            for rank in 0..size {
                let (tx, rx) = mpsc::channel::<Vec<String>>();
                senders.push(tx);

                handles.push(scope.spawn(move || {
                    let report = match rx.recv() {
                        Ok(files) => {
                            let range = rank_range(files.len(), rank, size);
                            work(WorkerContext {
                                rank,
                                size,
                                files,
                                range,
                            })
                        }
                        // 通道在收到目录前断开：广播失败，空手到屏障
                        Err(_) => WorkerReport::aborted(rank, "frame catalog was never delivered"),
                    };
                    barrier.wait();
                    report
                }));
            }

            // rank 0 的目录广播：每个 worker 一份独立副本
            for (rank, tx) in senders.iter().enumerate() {
                tx.send(catalog.to_vec())
                    .map_err(|_| DislokitError::DistributeError { rank })?;
            }
            drop(senders);

            let mut reports = Vec::with_capacity(size);
            for handle in handles {
                match handle.join() {
                    Ok(report) => reports.push(report),
                    Err(_) => {
                        return Err(DislokitError::Other(
                            "worker thread panicked".to_string(),
                        ))
                    }
                }
            }
            Ok(reports)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn catalog(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("dump.{}", i)).collect()
    }

    #[test]
    fn test_run_partitions_catalog() {
        let group = WorkerGroup::new(4);
        let reports = group
            .run(&catalog(10), |ctx| {
                let mut report = WorkerReport::new(ctx.rank, ctx.slice().len());
                report.processed = ctx.slice().len();
                report
            })
            .unwrap();

        assert_eq!(reports.len(), 4);
        let sizes: Vec<usize> = reports.iter().map(|r| r.assigned).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(reports.iter().map(|r| r.processed).sum::<usize>(), 10);
        for (rank, report) in reports.iter().enumerate() {
            assert_eq!(report.rank, rank);
        }
    }

    #[test]
    fn test_run_invokes_every_worker_once() {
        let calls = AtomicUsize::new(0);
        let group = WorkerGroup::new(3);
        let reports = group
            .run(&catalog(1), |ctx| {
                calls.fetch_add(1, Ordering::SeqCst);
                WorkerReport::new(ctx.rank, ctx.slice().len())
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(reports.len(), 3);
    }

    #[test]
    fn test_run_empty_catalog() {
        let group = WorkerGroup::new(2);
        let reports = group
            .run(&[], |ctx| WorkerReport::new(ctx.rank, ctx.slice().len()))
            .unwrap();

        assert!(reports.iter().all(|r| r.assigned == 0));
    }

    #[test]
    fn test_worker_fatal_does_not_stop_siblings() {
        let group = WorkerGroup::new(3);
        let reports = group
            .run(&catalog(6), |ctx| {
                let mut report = WorkerReport::new(ctx.rank, ctx.slice().len());
                if ctx.rank == 1 {
                    report.fatal = Some("boom".to_string());
                } else {
                    report.processed = ctx.slice().len();
                }
                report
            })
            .unwrap();

        assert_eq!(reports.len(), 3);
        assert!(reports[1].fatal.is_some());
        assert_eq!(reports[0].processed + reports[2].processed, 4);
    }

    #[test]
    fn test_slices_are_contiguous_and_disjoint() {
        let group = WorkerGroup::new(4);
        let names = catalog(37);
        let reports = group
            .run(&names, |ctx| {
                let mut report = WorkerReport::new(ctx.rank, ctx.slice().len());
                // 借 failures 字段带回分得的文件名，校验区间内容
                for name in ctx.slice() {
                    report.failures.push(FrameFailure {
                        file: name.clone(),
                        timestep: None,
                        error: String::new(),
                    });
                }
                report
            })
            .unwrap();

        assert_eq!(reports[0].assigned, 10);
        let collected: Vec<String> = reports
            .iter()
            .flat_map(|r| r.failures.iter().map(|f| f.file.clone()))
            .collect();
        assert_eq!(collected, names);
    }

    #[test]
    fn test_zero_size_defaults_to_cpu_count() {
        assert!(WorkerGroup::new(0).size() >= 1);
    }
}
