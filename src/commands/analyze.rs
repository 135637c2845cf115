//! # analyze 子命令实现
//!
//! 轨迹缺陷分析的协调器：建立帧目录，把连续帧区间分派给 SPMD
//! 工作组，逐帧做位错核提取与占位普查并导出，屏障汇合后汇总
//! 运行报告。
//!
//! ## 功能
//! - 帧目录自然序编目 + glob 过滤
//! - 多 worker 并行处理（帧区间连续分割）
//! - 帧级失败隔离：单帧出错不影响其余帧
//! - summary.csv 运行摘要与可选缺陷演化图
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的 AnalyzeArgs
//! - 使用 `batch/` 模块做编目与分派
//! - 使用 `defects/` 模块做单帧分析与导出
//! - 使用 `parsers/` 读取帧文件

use crate::batch::{self, FrameFailure, WorkerContext, WorkerGroup, WorkerReport};
use crate::cli::analyze::AnalyzeArgs;
use crate::defects::{self, DefectExtractor, OccupancyClassifier};
use crate::error::{DislokitError, Result};
use crate::models::{FrameSummary, ReferenceLattice, RunConfig};
use crate::parsers;
use crate::utils::{output, progress};

use indicatif::ProgressBar;
use std::fs;
use std::path::Path;

/// 执行轨迹缺陷分析
pub fn execute(args: AnalyzeArgs) -> Result<()> {
    output::print_header("Trajectory Defect Analysis");

    let config = build_config(args)?;

    let catalog = batch::list_frames(&config.dump_dir, &config.pattern)?;
    if catalog.is_empty() {
        output::print_warning(&format!(
            "No matching dump files found with pattern '{}'",
            config.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} dump frames", catalog.len()));
    output::print_info(&format!(
        "Reference lattice: '{}'",
        config.reference_path.display()
    ));
    output::print_info(&format!(
        "Lattice constant: {} Å (neighbor cutoff {:.4} Å)",
        config.lattice_constant,
        DefectExtractor::new(config.lattice_constant).cutoff()
    ));

    prepare_output_dirs(&config)?;

    let group = WorkerGroup::new(config.workers);
    output::print_info(&format!("Using {} worker threads", group.size()));

    let pb = progress::create_progress_bar(catalog.len() as u64, "Analyzing");
    let reports = group.run(&catalog, |ctx| process_slice(ctx, &config, &pb))?;
    pb.finish_and_clear();

    report_run(&config, catalog.len(), reports)
}

/// 校验命令行参数并固化为运行配置
fn build_config(args: AnalyzeArgs) -> Result<RunConfig> {
    if !args.dump_dir.is_dir() {
        return Err(DislokitError::InvalidArgument(format!(
            "dump directory '{}' does not exist",
            args.dump_dir.display()
        )));
    }
    if !args.reference.is_file() {
        return Err(DislokitError::InvalidArgument(format!(
            "reference file '{}' does not exist",
            args.reference.display()
        )));
    }
    if !args.lattice_constant.is_finite() || args.lattice_constant <= 0.0 {
        return Err(DislokitError::InvalidArgument(format!(
            "lattice constant must be positive, got {}",
            args.lattice_constant
        )));
    }
    if !args.box_tolerance.is_finite() || args.box_tolerance < 0.0 {
        return Err(DislokitError::InvalidArgument(format!(
            "box tolerance must be non-negative, got {}",
            args.box_tolerance
        )));
    }

    Ok(RunConfig {
        dump_dir: args.dump_dir,
        reference_path: args.reference,
        output_dir: args.output,
        pattern: args.pattern,
        workers: args.workers,
        lattice_constant: args.lattice_constant,
        box_tolerance: args.box_tolerance,
        energy_column: args.energy_column,
        mesh: !args.no_mesh,
        plot: args.plot,
    })
}

/// 创建全部输出类别目录，无论本次运行是否产生对应文件
fn prepare_output_dirs(config: &RunConfig) -> Result<()> {
    let dirs = [
        config.defect_atoms_dir(),
        config.mesh_dir(),
        config.vacancy_dir(),
        config.interstitial_dir(),
    ];
    for dir in &dirs {
        fs::create_dir_all(dir).map_err(|e| DislokitError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

/// 单个 worker 的帧区间处理
///
/// 参考晶格每个 worker 加载一次；加载失败视为 worker 级致命错误，
/// 整个区间跳过但仍到屏障汇合。
fn process_slice(ctx: WorkerContext, config: &RunConfig, pb: &ProgressBar) -> WorkerReport {
    let (start, end) = ctx.range;
    let mut report = WorkerReport::new(ctx.rank, end - start);

    pb.println(format!(
        "worker {}/{}: frames [{}, {})",
        ctx.rank, ctx.size, start, end
    ));

    let reference = match ReferenceLattice::load(&config.reference_path) {
        Ok(reference) => reference,
        Err(e) => {
            report.fatal = Some(e.to_string());
            pb.inc((end - start) as u64);
            return report;
        }
    };

    let extractor = DefectExtractor::new(config.lattice_constant);
    let classifier = OccupancyClassifier::new(&reference, config.box_tolerance);

    for file in ctx.slice() {
        match process_frame(file, config, &reference, &extractor, &classifier) {
            Ok(summary) => {
                if summary.degenerate_sites > 0 {
                    pb.println(format!(
                        "[WARN] {}: {} sites with occupancy > 2",
                        summary.file, summary.degenerate_sites
                    ));
                }
                report.processed += 1;
                report.summaries.push(summary);
            }
            Err((timestep, e)) => report.failures.push(FrameFailure {
                file: file.clone(),
                timestep,
                error: e.to_string(),
            }),
        }
        pb.inc(1);
    }

    report
}

/// 单帧完整流水线：解析、位错核提取、占位普查、导出
fn process_frame(
    file: &str,
    config: &RunConfig,
    reference: &ReferenceLattice,
    extractor: &DefectExtractor,
    classifier: &OccupancyClassifier,
) -> std::result::Result<FrameSummary, (Option<i64>, DislokitError)> {
    // 目录里的帧文件名相对 dump 目录解析
    let frame = parsers::parse_dump_file(&config.dump_dir.join(file)).map_err(|e| (None, e))?;
    let timestep = frame.timestep;
    let frame_err = |e: DislokitError| (Some(timestep), e);

    let energies = frame
        .extra_column(&config.energy_column)
        .ok_or_else(|| {
            frame_err(DislokitError::MissingColumn {
                column: config.energy_column.clone(),
                path: file.to_string(),
            })
        })?;

    let analysis = extractor.analyze(&frame);
    let occupancy = classifier.classify(&frame).map_err(frame_err)?;

    let vacancy_sites = occupancy.vacancy_sites();
    let interstitial_atoms = occupancy.interstitial_atoms();
    let degenerate_sites = occupancy.degenerate_sites();

    defects::export::write_defect_atoms(
        &config
            .defect_atoms_dir()
            .join(format!("dxa_atoms_{}", timestep)),
        &frame,
        &analysis,
        &config.energy_column,
        energies,
    )
    .map_err(frame_err)?;

    if config.mesh {
        defects::export::write_mesh_summary(
            &config.mesh_dir().join(format!("dxa_{}", timestep)),
            &frame,
            &analysis,
        )
        .map_err(frame_err)?;
    }

    defects::export::write_vacancies(
        &config.vacancy_dir().join(format!("ws_vac_{}", timestep)),
        timestep,
        reference,
        &vacancy_sites,
    )
    .map_err(frame_err)?;

    defects::export::write_interstitials(
        &config
            .interstitial_dir()
            .join(format!("ws_sia_{}", timestep)),
        &frame,
        &interstitial_atoms,
    )
    .map_err(frame_err)?;

    Ok(FrameSummary {
        timestep,
        file: file.to_string(),
        atoms: frame.atoms.len(),
        defect_atoms: analysis.defect_atom_count(),
        defect_clusters: analysis.cluster_count,
        vacancies: vacancy_sites.len(),
        interstitial_atoms: interstitial_atoms.len(),
        degenerate_sites: degenerate_sites.len(),
    })
}

/// 汇总所有 worker 报告：统计表、失败列表、summary.csv、可选图表
fn report_run(config: &RunConfig, total: usize, reports: Vec<WorkerReport>) -> Result<()> {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct WorkerRow {
        #[tabled(rename = "Rank")]
        rank: usize,
        #[tabled(rename = "Assigned")]
        assigned: usize,
        #[tabled(rename = "Processed")]
        processed: usize,
        #[tabled(rename = "Failed")]
        failed: usize,
        #[tabled(rename = "Status")]
        status: String,
    }

    let rows: Vec<WorkerRow> = reports
        .iter()
        .map(|r| WorkerRow {
            rank: r.rank,
            assigned: r.assigned,
            processed: r.processed,
            failed: r.failures.len(),
            status: match &r.fatal {
                Some(_) => "aborted".to_string(),
                None => "ok".to_string(),
            },
        })
        .collect();

    output::print_separator();
    println!("{}", Table::new(&rows));

    let failures: Vec<&FrameFailure> = reports.iter().flat_map(|r| &r.failures).collect();
    if !failures.is_empty() {
        output::print_warning(&format!("{} frames failed:", failures.len()));
        for f in failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", f.file, f.error));
        }
        if failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", failures.len() - 10));
        }
    }

    let fatals: Vec<(usize, String)> = reports
        .iter()
        .filter_map(|r| r.fatal.as_ref().map(|m| (r.rank, m.clone())))
        .collect();
    let workers = reports.len();

    let mut summaries: Vec<FrameSummary> =
        reports.into_iter().flat_map(|r| r.summaries).collect();
    summaries.sort_by_key(|s| s.timestep);

    let summary_path = config.summary_path();
    write_summary_csv(&summary_path, &summaries)?;
    output::print_success(&format!(
        "Run summary saved to '{}'",
        summary_path.display()
    ));

    if config.plot {
        if summaries.is_empty() {
            output::print_warning("No frames succeeded, skipping evolution plot");
        } else {
            let plot_path = config.plot_path();
            defects::plot::plot_defect_evolution(&summaries, &plot_path)?;
            output::print_success(&format!(
                "Evolution plot saved to '{}'",
                plot_path.display()
            ));
        }
    }

    if !fatals.is_empty() {
        for (rank, msg) in &fatals {
            output::print_error(&format!("worker {} aborted: {}", rank, msg));
        }
        return Err(DislokitError::Other(format!(
            "{} of {} workers aborted",
            fatals.len(),
            workers
        )));
    }

    output::print_done(&format!("Analyzed {}/{} frames", summaries.len(), total));
    Ok(())
}

/// 按时间步升序写运行摘要 CSV
fn write_summary_csv(path: &Path, summaries: &[FrameSummary]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for summary in summaries {
        wtr.serialize(summary)?;
    }
    wtr.flush().map_err(|e| DislokitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
