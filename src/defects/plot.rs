//! # 缺陷演化图表
//!
//! 使用 `plotters` 库将逐帧摘要画成缺陷数量随时间步演化的折线图。
//!
//! ## 功能
//! - 位错核原子数、空位数、间隙原子数三条曲线
//! - PNG 输出
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 调用
//! - 使用 `models/summary.rs` 的 FrameSummary 结构
//! - 使用 `plotters` 渲染图表

use crate::error::{DislokitError, Result};
use crate::models::FrameSummary;

use plotters::prelude::*;
use std::path::Path;

/// 生成缺陷演化折线图（摘要须按时间步升序）
pub fn plot_defect_evolution(summaries: &[FrameSummary], output_path: &Path) -> Result<()> {
    if summaries.is_empty() {
        return Err(DislokitError::PlotError("no frames to plot".to_string()));
    }

    let root = BitMapBackend::new(output_path, (1200, 800)).into_drawing_area();
    draw_evolution_chart(&root, summaries)?;
    root.present()
        .map_err(|e| DislokitError::PlotError(e.to_string()))?;
    Ok(())
}

/// 绘制演化图表的核心逻辑
fn draw_evolution_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    summaries: &[FrameSummary],
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| DislokitError::PlotError(format!("{:?}", e)))?;

    // 确定范围
    let x_min = summaries.first().map(|s| s.timestep as f64).unwrap_or(0.0);
    let mut x_max = summaries.last().map(|s| s.timestep as f64).unwrap_or(1.0);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }

    let y_peak = summaries
        .iter()
        .map(|s| s.defect_atoms.max(s.vacancies).max(s.interstitial_atoms))
        .max()
        .unwrap_or(0);
    let y_max = (y_peak as f64 * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(root)
        .caption("Defect Evolution", ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(|e| DislokitError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Timestep")
        .y_desc("Count")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| DislokitError::PlotError(format!("{:?}", e)))?;

    let series: [(&str, RGBColor, fn(&FrameSummary) -> usize); 3] = [
        ("Dislocation core atoms", RGBColor(204, 51, 51), |s| {
            s.defect_atoms
        }),
        ("Vacancies", RGBColor(0, 102, 204), |s| s.vacancies),
        ("Interstitial atoms", RGBColor(0, 153, 68), |s| {
            s.interstitial_atoms
        }),
    ];

    for (name, color, value) in series {
        chart
            .draw_series(LineSeries::new(
                summaries
                    .iter()
                    .map(|s| (s.timestep as f64, value(s) as f64)),
                color.stroke_width(2),
            ))
            .map_err(|e| DislokitError::PlotError(format!("{:?}", e)))?
            .label(name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| DislokitError::PlotError(format!("{:?}", e)))?;

    Ok(())
}
