//! # LAMMPS dump 格式解析器
//!
//! 解析 LAMMPS 文本 dump 帧文件（每个时间步一个文件）。
//!
//! ## dump 格式说明
//! ```text
//! ITEM: TIMESTEP
//! 5000
//! ITEM: NUMBER OF ATOMS
//! 16000
//! ITEM: BOX BOUNDS pp ff pp
//! xlo xhi                # 每轴一行，下界 上界
//! ylo yhi
//! zlo zhi
//! ITEM: ATOMS id x y z c_peratom ...
//! 1 0.0 0.0 0.0 -4.01 ...
//! ```
//!
//! 必需列为 id 与 x y z；type 列可选，缺省记为 1；
//! 其余列按列名保留为额外数据列。只支持正交盒。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/frame.rs`

use crate::error::{DislokitError, Result};
use crate::models::{Atom, BoxBounds, Frame};

use std::fs;
use std::path::Path;

/// 解析 LAMMPS dump 文件
pub fn parse_dump_file(path: &Path) -> Result<Frame> {
    let content = fs::read_to_string(path).map_err(|e| DislokitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_dump_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 dump 格式
pub fn parse_dump_content(content: &str, source: &str) -> Result<Frame> {
    let parse_err = |reason: String| DislokitError::ParseError {
        format: "dump".to_string(),
        path: source.to_string(),
        reason,
    };

    let lines: Vec<&str> = content.lines().collect();
    let mut idx = 0usize;

    // ITEM: TIMESTEP
    let line = next_line(&lines, &mut idx).ok_or_else(|| parse_err("empty file".to_string()))?;
    if !line.starts_with("ITEM: TIMESTEP") {
        return Err(parse_err(format!(
            "expected 'ITEM: TIMESTEP', found '{}'",
            line
        )));
    }
    let timestep: i64 = next_line(&lines, &mut idx)
        .ok_or_else(|| parse_err("missing timestep value".to_string()))?
        .parse()
        .map_err(|_| parse_err("invalid timestep value".to_string()))?;

    // ITEM: NUMBER OF ATOMS
    let line = next_line(&lines, &mut idx)
        .ok_or_else(|| parse_err("missing 'ITEM: NUMBER OF ATOMS'".to_string()))?;
    if !line.starts_with("ITEM: NUMBER OF ATOMS") {
        return Err(parse_err(format!(
            "expected 'ITEM: NUMBER OF ATOMS', found '{}'",
            line
        )));
    }
    let natoms: usize = next_line(&lines, &mut idx)
        .ok_or_else(|| parse_err("missing atom count".to_string()))?
        .parse()
        .map_err(|_| parse_err("invalid atom count".to_string()))?;

    // ITEM: BOX BOUNDS <flags>
    let line = next_line(&lines, &mut idx)
        .ok_or_else(|| parse_err("missing 'ITEM: BOX BOUNDS'".to_string()))?;
    let rest = line.strip_prefix("ITEM: BOX BOUNDS").ok_or_else(|| {
        parse_err(format!("expected 'ITEM: BOX BOUNDS', found '{}'", line))
    })?;
    let flags: Vec<&str> = rest.split_whitespace().collect();
    if flags.iter().any(|f| matches!(*f, "xy" | "xz" | "yz")) {
        return Err(parse_err("triclinic box is not supported".to_string()));
    }
    let periodic = match flags.len() {
        // 旧版 dump 不写边界标志，按全周期处理
        0 => [true, true, true],
        3 => [
            flags[0].starts_with('p'),
            flags[1].starts_with('p'),
            flags[2].starts_with('p'),
        ],
        _ => {
            return Err(parse_err(format!(
                "invalid boundary flags '{}'",
                rest.trim()
            )))
        }
    };

    let mut lo = [0.0f64; 3];
    let mut hi = [0.0f64; 3];
    for axis in 0..3 {
        let line = next_line(&lines, &mut idx)
            .ok_or_else(|| parse_err("missing box bounds line".to_string()))?;
        let parts: Vec<f64> = line
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() != 2 {
            return Err(parse_err(format!("invalid box bounds line '{}'", line)));
        }
        lo[axis] = parts[0];
        hi[axis] = parts[1];
    }

    // ITEM: ATOMS <columns>
    let line = next_line(&lines, &mut idx)
        .ok_or_else(|| parse_err("missing 'ITEM: ATOMS'".to_string()))?;
    let cols = line
        .strip_prefix("ITEM: ATOMS")
        .ok_or_else(|| parse_err(format!("expected 'ITEM: ATOMS', found '{}'", line)))?;
    let columns: Vec<String> = cols.split_whitespace().map(|s| s.to_string()).collect();

    let find = |name: &str| columns.iter().position(|c| c == name);
    let id_col = find("id").ok_or_else(|| parse_err("missing required column 'id'".to_string()))?;
    let x_col = find("x").ok_or_else(|| parse_err("missing required column 'x'".to_string()))?;
    let y_col = find("y").ok_or_else(|| parse_err("missing required column 'y'".to_string()))?;
    let z_col = find("z").ok_or_else(|| parse_err("missing required column 'z'".to_string()))?;
    let type_col = find("type");

    let core = [Some(id_col), Some(x_col), Some(y_col), Some(z_col), type_col];
    let extra_cols: Vec<usize> = (0..columns.len())
        .filter(|i| !core.contains(&Some(*i)))
        .collect();
    let extra_columns: Vec<String> = extra_cols.iter().map(|&i| columns[i].clone()).collect();

    let mut atoms: Vec<Atom> = Vec::with_capacity(natoms);
    let mut extras: Vec<Vec<f64>> = vec![Vec::with_capacity(natoms); extra_cols.len()];

    for n in 0..natoms {
        let line = next_line(&lines, &mut idx)
            .ok_or_else(|| parse_err(format!("expected {} atoms, found {}", natoms, n)))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != columns.len() {
            return Err(parse_err(format!(
                "atom line {} has {} fields, expected {}",
                n + 1,
                tokens.len(),
                columns.len()
            )));
        }

        let id: i64 = tokens[id_col]
            .parse()
            .map_err(|_| parse_err(format!("invalid atom id '{}'", tokens[id_col])))?;

        let type_id: i32 = match type_col {
            Some(c) => tokens[c]
                .parse()
                .map_err(|_| parse_err(format!("invalid atom type '{}'", tokens[c])))?,
            None => 1,
        };

        let mut position = [0.0f64; 3];
        for (k, &c) in [x_col, y_col, z_col].iter().enumerate() {
            position[k] = tokens[c]
                .parse()
                .map_err(|_| parse_err(format!("invalid coordinate '{}'", tokens[c])))?;
        }

        for (slot, &c) in extra_cols.iter().enumerate() {
            let value: f64 = tokens[c].parse().map_err(|_| {
                parse_err(format!(
                    "invalid value '{}' in column '{}'",
                    tokens[c], columns[c]
                ))
            })?;
            extras[slot].push(value);
        }

        atoms.push(Atom {
            id,
            type_id,
            position,
        });
    }

    Ok(Frame {
        timestep,
        bounds: BoxBounds::new(lo, hi, periodic),
        atoms,
        extra_columns,
        extras,
    })
}

/// 取下一个非空行
fn next_line<'a>(lines: &[&'a str], idx: &mut usize) -> Option<&'a str> {
    while *idx < lines.len() {
        let line = lines[*idx].trim();
        *idx += 1;
        if !line.is_empty() {
            return Some(line);
        }
    }
    None
}
