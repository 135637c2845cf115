//! # 帧目录编排
//!
//! 枚举 dump 目录下的帧文件并按自然顺序排序：文件名拆成
//! 数字段与文本段交替的序列，数字段按数值比较，文本段忽略
//! 大小写比较，因此 frame_2 排在 frame_10 之前。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 调用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `glob` 过滤文件名
//! - 使用 `regex` 切分数字段

use crate::error::{DislokitError, Result};

use std::cmp::Ordering;
use std::path::Path;
use walkdir::WalkDir;

/// 列出目录下匹配模式的帧文件名，按自然顺序排序
///
/// 只收集第一层的常规文件，子目录忽略。目录为空返回空列表，
/// 目录不可读或不存在返回 `CatalogError`。
pub fn list_frames(dir: &Path, pattern: &str) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(DislokitError::CatalogError {
            path: dir.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }

    let glob_pattern = glob::Pattern::new(pattern).map_err(|e| {
        DislokitError::InvalidArgument(format!("Invalid pattern '{}': {}", pattern, e))
    })?;

    let mut names: Vec<String> = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1).into_iter() {
        let entry = entry.map_err(|e| DislokitError::CatalogError {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if glob_pattern.matches(name) {
                names.push(name.to_string());
            }
        }
    }

    names.sort_by(|a, b| natural_cmp(a, b));
    Ok(names)
}

/// 文件名自然排序比较
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ta = tokenize(a);
    let tb = tokenize(b);

    for (x, y) in ta.iter().zip(tb.iter()) {
        let ord = match (x, y) {
            (NaturalToken::Number(nx), NaturalToken::Number(ny)) => cmp_digits(nx, ny),
            (NaturalToken::Text(sx), NaturalToken::Text(sy)) => sx.cmp(sy),
            (NaturalToken::Number(_), NaturalToken::Text(_)) => Ordering::Less,
            (NaturalToken::Text(_), NaturalToken::Number(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    // 自然键相同（如 dump_007 与 dump_7）时退回字节序，保证全序
    ta.len().cmp(&tb.len()).then_with(|| a.cmp(b))
}

/// 自然排序的切分单元
#[derive(Debug, PartialEq, Eq)]
enum NaturalToken {
    /// 文本段，已转小写
    Text(String),
    /// 数字段，保留原始数字串
    Number(String),
}

/// 把文件名切分为文本段与数字段交替的序列（首尾总是文本段，可为空）
fn tokenize(name: &str) -> Vec<NaturalToken> {
    use regex::Regex;

    let digits = Regex::new(r"\d+").unwrap();
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in digits.find_iter(name) {
        tokens.push(NaturalToken::Text(name[last..m.start()].to_lowercase()));
        tokens.push(NaturalToken::Number(name[m.start()..m.end()].to_string()));
        last = m.end();
    }
    tokens.push(NaturalToken::Text(name[last..].to_lowercase()));
    tokens
}

/// 数字串按数值比较（去前导零后先比长度再比字典序）
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
