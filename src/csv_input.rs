//! ダウンロード済みCSVの読み込み
//!
//! ダウンロードディレクトリから最新のCSVを探し、列名→値の
//! 生レコード列にデコードする。列の意味付けはextractorが行う。

use crate::error::{RankCheckerError, Result};
use crate::extractor::RawRecord;
use std::path::{Path, PathBuf};

/// ディレクトリ直下で最も新しいCSVファイルを返す
pub fn find_latest_csv(dir: &Path) -> Result<PathBuf> {
    let mut latest: Option<(PathBuf, std::time::SystemTime)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !path.is_file() || !is_csv {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if latest.as_ref().is_none_or(|(_, time)| modified > *time) {
            latest = Some((path, modified));
        }
    }

    latest
        .map(|(path, _)| path)
        .ok_or_else(|| RankCheckerError::CsvNotFound(dir.display().to_string()))
}

/// CSVファイルを生レコード列にデコードする
///
/// 空行はスキップ、値は前後の空白を落とす。
pub fn read_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| RankCheckerError::Decode(format!("{}: {}", path.display(), e)))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| RankCheckerError::Decode(format!("{}: {}", path.display(), e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result
            .map_err(|e| RankCheckerError::Decode(format!("{}: {}", path.display(), e)))?;

        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        if !record.is_empty() {
            records.push(record);
        }
    }

    Ok(records)
}
