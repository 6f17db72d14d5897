//! 日次データのスプレッドシート反映
//!
//! シートはA列がキーワード、B列が常に最新日のデータ列。日付が
//! 変わるたびにB列の位置へ新しい列を挿入し、過去の列は右へ
//! 押し出されて時系列順に残る。
//!
//! ## 手順
//! 1. ヘッダーの確認・作成（冪等）
//! 2. A列からキーワード→行番号の対応を作る
//! 3. B1が今日の日付なら反映済みとして何もしない
//! 4. B列が使用中なら左に新列を挿入し、B1に日付を書く
//! 5. 既存キーワードはバッチ更新、新規キーワードは一括追加

use super::{Grid, RangeRef, SpreadsheetHandle};
use crate::error::Result;
use crate::extractor::RankRecord;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// A1に置くヘッダーラベル
    pub keyword_header: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            keyword_header: "キーワード".into(),
        }
    }
}

/// 反映結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// falseなら同日の再実行でシートは変更されていない
    pub updated: bool,
    /// 追加した新規キーワード行数
    pub new_rows: usize,
    /// 更新した既存キーワード行数
    pub updated_rows: usize,
}

impl ReconcileOutcome {
    fn no_op() -> Self {
        Self {
            updated: false,
            new_rows: 0,
            updated_rows: 0,
        }
    }
}

/// 順位レコードをシートに反映する
///
/// 通信エラーはその時点で処理全体を中断して返す。同一バッチ内の
/// 重複キーワードは後勝ち。
pub fn reconcile(
    records: &[RankRecord],
    sheet: &mut dyn SpreadsheetHandle,
    date: &str,
    options: &ReconcileOptions,
) -> Result<ReconcileOutcome> {
    let mut grid = sheet.read_range(RangeRef::All)?;

    // ヘッダーがなければ作って読み直す（既にあれば何もしない）
    let has_header = grid
        .first()
        .and_then(|row| row.first())
        .is_some_and(|cell| cell == &options.keyword_header);
    if !has_header {
        sheet.write_range(
            RangeRef::Cell { row: 0, col: 0 },
            vec![vec![options.keyword_header.clone()]],
        )?;
        grid = sheet.read_range(RangeRef::All)?;
    }

    // キーワード→行番号（0始まり、ヘッダー行はスキップ）
    let mut keyword_rows: HashMap<&str, usize> = HashMap::new();
    for (index, row) in grid.iter().enumerate().skip(1) {
        if let Some(keyword) = row.first().filter(|k| !k.is_empty()) {
            keyword_rows.insert(keyword.as_str(), index);
        }
    }

    // B1が今日の日付なら反映済み
    let date_cell = grid.first().and_then(|row| row.get(1));
    if date_cell.is_some_and(|cell| cell == date) {
        return Ok(ReconcileOutcome::no_op());
    }

    // B列にデータがあれば、その左へ新しい列を挿入する
    let b_column_occupied = grid.iter().any(|row| row.get(1).is_some_and(|c| !c.is_empty()));
    if b_column_occupied {
        sheet.insert_column(1)?;
    }
    sheet.write_range(RangeRef::Cell { row: 0, col: 1 }, vec![vec![date.to_string()]])?;

    // 既存キーワードの更新と新規キーワードの追加に振り分ける
    let mut writes: Vec<(RangeRef, Grid)> = Vec::new();
    let mut updated_rows: HashSet<usize> = HashSet::new();
    let mut new_rows: Vec<Vec<String>> = Vec::new();
    let mut new_row_index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let rank = rank_cell(record.rank);

        if let Some(&row) = keyword_rows.get(record.keyword.as_str()) {
            writes.push((RangeRef::Cell { row, col: 1 }, vec![vec![rank]]));
            updated_rows.insert(row);
        } else if let Some(&index) = new_row_index.get(&record.keyword) {
            // バッチ内重複は追加済み行の値を上書き
            new_rows[index][1] = rank;
        } else {
            new_row_index.insert(record.keyword.clone(), new_rows.len());
            new_rows.push(vec![record.keyword.clone(), rank]);
        }
    }

    if !writes.is_empty() {
        sheet.batch_write(writes)?;
    }
    if !new_rows.is_empty() {
        sheet.append_rows(RangeRef::All, new_rows.clone())?;
    }

    Ok(ReconcileOutcome {
        updated: true,
        new_rows: new_rows.len(),
        updated_rows: updated_rows.len(),
    })
}

fn rank_cell(rank: Option<u32>) -> String {
    match rank {
        Some(rank) => rank.to_string(),
        None => "-".into(),
    }
}
