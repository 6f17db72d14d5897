//! スプレッドシート連携
//!
//! 実際のバックエンドRPCは`SpreadsheetHandle`の向こう側にある外部機能。
//! 反映処理（reconcile）はこのトレイトに対してのみ書かれており、
//! テストや手元実行では`MemorySheet`/`FileSheet`を使う。

mod memory;
mod reconcile;

pub use memory::{FileSheet, MemorySheet};
pub use reconcile::{reconcile, ReconcileOptions, ReconcileOutcome};

use thiserror::Error;

/// スプレッドシート通信の失敗。反映処理はこれをそのまま上に返す
#[derive(Error, Debug)]
#[error("スプレッドシート通信エラー: {0}")]
pub struct TransportError(pub String);

/// セル値の2次元グリッド。行1がヘッダー
pub type Grid = Vec<Vec<String>>;

/// 読み書き対象の範囲（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRef {
    /// 単一セル
    Cell { row: usize, col: usize },
    /// 1列全体
    Column(usize),
    /// シート全体
    All,
}

impl std::fmt::Display for RangeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeRef::Cell { row, col } => write!(f, "{}{}", column_label(*col), row + 1),
            RangeRef::Column(col) => {
                let label = column_label(*col);
                write!(f, "{}:{}", label, label)
            }
            RangeRef::All => write!(f, "A1:ZZ"),
        }
    }
}

/// 列番号をA1表記の列名にする（0 → A, 26 → AA）
fn column_label(mut col: usize) -> String {
    let mut label = String::new();
    loop {
        label.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    label
}

/// 外部スプレッドシート機能の境界
///
/// すべての操作は失敗しうる。部分コミットは仮定できないため、
/// 呼び出し側は失敗時に処理全体を中断する。
pub trait SpreadsheetHandle {
    fn read_range(&self, range: RangeRef) -> Result<Grid, TransportError>;

    fn write_range(&mut self, range: RangeRef, values: Grid) -> Result<(), TransportError>;

    /// `index`の位置に空列を1本挿入する（既存列は右へずれる）
    fn insert_column(&mut self, index: usize) -> Result<(), TransportError>;

    /// 最終データ行の直後に行を追加する
    fn append_rows(&mut self, range: RangeRef, rows: Grid) -> Result<(), TransportError>;

    /// 複数範囲への書き込みを1回のバッチで行う
    fn batch_write(&mut self, writes: Vec<(RangeRef, Grid)>) -> Result<(), TransportError>;
}
