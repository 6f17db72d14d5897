//! ローカル実装のスプレッドシート
//!
//! `MemorySheet`はテストとドライラン用。`FileSheet`はグリッドを
//! JSONファイルとして永続化し、リモートバックエンドを繋がない
//! 手元実行で履歴列を積み上げるために使う。

use super::{Grid, RangeRef, SpreadsheetHandle, TransportError};
use std::path::{Path, PathBuf};

/// メモリ上のグリッド
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    grid: Grid,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_grid(grid: Grid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.grid
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// ヘッダー行を除いたデータ行数
    pub fn data_rows(&self) -> usize {
        self.grid.len().saturating_sub(1)
    }

    fn set_cell(&mut self, row: usize, col: usize, value: String) {
        if self.grid.len() <= row {
            self.grid.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.grid[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value;
    }
}

impl SpreadsheetHandle for MemorySheet {
    fn read_range(&self, range: RangeRef) -> Result<Grid, TransportError> {
        let grid = match range {
            RangeRef::All => self.grid.clone(),
            RangeRef::Cell { row, col } => vec![vec![self.cell(row, col).to_string()]],
            RangeRef::Column(col) => self
                .grid
                .iter()
                .map(|row| vec![row.get(col).cloned().unwrap_or_default()])
                .collect(),
        };
        Ok(grid)
    }

    fn write_range(&mut self, range: RangeRef, values: Grid) -> Result<(), TransportError> {
        let (start_row, start_col) = match range {
            RangeRef::Cell { row, col } => (row, col),
            RangeRef::Column(col) => (0, col),
            RangeRef::All => (0, 0),
        };

        for (r, row) in values.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                self.set_cell(start_row + r, start_col + c, value);
            }
        }
        Ok(())
    }

    fn insert_column(&mut self, index: usize) -> Result<(), TransportError> {
        for row in &mut self.grid {
            if row.len() > index {
                row.insert(index, String::new());
            }
        }
        Ok(())
    }

    fn append_rows(&mut self, _range: RangeRef, rows: Grid) -> Result<(), TransportError> {
        self.grid.extend(rows);
        Ok(())
    }

    fn batch_write(&mut self, writes: Vec<(RangeRef, Grid)>) -> Result<(), TransportError> {
        for (range, values) in writes {
            self.write_range(range, values)?;
        }
        Ok(())
    }
}

/// JSONファイルに永続化するグリッド
///
/// 読み書きはメモリ上で行い、`save`でまとめて書き出す。
/// 反映処理が失敗した場合は保存しないことで中途半端な状態を残さない。
#[derive(Debug)]
pub struct FileSheet {
    path: PathBuf,
    sheet: MemorySheet,
}

impl FileSheet {
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let sheet = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| TransportError(format!("{}: {}", path.display(), e)))?;
            let grid: Grid = serde_json::from_str(&content)
                .map_err(|e| TransportError(format!("{}: {}", path.display(), e)))?;
            MemorySheet::from_grid(grid)
        } else {
            MemorySheet::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            sheet,
        })
    }

    pub fn save(&self) -> Result<(), TransportError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TransportError(format!("{}: {}", parent.display(), e)))?;
        }

        let content = serde_json::to_string_pretty(self.sheet.grid())
            .map_err(|e| TransportError(e.to_string()))?;
        std::fs::write(&self.path, content)
            .map_err(|e| TransportError(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }

    pub fn sheet(&self) -> &MemorySheet {
        &self.sheet
    }
}

impl SpreadsheetHandle for FileSheet {
    fn read_range(&self, range: RangeRef) -> Result<Grid, TransportError> {
        self.sheet.read_range(range)
    }

    fn write_range(&mut self, range: RangeRef, values: Grid) -> Result<(), TransportError> {
        self.sheet.write_range(range, values)
    }

    fn insert_column(&mut self, index: usize) -> Result<(), TransportError> {
        self.sheet.insert_column(index)
    }

    fn append_rows(&mut self, range: RangeRef, rows: Grid) -> Result<(), TransportError> {
        self.sheet.append_rows(range, rows)
    }

    fn batch_write(&mut self, writes: Vec<(RangeRef, Grid)>) -> Result<(), TransportError> {
        self.sheet.batch_write(writes)
    }
}
