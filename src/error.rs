use crate::sheets::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankCheckerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("CSVファイルが見つかりません: {0}")]
    CsvNotFound(String),

    #[error("CSV読み込みエラー: {0}")]
    Decode(String),

    #[error("{0}の列が見つかりませんでした。列名: {1:?}")]
    MissingColumn(&'static str, Vec<String>),

    #[error("分析対象のレコードがありません")]
    EmptyInput,

    #[error("スプレッドシート反映エラー: {0}")]
    Reconciliation(#[from] TransportError),

    #[error("Slack通知エラー: {0}")]
    Notify(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RankCheckerError>;
