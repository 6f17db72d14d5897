//! 実行パイプライン
//!
//! 抽出 → 分析 → （シート反映）→ レポート作成の順で流す。
//! 抽出・分析の失敗は致命的。シート反映の失敗はレポート作成と
//! 通知を妨げず、結果に記録して呼び出し側へ渡す。

use crate::analyzer::{self, AnalyzeOptions, Analysis};
use crate::config::Config;
use crate::error::{RankCheckerError, Result};
use crate::extractor::{self, RawRecord};
use crate::report;
use crate::sheets::{reconcile, ReconcileOptions, ReconcileOutcome, SpreadsheetHandle};

/// 1回分の実行結果
#[derive(Debug)]
pub struct RunOutcome {
    pub analysis: Analysis,
    pub report: String,
    /// シート反映の結果。ハンドル未指定ならNone
    pub reconcile: Option<ReconcileOutcome>,
    /// 反映が失敗した場合のエラー（実行自体は続行済み）
    pub reconcile_error: Option<RankCheckerError>,
}

/// 生レコードから分析・反映・レポート作成まで行う
pub fn run_analysis(
    raw_records: &[RawRecord],
    date: &str,
    config: &Config,
    sheet: Option<&mut dyn SpreadsheetHandle>,
) -> Result<RunOutcome> {
    let records = extractor::extract(raw_records)?;

    let options = AnalyzeOptions {
        sign_convention: config.sign_convention,
        big_move_threshold: config.big_move_threshold,
    };
    let analysis = analyzer::analyze(&records, &options)?;

    let (reconcile_outcome, reconcile_error) = match sheet {
        Some(sheet) => {
            let options = ReconcileOptions {
                keyword_header: config.keyword_header.clone(),
            };
            match reconcile(&records, sheet, date, &options) {
                Ok(outcome) => (Some(outcome), None),
                Err(e) => (None, Some(e)),
            }
        }
        None => (None, None),
    };

    let report = report::format_report(&analysis, date, &config.group_label);

    Ok(RunOutcome {
        analysis,
        report,
        reconcile: reconcile_outcome,
        reconcile_error,
    })
}
