//! 通知メッセージの組み立て
//!
//! 分析結果から通知用のテキストを作る。副作用なし。
//! パーセンテージの丸め（小数2桁）はここで行う。

use crate::analyzer::{Analysis, RankMove};

/// 大変動リストに載せる最大件数
const TOP_MOVERS: usize = 5;

/// 分析結果をレポート文字列にする
pub fn format_report(analysis: &Analysis, date: &str, group_label: &str) -> String {
    let counts = &analysis.rank_counts;
    let percent = &analysis.rank_percent;
    let stats = &analysis.change_stats;
    let total = analysis.total;

    let mut message = String::new();
    message.push_str(&format!("順位計測結果（{}）\n", date));
    message.push_str(&format!("対象グループ：{}\n\n", group_label));

    message.push_str("■ 順位分布\n");
    message.push_str(&format!("1~3位  ：{:.2}% ({}件)\n", percent.top3, counts.top3));
    message.push_str(&format!("4~10位 ：{:.2}% ({}件)\n", percent.top10, counts.top10));
    message.push_str(&format!("11~50位：{:.2}% ({}件)\n", percent.top50, counts.top50));
    message.push_str(&format!("それ以下：{:.2}% ({}件)\n\n", percent.others, counts.others));

    let ratio = |count: usize| count as f64 / total as f64 * 100.0;
    message.push_str("■ 順位変化\n");
    message.push_str(&format!("上昇：{}件 ({:.2}%)\n", stats.improved, ratio(stats.improved)));
    message.push_str(&format!("下降：{}件 ({:.2}%)\n", stats.worsened, ratio(stats.worsened)));
    message.push_str(&format!(
        "変化なし：{}件 ({:.2}%)\n",
        stats.unchanged,
        ratio(stats.unchanged)
    ));

    if !stats.big_winners.is_empty() {
        message.push_str(&format!(
            "\n■ 大きく上昇したキーワード（{}位以上）\n",
            stats.big_move_threshold
        ));
        for mover in stats.big_winners.iter().take(TOP_MOVERS) {
            message.push_str(&mover_line(mover, '↑'));
        }
    }

    if !stats.big_losers.is_empty() {
        message.push_str(&format!(
            "\n■ 大きく下降したキーワード（{}位以上）\n",
            stats.big_move_threshold
        ));
        for mover in stats.big_losers.iter().take(TOP_MOVERS) {
            message.push_str(&mover_line(mover, '↓'));
        }
    }

    message
}

fn mover_line(mover: &RankMove, arrow: char) -> String {
    let rank = match mover.rank {
        Some(rank) => format!("{}位", rank),
        None => "圏外".to_string(),
    };
    format!(
        "・{}: {} ({}{})\n",
        mover.keyword,
        rank,
        arrow,
        mover.change.unsigned_abs()
    )
}

/// 実行失敗時の通知メッセージ
pub fn format_failure(error: &dyn std::error::Error, date: &str, group_label: &str) -> String {
    format!(
        "順位計測でエラーが発生しました（{}）\n対象グループ：{}\nエラー: {}",
        date, group_label, error
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{analyze, AnalyzeOptions};
    use crate::extractor::RankRecord;

    fn record(keyword: &str, rank: Option<u32>, change: Option<i32>) -> RankRecord {
        RankRecord {
            keyword: keyword.to_string(),
            rank,
            rank_change: change,
        }
    }

    #[test]
    fn test_report_sections() {
        let records = vec![
            record("a", Some(2), Some(4)),
            record("b", Some(15), Some(-5)),
            record("c", Some(100), Some(0)),
        ];
        let analysis = analyze(&records, &AnalyzeOptions::default()).unwrap();

        let report = format_report(&analysis, "2026-08-26", "テストグループ");

        assert!(report.contains("順位計測結果（2026-08-26）"));
        assert!(report.contains("対象グループ：テストグループ"));
        assert!(report.contains("1~3位  ：33.33% (1件)"));
        assert!(report.contains("4~10位 ：0.00% (0件)"));
        assert!(report.contains("11~50位：33.33% (1件)"));
        assert!(report.contains("それ以下：33.33% (1件)"));
        assert!(report.contains("上昇：1件 (33.33%)"));
        assert!(report.contains("・a: 2位 (↑4)"));
        assert!(report.contains("・b: 15位 (↓5)"));
    }

    #[test]
    fn test_report_omits_empty_mover_sections() {
        let records = vec![record("a", Some(2), Some(1))];
        let analysis = analyze(&records, &AnalyzeOptions::default()).unwrap();

        let report = format_report(&analysis, "2026-08-26", "g");

        assert!(!report.contains("大きく上昇"));
        assert!(!report.contains("大きく下降"));
    }

    #[test]
    fn test_report_truncates_to_top_five() {
        let records: Vec<RankRecord> = (1..=8)
            .map(|i| record(&format!("kw{}", i), Some(i), Some(i as i32 + 2)))
            .collect();
        let analysis = analyze(&records, &AnalyzeOptions::default()).unwrap();
        assert_eq!(analysis.change_stats.big_winners.len(), 8);

        let report = format_report(&analysis, "2026-08-26", "g");

        let lines = report.lines().filter(|l| l.starts_with('・')).count();
        assert_eq!(lines, 5);
        // 上昇幅の大きい順なので先頭はkw8
        assert!(report.contains("・kw8:"));
        assert!(!report.contains("・kw3:"));
    }

    #[test]
    fn test_report_is_deterministic() {
        let records = vec![record("a", Some(1), Some(3)), record("b", None, Some(-4))];
        let analysis = analyze(&records, &AnalyzeOptions::default()).unwrap();

        let first = format_report(&analysis, "2026-08-26", "g");
        let second = format_report(&analysis, "2026-08-26", "g");
        assert_eq!(first, second);
        assert!(first.contains("・b: 圏外 (↓4)"));
    }
}
