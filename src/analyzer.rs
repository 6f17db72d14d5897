//! 順位データの分析
//!
//! 各キーワードを順位帯に分類し、順位変化の統計をまとめる。
//! パーセンテージはここでは丸めず、表示時にフォーマッタが丸める。

use crate::error::{RankCheckerError, Result};
use crate::extractor::RankRecord;
use serde::{Deserialize, Serialize};

/// 順位帯。全順位（圏外含む）を重複なく網羅する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankBucket {
    /// 1〜3位
    Top3,
    /// 4〜10位
    Top10,
    /// 11〜50位
    Top50,
    /// 51位以下と圏外
    Others,
}

impl RankBucket {
    pub const ALL: [RankBucket; 4] = [
        RankBucket::Top3,
        RankBucket::Top10,
        RankBucket::Top50,
        RankBucket::Others,
    ];

    pub fn for_rank(rank: Option<u32>) -> Self {
        match rank {
            Some(1..=3) => RankBucket::Top3,
            Some(4..=10) => RankBucket::Top10,
            Some(11..=50) => RankBucket::Top50,
            _ => RankBucket::Others,
        }
    }
}

impl std::fmt::Display for RankBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankBucket::Top3 => write!(f, "1-3"),
            RankBucket::Top10 => write!(f, "4-10"),
            RankBucket::Top50 => write!(f, "11-50"),
            RankBucket::Others => write!(f, "others"),
        }
    }
}

/// 順位変化の符号の解釈
///
/// 計測元のCSVは正の値が順位上昇を表すため、それをデフォルトにする。
/// 符号が逆のエクスポートに切り替える場合も、変化数の集計と
/// 大変動キーワードの判定の両方に同じ解釈が適用される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// 正の値 = 順位上昇
    #[default]
    PositiveIsImprovement,
    /// 負の値 = 順位上昇
    NegativeIsImprovement,
}

impl SignConvention {
    /// 生の変化量を「上昇分」に揃える（正 = 上昇）
    pub fn improvement(&self, change: i32) -> i32 {
        match self {
            SignConvention::PositiveIsImprovement => change,
            SignConvention::NegativeIsImprovement => -change,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub sign_convention: SignConvention,
    /// 大変動とみなす変化量の閾値
    pub big_move_threshold: u32,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            sign_convention: SignConvention::default(),
            big_move_threshold: 3,
        }
    }
}

/// 順位帯ごとの件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankCounts {
    pub top3: usize,
    pub top10: usize,
    pub top50: usize,
    pub others: usize,
}

impl RankCounts {
    pub fn get(&self, bucket: RankBucket) -> usize {
        match bucket {
            RankBucket::Top3 => self.top3,
            RankBucket::Top10 => self.top10,
            RankBucket::Top50 => self.top50,
            RankBucket::Others => self.others,
        }
    }

    fn increment(&mut self, bucket: RankBucket) {
        match bucket {
            RankBucket::Top3 => self.top3 += 1,
            RankBucket::Top10 => self.top10 += 1,
            RankBucket::Top50 => self.top50 += 1,
            RankBucket::Others => self.others += 1,
        }
    }

    pub fn sum(&self) -> usize {
        self.top3 + self.top10 + self.top50 + self.others
    }
}

/// 順位帯ごとの割合（count / total * 100）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankPercent {
    pub top3: f64,
    pub top10: f64,
    pub top50: f64,
    pub others: f64,
}

impl RankPercent {
    pub fn get(&self, bucket: RankBucket) -> f64 {
        match bucket {
            RankBucket::Top3 => self.top3,
            RankBucket::Top10 => self.top10,
            RankBucket::Top50 => self.top50,
            RankBucket::Others => self.others,
        }
    }

    pub fn sum(&self) -> f64 {
        self.top3 + self.top10 + self.top50 + self.others
    }
}

/// 大きく順位が動いたキーワード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankMove {
    pub keyword: String,
    pub rank: Option<u32>,
    /// 生の変化量（符号はCSVのまま）
    pub change: i32,
}

/// 順位変化の統計
#[derive(Debug, Clone, Default)]
pub struct ChangeStats {
    pub improved: usize,
    pub worsened: usize,
    pub unchanged: usize,
    /// 閾値以上に上昇したキーワード。上昇幅の大きい順
    pub big_winners: Vec<RankMove>,
    /// 閾値以上に下降したキーワード。下降幅の大きい順
    pub big_losers: Vec<RankMove>,
    /// 判定に使った閾値
    pub big_move_threshold: u32,
}

/// 分析結果
#[derive(Debug, Clone)]
pub struct Analysis {
    pub rank_counts: RankCounts,
    pub rank_percent: RankPercent,
    pub change_stats: ChangeStats,
    pub total: usize,
}

/// 順位レコード列を1パスで集計する
///
/// 空の入力は`EmptyInput`として弾く（ゼロ除算をNaNで誤魔化さない）。
pub fn analyze(records: &[RankRecord], options: &AnalyzeOptions) -> Result<Analysis> {
    if records.is_empty() {
        return Err(RankCheckerError::EmptyInput);
    }

    let mut rank_counts = RankCounts::default();
    let mut change_stats = ChangeStats {
        big_move_threshold: options.big_move_threshold,
        ..ChangeStats::default()
    };
    let threshold = options.big_move_threshold as i32;

    for record in records {
        rank_counts.increment(RankBucket::for_rank(record.rank));

        // 変動列を持つレコードだけが変化統計に参加する
        let Some(change) = record.rank_change else {
            continue;
        };

        let improvement = options.sign_convention.improvement(change);
        let rank_move = RankMove {
            keyword: record.keyword.clone(),
            rank: record.rank,
            change,
        };

        if improvement > 0 {
            change_stats.improved += 1;
            if improvement >= threshold {
                change_stats.big_winners.push(rank_move);
            }
        } else if improvement < 0 {
            change_stats.worsened += 1;
            if -improvement >= threshold {
                change_stats.big_losers.push(rank_move);
            }
        } else {
            change_stats.unchanged += 1;
        }
    }

    let convention = options.sign_convention;
    change_stats
        .big_winners
        .sort_by_key(|m| std::cmp::Reverse(convention.improvement(m.change)));
    change_stats
        .big_losers
        .sort_by_key(|m| convention.improvement(m.change));

    let total = records.len();
    let percent = |count: usize| count as f64 / total as f64 * 100.0;
    let rank_percent = RankPercent {
        top3: percent(rank_counts.top3),
        top10: percent(rank_counts.top10),
        top50: percent(rank_counts.top50),
        others: percent(rank_counts.others),
    };

    Ok(Analysis {
        rank_counts,
        rank_percent,
        change_stats,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(keyword: &str, rank: Option<u32>, change: Option<i32>) -> RankRecord {
        RankRecord {
            keyword: keyword.to_string(),
            rank,
            rank_change: change,
        }
    }

    #[test]
    fn test_bucket_partition() {
        assert_eq!(RankBucket::for_rank(Some(1)), RankBucket::Top3);
        assert_eq!(RankBucket::for_rank(Some(3)), RankBucket::Top3);
        assert_eq!(RankBucket::for_rank(Some(4)), RankBucket::Top10);
        assert_eq!(RankBucket::for_rank(Some(10)), RankBucket::Top10);
        assert_eq!(RankBucket::for_rank(Some(11)), RankBucket::Top50);
        assert_eq!(RankBucket::for_rank(Some(50)), RankBucket::Top50);
        assert_eq!(RankBucket::for_rank(Some(51)), RankBucket::Others);
        assert_eq!(RankBucket::for_rank(None), RankBucket::Others);
    }

    #[test]
    fn test_every_rank_maps_to_one_bucket() {
        for rank in 1..=200u32 {
            let bucket = RankBucket::for_rank(Some(rank));
            let matches = RankBucket::ALL
                .iter()
                .filter(|b| **b == bucket)
                .count();
            assert_eq!(matches, 1, "{}位が複数の順位帯に入っている", rank);
        }
    }

    #[test]
    fn test_analyze_example_distribution() {
        let records = vec![
            record("a", Some(2), None),
            record("b", Some(15), None),
            record("c", Some(100), None),
        ];

        let analysis = analyze(&records, &AnalyzeOptions::default()).unwrap();
        assert_eq!(analysis.total, 3);
        assert_eq!(analysis.rank_counts.top3, 1);
        assert_eq!(analysis.rank_counts.top10, 0);
        assert_eq!(analysis.rank_counts.top50, 1);
        assert_eq!(analysis.rank_counts.others, 1);
        assert!((analysis.rank_percent.top3 - 100.0 / 3.0).abs() < 1e-9);
        assert!((analysis.rank_percent.sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_counts_sum_to_total() {
        let records: Vec<RankRecord> = (1..=77)
            .map(|i| record(&format!("kw{}", i), Some(i * 2), None))
            .collect();

        let analysis = analyze(&records, &AnalyzeOptions::default()).unwrap();
        assert_eq!(analysis.rank_counts.sum(), analysis.total);
        assert_eq!(analysis.total, records.len());
        assert!((analysis.rank_percent.sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_classification() {
        let records = vec![
            record("up_small", Some(5), Some(1)),
            record("up_big", Some(2), Some(4)),
            record("down_big", Some(30), Some(-6)),
            record("flat", Some(8), Some(0)),
            record("no_change_col", Some(9), None),
        ];

        let analysis = analyze(&records, &AnalyzeOptions::default()).unwrap();
        let stats = &analysis.change_stats;
        assert_eq!(stats.improved, 2);
        assert_eq!(stats.worsened, 1);
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.big_winners.len(), 1);
        assert_eq!(stats.big_winners[0].keyword, "up_big");
        assert_eq!(stats.big_losers.len(), 1);
        assert_eq!(stats.big_losers[0].keyword, "down_big");
    }

    #[test]
    fn test_negative_convention() {
        // 負の値 = 上昇の解釈では -5 は大幅上昇になる
        let records = vec![record("kw", Some(3), Some(-5))];
        let options = AnalyzeOptions {
            sign_convention: SignConvention::NegativeIsImprovement,
            ..AnalyzeOptions::default()
        };

        let analysis = analyze(&records, &options).unwrap();
        assert_eq!(analysis.change_stats.improved, 1);
        assert_eq!(analysis.change_stats.worsened, 0);
        assert_eq!(analysis.change_stats.big_winners.len(), 1);
        assert_eq!(analysis.change_stats.big_winners[0].change, -5);
    }

    #[test]
    fn test_big_movers_sorted_by_magnitude() {
        let records = vec![
            record("w1", Some(10), Some(3)),
            record("w2", Some(4), Some(8)),
            record("l1", Some(40), Some(-7)),
            record("l2", Some(35), Some(-3)),
        ];

        let analysis = analyze(&records, &AnalyzeOptions::default()).unwrap();
        let winners: Vec<&str> = analysis
            .change_stats
            .big_winners
            .iter()
            .map(|m| m.keyword.as_str())
            .collect();
        let losers: Vec<&str> = analysis
            .change_stats
            .big_losers
            .iter()
            .map(|m| m.keyword.as_str())
            .collect();
        assert_eq!(winners, vec!["w2", "w1"]);
        assert_eq!(losers, vec!["l1", "l2"]);
    }

    #[test]
    fn test_analyze_empty_is_error() {
        let err = analyze(&[], &AnalyzeOptions::default()).unwrap_err();
        assert!(matches!(err, RankCheckerError::EmptyInput));
    }
}
