//! CSV読み込みから反映・レポートまでの一気通貫テスト

use rank_checker_rust::config::Config;
use rank_checker_rust::csv_input;
use rank_checker_rust::error::RankCheckerError;
use rank_checker_rust::runner::run_analysis;
use rank_checker_rust::sheets::MemorySheet;
use std::io::Write;
use tempfile::tempdir;

fn write_csv(path: &std::path::Path, content: &str) {
    let mut file = std::fs::File::create(path).expect("CSVファイルの作成に失敗");
    file.write_all(content.as_bytes()).expect("CSVの書き込みに失敗");
}

#[test]
fn test_full_pipeline_from_csv() {
    let dir = tempdir().expect("一時ディレクトリの作成に失敗");
    let path = dir.path().join("export.csv");
    write_csv(
        &path,
        "検索キーワード,G順位,変動\n\
         プログラミング教室 東京,2,+4\n\
         子供 習い事 ランキング,8,0\n\
         ロボット教室 比較,23,-5\n\
         オンライン 学習,圏外,\n",
    );

    let raw_records = csv_input::read_raw_records(&path).unwrap();
    assert_eq!(raw_records.len(), 4);

    let config = Config::default();
    let mut sheet = MemorySheet::new();
    let outcome =
        run_analysis(&raw_records, "2026-08-26", &config, Some(&mut sheet)).unwrap();

    // 分析
    assert_eq!(outcome.analysis.total, 4);
    assert_eq!(outcome.analysis.rank_counts.top3, 1);
    assert_eq!(outcome.analysis.rank_counts.top10, 1);
    assert_eq!(outcome.analysis.rank_counts.top50, 1);
    assert_eq!(outcome.analysis.rank_counts.others, 1);
    assert_eq!(outcome.analysis.change_stats.big_winners.len(), 1);
    assert_eq!(outcome.analysis.change_stats.big_losers.len(), 1);

    // 反映
    let reconcile = outcome.reconcile.expect("反映結果がない");
    assert!(reconcile.updated);
    assert_eq!(reconcile.new_rows, 4);
    assert_eq!(sheet.cell(0, 1), "2026-08-26");
    assert_eq!(sheet.cell(1, 0), "プログラミング教室 東京");
    assert_eq!(sheet.cell(4, 1), "-");

    // レポート
    assert!(outcome.report.contains("1~3位  ：25.00% (1件)"));
    assert!(outcome.report.contains("・プログラミング教室 東京: 2位 (↑4)"));
    assert!(outcome.report.contains("・ロボット教室 比較: 23位 (↓5)"));
}

#[test]
fn test_pipeline_rejects_header_only_csv() {
    let dir = tempdir().expect("一時ディレクトリの作成に失敗");
    let path = dir.path().join("empty.csv");
    write_csv(&path, "検索キーワード,G順位\n");

    let raw_records = csv_input::read_raw_records(&path).unwrap();
    assert!(raw_records.is_empty());

    let err = run_analysis(&raw_records, "2026-08-26", &Config::default(), None).unwrap_err();
    assert!(matches!(err, RankCheckerError::EmptyInput));
}

#[test]
fn test_pipeline_with_unknown_headers() {
    // 既知の列名が一切なくてもサンプリングで順位列を見つける
    let dir = tempdir().expect("一時ディレクトリの作成に失敗");
    let path = dir.path().join("odd.csv");

    let mut content = String::from("語句,計測結果\n");
    for i in 1..=10 {
        content.push_str(&format!("kw{},{}\n", i, i * 5));
    }
    write_csv(&path, &content);

    let raw_records = csv_input::read_raw_records(&path).unwrap();
    let outcome = run_analysis(&raw_records, "2026-08-26", &Config::default(), None).unwrap();

    assert_eq!(outcome.analysis.total, 10);
    assert_eq!(outcome.analysis.rank_counts.top10, 2); // 5位と10位
}
