use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rank-checker")]
#[command(about = "SEO順位計測CSVの分析・スプレッドシート反映・Slack通知ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// CSVを分析してシート反映とSlack通知まで行う
    Run {
        /// 順位CSVファイル
        #[arg(required_unless_present = "dir")]
        csv: Option<PathBuf>,

        /// ダウンロードディレクトリ（最新のCSVを自動選択）
        #[arg(short, long, conflicts_with = "csv")]
        dir: Option<PathBuf>,

        /// 反映先シートファイル（JSON形式、省略時は反映スキップ）
        #[arg(short, long)]
        sheet: Option<PathBuf>,

        /// 計測日（YYYY-MM-DD、省略時は今日）
        #[arg(long)]
        date: Option<String>,

        /// グループ名（レポート見出し、省略時は設定値）
        #[arg(short, long)]
        group: Option<String>,

        /// Slack通知をスキップ
        #[arg(long)]
        no_notify: bool,
    },

    /// CSVを分析してレポートを標準出力に表示（副作用なし）
    Analyze {
        /// 順位CSVファイル
        #[arg(required = true)]
        csv: PathBuf,

        /// 計測日（YYYY-MM-DD、省略時は今日）
        #[arg(long)]
        date: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// Slack Webhook URLを設定
        #[arg(long)]
        set_webhook: Option<String>,

        /// 通知先チャンネルを設定
        #[arg(long)]
        set_channel: Option<String>,

        /// グループ名を設定
        #[arg(long)]
        set_group: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
