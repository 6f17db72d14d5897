use crate::analyzer::SignConvention;
use crate::error::{RankCheckerError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 計測対象のグループ名（レポート見出しに使用）
    pub group_label: String,
    /// A1に置くキーワード列のヘッダーラベル
    pub keyword_header: String,
    /// 大変動とみなす順位変化の閾値
    pub big_move_threshold: u32,
    /// 順位変化の符号の解釈
    pub sign_convention: SignConvention,
    /// Slack Incoming Webhook URL（未設定なら通知スキップ）
    pub slack_webhook_url: Option<String>,
    /// 通知先チャンネル
    pub slack_channel: Option<String>,
    /// 通知時の表示ユーザー名
    pub slack_username: String,
    /// 通知時のアイコン絵文字
    pub slack_icon_emoji: String,
    /// スレッドに投稿する場合のタイムスタンプ
    pub slack_thread_ts: Option<String>,
    /// スレッド投稿時にチャンネルにも流す
    pub slack_broadcast_to_channel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            group_label: "DM_SとAランクキーワード".into(),
            keyword_header: "キーワード".into(),
            big_move_threshold: 3,
            sign_convention: SignConvention::default(),
            slack_webhook_url: None,
            slack_channel: None,
            slack_username: "順位チェッカー自動通知".into(),
            slack_icon_emoji: ":chart_with_upwards_trend:".into(),
            slack_thread_ts: None,
            slack_broadcast_to_channel: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        // 環境変数の解決はここだけで行う。各コンポーネントはConfigを受け取る
        if let Ok(url) = std::env::var("RANK_CHECKER_SLACK_WEBHOOK_URL") {
            if !url.is_empty() {
                config.slack_webhook_url = Some(url);
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RankCheckerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("rank-checker").join("config.json"))
    }
}
