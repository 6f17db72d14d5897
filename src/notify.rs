//! Slack通知
//!
//! Incoming Webhookへのベストエフォート送信。分析・反映が成功して
//! いれば、ここでの失敗が実行全体を失敗にすることはない（呼び出し
//! 側がログに残して続行する）。

use crate::config::Config;
use crate::error::{RankCheckerError, Result};
use serde::Serialize;

#[derive(Serialize)]
struct SlackPayload<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_emoji: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_broadcast: Option<bool>,
}

/// Webhook経由の通知クライアント
pub struct SlackNotifier {
    webhook_url: String,
    channel: Option<String>,
    username: String,
    icon_emoji: String,
    thread_ts: Option<String>,
    broadcast_to_channel: bool,
    client: reqwest::Client,
}

impl SlackNotifier {
    /// Webhook URLが設定されていなければNone（通知はスキップされる）
    pub fn from_config(config: &Config) -> Option<Self> {
        let webhook_url = config.slack_webhook_url.clone()?;

        Some(Self {
            webhook_url,
            channel: config.slack_channel.clone(),
            username: config.slack_username.clone(),
            icon_emoji: config.slack_icon_emoji.clone(),
            thread_ts: config.slack_thread_ts.clone(),
            broadcast_to_channel: config.slack_broadcast_to_channel,
            client: reqwest::Client::new(),
        })
    }

    /// メッセージを送信する。成功でtrue
    pub async fn send(&self, message: &str) -> Result<bool> {
        // reply_broadcastはスレッド投稿のときだけ意味を持つ
        let reply_broadcast = self
            .thread_ts
            .as_ref()
            .map(|_| self.broadcast_to_channel)
            .filter(|b| *b);

        let payload = SlackPayload {
            text: message,
            channel: self.channel.as_deref(),
            username: Some(&self.username),
            icon_emoji: Some(&self.icon_emoji),
            thread_ts: self.thread_ts.as_deref(),
            reply_broadcast,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RankCheckerError::Notify(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RankCheckerError::Notify(format!(
                "ステータスコード: {}",
                response.status()
            )));
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_requires_webhook_url() {
        let config = Config::default();
        assert!(SlackNotifier::from_config(&config).is_none());

        let config = Config {
            slack_webhook_url: Some("https://hooks.slack.com/services/TEST".into()),
            ..Config::default()
        };
        assert!(SlackNotifier::from_config(&config).is_some());
    }

    #[test]
    fn test_payload_skips_missing_channel() {
        let payload = SlackPayload {
            text: "テスト",
            channel: None,
            username: Some("順位チェッカー自動通知"),
            icon_emoji: Some(":chart_with_upwards_trend:"),
            thread_ts: None,
            reply_broadcast: None,
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("channel"));
        assert!(!json.contains("thread_ts"));
        assert!(json.contains("icon_emoji"));
    }

    #[test]
    fn test_payload_with_thread() {
        let payload = SlackPayload {
            text: "テスト",
            channel: Some("#seo-report"),
            username: None,
            icon_emoji: None,
            thread_ts: Some("1740819204.046099"),
            reply_broadcast: Some(true),
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"thread_ts\":\"1740819204.046099\""));
        assert!(json.contains("\"reply_broadcast\":true"));
    }
}
