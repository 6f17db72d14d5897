use anyhow::Context;
use clap::Parser;
use rank_checker_rust::{cli, config, csv_input, error, notify, report, runner, sheets};

use cli::{Cli, Commands};
use config::Config;
use notify::SlackNotifier;
use sheets::FileSheet;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("設定の読み込みに失敗しました")?;

    match cli.command {
        Commands::Run { csv, dir, sheet, date, group, no_notify } => {
            println!("📈 rank-checker-rust - 順位計測\n");

            let config = match group {
                Some(group_label) => Config { group_label, ..config },
                None => config,
            };
            let date = date.unwrap_or_else(today);

            let result = run_batch(&config, csv, dir, sheet, &date, cli.verbose).await;

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    // 失敗もベストエフォートで通知する。通知自体の失敗はログだけ残す
                    if !no_notify {
                        if let Some(notifier) = SlackNotifier::from_config(&config) {
                            let message = report::format_failure(&e, &date, &config.group_label);
                            if let Err(notify_err) = notifier.send(&message).await {
                                eprintln!("エラー通知の送信に失敗: {}", notify_err);
                            }
                        }
                    }
                    return Err(e.into());
                }
            };

            println!("[4/4] Slack通知中...");
            if no_notify {
                println!("- 通知をスキップ（--no-notify）\n");
            } else if let Some(notifier) = SlackNotifier::from_config(&config) {
                match notifier.send(&outcome.report).await {
                    Ok(_) => println!("✔ Slack通知を送信\n"),
                    // 分析は成功しているので、通知失敗で全体を失敗にしない
                    Err(e) => eprintln!("Slack通知の送信に失敗: {}\n", e),
                }
            } else {
                println!("- Webhook URL未設定のため通知をスキップ\n");
            }

            // 反映失敗は通知後に終了コードへ反映する
            if let Some(e) = outcome.reconcile_error {
                eprintln!("⚠ 部分的な失敗: 分析と通知は完了、スプレッドシート反映のみ失敗");
                return Err(e).context("スプレッドシート反映に失敗しました");
            }

            println!("✅ 完了");
        }

        Commands::Analyze { csv, date } => {
            println!("📊 rank-checker-rust - 分析のみ\n");

            let date = date.unwrap_or_else(today);
            let raw_records = csv_input::read_raw_records(&csv)?;
            println!("✔ {}件のレコードを読み込み\n", raw_records.len());

            let outcome = runner::run_analysis(&raw_records, &date, &config, None)?;
            println!("{}", outcome.report);
        }

        Commands::Config { set_webhook, set_channel, set_group, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(url) = set_webhook {
                config.slack_webhook_url = Some(url);
                changed = true;
            }
            if let Some(channel) = set_channel {
                config.slack_channel = Some(channel);
                changed = true;
            }
            if let Some(group) = set_group {
                config.group_label = group;
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show {
                println!("設定:");
                println!("  グループ名: {}", config.group_label);
                println!("  大変動閾値: {}位", config.big_move_threshold);
                println!("  符号の解釈: {:?}", config.sign_convention);
                println!(
                    "  Slack Webhook: {}",
                    if config.slack_webhook_url.is_some() { "設定済み" } else { "未設定" }
                );
                println!(
                    "  通知チャンネル: {}",
                    config.slack_channel.as_deref().unwrap_or("（デフォルト）")
                );
            }
        }
    }

    Ok(())
}

/// CSV読み込み → 分析 → シート反映までを実行する
async fn run_batch(
    config: &Config,
    csv: Option<PathBuf>,
    dir: Option<PathBuf>,
    sheet_path: Option<PathBuf>,
    date: &str,
    verbose: bool,
) -> error::Result<runner::RunOutcome> {
    // 1. CSVの特定と読み込み
    println!("[1/4] CSVを読み込み中...");
    let csv_path = match (csv, dir) {
        (Some(path), _) => path,
        (None, Some(dir)) => {
            let path = csv_input::find_latest_csv(&dir)?;
            println!("- 最新のCSVを選択: {}", path.display());
            path
        }
        (None, None) => unreachable!("clap側で必須チェック済み"),
    };
    let raw_records = csv_input::read_raw_records(&csv_path)?;
    println!("✔ {}件のレコードを読み込み\n", raw_records.len());

    // 2. 分析と反映
    println!("[2/4] 順位データを分析中...");
    let mut sheet = match sheet_path {
        Some(ref path) => Some(FileSheet::open(path)?),
        None => None,
    };
    let outcome = runner::run_analysis(
        &raw_records,
        date,
        config,
        sheet.as_mut().map(|s| s as &mut dyn sheets::SpreadsheetHandle),
    )?;
    println!("✔ 分析完了（対象{}件）\n", outcome.analysis.total);

    if verbose {
        println!("{}\n", outcome.report);
    }

    // 3. 反映結果の報告と保存
    println!("[3/4] スプレッドシートに反映中...");
    match (&outcome.reconcile, &outcome.reconcile_error) {
        (Some(reconcile), _) => {
            if reconcile.updated {
                if let Some(ref sheet) = sheet {
                    sheet.save()?;
                }
                println!(
                    "✔ 反映完了（更新{}件 / 追加{}件）\n",
                    reconcile.updated_rows, reconcile.new_rows
                );
            } else {
                println!("- 本日分（{}）は反映済みのためスキップ\n", date);
            }
        }
        (None, Some(e)) => {
            // 反映失敗は通知を妨げない。終了コードへの反映は呼び出し側が行う
            eprintln!("スプレッドシート反映に失敗: {}\n", e);
        }
        (None, None) => {
            println!("- シート未指定のためスキップ\n");
        }
    }

    Ok(outcome)
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
