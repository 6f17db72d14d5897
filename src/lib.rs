//! SEO順位計測CSVの分析・スプレッドシート反映・Slack通知ツール

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod csv_input;
pub mod error;
pub mod extractor;
pub mod notify;
pub mod report;
pub mod runner;
pub mod sheets;
