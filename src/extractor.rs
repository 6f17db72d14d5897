//! CSVレコードの正規化
//!
//! エクスポート元によって列名が揺れるため、キーワード列・順位列・
//! 変動列を推定してから (キーワード, 順位, 変動) に変換する。
//!
//! ## 列推定の優先順位
//! 1. 既知の列名との完全一致
//! 2. 列名の部分一致
//! 3. サンプリング（順位列のみ: 先頭10行の8割以上が数値）

use crate::error::{RankCheckerError, Result};

/// デコード済みCSVの1行。列順を保持した (列名, 値) の並び
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for RawRecord {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// 正規化済みの順位レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankRecord {
    pub keyword: String,
    /// Noneは圏外（順位なし）
    pub rank: Option<u32>,
    /// 前回計測からの順位変化。変動列がないCSVではNone
    pub rank_change: Option<i32>,
}

const KEYWORD_EXACT: &[&str] = &["キーワード", "keyword", "key_word", "query", "検索キーワード"];
const KEYWORD_FRAGMENTS: &[&str] = &["キーワード", "key", "word", "query"];

const RANK_EXACT: &[&str] = &[
    "G順位",
    "G_順位",
    "Google順位",
    "Google_順位",
    "g_ranking",
    "google_ranking",
    "ranking",
    "順位",
    "g_rank",
    "google_rank",
    "grank",
    "rank",
];
const RANK_FRAGMENTS: &[&str] = &["順位", "rank"];

const CHANGE_EXACT: &[&str] = &["変動", "順位変動", "G変動", "前回比", "change", "g_change"];
const CHANGE_FRAGMENTS: &[&str] = &["変動", "変化", "change", "diff"];

/// 圏外を表す値
const UNRANKED_VALUES: &[&str] = &["-", "ー", "－", "圏外"];

/// サンプリングで順位列と判定するしきい値
const NUMERIC_RATIO_THRESHOLD: f64 = 0.8;
const SAMPLE_ROWS: usize = 10;

/// 生レコード列を正規化する
///
/// 列の推定はバッチ先頭の1回だけ行い、全行に適用する。
/// キーワードが空の行と、順位が数値でも圏外でもない行は黙って捨てる。
pub fn extract(raw_records: &[RawRecord]) -> Result<Vec<RankRecord>> {
    let Some(first) = raw_records.first() else {
        // 空のCSVは空の結果。分析側がEmptyInputとして弾く
        return Ok(Vec::new());
    };

    let headers: Vec<String> = first.headers().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(RankCheckerError::MissingColumn("キーワード", headers));
    }

    let keyword_column = find_keyword_column(raw_records, &headers);
    let rank_column = find_rank_column(raw_records, &headers, &keyword_column)
        .ok_or_else(|| RankCheckerError::MissingColumn("順位", headers.clone()))?;
    let change_column = find_change_column(&headers, &keyword_column, &rank_column);

    let mut records = Vec::with_capacity(raw_records.len());

    for raw in raw_records {
        let keyword = raw.get(&keyword_column).unwrap_or("").trim();
        if keyword.is_empty() {
            continue;
        }

        let rank = match parse_rank(raw.get(&rank_column).unwrap_or("")) {
            Some(rank) => rank,
            None => continue,
        };

        let rank_change = change_column
            .as_deref()
            .and_then(|col| raw.get(col))
            .and_then(parse_leading_int)
            .and_then(|v| i32::try_from(v).ok());

        records.push(RankRecord {
            keyword: keyword.to_string(),
            rank,
            rank_change,
        });
    }

    Ok(records)
}

/// キーワード列を推定する。最終的には先頭列にフォールバックする
fn find_keyword_column(records: &[RawRecord], headers: &[String]) -> String {
    if let Some(col) = match_exact(headers, KEYWORD_EXACT) {
        return col;
    }
    if let Some(col) = match_fragment(headers, KEYWORD_FRAGMENTS) {
        return col;
    }

    // 先頭列の値が数値でなければキーワード列とみなす
    let first = &headers[0];
    if let Some(value) = records.first().and_then(|r| r.get(first)) {
        if !value.is_empty() && parse_leading_int(value).is_none() {
            return first.clone();
        }
    }

    first.clone()
}

/// 順位列を推定する。名前で見つからなければ値のサンプリングで探す
fn find_rank_column(
    records: &[RawRecord],
    headers: &[String],
    keyword_column: &str,
) -> Option<String> {
    if let Some(col) = match_exact(headers, RANK_EXACT) {
        return Some(col);
    }
    if let Some(col) = match_fragment(headers, RANK_FRAGMENTS) {
        return Some(col);
    }

    // 先頭10行をサンプリングし、8割以上が整数として読める列を採用
    let sample = records.len().min(SAMPLE_ROWS);
    if sample == 0 {
        return None;
    }

    for col in headers {
        if col == keyword_column {
            continue;
        }

        let numeric = records[..sample]
            .iter()
            .filter(|r| {
                r.get(col)
                    .filter(|v| !v.is_empty())
                    .and_then(parse_leading_int)
                    .is_some()
            })
            .count();

        if numeric as f64 / sample as f64 >= NUMERIC_RATIO_THRESHOLD {
            return Some(col.clone());
        }
    }

    None
}

fn find_change_column(
    headers: &[String],
    keyword_column: &str,
    rank_column: &str,
) -> Option<String> {
    let candidates: Vec<String> = headers
        .iter()
        .filter(|h| h.as_str() != keyword_column && h.as_str() != rank_column)
        .cloned()
        .collect();

    match_exact(&candidates, CHANGE_EXACT).or_else(|| match_fragment(&candidates, CHANGE_FRAGMENTS))
}

fn match_exact(headers: &[String], names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| headers.iter().find(|h| h.as_str() == *name).cloned())
}

fn match_fragment(headers: &[String], fragments: &[&str]) -> Option<String> {
    headers
        .iter()
        .find(|h| {
            let lower = h.to_lowercase();
            fragments.iter().any(|f| lower.contains(f))
        })
        .cloned()
}

/// 順位のパース。Some(Some(n))=順位あり、Some(None)=圏外、None=行を捨てる
fn parse_rank(value: &str) -> Option<Option<u32>> {
    let value = value.trim();
    if UNRANKED_VALUES.contains(&value) {
        return Some(None);
    }

    match parse_leading_int(value) {
        Some(n) if n >= 1 => u32::try_from(n).ok().map(Some),
        _ => None,
    }
}

/// 文字列先頭の整数を読む（"3位" → 3、"+2" → 2、"-5" → -5）
fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim();
    let (sign, rest) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    digits.parse::<i64>().ok().map(|n| n * sign)
}
