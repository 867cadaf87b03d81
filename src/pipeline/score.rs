//! 直近ウィンドウと履歴ベースラインの比較によるトレンドスコア計算。

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::store::models::RankedKeywords;

use super::aggregate::BucketedCounts;

/// 単一キーワードのトレンドスコア。
///
/// 履歴カウントが 0 の場合は直近カウントそのものをスコアとする（新規出現は
/// 観測量に比例した最大の新規性として扱う）。履歴がある場合は相対成長率。
/// 両者のスコアは大小比較可能な同一尺度ではないが、これは仕様上の方針であり
/// 計算誤りではない。
#[must_use]
pub(crate) fn trend_score(recent: u64, historical: u64) -> f64 {
    if historical == 0 {
        recent as f64
    } else {
        (recent as f64 - historical as f64) / historical as f64
    }
}

/// バケット済みカウントからトレンドキーワードの全順序を計算する。
///
/// バケットキーを昇順に並べ、末尾 `recent_window` 個を直近、それ以前の全区間を
/// 履歴として合算する。直近に現れないキーワードは履歴にあっても脱落する。
/// `recent_window` が区間数以上の場合は全区間が直近となり履歴は空になる。
///
/// 返り値はスコア降順。カウンタが BTreeMap で決定的に並ぶため、同点時の順序も
/// 実行間で安定する。
#[must_use]
pub fn identify_trending(buckets: &BucketedCounts, recent_window: usize) -> RankedKeywords {
    let interval_count = buckets.len();
    let split = interval_count.saturating_sub(recent_window);

    let mut recent: BTreeMap<&str, u64> = BTreeMap::new();
    let mut historical: BTreeMap<&str, u64> = BTreeMap::new();

    for (position, counts) in buckets.values().enumerate() {
        let side = if position < split {
            &mut historical
        } else {
            &mut recent
        };
        for (keyword, count) in counts {
            *side.entry(keyword).or_insert(0) += count;
        }
    }

    let mut ranked: RankedKeywords = recent
        .iter()
        .map(|(keyword, &recent_count)| {
            let historical_count = historical.get(keyword).copied().unwrap_or(0);
            ((*keyword).to_string(), trend_score(recent_count, historical_count))
        })
        .collect();

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
}
