//! 配信元サイトごとに揺れる pubDate 文字列を UTC の絶対時刻へ正規化する。

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// オフセット付きフォーマット。上から順に試行する。
/// 2桁年（%y）を先に置く。4桁年の入力は2桁消費後の空白照合で必ず弾かれるが、
/// 逆順だと "25" が西暦25年として %Y に一致し得る。
const OFFSET_FORMATS: &[&str] = &[
    // thanhnien.vn（2桁年）
    "%a, %d %b %y %H:%M:%S %z",
    // vnexpress.net, dantri
    "%a, %d %b %Y %H:%M:%S %z",
];

// nhandan.vn はオフセットなしの naive 形式で配信する。UTC とみなす。
const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// tuoitre は "GMT+0700" のようにリテラル GMT を挟む。
const GMT_LITERAL_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT%z";

// "GMT+7" のような数値オフセット省略形。時間単位のシフトでしか近似できない。
static GMT_HOUR_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*) GMT([+-]\d{1,2})$").expect("valid GMT suffix pattern"));

/// pubDate 文字列を UTC の絶対時刻にパースする。
///
/// 既知のフォーマットを順に試し、どれにも一致しない場合は `GMT±N` サフィックスの
/// フォールバックを試みる。全て失敗した場合は診断ログを出して `None` を返す。
/// 呼び出し側にエラーが伝播することはない。
#[must_use]
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT) {
        return Some(naive.and_utc());
    }

    if let Ok(parsed) = DateTime::parse_from_str(raw, GMT_LITERAL_FORMAT) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(shifted) = parse_gmt_hour_suffix(raw) {
        return Some(shifted);
    }

    warn!(pub_date = raw, "failed to parse pubDate");
    None
}

/// `... GMT+7` 形式のフォールバック。プレフィックスを naive としてパースし、
/// オフセットを時間シフトとして加算した近似値を返す。分単位のオフセットは対象外。
fn parse_gmt_hour_suffix(raw: &str) -> Option<DateTime<Utc>> {
    let captures = GMT_HOUR_SUFFIX.captures(raw)?;
    let base = captures.get(1)?.as_str().trim();
    let offset_hours: i64 = captures.get(2)?.as_str().parse().ok()?;

    let naive = NaiveDateTime::parse_from_str(base, "%a, %d %b %Y %H:%M:%S").ok()?;
    Some((naive + Duration::hours(offset_hours)).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn utc(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts)
            .expect("valid rfc3339 timestamp")
            .with_timezone(&Utc)
    }

    #[rstest]
    // vnexpress style, 4-digit year with numeric offset
    #[case("Tue, 07 Jan 2025 10:30:00 +0700", "2025-01-07T03:30:00Z")]
    // thanhnien style, 2-digit year
    #[case("Tue, 07 Jan 25 10:30:00 +0700", "2025-01-07T03:30:00Z")]
    // nhandan style, naive timestamp treated as UTC
    #[case("2025-01-07 10:30:00", "2025-01-07T10:30:00Z")]
    // tuoitre style, literal GMT before the numeric offset
    #[case("Tue, 07 Jan 2025 10:30:00 GMT+0700", "2025-01-07T03:30:00Z")]
    fn parses_supported_formats(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(parse_pub_date(raw), Some(utc(expected)));
    }

    #[test]
    fn same_instant_across_equivalent_formats() {
        let with_offset = parse_pub_date("Tue, 07 Jan 2025 10:30:00 +0700");
        let with_gmt_literal = parse_pub_date("Tue, 07 Jan 2025 10:30:00 GMT+0700");
        let two_digit_year = parse_pub_date("Tue, 07 Jan 25 10:30:00 +0700");

        assert!(with_offset.is_some());
        assert_eq!(with_offset, with_gmt_literal);
        assert_eq!(with_offset, two_digit_year);
    }

    #[test]
    fn falls_back_on_short_gmt_suffix() {
        // the short form only carries hours, so the shift is an approximation
        let parsed = parse_pub_date("Tue, 07 Jan 2025 10:30:00 GMT+7");
        assert_eq!(parsed, Some(utc("2025-01-07T17:30:00Z")));

        let negative = parse_pub_date("Tue, 07 Jan 2025 10:30:00 GMT-5");
        assert_eq!(negative, Some(utc("2025-01-07T05:30:00Z")));
    }

    #[rstest]
    #[case("")]
    #[case("hôm qua")]
    #[case("07/01/2025 10:30")]
    #[case("Tue, 07 Jan 2025 10:30:00 GMT+7:30")]
    fn unparseable_returns_none(#[case] raw: &str) {
        assert_eq!(parse_pub_date(raw), None);
    }

    #[test]
    fn rejects_inconsistent_weekday() {
        // 2025-01-07 is a Tuesday; chrono validates the weekday token
        assert_eq!(parse_pub_date("Mon, 07 Jan 2025 10:30:00 +0700"), None);
    }
}
