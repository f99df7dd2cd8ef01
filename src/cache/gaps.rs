use chrono::{DateTime, Utc};

use crate::models::{CandleSeries, Granularity, TimeSpan};

/// Spans of candle data the cached series is missing, ordered leading,
/// internal, trailing.
///
/// Leading and trailing gaps cover the stretch of `span` before the
/// first and after the last cached candle, clamped to `span`. Internal
/// gaps cover every hole between consecutive cached candles across the
/// whole series, in or out of view. Bounds are stepped to the series'
/// label grid; an empty series yields the whole span as one gap.
pub fn missing_spans(
    series: &CandleSeries,
    granularity: Granularity,
    span: TimeSpan,
) -> Vec<TimeSpan> {
    let step = granularity.step();

    let (first, last) = match (series.first_timestamp(), series.last_timestamp()) {
        (Some(first), Some(last)) => (first, last),
        _ => return vec![span],
    };

    let mut gaps = Vec::new();

    if span.start < first {
        push_gap(&mut gaps, span.start, (first - step).min(span.end));
    }

    for pair in series.as_slice().windows(2) {
        let (prev, next) = (pair[0].timestamp, pair[1].timestamp);
        if next - prev > step {
            push_gap(&mut gaps, prev + step, next - step);
        }
    }

    if span.end > last {
        push_gap(&mut gaps, (last + step).max(span.start), span.end);
    }

    gaps
}

/// Off-grid neighbours can invert a candidate gap; those are not gaps.
fn push_gap(gaps: &mut Vec<TimeSpan>, start: DateTime<Utc>, end: DateTime<Utc>) {
    if start <= end {
        gaps.push(TimeSpan { start, end });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::series_at_minutes;
    use chrono::{Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn minute(m: i64) -> DateTime<Utc> {
        base() + Duration::minutes(m)
    }

    fn minute_span(from: i64, to: i64) -> TimeSpan {
        TimeSpan::new(minute(from), minute(to)).unwrap()
    }

    #[test]
    fn empty_series_yields_the_whole_span() {
        let series = CandleSeries::default();
        let gaps = missing_spans(&series, Granularity::M1, minute_span(0, 30));
        assert_eq!(gaps, vec![minute_span(0, 30)]);
    }

    #[test]
    fn series_entirely_after_the_span_clamps_leading_to_it() {
        // The leading gap stops at the span end, not at the first candle.
        let series = series_at_minutes(base(), &[100, 101, 102]);
        let gaps = missing_spans(&series, Granularity::M1, minute_span(0, 30));
        assert_eq!(gaps, vec![minute_span(0, 30)]);
    }

    #[test]
    fn series_entirely_before_the_span_clamps_trailing_to_it() {
        let series = series_at_minutes(base(), &[0, 1, 2]);
        let gaps = missing_spans(&series, Granularity::M1, minute_span(100, 130));
        assert_eq!(gaps, vec![minute_span(100, 130)]);
    }

    #[test]
    fn fully_covered_span_has_no_gaps() {
        let series = series_at_minutes(base(), &(0..=30).collect::<Vec<_>>());
        let gaps = missing_spans(&series, Granularity::M1, minute_span(0, 30));
        assert!(gaps.is_empty());
    }

    #[test]
    fn leading_gap_ends_one_step_before_the_first_candle() {
        let series = series_at_minutes(base(), &(5..=30).collect::<Vec<_>>());
        let gaps = missing_spans(&series, Granularity::M1, minute_span(0, 30));
        assert_eq!(gaps, vec![minute_span(0, 4)]);
    }

    #[test]
    fn trailing_gap_starts_one_step_after_the_last_candle() {
        let series = series_at_minutes(base(), &(0..=20).collect::<Vec<_>>());
        let gaps = missing_spans(&series, Granularity::M1, minute_span(0, 30));
        assert_eq!(gaps, vec![minute_span(21, 30)]);
    }

    #[test]
    fn internal_hole_becomes_one_stepped_gap() {
        // Labels 0..=10 and 20..=30 cached, 11..=19 missing.
        let mut minutes: Vec<i64> = (0..=10).collect();
        minutes.extend(20..=30);
        let series = series_at_minutes(base(), &minutes);

        let gaps = missing_spans(&series, Granularity::M1, minute_span(0, 30));
        assert_eq!(gaps, vec![minute_span(11, 19)]);
    }

    #[test]
    fn hole_beyond_the_view_is_still_reported() {
        // The span is fully covered by the cached head; the series hole
        // at 11..=19 is reported anyway.
        let mut minutes: Vec<i64> = (0..=10).collect();
        minutes.extend(20..=30);
        let series = series_at_minutes(base(), &minutes);

        let gaps = missing_spans(&series, Granularity::M1, minute_span(0, 10));
        assert_eq!(gaps, vec![minute_span(11, 19)]);
    }

    #[test]
    fn missing_single_bucket_is_a_single_point_gap() {
        let minutes: Vec<i64> = (0..=30).filter(|m| *m != 13).collect();
        let series = series_at_minutes(base(), &minutes);

        let gaps = missing_spans(&series, Granularity::M1, minute_span(0, 30));
        assert_eq!(gaps, vec![minute_span(13, 13)]);
    }

    #[test]
    fn lone_cached_candle_splits_the_span_around_itself() {
        let series = series_at_minutes(base(), &[15]);
        let gaps = missing_spans(&series, Granularity::M1, minute_span(0, 30));
        assert_eq!(gaps, vec![minute_span(0, 14), minute_span(16, 30)]);
    }

    #[test]
    fn gaps_come_back_leading_internal_trailing() {
        let series = series_at_minutes(base(), &[5, 6, 7, 12, 13]);
        let gaps = missing_spans(&series, Granularity::M1, minute_span(0, 30));
        assert_eq!(
            gaps,
            vec![minute_span(0, 4), minute_span(8, 11), minute_span(14, 30)]
        );
    }

    #[test]
    fn sub_step_neighbours_are_not_gaps() {
        // 7 minutes apart on a 5-minute grid: no whole bucket fits between.
        let series = series_at_minutes(base(), &[0, 7]);
        let gaps = missing_spans(&series, Granularity::M5, minute_span(0, 7));
        assert!(gaps.is_empty());
    }

    #[test]
    fn coarser_granularities_step_their_own_grid() {
        // One-hour labels at 12:00 and 15:00; the hole is 13:00..14:00.
        let series = series_at_minutes(base(), &[0, 180]);
        let span = minute_span(0, 180);
        let gaps = missing_spans(&series, Granularity::H1, span);
        assert_eq!(gaps, vec![minute_span(60, 120)]);
    }
}
