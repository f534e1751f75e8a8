//! Pure rendering of a progress line.
//!
//! Nothing here touches shared state or I/O; [`ProgressTracker`](crate::ProgressTracker)
//! resolves its effective settings under its lock and hands them to
//! [`render_line`].

use std::{fmt::Write as _, time::Duration};

use crate::format::NumberFormat;

/// Glyph for the completed part of the bar.
pub const FILL_CHAR: char = '#';

/// Glyph for the remaining part of the bar.
pub const EMPTY_CHAR: char = '.';

/// Completion ratio in `[0.0, 1.0]`, clamped to exactly `1.0` once
/// `value >= total`.
///
/// `total` must already be the effective (positive) total.
#[must_use]
pub fn rate(value: f64, total: f64) -> f64 {
    if value >= total {
        1.0
    } else {
        value / total
    }
}

/// Number of fill glyphs for a bar `width` glyphs wide at `rate`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn filled(width: usize, rate: f64) -> usize {
    let done = (width as f64 * rate).floor();
    if done.is_nan() || done <= 0.0 {
        0
    } else {
        (done as usize).min(width)
    }
}

/// Everything needed to draw one line, already resolved to effective values.
#[derive(Clone, Copy, Debug)]
pub struct Line<'a> {
    /// Label printed before the percentage.
    pub prefix: &'a str,
    /// Current progress.
    pub value: f64,
    /// Effective total (always positive).
    pub total: f64,
    /// Effective bar width (always positive).
    pub width: usize,
    /// Template for `value` and `total`.
    pub format: &'a NumberFormat,
    /// Time since the first render.
    pub elapsed: Duration,
}

/// Renders `\r<prefix><pct>% [<bar>] [<value>/<total> in <elapsed>]`.
#[must_use]
pub fn render_line(line: &Line<'_>) -> String {
    let rate = rate(line.value, line.total);
    let done = filled(line.width, rate);

    let mut out = String::with_capacity(line.prefix.len() + line.width + 48);
    out.push('\r');
    out.push_str(line.prefix);
    let _ = write!(out, "{:5.1}% [", rate * 100.0);
    out.extend(std::iter::repeat_n(FILL_CHAR, done));
    out.extend(std::iter::repeat_n(EMPTY_CHAR, line.width - done));
    out.push_str("] [");
    line.format.format_into(&mut out, line.value);
    out.push('/');
    line.format.format_into(&mut out, line.total);
    out.push_str(" in ");
    out.push_str(&format_duration(line.elapsed));
    out.push(']');
    out
}

/// Formats a duration the compact way: `0s`, `850ns`, `1.5µs`, `500ms`,
/// `1.2s`, `1m30s`, `2h0m5s`.
///
/// The largest unit below one second is chosen for short durations; above a
/// second, hours and minutes are whole and seconds carry up to nine
/// fractional digits with trailing zeros dropped.
#[must_use]
pub fn format_duration(elapsed: Duration) -> String {
    let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);

    if nanos < 1_000_000_000 {
        return match nanos {
            0 => String::from("0s"),
            1..1_000 => format!("{nanos}ns"),
            1_000..1_000_000 => {
                let (frac, whole) = fraction(nanos, 3);
                format!("{whole}{frac}µs")
            }
            _ => {
                let (frac, whole) = fraction(nanos, 6);
                format!("{whole}{frac}ms")
            }
        };
    }

    let (frac, secs) = fraction(nanos, 9);
    let mins = secs / 60;
    let mut out = String::new();
    if mins > 0 {
        let hours = mins / 60;
        if hours > 0 {
            let _ = write!(out, "{hours}h");
        }
        let _ = write!(out, "{}m", mins % 60);
    }
    let _ = write!(out, "{}{frac}s", secs % 60);
    out
}

/// Splits the lowest `digits` decimal digits off `v`, returning them as a
/// `.ddd` suffix without trailing zeros (empty if all zero) and the rest.
#[allow(clippy::cast_possible_truncation)]
fn fraction(mut v: u64, digits: u32) -> (String, u64) {
    let mut buf = Vec::with_capacity(digits as usize);
    let mut significant = false;
    for _ in 0..digits {
        let digit = v % 10;
        significant |= digit != 0;
        if significant {
            buf.push(char::from(b'0' + digit as u8));
        }
        v /= 10;
    }

    let mut frac = String::new();
    if significant {
        frac.push('.');
        frac.extend(buf.iter().rev());
    }
    (frac, v)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{Line, filled, format_duration, rate, render_line};
    use crate::format::NumberFormat;

    #[rstest]
    #[case(Duration::ZERO, "0s")]
    #[case(Duration::from_nanos(1), "1ns")]
    #[case(Duration::from_nanos(999), "999ns")]
    #[case(Duration::from_nanos(1_500), "1.5µs")]
    #[case(Duration::from_micros(250), "250µs")]
    #[case(Duration::from_millis(500), "500ms")]
    #[case(Duration::from_micros(1_250), "1.25ms")]
    #[case(Duration::from_millis(1_200), "1.2s")]
    #[case(Duration::from_secs(1), "1s")]
    #[case(Duration::from_secs(90), "1m30s")]
    #[case(Duration::from_millis(61_001), "1m1.001s")]
    #[case(Duration::from_secs(3_600), "1h0m0s")]
    #[case(Duration::from_secs(7_205), "2h0m5s")]
    fn test_format_duration(#[case] elapsed: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(elapsed), expected);
    }

    /// Rate Clamping
    /// Values at or past the total clamp to exactly 1.0.
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_rate_clamps() {
        assert_eq!(rate(0.0, 100.0), 0.0);
        assert_eq!(rate(25.0, 100.0), 0.25);
        assert_eq!(rate(100.0, 100.0), 1.0);
        assert_eq!(rate(250.0, 100.0), 1.0);
    }

    #[rstest]
    #[case(24, 0.0, 0)]
    #[case(24, 0.5, 12)]
    #[case(24, 0.99, 23)]
    #[case(24, 1.0, 24)]
    #[case(40, 3.0 / 101.0, 1)]
    #[case(10, -0.5, 0)]
    fn test_filled(#[case] width: usize, #[case] rate: f64, #[case] expected: usize) {
        assert_eq!(filled(width, rate), expected);
    }

    /// Full Line Layout
    #[test]
    fn test_render_line() {
        let format = NumberFormat::default();
        let line = render_line(&Line {
            prefix: "copy ",
            value: 3.0,
            total: 101.0,
            width: 10,
            format: &format,
            elapsed: Duration::from_millis(500),
        });
        assert_eq!(line, "\rcopy   3.0% [..........] [3/101 in 500ms]");
    }

    #[test]
    fn test_render_line_complete() {
        let format = NumberFormat::parse("%0.3f").unwrap();
        let line = render_line(&Line {
            prefix: "",
            value: 101.0,
            total: 101.0,
            width: 4,
            format: &format,
            elapsed: Duration::from_millis(1_200),
        });
        assert_eq!(line, "\r100.0% [####] [101.000/101.000 in 1.2s]");
    }
}
