use std::io::Write;
use std::sync::OnceLock;

use log::info;
use regex::bytes::Regex;

use crate::error::Result;
use crate::output::colors::{self, Value};

use super::client::ApiClient;

/// How a fetched job log is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Byte-for-byte copy, embedded carriage returns included.
    Raw,
    /// Keep only the last carriage-return-delimited segment of each line.
    Collapsed,
    /// Collapsed, with a dim elapsed-time prefix per line.
    Timestamps,
}

pub async fn show<W: Write>(
    client: &ApiClient,
    out: &mut W,
    job_id: &str,
    mode: LogMode,
) -> Result<()> {
    info!("Fetching log of job {job_id}");
    let body = client.get_raw(&format!("/jobs/{job_id}/log.txt")).await?;
    render(out, &body, mode)
}

pub fn render<W: Write>(out: &mut W, body: &[u8], mode: LogMode) -> Result<()> {
    match mode {
        LogMode::Raw => out.write_all(body)?,
        LogMode::Collapsed => {
            for line in lines(body) {
                out.write_all(last_segment(trim_line_end(line)))?;
                out.write_all(b"\n")?;
            }
        }
        LogMode::Timestamps => {
            let mut renderer = TimestampRenderer::new();
            for line in lines(body) {
                renderer.render_line(out, trim_line_end(line))?;
            }
        }
    }
    Ok(())
}

fn lines(body: &[u8]) -> impl Iterator<Item = &[u8]> {
    body.split_inclusive(|&b| b == b'\n')
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}

/// Everything before the last carriage return is overwritten terminal
/// output; only the final segment survives.
fn last_segment(line: &[u8]) -> &[u8] {
    match line.iter().rposition(|&b| b == b'\r') {
        Some(pos) => &line[pos + 1..],
        None => line,
    }
}

/// Printed width of a `MM:SS.ss` marker, style codes excluded.
const STAMP_WIDTH: usize = 8;

fn ansi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[.*?[a-zA-Z]").expect("ANSI pattern is valid"))
}

fn time_end_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\Atravis_time:end:\w+:start=(?P<start>[0-9]+),finish=(?P<finish>[0-9]+),duration=[0-9]+\z")
            .expect("timing pragma pattern is valid")
    })
}

/// Annotates each visible line with elapsed time since the stream's first
/// timing marker. The origin is fixed by the first `travis_time:end` pragma
/// and never resets.
struct TimestampRenderer {
    origin: Option<f64>,
}

impl TimestampRenderer {
    fn new() -> Self {
        Self { origin: None }
    }

    fn render_line<W: Write>(&mut self, out: &mut W, line: &[u8]) -> Result<()> {
        let mut segments: Vec<&[u8]> = line.split(|&b| b == b'\r').collect();
        let text = segments.pop().unwrap_or_default();
        let mut stamped = false;
        for segment in segments {
            let clean = ansi_regex().replace_all(segment, &b""[..]);
            let Some((start, finish)) = parse_time_end(&clean) else {
                continue;
            };
            let origin = *self.origin.get_or_insert(start);
            // Several markers may share one source line; each gets its own
            // visual line, only the last is followed by the text.
            if stamped {
                out.write_all(b"\n")?;
            }
            let styled = colors::render(
                "{dim}{stamp}{off}",
                &[("stamp", Value::Text(format_stamp(finish - origin)))],
            )?;
            out.write_all(styled.as_bytes())?;
            stamped = true;
        }
        if stamped {
            out.write_all(b" ")?;
        } else {
            // Same printed width as a marker, so text columns stay aligned.
            out.write_all(&[b' '; STAMP_WIDTH + 1])?;
        }
        out.write_all(text)?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

/// Extracts start/finish seconds from a timing-end pragma. Anything that
/// does not match the expected shape is ordinary overwritten content.
fn parse_time_end(segment: &[u8]) -> Option<(f64, f64)> {
    let caps = time_end_regex().captures(segment)?;
    let start = parse_ns(caps.name("start")?.as_bytes())?;
    let finish = parse_ns(caps.name("finish")?.as_bytes())?;
    Some((start, finish))
}

fn parse_ns(digits: &[u8]) -> Option<f64> {
    let ns: u64 = std::str::from_utf8(digits).ok()?.parse().ok()?;
    Some(ns as f64 / 1e9)
}

fn format_stamp(elapsed: f64) -> String {
    let minutes = (elapsed / 60.0).floor();
    let seconds = elapsed - minutes * 60.0;
    format!("{:02}:{:05.2}", minutes as i64, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(body: &[u8], mode: LogMode) -> Vec<u8> {
        let mut buf = Vec::new();
        render(&mut buf, body, mode).unwrap();
        buf
    }

    #[test]
    fn test_raw_mode_is_identity() {
        let body = b"a\rb\r\nc\x1b[31m\n";
        assert_eq!(rendered(body, LogMode::Raw), body);
    }

    #[test]
    fn test_collapsed_keeps_only_the_last_segment() {
        let body = b"spinner |\rspinner /\rdone\n";
        assert_eq!(rendered(body, LogMode::Collapsed), b"done\n");
    }

    #[test]
    fn test_collapsed_normalizes_line_endings() {
        // CRLF endings, a plain line, and a final line without a newline all
        // come out with exactly one newline each.
        let body = b"one\r\ntwo\nthree";
        assert_eq!(rendered(body, LogMode::Collapsed), b"one\ntwo\nthree\n");
    }

    #[test]
    fn test_collapsed_empty_line_stays_empty() {
        assert_eq!(rendered(b"\n\n", LogMode::Collapsed), b"\n\n");
    }

    #[test]
    fn test_stamp_width_matches_placeholder() {
        assert_eq!(format_stamp(0.0).len(), STAMP_WIDTH);
        assert_eq!(format_stamp(90.5).len(), STAMP_WIDTH);
    }

    #[test]
    fn test_format_stamp_divmod() {
        assert_eq!(format_stamp(1.5), "00:01.50");
        assert_eq!(format_stamp(90.25), "01:30.25");
        assert_eq!(format_stamp(3600.0), "60:00.00");
    }

    #[test]
    fn test_origin_is_fixed_by_the_first_marker() {
        let body = b"travis_time:end:0001:start=1000000000,finish=2500000000,duration=1500000000\rfirst\n\
                     travis_time:end:0002:start=2000000000,finish=4000000000,duration=2000000000\rsecond\n";
        let out = rendered(body, LogMode::Timestamps);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\x1b[2m00:01.50\x1b[0m first\n\x1b[2m00:03.00\x1b[0m second\n"
        );
    }

    #[test]
    fn test_unmarked_lines_get_an_aligned_placeholder() {
        let body = b"travis_time:end:01:start=1000000000,finish=1000000000,duration=0\rmarked\n\
                     plain\n";
        let text = String::from_utf8(rendered(body, LogMode::Timestamps)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "\x1b[2m00:00.00\x1b[0m marked");
        assert_eq!(lines[1], "         plain");
        // Identical visible-column offset: 8 stamp columns plus one space.
        assert_eq!(lines[1].len() - "plain".len(), STAMP_WIDTH + 1);
    }

    #[test]
    fn test_multiple_markers_each_render_on_their_own_line() {
        let body = b"travis_time:end:01:start=1000000000,finish=2000000000,duration=1000000000\r\
                     travis_time:end:02:start=3000000000,finish=4000000000,duration=1000000000\rtext\n";
        let text = String::from_utf8(rendered(body, LogMode::Timestamps)).unwrap();
        assert_eq!(
            text,
            "\x1b[2m00:01.00\x1b[0m\n\x1b[2m00:03.00\x1b[0m text\n"
        );
    }

    #[test]
    fn test_ansi_wrapped_pragma_still_matches() {
        let body = b"\x1b[0Ktravis_time:end:01:start=1000000000,finish=2500000000,duration=1500000000\x1b[0K\rok\n";
        let text = String::from_utf8(rendered(body, LogMode::Timestamps)).unwrap();
        assert_eq!(text, "\x1b[2m00:01.50\x1b[0m ok\n");
    }

    #[test]
    fn test_malformed_pragma_is_ignored() {
        let body = b"travis_time:end:01:start=oops,finish=2,duration=3\rtext\n";
        let text = String::from_utf8(rendered(body, LogMode::Timestamps)).unwrap();
        assert_eq!(text, "         text\n");
    }

    #[test]
    fn test_ordinary_overwritten_segments_are_discarded() {
        let body = b"downloading 10%\rdownloading 100%\n";
        let text = String::from_utf8(rendered(body, LogMode::Timestamps)).unwrap();
        assert_eq!(text, "         downloading 100%\n");
    }

    #[test]
    fn test_visible_text_bytes_pass_through_untouched() {
        // Not valid UTF-8; must be copied at the byte level.
        let body = b"caf\xff latin-1\n";
        let out = rendered(body, LogMode::Timestamps);
        assert_eq!(&out[STAMP_WIDTH + 1..], b"caf\xff latin-1\n");
    }
}
