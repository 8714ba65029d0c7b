use super::query_param;

/// Parameters the host passes in the embed page's query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageParams {
    /// Seconds into the video to start at (`t=`).
    pub start_at: Option<f64>,
    /// Restrict playback to H.264 streams (`h264Only=1`).
    pub h264_only: bool,
    /// Exclude 60 fps streams (`no60Fps=1`).
    pub no_60fps: bool,
}

impl PageParams {
    pub fn from_query(query: &str) -> Self {
        Self {
            start_at: query_param(query, "t").as_deref().and_then(parse_timestamp),
            h264_only: flag(query, "h264Only"),
            no_60fps: flag(query, "no60Fps"),
        }
    }
}

fn flag(query: &str, key: &str) -> bool {
    query_param(query, key).as_deref() == Some("1")
}

/// Accepts `90`, `90.5`, `90s` and unit forms like `1h2m3s`.
pub fn parse_timestamp(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(seconds) = raw.parse::<f64>() {
        return (seconds.is_finite() && seconds >= 0.0).then_some(seconds);
    }

    let mut total = 0.0;
    let mut digits = String::new();
    for c in raw.chars() {
        match c {
            '0'..='9' | '.' => digits.push(c),
            'h' | 'm' | 's' => {
                let value: f64 = digits.parse().ok()?;
                digits.clear();
                total += value
                    * match c {
                        'h' => 3600.0,
                        'm' => 60.0,
                        _ => 1.0,
                    };
            }
            _ => return None,
        }
    }
    digits.is_empty().then_some(total)
}
