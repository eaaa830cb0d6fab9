//! `/proc/uptime` parsing.

use super::{ParseError, ProcError, ProcRoot};

/// Larger than any real uptime (about 136 years); bigger values are garbage.
const MAX_UPTIME_SECS: f64 = u32::MAX as f64;

/// Seconds since boot.
pub fn read_uptime(root: &ProcRoot) -> Result<f64, ProcError> {
    let path = root.uptime_file();
    let content = root.read_to_string(&path)?;
    parse_uptime_content(&content).map_err(|e| ProcError::malformed(&path, e))
}

/// First whitespace-separated field, e.g. `"350735.47 234388.90"`.
pub fn parse_uptime_content(content: &str) -> Result<f64, ParseError> {
    let first = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty uptime"))?;
    let seconds: f64 = first
        .parse()
        .map_err(|_| ParseError::new(format!("uptime is not a number: {:?}", first)))?;
    if !(0.0..=MAX_UPTIME_SECS).contains(&seconds) {
        return Err(ParseError::new(format!("uptime out of range: {}", seconds)));
    }
    Ok(seconds)
}
