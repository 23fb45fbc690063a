// Duration parsing for `watch --for`

use anyhow::Result;

/// Parse a duration expression and return seconds.
///
/// Accepts a bare number of seconds (`90`) or unit groups in h, m, s order
/// (`30s`, `5m`, `1h30m`, `2h5s`).
pub fn parse_duration(expr: &str) -> Result<u64> {
    let expr = expr.trim();
    if expr.is_empty() {
        anyhow::bail!("Duration cannot be empty");
    }
    if let Ok(secs) = expr.parse::<u64>() {
        if secs == 0 {
            anyhow::bail!("Duration must be greater than 0");
        }
        return Ok(secs);
    }

    let mut total_secs = 0u64;
    let mut digits = String::new();
    // Rank of the last unit seen; units must appear in descending order
    let mut last_rank = 0;

    for c in expr.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let (rank, unit_secs) = match c.to_ascii_lowercase() {
            'h' => (1, 3600),
            'm' => (2, 60),
            's' => (3, 1),
            _ => anyhow::bail!("Invalid duration format: {}", expr),
        };
        if digits.is_empty() || rank <= last_rank {
            anyhow::bail!("Invalid duration format: {}", expr);
        }
        let value: u64 = digits.parse()?;
        total_secs += value * unit_secs;
        digits.clear();
        last_rank = rank;
    }

    if !digits.is_empty() {
        anyhow::bail!("Invalid duration format: {} (missing unit)", expr);
    }
    if total_secs == 0 {
        anyhow::bail!("Duration must be greater than 0");
    }

    Ok(total_secs)
}
