/// Parses a "HH:MM:SS" duration into whole seconds. Hours are unbounded,
/// minutes and seconds must stay below 60.
pub fn parse_hms(raw: &str) -> anyhow::Result<i64> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        anyhow::bail!("Expected HH:MM:SS, got '{}'", raw);
    }

    let hours: i64 = parts[0].parse()?;
    let minutes: i64 = parts[1].parse()?;
    let seconds: i64 = parts[2].parse()?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        anyhow::bail!("Duration components out of range in '{}'", raw);
    }

    Ok(hours * 3600 + minutes * 60 + seconds)
}

pub fn format_hms(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}
