use rand::Rng;
use std::time::Duration;

/// Delay sampled uniformly from `[min_secs, max_secs]`
pub fn sample_delay(min_secs: f64, max_secs: f64) -> Duration {
    let min = min_secs.max(0.0);
    let max = max_secs.max(min);
    if max <= min {
        return Duration::from_secs_f64(min);
    }
    Duration::from_secs_f64(rand::thread_rng().gen_range(min..=max))
}

/// Convert a company name to something safe to use as a directory name
pub fn sanitize_filename(name: &str) -> String {
    let name = name.trim().replace(['/', '\\', ':', '?', '&', '=', '#', '%', '*', '"', '<', '>', '|'], "_");

    if name.is_empty() || name == "." || name == ".." {
        return "unnamed".to_string();
    }

    // Limit filename length
    if name.chars().count() > 100 {
        name.chars().take(100).collect()
    } else {
        name
    }
}
