const MAX_WORKERS: usize = 64;

pub const MAX_WORKERS_ENV: &str = "ANAGRAM_MAX_WORKERS";

/// Worker cap used when nothing is configured: one per available core.
pub fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, MAX_WORKERS)
}

pub fn clamp_max_workers(value: usize) -> usize {
    value.clamp(1, MAX_WORKERS)
}

pub fn parse_max_workers(raw: Option<&str>, default_value: usize) -> usize {
    let value = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default_value);
    clamp_max_workers(value)
}

pub fn max_workers_from_env() -> usize {
    let raw = std::env::var(MAX_WORKERS_ENV).ok();
    parse_max_workers(raw.as_deref(), default_max_workers())
}
