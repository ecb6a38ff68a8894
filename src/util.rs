/// Sleep until the next clock-aligned tick.
///
/// With `interval_secs = 3600`, a call at 14:03:22 sleeps until 15:00:00.
pub async fn sleep_until_aligned(interval_secs: u64) {
    let sleep_secs = secs_until_aligned(chrono::Utc::now().timestamp() as u64, interval_secs);

    tracing::debug!(next_build_in_secs = sleep_secs, "sleeping until next aligned tick");

    tokio::time::sleep(std::time::Duration::from_secs(sleep_secs)).await;
}

fn secs_until_aligned(now_secs: u64, interval_secs: u64) -> u64 {
    let interval_secs = interval_secs.max(1);
    let next_tick = (now_secs / interval_secs + 1) * interval_secs;
    next_tick - now_secs
}
