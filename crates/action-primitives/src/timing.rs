use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Instant;

/// A value together with the wall-clock span that produced it.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed_ms: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl<T> Timed<T> {
    pub fn into_parts(self) -> (T, u64) {
        (self.value, self.elapsed_ms)
    }
}

/// Await `fut` and record how long it took.
///
/// The measurement is taken whatever the future resolves to, so a failing
/// action still reports its duration. One raw sample per call; comparisons
/// between runs belong to the caller.
pub async fn instrument<F, T>(fut: F) -> Timed<T>
where
    F: Future<Output = T>,
{
    let started_at = Utc::now();
    let start = Instant::now();
    let value = fut.await;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    Timed {
        value,
        elapsed_ms,
        started_at,
        finished_at: Utc::now(),
    }
}
