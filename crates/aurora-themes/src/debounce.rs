//! Call debouncing.
//!
//! Collapses rapid repeated calls into one effective call after a quiet
//! period. Built once per owner and reused, so timers never leak across
//! reconstructions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Debounced call wrapper.
///
/// `call` stores the value and arms a timer; only the newest call within the
/// quiet period fires the action. Must be used inside a tokio runtime.
pub struct Debouncer<T: Send + 'static> {
    delay: Duration,
    generation: Arc<AtomicU64>,
    latest: Arc<Mutex<Option<T>>>,
    action: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            latest: Arc::new(Mutex::new(None)),
            action: Arc::new(action),
        }
    }

    /// Schedule the action for this value, superseding any pending call.
    pub fn call(&self, value: T) {
        *self.latest.lock().unwrap() = Some(value);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let delay = self.delay;
        let generations = Arc::clone(&self.generation);
        let latest = Arc::clone(&self.latest);
        let action = Arc::clone(&self.action);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Superseded by a newer call
            if generations.load(Ordering::SeqCst) != generation {
                return;
            }
            if let Some(value) = latest.lock().unwrap().take() {
                action(value);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_rapid_calls_collapse_to_one() {
        let count = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(None));

        let c = Arc::clone(&count);
        let l = Arc::clone(&last);
        let debouncer = Debouncer::new(Duration::from_millis(20), move |v: u32| {
            c.fetch_add(1, Ordering::SeqCst);
            *l.lock().unwrap() = Some(v);
        });

        for i in 0..5 {
            debouncer.call(i);
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(*last.lock().unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_spaced_calls_each_fire() {
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        let debouncer = Debouncer::new(Duration::from_millis(10), move |_: u32| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        debouncer.call(1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.call(2);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
