use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

type SharedCall<T> = Shared<BoxFuture<'static, T>>;

/// Registry of calls currently in flight, keyed by call identity.
///
/// Concurrent calls with the same key are joined to a single execution and
/// all receive its outcome. The entry is dropped as soon as that execution
/// completes, so outcomes are never reused by later calls.
pub(crate) struct InFlight<K, T: Clone> {
    calls: Arc<Mutex<HashMap<K, SharedCall<T>>>>,
}

impl<K, T: Clone> Default for InFlight<K, T> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, T> InFlight<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Runs the future built by `start`, or joins the call already running
    /// under `key`. `start` is only invoked when no call is in flight.
    ///
    /// The second value tells whether the call was joined.
    pub async fn run<F, Fut>(&self, key: &K, start: F) -> (T, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (call, joined) = {
            let mut calls = self.calls.lock();
            match calls.get(key) {
                Some(call) => (call.clone(), true),
                None => {
                    let call = self.track(key.clone(), start());
                    calls.insert(key.clone(), call.clone());
                    (call, false)
                }
            }
        };
        (call.await, joined)
    }

    /// Number of distinct calls currently in flight
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    // The entry is removed by the execution itself, so it disappears even
    // when the caller that started it has gone away.
    fn track<Fut>(&self, key: K, fut: Fut) -> SharedCall<T>
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        let calls = Arc::clone(&self.calls);
        async move {
            let out = fut.await;
            calls.lock().remove(&key);
            out
        }
        .boxed()
        .shared()
    }
}
