use once_cell::sync::{Lazy, OnceCell};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::debug;

/// Environment variable holding the integration routing key
pub const ROUTING_KEY_ENV: &str = "ROUTING_KEY";

type Provider = dyn Fn() -> Option<String> + Send + Sync;

static PROCESS_CONTEXT: Lazy<EventContext> =
    Lazy::new(|| EventContext::new(routing_key_from_env, host_name));

/// A string computed at most once from its provider and cached afterwards
///
/// Clones share the cache. Surrounding whitespace is trimmed and blank values
/// are cached as `None`.
#[derive(Clone)]
pub struct CachedValue {
    cell: Arc<OnceCell<Option<String>>>,
    provider: Arc<Provider>,
}

impl CachedValue {
    /// Wrap a provider; it is not called until the first read
    pub fn new<F>(provider: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self {
            cell: Arc::new(OnceCell::new()),
            provider: Arc::new(provider),
        }
    }

    /// Return the cached value, running the provider on first access
    pub fn get(&self) -> Option<&str> {
        self.cell
            .get_or_init(|| {
                (self.provider)()
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
            })
            .as_deref()
    }
}

impl Debug for CachedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedValue")
            .field("initialized", &self.cell.get().is_some())
            .finish()
    }
}

/// Values every event derives from its environment rather than from the caller
///
/// The routing key selects the integration receiving events, the source names
/// the machine sending them. Both are read lazily, once, and then shared by
/// every client holding a clone of the context.
#[derive(Clone)]
pub struct EventContext {
    routing_key: CachedValue,
    source: CachedValue,
}

impl EventContext {
    /// Build a context from custom providers
    pub fn new<R, S>(routing_key: R, source: S) -> Self
    where
        R: Fn() -> Option<String> + Send + Sync + 'static,
        S: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self {
            routing_key: CachedValue::new(routing_key),
            source: CachedValue::new(source),
        }
    }

    /// Build a context from known values
    pub fn fixed(routing_key: &str, source: &str) -> Self {
        let routing_key = routing_key.to_string();
        let source = source.to_string();
        Self::new(move || Some(routing_key.clone()), move || Some(source.clone()))
    }

    /// The process-wide context
    ///
    /// Routing key from the `ROUTING_KEY` environment variable, source from the
    /// host name. All returned handles share the same cache.
    pub fn process() -> Self {
        PROCESS_CONTEXT.clone()
    }

    /// Get the routing key, reading it on first access
    pub fn routing_key(&self) -> Option<&str> {
        self.routing_key.get()
    }

    /// Get the source host name, reading it on first access
    pub fn source(&self) -> Option<&str> {
        self.source.get()
    }
}

impl Debug for EventContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventContext")
            .field("routing_key", &"<redacted>")
            .field("source", &self.source.cell.get())
            .finish()
    }
}

fn routing_key_from_env() -> Option<String> {
    let key = std::env::var(ROUTING_KEY_ENV).ok();
    debug!(present = key.is_some(), "Read routing key from environment");
    key
}

fn host_name() -> Option<String> {
    gethostname::gethostname().into_string().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_cached_value_trims() {
        let value = CachedValue::new(|| Some("  key-123 \n".to_string()));
        assert_eq!(value.get(), Some("key-123"));
    }

    #[test]
    fn test_cached_value_blank_is_none() {
        let value = CachedValue::new(|| Some("   ".to_string()));
        assert_eq!(value.get(), None);

        let value = CachedValue::new(|| None);
        assert_eq!(value.get(), None);
    }

    #[test]
    fn test_cached_value_ignores_later_changes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let value = CachedValue::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Some(format!("value-{n}"))
        });

        assert_eq!(value.get(), Some("value-0"));
        assert_eq!(value.get(), Some("value-0"));

        let shared = value.clone();
        assert_eq!(shared.get(), Some("value-0"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_access() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let value = CachedValue::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Some(format!("routing-{n}"))
        });

        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let value = value.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    value.get().map(str::to_string)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let first = results[0].clone();
        assert!(first.is_some());
        assert!(results.iter().all(|r| *r == first));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fixed_context() {
        let context = EventContext::fixed("rk", "host-a");
        assert_eq!(context.routing_key(), Some("rk"));
        assert_eq!(context.source(), Some("host-a"));
    }

    #[test]
    fn test_debug_redacts_routing_key() {
        let context = EventContext::fixed("secret-key", "host-a");
        context.routing_key();
        let debug = format!("{context:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_process_context_is_shared() {
        let first = EventContext::process();
        let second = EventContext::process();
        assert_eq!(first.source(), second.source());
        assert_eq!(first.routing_key(), second.routing_key());
        assert!(first.source().is_some());
    }

    #[test]
    fn test_routing_key_read_from_env_trimmed_and_cached() {
        Jail::expect_with(|jail| {
            jail.set_env(ROUTING_KEY_ENV, "  rk-env \n");
            let context = EventContext::new(routing_key_from_env, host_name);
            assert_eq!(context.routing_key(), Some("rk-env"));

            jail.set_env(ROUTING_KEY_ENV, "changed");
            assert_eq!(context.routing_key(), Some("rk-env"));
            assert_eq!(context.clone().routing_key(), Some("rk-env"));
            Ok(())
        });
    }
}
