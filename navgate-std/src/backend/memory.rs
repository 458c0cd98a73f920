use crate::url::{clean_path, normalize_base, strip_base};
use navgate_core::{ListenerHandle, LocationBackend, PopHandler};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

struct Stack {
    entries: Vec<String>,
    index: usize,
    mutations: usize,
    handlers: Vec<(u64, PopHandler)>,
    next_handler: u64,
}

struct Shared {
    base: String,
    stack: Mutex<Stack>,
}

/// An in-memory history stack.
///
/// Entries are stored with the base path applied, exactly as a browser would
/// show them; every [`LocationBackend`] method speaks app-relative locations.
/// [`go`](LocationBackend::go) moves through the stack and reports the new
/// location to pop handlers, the way a browser fires `popstate`.
///
/// Clones share the same stack.
///
/// # Example
///
/// ```rust
/// use navgate_core::LocationBackend;
/// use navgate_std::backend::MemoryBackend;
///
/// let backend = MemoryBackend::new(Some("/app/"));
/// backend.push("/users?page=2");
/// assert_eq!(backend.current_location(), "/users?page=2");
/// assert_eq!(backend.entries(), vec!["/app/", "/app/users?page=2"]);
/// ```
#[derive(Clone)]
pub struct MemoryBackend {
    shared: Arc<Shared>,
}

impl MemoryBackend {
    /// Create a backend serving the app under `base`, positioned at `/`.
    pub fn new(base: Option<&str>) -> Self {
        let base = normalize_base(base);
        let root = clean_path(&format!("{base}/"));
        Self {
            shared: Arc::new(Shared {
                base,
                stack: Mutex::new(Stack {
                    entries: vec![root],
                    index: 0,
                    mutations: 0,
                    handlers: Vec::new(),
                    next_handler: 0,
                }),
            }),
        }
    }

    /// Position the first entry at `location` instead of `/`.
    pub fn starting_at(self, location: &str) -> Self {
        let url = self.absolute(location);
        {
            let mut stack = self.shared.stack.lock();
            stack.entries[0] = url;
        }
        self
    }

    /// The normalized base path.
    pub fn base(&self) -> &str {
        &self.shared.base
    }

    /// Every entry, base included, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.shared.stack.lock().entries.clone()
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.shared.stack.lock().index
    }

    /// How many times `push` or `replace` ran.
    pub fn mutations(&self) -> usize {
        self.shared.stack.lock().mutations
    }

    fn absolute(&self, location: &str) -> String {
        clean_path(&format!("{}{location}", self.shared.base))
    }
}

impl LocationBackend for MemoryBackend {
    fn push(&self, url: &str) {
        let url = self.absolute(url);
        let mut stack = self.shared.stack.lock();
        let keep = stack.index + 1;
        stack.entries.truncate(keep);
        stack.entries.push(url);
        stack.index = keep;
        stack.mutations += 1;
    }

    fn replace(&self, url: &str) {
        let url = self.absolute(url);
        let mut stack = self.shared.stack.lock();
        let index = stack.index;
        stack.entries[index] = url;
        stack.mutations += 1;
    }

    fn go(&self, delta: isize) {
        let (location, handlers) = {
            let mut stack = self.shared.stack.lock();
            let Some(target) = stack.index.checked_add_signed(delta) else {
                return;
            };
            if target >= stack.entries.len() || target == stack.index {
                return;
            }
            stack.index = target;
            let location = strip_base(&self.shared.base, &stack.entries[target]);
            let handlers: Vec<PopHandler> = stack.handlers.iter().map(|(_, h)| h.clone()).collect();
            (location, handlers)
        };
        for handler in handlers {
            handler(location.clone());
        }
    }

    fn current_location(&self) -> String {
        let stack = self.shared.stack.lock();
        strip_base(&self.shared.base, &stack.entries[stack.index])
    }

    fn setup_listeners(&self, on_pop: PopHandler) -> Vec<ListenerHandle> {
        let id = {
            let mut stack = self.shared.stack.lock();
            let id = stack.next_handler;
            stack.next_handler += 1;
            stack.handlers.push((id, on_pop));
            id
        };
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let cleanup: ListenerHandle = Box::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.stack.lock().handlers.retain(|(handler, _)| *handler != id);
            }
        });
        vec![cleanup]
    }
}
