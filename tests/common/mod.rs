//! Shared helpers for integration tests

#![allow(dead_code)]

use hash_navigator::{EntryState, MemoryHost, RouteEntry, RouteStatus, Router, RouterConfig};
use std::cell::RefCell;
use std::rc::Rc;

pub const BASE: &str = "app://local/index.html";

/// Initialise `env_logger` once; repeated calls are harmless
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn url(hash: &str) -> String {
    format!("{BASE}#{hash}")
}

pub fn state(value: serde_json::Value) -> EntryState {
    value.as_object().cloned().unwrap_or_default()
}

pub fn config() -> RouterConfig {
    RouterConfig::new("home").routes(["home", "about", "profile/:id", "item/:name/info/:id"])
}

pub fn host(initial: &str) -> Rc<MemoryHost> {
    init_logging();
    Rc::new(MemoryHost::new(initial))
}

/// One `on_change` call
#[derive(Debug, Clone, PartialEq)]
pub struct Observed {
    pub hash: String,
    pub previous: Option<String>,
    pub status: RouteStatus,
}

/// Collects every `on_change` call
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<Observed>>>,
}

impl Recorder {
    pub fn callback(&self) -> impl Fn(&RouteEntry, Option<&RouteEntry>, RouteStatus) + 'static {
        let calls = self.calls.clone();
        move |entry, previous, status| {
            calls.borrow_mut().push(Observed {
                hash: entry.hash.clone(),
                previous: previous.map(|p| p.hash.clone()),
                status,
            });
        }
    }

    pub fn calls(&self) -> Vec<Observed> {
        self.calls.borrow().clone()
    }

    pub fn hashes(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|o| o.hash.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }
}

/// A created router over a fresh host, with a recorder attached
pub fn created_router(initial: &str) -> (Rc<MemoryHost>, Router, Recorder) {
    let host = host(initial);
    let router = Router::new(host.clone());
    let recorder = Recorder::default();
    // The subscription stays registered until destroy; dropping it does not cancel
    router
        .create(config(), recorder.callback())
        .expect("valid test config");
    (host, router, recorder)
}

pub fn hashes(router: &Router) -> Vec<String> {
    router.entries().iter().map(|e| e.hash.clone()).collect()
}
