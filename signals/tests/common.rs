use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    let level = std::env::var("LOG_LEVEL").ok().and_then(|level| Level::from_str(&level).ok()).unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt().with_max_level(level).with_test_writer().try_init();
}

/// Returns a recorder to hand to slots, and a check that drains everything recorded so far
#[allow(unused)]
pub fn watcher<T: 'static>() -> (Rc<dyn Fn(T)>, Box<dyn Fn() -> Vec<T>>) {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let record = {
        let changes = changes.clone();
        Rc::new(move |value: T| changes.borrow_mut().push(value)) as Rc<dyn Fn(T)>
    };

    let check = Box::new(move || changes.borrow_mut().drain(..).collect::<Vec<T>>());

    (record, check)
}

/// Runs its closure when dropped
#[allow(unused)]
pub struct OnDrop(Option<Box<dyn FnOnce()>>);

#[allow(unused)]
impl OnDrop {
    pub fn new(f: impl FnOnce() + 'static) -> Self { Self(Some(Box::new(f))) }
}

impl Drop for OnDrop {
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f()
        }
    }
}
