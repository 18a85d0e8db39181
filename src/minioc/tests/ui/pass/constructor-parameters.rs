use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use minioc::prelude::*;

pub trait Sink: Send + Sync {
    fn label(&self) -> &'static str;
}

interface!(dyn Sink);

pub trait Flush: Send + Sync {
    fn flush(&self);
}

interface!(dyn Flush);

pub struct Source;

#[injectable]
impl Source {
    #[inject]
    pub fn new() -> Self {
        Source
    }
}

pub struct Console {
    pub flushed: AtomicBool,
}

#[injectable(implements(dyn Sink, dyn Flush), dispose)]
impl Console {
    #[inject]
    pub fn new() -> Self {
        Self {
            flushed: AtomicBool::new(false),
        }
    }
}

impl Sink for Console {
    fn label(&self) -> &'static str {
        "console"
    }
}

impl Flush for Console {
    fn flush(&self) {
        self.flushed.store(true, Ordering::SeqCst);
    }
}

impl Dispose for Console {
    fn dispose(&self) {
        self.flush();
    }
}

pub struct Relay {
    pub source: Arc<Source>,
    pub sinks: Vec<Arc<dyn Sink>>,
}

#[injectable]
impl Relay {
    #[inject]
    pub fn new(source: Arc<Source>, #[all] sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self { source, sinks }
    }

    #[inject]
    pub fn detached(_: Arc<Source>) -> Self {
        Self {
            source: Arc::new(Source),
            sinks: Vec::new(),
        }
    }

    #[inject]
    pub fn with_prefix(source: Arc<Source>, prefix: Arc<String>) -> Self {
        let _ = prefix;
        Self {
            source,
            sinks: Vec::new(),
        }
    }
}

pub struct Wrapper<T> {
    pub inner: Arc<T>,
}

#[injectable]
impl<T> Wrapper<T>
where
    T: Injectable,
{
    #[inject]
    pub fn new(inner: Arc<T>) -> Self {
        Self { inner }
    }
}

fn main() {
    let info = TypeInfo::of::<Relay>();
    assert_eq!(info.constructors().len(), 3);
    assert_eq!(info.constructors()[1].parameters()[0].name(), None);
    assert!(TypeInfo::of::<Console>().is_disposable());

    let container = Container::new();
    container.register_as_named::<dyn Sink, Console>("console");
    let relay = container.resolve::<Relay>().unwrap();
    let labels = relay.sinks.iter().map(|sink| sink.label()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["console"]);

    let console = Arc::new(Console::new());
    container.register_instance::<Console>(Arc::clone(&console));
    container.dispose();
    assert!(console.flushed.load(Ordering::SeqCst));

    let container = Container::new();
    let wrapper = container.resolve::<Wrapper<Source>>().unwrap();
    let _ = &wrapper.inner;
}
