use std::io;
use std::num::ParseIntError;
use std::sync::Arc;

use minioc::introspect::BoxError;
use minioc::prelude::*;

pub struct Clock;

#[injectable]
impl Clock {
    #[inject]
    pub fn new() -> Clock {
        Clock
    }
}

pub struct Settings {
    pub workers: usize,
}

#[injectable]
impl Settings {
    #[inject]
    pub fn parse(raw: Arc<String>) -> Result<Settings, ParseIntError> {
        Ok(Self {
            workers: raw.parse()?,
        })
    }
}

pub struct Journal;

#[injectable]
impl Journal {
    #[inject]
    pub fn open(_clock: Arc<Clock>) -> Result<Self, io::Error> {
        Err(io::Error::other("read-only file system"))
    }
}

pub struct Scheduler {
    pub workers: usize,
}

#[injectable]
impl Scheduler {
    #[inject]
    pub fn new(
        settings: Arc<Settings>,
        _clock: Arc<Clock>,
    ) -> std::result::Result<Self, BoxError> {
        if settings.workers == 0 {
            return Err("a scheduler needs workers".into());
        }
        Ok(Self {
            workers: settings.workers,
        })
    }
}

fn main() {
    let container = Container::new();
    container.register_instance(Arc::new(String::from("4")));

    assert_eq!(container.resolve::<Scheduler>().unwrap().workers, 4);
    assert!(container.resolve::<Journal>().is_err());

    container.register_instance(Arc::new(String::from("0")));
    assert!(container.resolve::<Scheduler>().is_err());

    container.register_instance(Arc::new(String::from("many")));
    assert!(container.resolve::<Settings>().is_err());
}
