use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::mem;
use std::thread::{self, ThreadId};

use oneshot::{Receiver, Sender};
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::container::resolver::{CallContext, ConstructionError, Request, Resolver};
use crate::container::selector::{self, Constructed};
use crate::container::SharedManaged;
use crate::dispose::Disposer;
use crate::introspect::Implementation;
use crate::strategy::MultiInstanceStrategy;

/// Builds one object on first request and hands out that object afterwards.
///
/// The lock is not held while the object is being built. Other threads
/// requesting it in the meantime wait for the outcome, and the building
/// thread requesting it again fails with a cyclic dependency.
pub struct SingletonStrategy {
    implementation: Implementation,
    constructor: Option<usize>,
    state: Mutex<SingletonState>,
}

enum SingletonState {
    Vacant,
    Constructing {
        on_thread: ThreadId,
        waiters: Vec<Sender<WaitResponse>>,
    },
    Constructed {
        object: Box<dyn SharedManaged>,
        disposer: Option<Disposer>,
    },
}

type WaitResponse = Result<Box<dyn SharedManaged>, ConstructionError>;

impl SingletonStrategy {
    pub fn new(implementation: Implementation) -> Self {
        Self::from_parts(implementation, None)
    }

    pub(crate) fn from_parts(implementation: Implementation, constructor: Option<usize>) -> Self {
        Self {
            implementation,
            constructor,
            state: Mutex::new(SingletonState::Vacant),
        }
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    pub fn constructor(&self) -> Option<usize> {
        self.constructor
    }

    pub fn with_constructor(&self, index: usize) -> Self {
        Self::from_parts(self.implementation.clone(), Some(index))
    }

    pub fn to_multi_instance(&self) -> MultiInstanceStrategy {
        MultiInstanceStrategy::from_parts(self.implementation.clone(), self.constructor)
    }

    pub fn is_constructed(&self) -> bool {
        matches!(*self.state.lock(), SingletonState::Constructed { .. })
    }

    /// Returns the cached object, building it first if needed. The request's
    /// parameters only take effect on the call that builds the object.
    pub fn produce(
        &self,
        resolver: &dyn Resolver,
        request: &Request,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, ConstructionError> {
        let mut state = self.state.lock();
        match &mut *state {
            SingletonState::Constructed { object, .. } => Ok(object.dyn_clone()),
            SingletonState::Constructing { on_thread, waiters } => {
                if *on_thread == thread::current().id() {
                    Err(ConstructionError::CyclicDependency {
                        implementation: self.implementation.info().name(),
                    })
                } else {
                    let (sender, receiver) = oneshot::channel();
                    waiters.push(sender);
                    drop(state);
                    self.wait_for_object(receiver)
                }
            }
            SingletonState::Vacant => self.construct(state, resolver, request, context),
        }
    }

    /// Blocks until the constructing thread reports. A dropped sender means
    /// that thread unwound out of the constructor.
    fn wait_for_object(&self, receiver: Receiver<WaitResponse>) -> WaitResponse {
        receiver.recv().unwrap_or_else(|_| {
            Err(ConstructionError::Abandoned {
                implementation: self.implementation.info().name(),
            })
        })
    }

    fn construct(
        &self,
        mut state: MutexGuard<'_, SingletonState>,
        resolver: &dyn Resolver,
        request: &Request,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, ConstructionError> {
        *state = SingletonState::Constructing {
            on_thread: thread::current().id(),
            waiters: Vec::new(),
        };
        drop(state);

        let guard = ConstructionGuard { state: &self.state };
        let result = selector::construct(
            resolver,
            &self.implementation,
            self.constructor,
            request,
            context,
        );
        mem::forget(guard);

        let mut state = self.state.lock();
        let waiters = match mem::replace(&mut *state, SingletonState::Vacant) {
            SingletonState::Constructing { waiters, .. } => waiters,
            _ => unreachable!("only the constructing thread may leave the constructing state"),
        };

        match result {
            Ok(Constructed { object, disposer }) => {
                debug!(
                    implementation = self.implementation.info().name(),
                    "constructed singleton"
                );
                *state = SingletonState::Constructed {
                    object: object.dyn_clone(),
                    disposer,
                };
                drop(state);
                notify(waiters, || Ok(object.dyn_clone()));
                Ok(object)
            }
            Err(err) => {
                drop(state);
                notify(waiters, || Err(err.clone()));
                Err(err)
            }
        }
    }

    pub fn can_produce(
        &self,
        resolver: &dyn Resolver,
        request: &Request,
        context: &CallContext<'_>,
    ) -> bool {
        match &*self.state.lock() {
            SingletonState::Constructed { .. } => return true,
            SingletonState::Constructing { on_thread, .. } => {
                if *on_thread == thread::current().id() {
                    return false;
                }
            }
            SingletonState::Vacant => {}
        }
        selector::can_construct(
            resolver,
            &self.implementation,
            self.constructor,
            request,
            context,
        )
    }

    /// Disposes the cached object, if any. A later request builds a new one.
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        let disposer = match mem::replace(&mut *state, SingletonState::Vacant) {
            SingletonState::Constructed { disposer, .. } => disposer,
            other => {
                *state = other;
                return;
            }
        };
        drop(state);

        if let Some(disposer) = disposer {
            debug!(
                implementation = self.implementation.info().name(),
                "disposing singleton"
            );
            disposer.run();
        }
    }
}

/// Puts a singleton back to vacant if its constructor panics. Dropping the
/// waiters' senders wakes them up.
struct ConstructionGuard<'a> {
    state: &'a Mutex<SingletonState>,
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        let previous = mem::replace(&mut *self.state.lock(), SingletonState::Vacant);
        drop(previous);
    }
}

fn notify<F>(waiters: Vec<Sender<WaitResponse>>, response: F)
where
    F: Fn() -> WaitResponse,
{
    for waiter in waiters {
        let _ = waiter.send(response());
    }
}

impl Debug for SingletonStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SingletonStrategy")
            .field("implementation", &self.implementation)
            .field("constructor", &self.constructor)
            .field("constructed", &self.is_constructed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    use crate::container::resolver::MockResolver;
    use crate::dispose::Dispose;
    use crate::introspect::{BoxError, Injectable, TypeInfo};

    use super::*;

    static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    struct Slow {
        disposed: AtomicUsize,
    }

    impl Dispose for Slow {
        fn dispose(&self) {
            self.disposed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Injectable for Slow {
        fn type_info() -> TypeInfo {
            TypeInfo::concrete::<Self>()
                .constructor(vec![], |_| {
                    CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(50));
                    Ok(Slow {
                        disposed: AtomicUsize::new(0),
                    })
                })
                .disposable()
                .build()
        }
    }

    struct Failing;

    impl Injectable for Failing {
        fn type_info() -> TypeInfo {
            TypeInfo::concrete::<Self>()
                .constructor(vec![], |_| Err("not today".into()))
                .build()
        }
    }

    #[test]
    fn singleton_strategy_constructs_once_across_threads() {
        let strategy = Arc::new(SingletonStrategy::new(Implementation::of_self(
            TypeInfo::of::<Slow>(),
        )));
        let barrier = Arc::new(Barrier::new(4));

        let handles = (0..4)
            .map(|_| {
                let strategy = Arc::clone(&strategy);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let resolver = MockResolver::new();
                    barrier.wait();
                    strategy
                        .produce(&resolver, &Request::of::<Slow>(), &CallContext::root())
                        .unwrap()
                        .downcast_arc::<Slow>()
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();
        let objects = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);
        assert!(objects.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert!(strategy.is_constructed());

        strategy.dispose();
        strategy.dispose();
        assert_eq!(objects[0].disposed.load(Ordering::SeqCst), 1);
        assert!(!strategy.is_constructed());
    }

    #[test]
    fn singleton_strategy_resets_after_failure() {
        let resolver = MockResolver::new();
        let strategy = SingletonStrategy::new(Implementation::of_self(TypeInfo::of::<Failing>()));
        let request = Request::of::<Failing>();

        for _ in 0..2 {
            let err = strategy
                .produce(&resolver, &request, &CallContext::root())
                .unwrap_err();
            assert!(matches!(err, ConstructionError::Constructor { .. }));
            assert!(!strategy.is_constructed());
        }
    }

    static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

    struct Flaky;

    impl Injectable for Flaky {
        fn type_info() -> TypeInfo {
            TypeInfo::concrete::<Self>()
                .constructor(vec![], |_| -> Result<Flaky, BoxError> {
                    if ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
                        thread::sleep(Duration::from_millis(200));
                        panic!("first attempt panics");
                    }
                    Ok(Flaky)
                })
                .build()
        }
    }

    #[test]
    fn singleton_strategy_recovers_from_panicking_constructor() {
        let strategy = Arc::new(SingletonStrategy::new(Implementation::of_self(
            TypeInfo::of::<Flaky>(),
        )));
        let request = Request::of::<Flaky>();

        let builder = {
            let strategy = Arc::clone(&strategy);
            thread::spawn(move || {
                let resolver = MockResolver::new();
                let request = Request::of::<Flaky>();
                let _ = strategy.produce(&resolver, &request, &CallContext::root());
            })
        };
        while ATTEMPTS.load(Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(1));
        }

        let resolver = MockResolver::new();
        let err = strategy
            .produce(&resolver, &request, &CallContext::root())
            .unwrap_err();
        assert!(matches!(err, ConstructionError::Abandoned { .. }));
        assert!(builder.join().is_err());
        assert!(!strategy.is_constructed());

        strategy
            .produce(&resolver, &request, &CallContext::root())
            .unwrap();
        assert!(strategy.is_constructed());
        assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn singleton_strategy_to_multi_instance_keeps_constructor() {
        let strategy = SingletonStrategy::new(Implementation::of_self(TypeInfo::of::<Slow>()))
            .with_constructor(0);
        assert_eq!(strategy.to_multi_instance().constructor(), Some(0));
    }
}
