use std::sync::Arc;

use minioc::prelude::*;

fn main() {
    let container = build_container("greeter");
    let app = container.resolve::<App>().unwrap();
    app.run();
}

fn build_container(app_name: &str) -> Arc<Container> {
    let container = Container::new();

    container.register_instance_named("app_name", Arc::new(app_name.to_owned()));

    container.register_factory::<dyn Logger, _>(|resolver, _| {
        let app_name = resolver.resolve_named::<String>("app_name")?;
        Ok(Arc::new(ConsoleLogger { app_name }))
    });

    container.register_as_named::<dyn Greeter, EnglishGreeter>("english");
    container.register_as_named::<dyn Greeter, ChineseGreeter>("chinese");

    container.register::<App>().as_singleton().unwrap();

    container
}

trait Logger: Send + Sync + 'static {
    fn log(&self, message: &str);
}

interface!(dyn Logger);

struct ConsoleLogger {
    app_name: Arc<String>,
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name, message);
    }
}

trait Greeter: Send + Sync + 'static {
    fn greet(&self);
}

interface!(dyn Greeter);

struct EnglishGreeter {
    logger: Arc<dyn Logger>,
}

#[injectable(implements(dyn Greeter))]
impl EnglishGreeter {
    #[inject]
    fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Greeter for EnglishGreeter {
    fn greet(&self) {
        self.logger.log("Hello World!");
    }
}

struct ChineseGreeter {
    logger: Arc<dyn Logger>,
}

#[injectable(implements(dyn Greeter))]
impl ChineseGreeter {
    #[inject]
    fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Greeter for ChineseGreeter {
    fn greet(&self) {
        self.logger.log("你好世界!");
    }
}

struct App {
    logger: Arc<dyn Logger>,
    greeters: Vec<Arc<dyn Greeter>>,
}

#[injectable]
impl App {
    #[inject]
    fn new(logger: Arc<dyn Logger>, #[all] greeters: Vec<Arc<dyn Greeter>>) -> Self {
        Self { logger, greeters }
    }

    fn run(&self) {
        self.logger.log("Greeting from minioc managed objects:");
        for greeter in &self.greeters {
            greeter.greet();
        }
    }
}
