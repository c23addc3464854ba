/// Run an injector before the inner service.
pub mod injector;
