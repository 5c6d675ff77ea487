pub mod common;
pub mod failure_injection;
pub mod lifecycle;
pub mod scenarios;

pub fn init_test_environment() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
