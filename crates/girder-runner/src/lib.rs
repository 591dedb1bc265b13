pub mod config;
pub mod controller;
pub mod debounce;
pub mod slots;
pub mod timer;

pub use config::LoopConfig;
pub use controller::{GameLoopController, InputSender};
pub use debounce::JumpDebounce;
pub use slots::{SaveError, SaveSlots};
pub use timer::RepeatingTimer;

/// Install `env_logger` as the `log` backend, honoring `RUST_LOG`
/// (default level: info). Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
