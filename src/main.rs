#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use std::process::ExitCode;

use floatboard::config::ConfigStore;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = match ConfigStore::default_location() {
        Ok(store) => store,
        Err(err) => {
            log::error!("Cannot locate the configuration store: {err}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Configuration store at {}", store.root().display());

    match run(store) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("floatboard stopped: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(windows)]
fn run(store: ConfigStore) -> Result<(), floatboard::platform::PlatformError> {
    floatboard::ui::desktop::run(store)
}

/// Without a desktop surface the store is loaded, reported and saved back
#[cfg(not(windows))]
fn run(store: ConfigStore) -> Result<(), floatboard::platform::PlatformError> {
    use floatboard::app::{HeadlessHost, TrayController};

    let mut controller = TrayController::start(store, HeadlessHost::default());
    log::info!("{} zone(s) restored; no desktop surface on this platform", controller.zones().len());
    controller.quit();
    Ok(())
}
