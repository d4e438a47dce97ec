//! Layered diorama viewer
//!
//! Controls:
//!   E / Q           - push layers apart / together
//!   Scroll          - same as Q / E, two steps per line
//!   Space / LCtrl   - zoom in / out
//!   Left mouse drag - rotate the diorama
//!   WASD, arrows    - move and turn the eye
//!   R               - toggle black / white background
//!   Escape          - exit

use layered_diorama::{app, DioramaConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"),
    )
    .init();

    match app::run(DioramaConfig::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
