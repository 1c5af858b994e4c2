//! # scenevm
//!
//! Memory console for the scene virtual machine.
//!
//! `scenevm [SAVE_DIR]` keeps global memory and save slots in
//! `SAVE_DIR`, `./saves` when not given. Set `RUST_LOG` for more detail.
//!

use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scenevm=warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let save_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./saves"));
    scenevm::term::main(save_dir);
}
