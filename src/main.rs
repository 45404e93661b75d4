//! Preview window for spritefx presets.

use std::path::PathBuf;

use spritefx::viewer::{default_preset, Viewer};

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map_or_else(|| default_preset().to_path_buf(), PathBuf::from);

    if !path.exists() {
        log::error!("Usage: spritefx [preset.toml] ({} not found)", path.display());
        std::process::exit(1);
    }

    let title = format!(
        "spritefx - {}",
        path.file_stem().map_or_else(String::new, |s| s.to_string_lossy().into_owned())
    );

    if let Err(e) = Viewer::builder().with_path(path).with_title(title).build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
