use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Каталог target/<profile>, куда cargo кладёт бинарник
fn profile_dir() -> Option<PathBuf> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").ok()?);
    let profile = env::var("PROFILE").ok()?;
    out_dir
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}

// config.toml из корня workspace копируется рядом с бинарником,
// где его ищет shared::config::load_config
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config.toml");
    if !source.exists() {
        println!("cargo:warning=config.toml not found, backend will use the embedded defaults");
        return;
    }

    let Some(target) = profile_dir() else {
        println!("cargo:warning=cannot locate target profile directory, config.toml not copied");
        return;
    };

    if let Err(e) = fs::copy(&source, target.join("config.toml")) {
        println!("cargo:warning=failed to copy config.toml: {}", e);
    }
}
