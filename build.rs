use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // pkg-config finds FFmpeg everywhere but on Windows.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match vcpkg_ffmpeg_dir() {
        Some(dir) if dir.exists() => report_vcpkg_install(&dir),
        Some(dir) => println!(
            "cargo:warning=VCPKG_ROOT is set but {} does not exist; install ffmpeg with vcpkg or set FFMPEG_DIR.",
            dir.display(),
        ),
        None => println!(
            "cargo:warning=framescrub needs FFmpeg development libraries. On Windows set FFMPEG_DIR, or VCPKG_ROOT for a vcpkg install."
        ),
    }
}

/// `<VCPKG_ROOT>/installed/<triplet>`, if `VCPKG_ROOT` is set.
fn vcpkg_ffmpeg_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    Some(Path::new(&root).join("installed").join(triplet))
}

fn report_vcpkg_install(dir: &Path) {
    println!(
        "cargo:warning=Using vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to silence this message.",
        dir.display(),
    );
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        println!("cargo:warning=Set VCPKGRS_DYNAMIC=1 if the vcpkg FFmpeg build is dynamic.");
    }
}
