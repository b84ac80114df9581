use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;

/// (output name, entry point, profile) for each embedded shader
const SHADERS: &[(&str, &str, &str)] = &[
    ("waveform_vs.cso", "vs_main", "vs_4_0"),
    ("waveform_ps.cso", "ps_main", "ps_4_0"),
];

const SHADER_SOURCE: &str = "shaders/waveform.hlsl";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set by cargo"));

    if env::var_os("CARGO_FEATURE_OPENGL").is_some() {
        generate_gl_bindings(&out_dir);
    }

    if env::var_os("CARGO_FEATURE_D3D11").is_some() {
        build_shaders(&out_dir);
    }
}

fn generate_gl_bindings(out_dir: &Path) {
    let mut file =
        File::create(out_dir.join("gl_bindings.rs")).expect("failed to create gl_bindings.rs");

    // glBegin/glEnd and the matrix stack live in the compatibility profile
    Registry::new(Api::Gl, (2, 1), Profile::Compatibility, Fallbacks::None, [])
        .write_bindings(StructGenerator, &mut file)
        .expect("failed to generate GL bindings");
}

/// Produce the shader binaries that get embedded with `include_bytes!`.
///
/// Binaries checked in under `shaders/` are copied as-is; otherwise `fxc`
/// (or the compiler named by `FXC`) builds them from the HLSL source.
fn build_shaders(out_dir: &Path) {
    println!("cargo:rerun-if-changed={}", SHADER_SOURCE);
    println!("cargo:rerun-if-env-changed=FXC");

    let fxc = env::var("FXC").unwrap_or_else(|_| "fxc".to_string());

    for &(name, entry, profile) in SHADERS {
        let prebuilt = Path::new("shaders").join(name);
        let target = out_dir.join(name);
        println!("cargo:rerun-if-changed={}", prebuilt.display());

        if prebuilt.exists() {
            fs::copy(&prebuilt, &target).expect("failed to copy prebuilt shader");
            continue;
        }

        let status = Command::new(&fxc)
            .args(["/nologo", "/O3", "/T", profile, "/E", entry, "/Fo"])
            .arg(&target)
            .arg(SHADER_SOURCE)
            .status()
            .unwrap_or_else(|e| panic!("failed to run {} for {}: {}", fxc, entry, e));

        assert!(status.success(), "{} failed to compile {} ({})", fxc, entry, profile);
    }
}
