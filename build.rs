use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Forward a local .env into compile-time env (read with option_env!)
    let env_file = Path::new(".env");

    if env_file.exists() {
        println!("cargo:rerun-if-changed=.env");

        if let Ok(contents) = fs::read_to_string(env_file) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"');

                    // Real environment wins over .env
                    if env::var(key).is_err() {
                        println!("cargo:rustc-env={}={}", key, value);
                    }
                }
            }
        }
    }

    for key in [
        "BASE_PATH",
        "API_TIMEOUT_MS",
        "VIDEO_READY_TIMEOUT_MS",
        "ZOOM_MIN",
        "ZOOM_MAX",
        "FOCUS_INDICATOR_MS",
        "SUCCESS_CLOSE_DELAY_MS",
        "DEFAULT_LANGUAGE",
        "ENABLE_LOGGING",
    ] {
        println!("cargo:rerun-if-env-changed={}", key);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
