//! Build automation tasks for Sam's Platformer
//!
//! Usage:
//!   cargo xtask build-web       # Build WASM for web deployment
//!   cargo xtask package-itch    # Create zip for itch.io upload

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;

const GAME_NAME: &str = "sams-platformer";
const GAME_TITLE: &str = "Sam's Platformer";
const MQ_JS_BUNDLE_URL: &str =
    "https://raw.githubusercontent.com/not-fl3/macroquad/v0.4.14/js/mq_js_bundle.js";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for Sam's Platformer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build WASM for web deployment
    BuildWeb {
        /// Mark as dev build (adds DEV banner to the page title)
        #[arg(long)]
        dev: bool,
    },
    /// Create zip file ready for itch.io upload
    PackageItch,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::BuildWeb { dev } => build_web(dev),
        Commands::PackageItch => package_itch(),
    }
}

/// Get the project root directory
fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

/// Run a command and check for success
fn run_cmd(cmd: &mut Command) -> Result<()> {
    let status = cmd.status().context("Failed to execute command")?;
    if !status.success() {
        anyhow::bail!("Command failed with status: {}", status);
    }
    Ok(())
}

/// Download a file from URL to destination
fn download_file(url: &str, dest: &Path) -> Result<()> {
    println!("Downloading {}...", url);
    run_cmd(Command::new("curl").args(["-L", "-o"]).arg(dest).arg(url))
}

/// Copy directory recursively
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// The web shell hosting the WASM build
fn index_html(dev: bool) -> String {
    let title = if dev {
        format!("[DEV] {}", GAME_TITLE)
    } else {
        GAME_TITLE.to_string()
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        html, body, canvas {{
            margin: 0; padding: 0; width: 100%; height: 100%;
            overflow: hidden; background: black;
        }}
    </style>
</head>
<body>
    <canvas id="glcanvas" tabindex="1"></canvas>
    <script src="mq_js_bundle.js"></script>
    <script>load("{GAME_NAME}.wasm");</script>
</body>
</html>
"#
    )
}

/// Build WASM for web deployment
fn build_web(dev: bool) -> Result<()> {
    let root = project_root();
    let dist = root.join("dist/web");

    println!("Building WASM...");
    run_cmd(
        Command::new("cargo")
            .current_dir(&root)
            .args(["build", "--release", "--target", "wasm32-unknown-unknown"]),
    )?;

    // Clean and create dist folder
    if dist.exists() {
        std::fs::remove_dir_all(&dist)?;
    }
    std::fs::create_dir_all(&dist)?;

    println!("Copying files to dist/web...");
    std::fs::copy(
        root.join(format!(
            "target/wasm32-unknown-unknown/release/{}.wasm",
            GAME_NAME
        )),
        dist.join(format!("{}.wasm", GAME_NAME)),
    )?;

    std::fs::write(dist.join("index.html"), index_html(dev))?;

    // Download macroquad JS bundle
    let mq_js = dist.join("mq_js_bundle.js");
    if !mq_js.exists() {
        download_file(MQ_JS_BUNDLE_URL, &mq_js)?;
    }

    // Copy assets
    copy_dir_recursive(&root.join("assets"), &dist.join("assets"))?;

    println!("Web build complete: dist/web/");
    Ok(())
}

/// Create zip for itch.io
fn package_itch() -> Result<()> {
    // First build web
    build_web(false)?;

    let root = project_root();
    let dist = root.join("dist");
    let zip_name = format!("{}-itch.zip", GAME_NAME);
    let zip_path = dist.join(&zip_name);

    // Remove old zip if exists
    if zip_path.exists() {
        std::fs::remove_file(&zip_path)?;
    }

    println!("Creating itch.io zip...");
    run_cmd(
        Command::new("zip")
            .current_dir(dist.join("web"))
            .args(["-r", &format!("../{}", zip_name), "."]),
    )?;

    println!("itch.io package ready: dist/{}", zip_name);
    Ok(())
}
