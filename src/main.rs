//! AutoJump CLI - plays the jump game on a device connected over adb

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;

use autojump::android::AdbDevice;
use autojump::config::Settings;
use autojump::vision::DebugSink;
use autojump::Jumper;

#[derive(Parser)]
#[clap(version, about)]
pub struct Args {
    /// Directory holding `<w>x<h>/config.json` and `default.json`
    #[clap(long, default_value = "config")]
    pub config_dir: PathBuf,
    /// Device serial, when more than one is attached
    #[clap(long)]
    pub serial: Option<String>,
    /// adb executable
    #[clap(long, default_value = "adb")]
    pub adb: PathBuf,
    /// Don't save screenshots
    #[clap(long)]
    pub no_debug: bool,
    /// Skip the start confirmation
    #[clap(long)]
    pub yes: bool,
    /// Stop after this many jumps
    #[clap(long)]
    pub max_jumps: Option<u64>,
}

fn confirm() -> anyhow::Result<bool> {
    print!("Open the game and tap start, then continue? [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if !args.yes && !confirm()? {
        bail!("aborted");
    }

    let mut device = AdbDevice::new(args.serial).with_adb_path(args.adb);
    match device.device_info() {
        Ok(info) => log::info!(
            "Device {} (Android {}), {}, {}",
            info.model,
            info.android_version,
            info.screen_size,
            info.density
        ),
        Err(e) => log::warn!("Could not read device info: {}", e),
    }

    let (width, height) = device.screen_size().context("failed to read screen size")?;
    let mut settings = Settings::load_for_resolution(&args.config_dir, width, height)
        .context("failed to load config")?;
    if args.no_debug {
        settings.debug.enabled = false;
    }

    device
        .probe_screenshot()
        .context("no working screenshot method")?;

    let debug = DebugSink::from_settings(&settings.debug)
        .context("failed to create screenshot directory")?;
    let mut jumper = Jumper::new(settings);
    if let Some(sink) = debug {
        log::info!("Saving screenshots to {}", sink.dir().display());
        jumper = jumper.with_debug_sink(sink);
    }

    loop {
        if let Some(max) = args.max_jumps {
            if jumper.game_state.jumps_total >= max {
                log::info!("Reached {} jumps, stopping", max);
                break;
            }
        }

        let report = jumper.run_iteration(&mut device)?;
        if let Some(secs) = report.rest_secs {
            thread::sleep(Duration::from_secs(secs));
        }
        thread::sleep(Duration::from_millis(report.delay_ms));
    }

    let state = &jumper.game_state;
    log::info!(
        "Session over: {} jumps, {} rests, {} failed detections",
        state.jumps_total,
        state.rests_taken,
        state.failed_detections
    );
    Ok(())
}
