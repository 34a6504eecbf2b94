mod config;
mod error;
mod fingerprint;
mod stage;
mod sync;
#[cfg(test)]
mod testutil;
mod updater;
mod workspace;

use crate::sync::SyncOutcome;
use anyhow::Result;
use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut check_only = false;
    let mut assume_yes = false;
    let mut save = false;
    let mut remote_override = None;
    let mut target_override = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--check" | "-c" => check_only = true,
            "--yes" | "-y" => assume_yes = true,
            "--save" => save = true,
            "--remote" => {
                if let Some(url) = args.next() {
                    remote_override = Some(url);
                } else {
                    eprintln!("--remote requires a URL");
                }
            }
            "--target" => {
                if let Some(dir) = args.next() {
                    target_override = Some(PathBuf::from(dir));
                } else {
                    eprintln!("--target requires a directory");
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => eprintln!("unknown argument: {other}"),
        }
    }

    let mut config = config::LauncherConfig::load_or_create()?;
    if let Some(url) = remote_override {
        config.remote_url = url;
    }
    if let Some(dir) = target_override {
        config.target_dir = Some(dir);
    }
    if save {
        config.save()?;
    }

    let Some(target_dir) = config.target_dir.clone() else {
        anyhow::bail!("no target directory configured; pass --target <dir> (add --save to remember it)");
    };

    if check_only {
        return match updater::needs_update(&config.remote_url, &target_dir) {
            Ok(true) => {
                println!("Update available for {}", target_dir.display());
                Ok(())
            }
            Ok(false) => {
                println!("Mods are up to date.");
                Ok(())
            }
            Err(err) => {
                eprintln!("Update status unknown; not claiming up to date.");
                Err(err.into())
            }
        };
    }

    let confirm_before_sync = config.confirm_before_sync;
    let confirm = || {
        if assume_yes || !confirm_before_sync {
            return true;
        }
        prompt_confirm(&target_dir)
    };

    match updater::check_and_sync(&config.remote_url, &target_dir, confirm) {
        Ok(SyncOutcome::NoUpdateNeeded) => println!("Mods are up to date."),
        Ok(SyncOutcome::UpdateAbortedByCaller) => println!("Update aborted."),
        Ok(SyncOutcome::UpdateApplied(report)) => {
            for failure in &report.failures {
                eprintln!("warning: {failure}");
            }
            println!(
                "Mods updated: {} file(s) installed, {} removed{}.",
                report.copied,
                report.removed,
                if report.failures.is_empty() {
                    String::new()
                } else {
                    format!(", {} failure(s) reported", report.failures.len())
                }
            );
        }
        Ok(SyncOutcome::UpdateFailed { reason }) => anyhow::bail!("update failed: {reason}"),
        Err(err) => {
            eprintln!("Update status unknown; not claiming up to date.");
            return Err(err.into());
        }
    }

    Ok(())
}

fn prompt_confirm(target: &Path) -> bool {
    print!("Replace mods in {}? [y/N]: ", target.display());
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_help() {
    println!("runeward");
    println!("  --check, -c       Report update status without syncing");
    println!("  --yes, -y         Skip the confirmation prompt");
    println!("  --remote <url>    Override the modpack archive URL");
    println!("  --target <dir>    Override the mod directory to sync");
    println!("  --save            Persist --remote/--target to the config file");
    println!("  --help, -h        Show this help");
}
