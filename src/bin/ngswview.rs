use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use ngswconf::report::Report;
use ngswconf::{parse_dir, Watcher};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "ngswview")]
#[command(about = "Compare the text configuration exports of NETGEAR smart switches")]
struct Args {
    /// Directory with `*.conf` exports
    configs_dir: PathBuf,
    /// Where to write the report
    out_file: PathBuf,
    /// Write the parsed configurations as JSON instead of a text report
    #[arg(long)]
    json: bool,
    /// Keep running and rebuild the report when the exports change
    #[arg(long)]
    watch: bool,
    /// Seconds without further changes before rebuilding
    #[arg(long, default_value_t = 30)]
    debounce: u64,
}

fn build(args: &Args) -> io::Result<()> {
    let configs = parse_dir(&args.configs_dir)?;
    let output = if args.json {
        let map: Vec<_> = configs
            .iter()
            .map(|(path, cfg)| serde_json::json!({ "file": path, "configuration": cfg }))
            .collect();
        serde_json::to_string_pretty(&map).map_err(io::Error::from)?
    } else {
        Report::new(configs.iter().map(|(_, cfg)| cfg)).to_string()
    };
    write_atomic(&args.out_file, output.as_bytes())?;
    info!("wrote {} ({} switches)", args.out_file.display(), configs.len());
    Ok(())
}

// Readers of the output never see a half-written file.
fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let mut file = fs::File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp, path)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
}

// Block until the exports changed and then stayed unchanged for `debounce`.
fn wait_for_changes(watcher: &Watcher, debounce: Duration) -> io::Result<()> {
    while !watcher.changed() {
        thread::sleep(POLL_INTERVAL);
    }
    info!("change detected, waiting {}s for more", debounce.as_secs());
    loop {
        watcher.rescan()?;
        thread::sleep(debounce);
        if !watcher.changed() {
            return Ok(());
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.watch {
        if let Err(e) = build(&args) {
            error!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    let watcher = match Watcher::new(&args.configs_dir) {
        Ok(w) => w,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let debounce = Duration::from_secs(args.debounce);
    loop {
        if let Err(e) = build(&args) {
            error!("{}", e);
        }
        if let Err(e) = wait_for_changes(&watcher, debounce) {
            error!("{}", e);
            thread::sleep(debounce);
        }
    }
}
