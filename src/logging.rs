use color_eyre::eyre::Result;
use log::LevelFilter;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Log to a file so stdout stays clean for JSON output
pub fn init_logging(debug: bool) -> Result<PathBuf> {
    let log_level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_dir = get_default_log_dir();
    fs::create_dir_all(&log_dir)?;

    let log_file = log_dir.join("gitscape.log");

    env_logger::Builder::new()
        .filter_level(log_level)
        .target(env_logger::Target::Pipe(Box::new(
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)?,
        )))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] - {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    log::info!("Logging initialized with level: {log_level}");
    Ok(log_file)
}

fn get_default_log_dir() -> PathBuf {
    let state_dir = env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/state")));

    match state_dir {
        Some(dir) => dir.join("gitscape"),
        None => env::temp_dir().join("gitscape"),
    }
}
