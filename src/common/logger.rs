use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Initialize the global logger: debug with `-v`, errors only with `-s`,
/// optionally redirected to a file.
pub fn init(verbose: bool, silent: bool, log_file: &Option<impl AsRef<Path>>) -> io::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else if silent {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder.filter_level(level);

    if let Some(log_file) = log_file {
        let file = File::create(log_file.as_ref())?;
        builder.target(Target::Pipe(Box::new(file)));
    } else {
        builder.target(Target::Stdout);
    }

    builder.format(|buf, record| {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(buf, "[{}] [{}] {}", timestamp, record.level(), record.args())
    });

    builder.init();

    Ok(())
}
