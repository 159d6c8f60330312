use anyhow::Context;
use backup_rclone::{backup::Backup, backup_error::BackupError, config::Config};
use std::path::Path;

const USAGE: &str = "usage: backup-rclone <category folder> <content path>";

fn main() {
    // init logger
    env_logger::init();

    match run_main() {
        Ok(max_size) => println!("Quota usage: {max_size} GB"),
        Err(err) => {
            // a failing external command propagates its own exit code
            if let Some(BackupError::CommandFailed { command, code }) =
                err.downcast_ref::<BackupError>()
            {
                eprintln!("{command} returns {code}");
                std::process::exit(*code);
            }

            eprintln!("backup-rclone error: {err:?}");
            std::process::exit(1);
        }
    }
}

fn run_main() -> anyhow::Result<f64> {
    // get parameters
    let mut args = std::env::args().skip(1);
    let category_folder = args.next().context(USAGE)?;
    let content_path = args.next().context(USAGE)?;

    let config =
        Config::read_from_file(Path::new("config.json")).context("could not read config file")?;

    // create backup object and run the pipeline
    let backup = Backup::new(config);

    Ok(backup.execute(&category_folder, &content_path)?)
}
