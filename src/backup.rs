use crate::{
    backup_error::BackupError,
    commands,
    config::Config,
    escape::escape_name,
    exec::{CommandExec, Exec},
    folder::folder_size,
};
use std::{fs, path::Path};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub struct Backup<T: Exec> {
    exec: T,
    config: Config,
}

impl Backup<CommandExec> {
    pub fn new(config: Config) -> Self {
        Self {
            exec: CommandExec {},
            config,
        }
    }
}

impl<T: Exec> Backup<T> {
    /// constructor
    pub fn new_with_exec(config: Config, exec: T) -> Self {
        Self { exec, config }
    }

    /// Back up `content_path` under the remote category folder and return
    /// the quota figure in GiB: the larger of the original content size and
    /// the staged archive size.
    ///
    /// Stages (each gated by configuration): rar compression into the
    /// staging directory (disk queue), par2 recovery data (disk queue),
    /// archive upload (network queue) followed by staging removal, raw
    /// folder upload (network queue). The first failing command aborts the
    /// run; staging is intentionally left in place on abort so partial
    /// archives can be inspected.
    pub fn execute(&self, category_folder: &str, content_path: &str) -> Result<f64, BackupError> {
        let orig_folder_name = folder_name_of(content_path)?;
        let folder_name = escape_name(&orig_folder_name);
        let backup_path = Path::new(&self.config.misc.prefix).join(&folder_name);

        let content_size = folder_size(Path::new(content_path))? as f64 / GIB;
        let mut max_size = content_size;

        if !self.config.rclone.compress_account.is_empty() {
            log::debug!("compressing \"{}\" into {:?}", content_path, backup_path);
            fs::create_dir_all(&backup_path)?;

            let rar_path = backup_path.join(format!("{folder_name}.rar"));
            commands::compress_folder(&self.exec, &self.config, &rar_path, content_path)?;

            if self.config.par2.redundancy > 0 {
                let staged_size = folder_size(&backup_path)?;
                commands::generate_parity(
                    &self.exec,
                    &self.config,
                    &backup_path,
                    &folder_name,
                    staged_size,
                )?;
            }

            let backup_size = folder_size(&backup_path)? as f64 / GIB;
            max_size = content_size.max(backup_size);

            commands::upload_archive(
                &self.exec,
                &self.config,
                &backup_path,
                category_folder,
                &folder_name,
            )?;

            fs::remove_dir_all(&backup_path)?;
        }

        if !self.config.rclone.raw_account.is_empty() {
            commands::upload_raw(
                &self.exec,
                &self.config,
                content_path,
                category_folder,
                &orig_folder_name,
            )?;
        }

        Ok(max_size)
    }
}

/// Display name of the content folder: last path component, tolerating a
/// trailing separator.
fn folder_name_of(content_path: &str) -> Result<String, BackupError> {
    Path::new(content_path)
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| BackupError::PathConversionError(content_path.to_string()))
}
