use crate::{
    backup_error::BackupError,
    config::Config,
    exec::Exec,
    queue,
};
use std::path::Path;

/// Run `command` on the given queue and turn a non-zero exit code into
/// [`BackupError::CommandFailed`].
fn run_checked<T: Exec>(
    exec: &T,
    config: &Config,
    command: Vec<String>,
    queue_name: &str,
) -> Result<(), BackupError> {
    let code = queue::execute(exec, &config.toolchain.tsp, &command, Some(queue_name))?;

    if code != 0 {
        return Err(BackupError::CommandFailed {
            command: command.join(" "),
            code,
        });
    }

    Ok(())
}

fn path_str(path: &Path) -> Result<&str, BackupError> {
    path.to_str()
        .ok_or_else(|| BackupError::PathConversionError(path.to_string_lossy().to_string()))
}

/// Archive the content folder into split, recovery-protected rar volumes in
/// the staging directory, serialized on the disk queue.
pub fn compress_folder<T: Exec>(
    exec: &T,
    config: &Config,
    rar_path: &Path,
    content_path: &str,
) -> Result<(), BackupError> {
    let command = vec![
        config.toolchain.rar.clone(),
        "a".to_string(),
        format!("-v{}", config.rar.split),
        "-m1".to_string(),
        "-ma5".to_string(),
        "-md128m".to_string(),
        "-s".to_string(),
        format!("-rr{}", config.rar.rr),
        path_str(rar_path)?.to_string(),
        content_path.to_string(),
    ];

    run_checked(exec, config, command, "disk")
}

/// Number of par2 recovery volumes to create for a staged archive of
/// `staged_size` bytes.
pub fn par2_volume_count(staged_size: u64, block: u64, redundancy: u32) -> u64 {
    let block_count = (staged_size as f64 / block as f64).ceil();
    let recovery_block_count = (block_count * redundancy as f64 / 100.0).ceil();

    (recovery_block_count / 3.0).ceil() as u64
}

/// Generate par2 recovery data for the staged archive, serialized on the
/// disk queue. Operates on the single `.rar` file when it exists, otherwise
/// on a wildcard over the split volumes (par2 expands the wildcard itself).
pub fn generate_parity<T: Exec>(
    exec: &T,
    config: &Config,
    backup_path: &Path,
    folder_name: &str,
    staged_size: u64,
) -> Result<(), BackupError> {
    let volume_count = par2_volume_count(staged_size, config.par2.block, config.par2.redundancy);

    let rar_path = backup_path.join(format!("{folder_name}.rar"));
    let target = if rar_path.exists() {
        rar_path
    } else {
        backup_path.join(format!("{folder_name}.part*.rar"))
    };

    let command = vec![
        config.toolchain.par2.clone(),
        "c".to_string(),
        format!("-s{}", config.par2.block),
        format!("-r{}", config.par2.redundancy),
        "-u".to_string(),
        format!("-m{}", config.par2.memory),
        "-v".to_string(),
        format!("-n{volume_count}"),
        path_str(&backup_path.join(format!("{folder_name}.rar.par2")))?.to_string(),
        path_str(&target)?.to_string(),
    ];

    run_checked(exec, config, command, "disk")
}

fn rclone_copy(src: &str, dst: String, config: &Config) -> Vec<String> {
    vec![
        config.toolchain.rclone.clone(),
        "copy".to_string(),
        src.to_string(),
        dst,
        "-v".to_string(),
        "--transfers".to_string(),
        config.rclone.threads.clone(),
        "--bwlimit".to_string(),
        config.rclone.bandwidth_limit.clone(),
    ]
}

/// Upload the staged archive directory to the compress account, serialized
/// on the network queue. When the raw upload targets the same account, the
/// archive goes into a `/backup` subfolder so the two copies do not collide.
pub fn upload_archive<T: Exec>(
    exec: &T,
    config: &Config,
    backup_path: &Path,
    category_folder: &str,
    folder_name: &str,
) -> Result<(), BackupError> {
    let account = &config.rclone.compress_account;
    let dst = if config.rclone.raw_account == *account {
        format!("{account}:/{category_folder}/{folder_name}/backup")
    } else {
        format!("{account}:/{category_folder}/{folder_name}")
    };

    let command = rclone_copy(path_str(backup_path)?, dst, config);

    run_checked(exec, config, command, "network")
}

/// Upload the original, uncompressed content folder to the raw account under
/// its unescaped name, serialized on the network queue.
pub fn upload_raw<T: Exec>(
    exec: &T,
    config: &Config,
    content_path: &str,
    category_folder: &str,
    orig_folder_name: &str,
) -> Result<(), BackupError> {
    let account = &config.rclone.raw_account;
    let dst = format!("{account}:/{category_folder}/{orig_folder_name}");
    let command = rclone_copy(content_path, dst, config);

    run_checked(exec, config, command, "network")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{Misc, Par2, Rar, Rclone, Toolchain};
    use crate::exec::MockExec;

    fn test_config() -> Config {
        Config {
            toolchain: Toolchain {
                rar: "rar".to_string(),
                par2: "par2".to_string(),
                rclone: "rclone".to_string(),
                tsp: "tsp".to_string(),
            },
            misc: Misc {
                prefix: "/tmp".to_string(),
            },
            rclone: Rclone {
                compress_account: "crypt".to_string(),
                raw_account: String::new(),
                threads: "4".to_string(),
                bandwidth_limit: "8M".to_string(),
            },
            rar: Rar {
                split: "1g".to_string(),
                rr: "5".to_string(),
            },
            par2: Par2 {
                block: 1048576,
                redundancy: 10,
                memory: "2000".to_string(),
            },
        }
    }

    #[test]
    fn par2_volume_counts() {
        // 10 blocks at 10% -> 1 recovery block -> 1 volume
        assert_eq!(par2_volume_count(10 * 1048576, 1048576, 10), 1);
        // partial block rounds the block count up
        assert_eq!(par2_volume_count(1048577, 1048576, 50), 1);
        // 100 blocks at 10% -> 10 recovery blocks -> 4 volumes
        assert_eq!(par2_volume_count(100 * 1048576, 1048576, 10), 4);
        // empty staging -> no volumes
        assert_eq!(par2_volume_count(0, 1048576, 10), 0);
    }

    #[test]
    fn compress_builds_rar_invocation_on_disk_queue() {
        let config = test_config();
        let mut mock = MockExec::new();

        mock.expect_exec().once().returning(|program, args, env| {
            assert_eq!(program, "tsp");
            assert_eq!(
                args,
                &[
                    "-n".to_string(),
                    "-f".to_string(),
                    "rar".to_string(),
                    "a".to_string(),
                    "-v1g".to_string(),
                    "-m1".to_string(),
                    "-ma5".to_string(),
                    "-md128m".to_string(),
                    "-s".to_string(),
                    "-rr5".to_string(),
                    "/tmp/name/name.rar".to_string(),
                    "/data/name".to_string(),
                ][..]
            );
            assert_eq!(
                env,
                &[("TS_SOCKET".to_string(), "/tmp/tsp-disk.sock".to_string())][..]
            );
            Ok(0)
        });

        compress_folder(&mock, &config, Path::new("/tmp/name/name.rar"), "/data/name").unwrap();
    }

    #[test]
    fn parity_targets_single_archive_when_present() {
        let config = test_config();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("name.rar"), b"data").unwrap();

        let expected = dir.path().join("name.rar").to_str().unwrap().to_string();
        let mut mock = MockExec::new();

        mock.expect_exec().once().returning(move |_, args, _| {
            assert_eq!(args.last().unwrap(), &expected);
            Ok(0)
        });

        generate_parity(&mock, &config, dir.path(), "name", 4).unwrap();
    }

    #[test]
    fn parity_falls_back_to_volume_wildcard() {
        let config = test_config();
        let dir = tempfile::tempdir().unwrap();

        let expected = dir
            .path()
            .join("name.part*.rar")
            .to_str()
            .unwrap()
            .to_string();
        let mut mock = MockExec::new();

        mock.expect_exec().once().returning(move |_, args, _| {
            assert_eq!(args.last().unwrap(), &expected);
            Ok(0)
        });

        generate_parity(&mock, &config, dir.path(), "name", 4).unwrap();
    }

    #[test]
    fn parity_flags() {
        let config = test_config();
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockExec::new();

        mock.expect_exec().once().returning(|_, args, _| {
            // args[0..2] is the tsp prefix
            assert_eq!(args[2], "par2");
            assert_eq!(args[3], "c");
            assert_eq!(args[4], "-s1048576");
            assert_eq!(args[5], "-r10");
            assert_eq!(args[6], "-u");
            assert_eq!(args[7], "-m2000");
            assert_eq!(args[8], "-v");
            assert_eq!(args[9], "-n1");
            Ok(0)
        });

        generate_parity(&mock, &config, dir.path(), "name", 1048576).unwrap();
    }

    #[test]
    fn archive_upload_uses_plain_destination_for_distinct_accounts() {
        let config = test_config();
        let mut mock = MockExec::new();

        mock.expect_exec().once().returning(|program, args, env| {
            assert_eq!(program, "tsp");
            assert_eq!(
                args,
                &[
                    "-n".to_string(),
                    "-f".to_string(),
                    "rclone".to_string(),
                    "copy".to_string(),
                    "/tmp/name".to_string(),
                    "crypt:/movies/name".to_string(),
                    "-v".to_string(),
                    "--transfers".to_string(),
                    "4".to_string(),
                    "--bwlimit".to_string(),
                    "8M".to_string(),
                ][..]
            );
            assert_eq!(
                env,
                &[("TS_SOCKET".to_string(), "/tmp/tsp-network.sock".to_string())][..]
            );
            Ok(0)
        });

        upload_archive(&mock, &config, Path::new("/tmp/name"), "movies", "name").unwrap();
    }

    #[test]
    fn archive_upload_appends_backup_suffix_for_shared_account() {
        let mut config = test_config();
        config.rclone.raw_account = "crypt".to_string();

        let mut mock = MockExec::new();

        mock.expect_exec().once().returning(|_, args, _| {
            assert_eq!(args[5], "crypt:/movies/name/backup");
            Ok(0)
        });

        upload_archive(&mock, &config, Path::new("/tmp/name"), "movies", "name").unwrap();
    }

    #[test]
    fn raw_upload_uses_unescaped_name() {
        let mut config = test_config();
        config.rclone.raw_account = "raw".to_string();

        let mut mock = MockExec::new();

        mock.expect_exec().once().returning(|_, args, _| {
            assert_eq!(args[4], "/data/a:b");
            assert_eq!(args[5], "raw:/movies/a:b");
            Ok(0)
        });

        upload_raw(&mock, &config, "/data/a:b", "movies", "a:b").unwrap();
    }

    #[test]
    fn non_zero_exit_becomes_command_failed() {
        let config = test_config();
        let mut mock = MockExec::new();

        mock.expect_exec().once().returning(|_, _, _| Ok(3));

        let err =
            compress_folder(&mock, &config, Path::new("/tmp/name/name.rar"), "/data/name")
                .unwrap_err();

        match err {
            BackupError::CommandFailed { code, ref command } => {
                assert_eq!(code, 3);
                assert!(command.starts_with("rar a -v1g"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
