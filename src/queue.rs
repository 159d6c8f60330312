use crate::exec::{Exec, ExecError};

/// Socket of the task-spooler daemon serializing the given queue, or `None`
/// for a queue this tool does not know about.
pub fn queue_socket(queue: &str) -> Option<&'static str> {
    match queue {
        "disk" => Some("/tmp/tsp-disk.sock"),
        "network" => Some("/tmp/tsp-network.sock"),
        _ => None,
    }
}

/// Run `command` (program + arguments), optionally routed through one of the
/// task-spooler queues.
///
/// With a recognized queue name the invocation is rewritten to
/// `tsp -n -f <command...>` and `TS_SOCKET` is set so the queue client talks
/// to the right daemon; the daemon then runs at most one job at a time per
/// queue. An unrecognized queue name only triggers a warning and the command
/// runs immediately, without the serialization guarantee.
pub fn execute<T: Exec>(
    exec: &T,
    tsp: &str,
    command: &[String],
    queue: Option<&str>,
) -> Result<i32, ExecError> {
    let socket = match queue {
        Some(name) => match queue_socket(name) {
            Some(socket) => Some(socket),
            None => {
                log::warn!(
                    "unknown queue option '{}' for execute(), run the task immediately",
                    name
                );
                None
            }
        },
        None => None,
    };

    match socket {
        Some(socket) => {
            let mut args = vec!["-n".to_string(), "-f".to_string()];
            args.extend_from_slice(command);

            exec.exec(
                tsp,
                &args,
                &[("TS_SOCKET".to_string(), socket.to_string())],
            )
        }
        None => {
            let (program, args) = command.split_first().ok_or(ExecError::EmptyCommand)?;

            exec.exec(program, args, &[])
        }
    }
}
