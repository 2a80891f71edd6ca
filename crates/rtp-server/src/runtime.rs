//! Tokio runtimes.
//!
//! The console reads stdin on the main runtime's blocking pool, and a pending
//! read holds a thread there until the next line arrives. Teleport searches
//! therefore get a runtime of their own whose blocking pool holds exactly
//! `worker_threads` threads.

use std::io;

use tokio::runtime::{Builder, Runtime};

/// Runtime for the console, signals and message delivery.
pub fn main_runtime() -> io::Result<Runtime> {
    Builder::new_multi_thread()
        .enable_all()
        .thread_name("rtp-server")
        .build()
}

/// Runtime whose blocking pool runs teleport jobs, at most `worker_threads` at a time.
pub fn worker_runtime(worker_threads: usize) -> io::Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(worker_threads.max(1))
        .thread_name("rtp-worker")
        .build()
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc as std_mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    use rtp_command::rtp::{CooldownLedger, RtpHandler, RtpSettings};
    use rtp_world::{GeneratorKind, World};
    use tokio::sync::mpsc;

    use super::*;
    use crate::host::ServerHost;

    #[test]
    fn teleport_finishes_while_console_read_is_pending() {
        // Main pool of one thread, like a worker count of 1 would have given.
        let main = Builder::new_multi_thread()
            .enable_all()
            .max_blocking_threads(1)
            .build()
            .unwrap();
        let workers = worker_runtime(1).unwrap();
        let (release_tx, release_rx) = std_mpsc::channel::<()>();

        let finished = main.block_on(async {
            // Stands in for a stdin read waiting on the operator.
            let reader = tokio::task::spawn_blocking(move || {
                let _ = release_rx.recv();
            });

            let world = Arc::new(World::new(GeneratorKind::Flat.build(0, &[])));
            let (tx, _rx) = mpsc::unbounded_channel();
            let host = Arc::new(ServerHost::new(world, tx));
            let id = host.join("Steve", None).unwrap();
            let handler = RtpHandler::new(
                Arc::clone(&host),
                Arc::new(CooldownLedger::default()),
                RtpSettings {
                    max_radius: 32,
                    ..RtpSettings::default()
                },
                workers.handle().clone(),
            );

            let job = handler.handle_request(id).unwrap();
            let report = tokio::time::timeout(Duration::from_secs(3), job).await;

            release_tx.send(()).unwrap();
            reader.await.unwrap();
            report
        });

        let report = finished.expect("teleport finished").unwrap();
        assert!(report.relocation.is_ok());
        workers.shutdown_background();
        main.shutdown_background();
    }

    #[test]
    fn worker_runtime_runs_blocking_jobs() {
        let workers = worker_runtime(2).unwrap();
        let handle = workers.spawn_blocking(|| 40 + 2);
        assert_eq!(workers.block_on(handle).unwrap(), 42);
    }
}
