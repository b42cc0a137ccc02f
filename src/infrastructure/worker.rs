//! Connection thread
//!
//! BLE I/O runs on its own thread with a single-threaded tokio runtime so
//! the UI loop never waits on it. The UI talks to it through
//! [`BluetoothCommand`]s; everything coming back is an `AppEvent`.

use crate::domain::actuators::{KeyActuator, VolumeActuator};
use crate::domain::interpreter::SensorInterpreter;
use crate::domain::lifecycle::{BleBackend, ConnectionLifecycle, LifecycleConfig};
use crate::domain::models::{AppEvent, BluetoothCommand, MessageSeverity};
use crate::domain::settings::{Settings, SettingsService};
use crate::domain::status::{ChannelStatusSink, StatusSink};
use crate::infrastructure::audio::SystemVolume;
use crate::infrastructure::bluetooth::PlatformBleBackend;
use crate::infrastructure::input_simulator::InputSimulator;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

pub struct ConnectionWorker {
    command_sender: mpsc::UnboundedSender<BluetoothCommand>,
    handle: Option<JoinHandle<()>>,
}

impl ConnectionWorker {
    /// Start the connection thread. The first lifecycle run begins right away.
    pub fn spawn(
        settings: Arc<Mutex<SettingsService>>,
        event_sender: mpsc::UnboundedSender<AppEvent>,
    ) -> anyhow::Result<Self> {
        let (command_sender, mut command_receiver) = mpsc::unbounded_channel();

        let handle = std::thread::Builder::new()
            .name("ble-connection".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to create tokio runtime for Bluetooth: {}", e);
                        return;
                    }
                };

                rt.block_on(async move {
                    let status = ChannelStatusSink::new(event_sender);
                    let snapshot = settings_snapshot(&settings);
                    let interpreter = SensorInterpreter::new(
                        snapshot.control.clone(),
                        SystemVolume::new(),
                        InputSimulator::new(),
                        status,
                    );
                    let mut lifecycle = ConnectionLifecycle::new(
                        PlatformBleBackend::new(),
                        interpreter,
                        LifecycleConfig::from(&snapshot.ble),
                    );

                    run_worker(&mut lifecycle, &mut command_receiver, &settings).await;
                    info!("Connection thread stopped");
                });
            })?;

        Ok(Self {
            command_sender,
            handle: Some(handle),
        })
    }

    pub fn send(&self, command: BluetoothCommand) {
        let _ = self.command_sender.send(command);
    }

    pub fn refresh(&self) {
        self.send(BluetoothCommand::Refresh);
    }

    /// Ask the thread to stop. Does not wait for it.
    pub fn shutdown(&mut self) {
        self.send(BluetoothCommand::Shutdown);
        // Joining could stall the UI while a WinRT call is pending.
        self.handle.take();
    }
}

fn settings_snapshot(settings: &Arc<Mutex<SettingsService>>) -> Settings {
    match settings.lock() {
        Ok(guard) => guard.get().clone(),
        Err(_) => {
            error!("Settings lock poisoned, using defaults");
            Settings::default()
        }
    }
}

enum Next {
    Restart,
    Stop,
}

fn on_command<S: StatusSink>(command: Option<BluetoothCommand>, status: &S) -> Next {
    match command {
        Some(BluetoothCommand::Refresh) => {
            status.log("Refreshing BLE process...", MessageSeverity::Info);
            Next::Restart
        }
        Some(BluetoothCommand::Shutdown) | None => Next::Stop,
    }
}

/// Run lifecycles back to back until shutdown.
///
/// A refresh drops the running lifecycle wherever it is. After a run
/// ends on its own, the worker waits for a refresh, or restarts after the
/// reconnect delay when auto reconnect is on. Settings are re-read before
/// every run.
pub async fn run_worker<B, V, K, S>(
    lifecycle: &mut ConnectionLifecycle<B, V, K, S>,
    commands: &mut mpsc::UnboundedReceiver<BluetoothCommand>,
    settings: &Arc<Mutex<SettingsService>>,
) where
    B: BleBackend,
    V: VolumeActuator,
    K: KeyActuator,
    S: StatusSink,
{
    loop {
        let snapshot = settings_snapshot(settings);
        lifecycle.update_config(LifecycleConfig::from(&snapshot.ble));
        lifecycle.interpreter_mut().update_control(snapshot.control.clone());

        let interrupted = tokio::select! {
            outcome = lifecycle.run() => {
                info!("Lifecycle ended: {:?}", outcome);
                None
            }
            command = commands.recv() => Some(command),
        };

        if let Some(command) = interrupted {
            lifecycle.abort();
            match on_command(command, lifecycle.status()) {
                Next::Restart => continue,
                Next::Stop => return,
            }
        }

        let next = if snapshot.ble.auto_reconnect {
            let delay = Duration::from_millis(snapshot.ble.reconnect_delay_ms);
            lifecycle.status().log(
                &format!("Reconnecting in {:.1}s...", delay.as_secs_f64()),
                MessageSeverity::Info,
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => Next::Restart,
                command = commands.recv() => on_command(command, lifecycle.status()),
            }
        } else {
            on_command(commands.recv().await, lifecycle.status())
        };

        if let Next::Stop = next {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actuators::testing::{FakeKeys, FakeVolume};
    use crate::domain::lifecycle::testing::FakeBackend;
    use crate::domain::models::LifecycleState;
    use crate::domain::settings::{BleSettings, ControlSettings};
    use crate::domain::status::testing::RecordingSink;
    use std::path::PathBuf;

    type TestLifecycle = ConnectionLifecycle<FakeBackend, FakeVolume, FakeKeys, RecordingSink>;

    fn lifecycle(backend: FakeBackend) -> TestLifecycle {
        let interpreter = SensorInterpreter::new(
            ControlSettings::default(),
            FakeVolume::at(0.5),
            FakeKeys::default(),
            RecordingSink::default(),
        );
        ConnectionLifecycle::new(
            backend,
            interpreter,
            LifecycleConfig::from(&BleSettings::default()),
        )
    }

    fn settings(name: &str, auto_reconnect: bool) -> Arc<Mutex<SettingsService>> {
        let path = PathBuf::from(format!(
            "{}/gyro_worker_{}_{}.json",
            std::env::temp_dir().display(),
            name,
            std::process::id()
        ));
        let mut service = SettingsService::from_path(path);
        service.get_mut().ble.auto_reconnect = auto_reconnect;
        Arc::new(Mutex::new(service))
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_worker() {
        let backend = FakeBackend {
            peripheral: None,
            ..Default::default()
        };
        let calls = backend.discover_calls.clone();
        let mut lc = lifecycle(backend);
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(BluetoothCommand::Shutdown).unwrap();

        run_worker(&mut lc, &mut rx, &settings("shutdown", false)).await;

        assert!(calls.get() <= 1);
        assert_eq!(lc.state(), LifecycleState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_restarts_running_lifecycle() {
        let backend = FakeBackend {
            link_lifetime: Duration::from_secs(3600),
            ..Default::default()
        };
        let calls = backend.discover_calls.clone();
        let mut lc = lifecycle(backend);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let settings = settings("refresh", false);

        tokio::join!(run_worker(&mut lc, &mut rx, &settings), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            tx.send(BluetoothCommand::Refresh).unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            tx.send(BluetoothCommand::Shutdown).unwrap();
        });

        assert_eq!(calls.get(), 2);
        let logs = lc.status().logs();
        assert_eq!(logs.iter().filter(|m| m.contains("Refreshing")).count(), 1);
        let disconnects = lc
            .status()
            .events
            .borrow()
            .iter()
            .filter(|e| matches!(e, AppEvent::ConnectionStatus { connected: false, .. }))
            .count();
        assert_eq!(disconnects, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_refresh_without_auto_reconnect() {
        let backend = FakeBackend::default();
        let calls = backend.discover_calls.clone();
        let mut lc = lifecycle(backend);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let settings = settings("manual", false);

        tokio::join!(run_worker(&mut lc, &mut rx, &settings), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            tx.send(BluetoothCommand::Shutdown).unwrap();
        });

        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_reconnect_restarts_after_delay() {
        let backend = FakeBackend::default();
        let calls = backend.discover_calls.clone();
        let mut lc = lifecycle(backend);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let settings = settings("auto", true);

        tokio::join!(run_worker(&mut lc, &mut rx, &settings), async {
            // Each pass: ~3s link lifetime plus the 2s reconnect delay.
            tokio::time::sleep(Duration::from_secs(12)).await;
            tx.send(BluetoothCommand::Shutdown).unwrap();
        });

        assert_eq!(calls.get(), 3);
        let logs = lc.status().logs();
        assert!(logs.iter().any(|m| m.contains("Reconnecting in 2.0s")));
    }
}
