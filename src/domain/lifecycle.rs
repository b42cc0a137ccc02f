//! Connection Lifecycle
//!
//! Drives one BLE session from discovery to link loss:
//!
//! ```text
//! Idle -> Scanning -> Connecting -> Connected -> (Disconnected | Failed) -> Idle
//! ```
//!
//! The platform side is behind [`BleBackend`] and [`BleLink`]. Notification
//! callbacks only forward raw payloads over a channel; the interpreter runs
//! on the task that owns this lifecycle.

use crate::domain::actuators::{KeyActuator, VolumeActuator};
use crate::domain::error::LinkError;
use crate::domain::interpreter::SensorInterpreter;
use crate::domain::models::{LifecycleState, MessageSeverity};
use crate::domain::settings::BleSettings;
use crate::domain::status::StatusSink;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Raw notification payloads from the platform callback.
pub type NotificationSender = mpsc::UnboundedSender<Vec<u8>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPeripheral {
    pub name: String,
    pub address: u64,
}

impl DiscoveredPeripheral {
    /// Address in the usual colon-separated form.
    pub fn address_string(&self) -> String {
        let bytes = self.address.to_be_bytes();
        bytes[2..]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(":")
    }
}

#[allow(async_fn_in_trait)]
pub trait BleBackend {
    type Link: BleLink;

    /// Return the first peripheral advertising `service_uuid` seen within `window`.
    async fn discover(
        &mut self,
        service_uuid: &str,
        window: Duration,
    ) -> Result<Option<DiscoveredPeripheral>, LinkError>;

    async fn connect(
        &mut self,
        peripheral: &DiscoveredPeripheral,
        service_uuid: &str,
        characteristic_uuid: &str,
    ) -> Result<Self::Link, LinkError>;
}

#[allow(async_fn_in_trait)]
pub trait BleLink {
    /// Enable notifications, forwarding every payload to `notifications`.
    async fn subscribe(&mut self, notifications: NotificationSender) -> Result<(), LinkError>;
    async fn unsubscribe(&mut self) -> Result<(), LinkError>;
    fn is_connected(&self) -> bool;
}

/// Fixed-interval retry, optionally capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Whether another attempt may follow `attempts` failed ones.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    pub service_uuid: String,
    pub characteristic_uuid: String,
    pub discovery_window: Duration,
    pub subscribe_retry: RetryPolicy,
    pub liveness_poll: Duration,
}

impl From<&BleSettings> for LifecycleConfig {
    fn from(ble: &BleSettings) -> Self {
        Self {
            service_uuid: ble.service_uuid.clone(),
            characteristic_uuid: ble.sensor_char_uuid.clone(),
            discovery_window: Duration::from_millis(ble.discovery_window_ms),
            subscribe_retry: RetryPolicy {
                interval: Duration::from_millis(ble.subscribe_retry_interval_ms),
                max_attempts: ble.subscribe_max_attempts,
            },
            liveness_poll: Duration::from_millis(ble.liveness_poll_ms.max(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The link was up and has since dropped.
    Disconnected,
    Failed(LinkError),
}

pub struct ConnectionLifecycle<B, V, K, S> {
    backend: B,
    interpreter: SensorInterpreter<V, K, S>,
    config: LifecycleConfig,
    state: LifecycleState,
    connected_address: Option<String>,
}

impl<B, V, K, S> ConnectionLifecycle<B, V, K, S>
where
    B: BleBackend,
    V: VolumeActuator,
    K: KeyActuator,
    S: StatusSink,
{
    pub fn new(backend: B, interpreter: SensorInterpreter<V, K, S>, config: LifecycleConfig) -> Self {
        Self {
            backend,
            interpreter,
            config,
            state: LifecycleState::Idle,
            connected_address: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn interpreter(&self) -> &SensorInterpreter<V, K, S> {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut SensorInterpreter<V, K, S> {
        &mut self.interpreter
    }

    pub fn update_config(&mut self, config: LifecycleConfig) {
        self.config = config;
    }

    pub fn status(&self) -> &S {
        &self.interpreter.status
    }

    /// Report an interrupted run as over. Called after the future
    /// returned by [`run`](Self::run) was dropped mid-flight.
    pub fn abort(&mut self) {
        if let Some(address) = self.connected_address.take() {
            self.interpreter.status.update_connection_status(&address, false);
        }
        if self.state != LifecycleState::Idle {
            self.set_state(LifecycleState::Idle);
        }
    }

    /// Run one full pass of the state machine. Always ends back in `Idle`.
    pub async fn run(&mut self) -> LifecycleOutcome {
        let outcome = self.run_session().await;

        match &outcome {
            LifecycleOutcome::Disconnected => self.set_state(LifecycleState::Disconnected),
            LifecycleOutcome::Failed(e) => {
                self.interpreter
                    .status
                    .log(&e.to_string(), MessageSeverity::Error);
                self.set_state(LifecycleState::Failed);
            }
        }
        self.set_state(LifecycleState::Idle);

        outcome
    }

    async fn run_session(&mut self) -> LifecycleOutcome {
        self.set_state(LifecycleState::Scanning);
        self.log("Scanning for BLE devices...", MessageSeverity::Info);

        let peripheral = match self
            .backend
            .discover(&self.config.service_uuid, self.config.discovery_window)
            .await
        {
            Ok(Some(peripheral)) => peripheral,
            Ok(None) => {
                return LifecycleOutcome::Failed(LinkError::Discovery(
                    "no device with the target service found".to_string(),
                ))
            }
            Err(e) => return LifecycleOutcome::Failed(e),
        };
        let address = peripheral.address_string();
        self.log(
            &format!("Found target device: {} ({})", peripheral.name, address),
            MessageSeverity::Info,
        );

        self.set_state(LifecycleState::Connecting);
        let mut link = match self
            .backend
            .connect(
                &peripheral,
                &self.config.service_uuid,
                &self.config.characteristic_uuid,
            )
            .await
        {
            Ok(link) => link,
            Err(e) => return LifecycleOutcome::Failed(e),
        };

        self.set_state(LifecycleState::Connected);
        self.interpreter.status.update_connection_status(&address, true);
        self.connected_address = Some(address.clone());
        self.log("Connected to BLE device.", MessageSeverity::Success);
        self.interpreter.begin_session();

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Err(outcome) = self.subscribe_with_retry(&mut link, tx).await {
            self.connected_address = None;
            self.interpreter.status.update_connection_status(&address, false);
            return outcome;
        }
        self.log(
            "Subscribed to notifications. Waiting for data...",
            MessageSeverity::Success,
        );

        self.stream(&link, &mut rx).await;

        if let Err(e) = link.unsubscribe().await {
            warn!("Error stopping notifications: {}", e);
            self.log(
                &format!("Error stopping notifications: {}", e),
                MessageSeverity::Warning,
            );
        }
        self.connected_address = None;
        self.interpreter.status.update_connection_status(&address, false);
        self.log("Device disconnected.", MessageSeverity::Warning);

        LifecycleOutcome::Disconnected
    }

    async fn subscribe_with_retry(
        &mut self,
        link: &mut B::Link,
        notifications: NotificationSender,
    ) -> Result<(), LifecycleOutcome> {
        let policy = self.config.subscribe_retry;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let e = match link.subscribe(notifications.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            if !link.is_connected() {
                return Err(LifecycleOutcome::Disconnected);
            }
            if !policy.allows_retry(attempts) {
                return Err(LifecycleOutcome::Failed(e));
            }

            self.log(
                &format!(
                    "Failed to start notify: {}. Retrying in {} seconds...",
                    e,
                    policy.interval.as_secs_f64()
                ),
                MessageSeverity::Warning,
            );
            tokio::time::sleep(policy.interval).await;

            if !link.is_connected() {
                return Err(LifecycleOutcome::Disconnected);
            }
        }
    }

    /// Feed notifications to the interpreter until the link drops.
    async fn stream(&mut self, link: &B::Link, rx: &mut mpsc::UnboundedReceiver<Vec<u8>>) {
        let mut poll = tokio::time::interval(self.config.liveness_poll);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                payload = rx.recv() => match payload {
                    Some(bytes) => {
                        let now = tokio::time::Instant::now().into_std();
                        self.interpreter.handle_notification(&bytes, now);
                    }
                    None => break,
                },
                _ = poll.tick() => {
                    if !link.is_connected() {
                        break;
                    }
                }
            }
        }
    }

    fn set_state(&mut self, state: LifecycleState) {
        if self.state != state {
            info!("Lifecycle: {} -> {}", self.state, state);
        }
        self.state = state;
        self.interpreter.status.update_lifecycle_state(state);
    }

    fn log(&self, message: &str, severity: MessageSeverity) {
        self.interpreter.status.log(message, severity);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted BLE backend driven by tokio's clock.

    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tokio::time::Instant;

    pub struct FakeLink {
        pub alive_until: Instant,
        pub subscribe_failures: u32,
        pub payloads: Vec<Vec<u8>>,
        pub sender: Option<NotificationSender>,
        pub unsubscribe_error: bool,
        pub unsubscribed: Rc<Cell<bool>>,
    }

    impl BleLink for FakeLink {
        async fn subscribe(&mut self, notifications: NotificationSender) -> Result<(), LinkError> {
            if self.subscribe_failures > 0 {
                self.subscribe_failures -= 1;
                return Err(LinkError::Subscription("characteristic busy".to_string()));
            }
            for payload in self.payloads.drain(..) {
                let _ = notifications.send(payload);
            }
            self.sender = Some(notifications);
            Ok(())
        }

        async fn unsubscribe(&mut self) -> Result<(), LinkError> {
            self.unsubscribed.set(true);
            self.sender = None;
            if self.unsubscribe_error {
                return Err(LinkError::Unsubscribe("device gone".to_string()));
            }
            Ok(())
        }

        fn is_connected(&self) -> bool {
            Instant::now() < self.alive_until
        }
    }

    pub struct FakeBackend {
        pub peripheral: Option<DiscoveredPeripheral>,
        pub connect_error: Option<LinkError>,
        pub link_lifetime: Duration,
        pub subscribe_failures: u32,
        pub payloads: Vec<Vec<u8>>,
        pub unsubscribe_error: bool,
        pub unsubscribed: Rc<Cell<bool>>,
        pub discover_calls: Rc<Cell<u32>>,
    }

    impl Default for FakeBackend {
        fn default() -> Self {
            Self {
                peripheral: Some(DiscoveredPeripheral {
                    name: "Pixel".to_string(),
                    address: 0x0011_2233_4455,
                }),
                connect_error: None,
                link_lifetime: Duration::from_secs(3),
                subscribe_failures: 0,
                payloads: Vec::new(),
                unsubscribe_error: false,
                unsubscribed: Rc::new(Cell::new(false)),
                discover_calls: Rc::new(Cell::new(0)),
            }
        }
    }

    impl BleBackend for FakeBackend {
        type Link = FakeLink;

        async fn discover(
            &mut self,
            _service_uuid: &str,
            window: Duration,
        ) -> Result<Option<DiscoveredPeripheral>, LinkError> {
            self.discover_calls.set(self.discover_calls.get() + 1);
            if self.peripheral.is_none() {
                tokio::time::sleep(window).await;
            }
            Ok(self.peripheral.clone())
        }

        async fn connect(
            &mut self,
            _peripheral: &DiscoveredPeripheral,
            _service_uuid: &str,
            _characteristic_uuid: &str,
        ) -> Result<FakeLink, LinkError> {
            if let Some(e) = self.connect_error.clone() {
                return Err(e);
            }
            Ok(FakeLink {
                alive_until: Instant::now() + self.link_lifetime,
                subscribe_failures: self.subscribe_failures,
                payloads: std::mem::take(&mut self.payloads),
                sender: None,
                unsubscribe_error: self.unsubscribe_error,
                unsubscribed: self.unsubscribed.clone(),
            })
        }
    }
}
