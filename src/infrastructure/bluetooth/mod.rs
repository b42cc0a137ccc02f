//! Bluetooth Module
//!
//! Platform side of the BLE link to the orientation peripheral.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            ConnectionLifecycle (domain::lifecycle)       │
//! └─────────────────────┬────────────────────────────────────┘
//!                       │ BleBackend / BleLink
//!                       ▼
//!               ┌────────────────┐
//!               │  WinBleBackend │
//!               └───────┬────────┘
//!         ┌─────────────┼─────────────┐
//!         ▼             ▼             ▼
//! ┌───────────┐  ┌────────────┐  ┌──────────┐
//! │  Scanner  │  │ Connection │  │ Protocol │
//! │ - adverts │  │ - GATT     │  │ - UUIDs  │
//! │           │  │ - notify   │  │ - buffers│
//! └───────────┘  └────────────┘  └──────────┘
//! ```
//!
//! On platforms other than Windows the backend reports every discovery
//! as failed, so the rest of the application still runs.

#[cfg(windows)]
pub mod connection;
pub mod protocol;
#[cfg(windows)]
pub mod scanner;

use crate::domain::error::LinkError;
use crate::domain::lifecycle::{BleBackend, DiscoveredPeripheral};
use std::time::Duration;

#[cfg(windows)]
pub use self::windows_backend::WinBleBackend as PlatformBleBackend;
#[cfg(not(windows))]
pub use self::unsupported::UnsupportedBleBackend as PlatformBleBackend;

#[cfg(windows)]
mod windows_backend {
    use super::*;
    use crate::infrastructure::bluetooth::connection::{self, WinBleLink};
    use crate::infrastructure::bluetooth::scanner::BleScanner;

    pub struct WinBleBackend {
        scanner: BleScanner,
    }

    impl WinBleBackend {
        pub fn new() -> Self {
            Self {
                scanner: BleScanner::new(),
            }
        }
    }

    impl BleBackend for WinBleBackend {
        type Link = WinBleLink;

        async fn discover(
            &mut self,
            service_uuid: &str,
            window: Duration,
        ) -> Result<Option<DiscoveredPeripheral>, LinkError> {
            self.scanner
                .find_first(service_uuid, window)
                .await
                .map_err(|e| LinkError::Discovery(format!("{:#}", e)))
        }

        async fn connect(
            &mut self,
            peripheral: &DiscoveredPeripheral,
            service_uuid: &str,
            characteristic_uuid: &str,
        ) -> Result<WinBleLink, LinkError> {
            connection::open_link(peripheral.address, service_uuid, characteristic_uuid)
                .await
                .map_err(|e| LinkError::Connection(format!("{:#}", e)))
        }
    }
}

#[cfg(not(windows))]
mod unsupported {
    use super::*;
    use crate::domain::lifecycle::{BleLink, NotificationSender};

    const UNSUPPORTED: &str = "Bluetooth LE is only supported on Windows";

    pub struct UnsupportedBleBackend;

    impl UnsupportedBleBackend {
        pub fn new() -> Self {
            Self
        }
    }

    /// Never constructed: discovery always fails first.
    pub enum UnsupportedLink {}

    impl BleLink for UnsupportedLink {
        async fn subscribe(&mut self, _notifications: NotificationSender) -> Result<(), LinkError> {
            match *self {}
        }

        async fn unsubscribe(&mut self) -> Result<(), LinkError> {
            match *self {}
        }

        fn is_connected(&self) -> bool {
            match *self {}
        }
    }

    impl BleBackend for UnsupportedBleBackend {
        type Link = UnsupportedLink;

        async fn discover(
            &mut self,
            _service_uuid: &str,
            _window: Duration,
        ) -> Result<Option<DiscoveredPeripheral>, LinkError> {
            Err(LinkError::Discovery(UNSUPPORTED.to_string()))
        }

        async fn connect(
            &mut self,
            _peripheral: &DiscoveredPeripheral,
            _service_uuid: &str,
            _characteristic_uuid: &str,
        ) -> Result<UnsupportedLink, LinkError> {
            Err(LinkError::Connection(UNSUPPORTED.to_string()))
        }
    }
}
