//! BLE Scanner Module
//!
//! Watches advertisements and picks the first peripheral that offers the
//! orientation service.

use crate::domain::lifecycle::DiscoveredPeripheral;
use crate::infrastructure::bluetooth::protocol;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use windows::Devices::Bluetooth::Advertisement::{
    BluetoothLEAdvertisementReceivedEventArgs, BluetoothLEAdvertisementWatcher,
    BluetoothLEScanningMode,
};
use windows::Foundation::TypedEventHandler;

pub struct BleScanner {
    watcher: Option<BluetoothLEAdvertisementWatcher>,
}

impl BleScanner {
    pub fn new() -> Self {
        Self { watcher: None }
    }

    /// Scan for up to `window` and return the first device advertising
    /// `service_uuid`.
    pub async fn find_first(
        &mut self,
        service_uuid: &str,
        window: Duration,
    ) -> Result<Option<DiscoveredPeripheral>> {
        // Stop any existing scan
        self.stop()?;

        let target_uuid = protocol::parse_guid(service_uuid)?;
        info!("Starting BLE scan for service UUID: {}", service_uuid);

        let (found_tx, mut found_rx) = mpsc::unbounded_channel();
        let watcher = BluetoothLEAdvertisementWatcher::new()?;
        watcher.SetScanningMode(BluetoothLEScanningMode::Active)?;

        let handler = TypedEventHandler::new(
            move |_: windows::core::Ref<BluetoothLEAdvertisementWatcher>,
                  args: windows::core::Ref<BluetoothLEAdvertisementReceivedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    let adv = args.Advertisement()?;
                    let service_uuids = adv.ServiceUuids()?;

                    for i in 0..service_uuids.Size()? {
                        if service_uuids.GetAt(i)? == target_uuid {
                            let name = adv.LocalName()?.to_string();
                            let _ = found_tx.send(DiscoveredPeripheral {
                                name: if name.is_empty() {
                                    "Unknown".to_string()
                                } else {
                                    name
                                },
                                address: args.BluetoothAddress()?,
                            });
                            break;
                        }
                    }
                }
                Ok(())
            },
        );

        watcher.Received(&handler)?;
        watcher.Start()?;
        self.watcher = Some(watcher);

        let found = tokio::time::timeout(window, found_rx.recv())
            .await
            .ok()
            .flatten();
        self.stop()?;

        Ok(found)
    }

    /// Stop scanning
    pub fn stop(&mut self) -> Result<()> {
        if let Some(watcher) = self.watcher.take() {
            info!("Stopping BLE scan...");
            watcher.Stop()?;
        }
        Ok(())
    }
}

impl Drop for BleScanner {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
