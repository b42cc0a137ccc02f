//! BLE Connection Module
//!
//! Opens the link to the peripheral, resolves the sensor characteristic
//! and manages its notification subscription.

use crate::domain::error::LinkError;
use crate::domain::lifecycle::{BleLink, NotificationSender};
use crate::infrastructure::bluetooth::protocol;
use anyhow::Result;
use tracing::{debug, info, warn};
use windows::Devices::Bluetooth::GenericAttributeProfile::{
    GattCharacteristic, GattClientCharacteristicConfigurationDescriptorValue,
    GattCommunicationStatus, GattSession, GattValueChangedEventArgs,
};
use windows::Devices::Bluetooth::{BluetoothConnectionStatus, BluetoothLEDevice};
use windows::Foundation::TypedEventHandler;

/// An open link with its sensor characteristic
pub struct WinBleLink {
    device: BluetoothLEDevice,
    // Held so Windows keeps the link up between notifications
    _session: Option<GattSession>,
    characteristic: GattCharacteristic,
    value_changed_token: Option<i64>,
}

/// Connect to `address` and resolve the sensor characteristic
pub async fn open_link(
    address: u64,
    service_uuid: &str,
    characteristic_uuid: &str,
) -> Result<WinBleLink> {
    info!("Connecting to Bluetooth device: {:#X}", address);

    let device = BluetoothLEDevice::FromBluetoothAddressAsync(address)?.await?;
    info!("Device connected: {:?}", device.Name()?);

    let session = match create_gatt_session(&device).await {
        Ok(session) => {
            debug!("GattSession created, MaintainConnection set to true");
            Some(session)
        }
        Err(e) => {
            warn!("Failed to create GattSession, continuing anyway: {}", e);
            None
        }
    };

    let characteristic = get_characteristic(&device, service_uuid, characteristic_uuid).await?;

    Ok(WinBleLink {
        device,
        _session: session,
        characteristic,
        value_changed_token: None,
    })
}

async fn create_gatt_session(device: &BluetoothLEDevice) -> Result<GattSession> {
    let device_id = device.BluetoothDeviceId()?;
    let session = GattSession::FromDeviceIdAsync(&device_id)?.await?;
    session.SetMaintainConnection(true)?;
    Ok(session)
}

async fn get_characteristic(
    device: &BluetoothLEDevice,
    service_uuid: &str,
    characteristic_uuid: &str,
) -> Result<GattCharacteristic> {
    let service_guid = protocol::parse_guid(service_uuid)?;
    let characteristic_guid = protocol::parse_guid(characteristic_uuid)?;

    let services_result = device.GetGattServicesForUuidAsync(service_guid)?.await?;
    if services_result.Status()? != GattCommunicationStatus::Success {
        anyhow::bail!(
            "Failed to get GATT services: {:?}",
            services_result.Status()?
        );
    }

    let services = services_result.Services()?;
    if services.Size()? == 0 {
        anyhow::bail!("Orientation service not found");
    }
    let service = services.GetAt(0)?;

    let chars_result = service
        .GetCharacteristicsForUuidAsync(characteristic_guid)?
        .await?;
    if chars_result.Status()? != GattCommunicationStatus::Success {
        anyhow::bail!(
            "Failed to get characteristics: {:?}",
            chars_result.Status()?
        );
    }

    let characteristics = chars_result.Characteristics()?;
    if characteristics.Size()? == 0 {
        anyhow::bail!("Sensor characteristic not found");
    }
    info!("Found sensor characteristic");

    Ok(characteristics.GetAt(0)?)
}

impl WinBleLink {
    async fn enable_notifications(&mut self, notifications: NotificationSender) -> Result<()> {
        self.remove_value_handler();

        let handler = TypedEventHandler::new(
            move |_: windows::core::Ref<GattCharacteristic>,
                  args: windows::core::Ref<GattValueChangedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    let value = args.CharacteristicValue()?;
                    let _ = notifications.send(protocol::read_buffer(&value)?);
                }
                Ok(())
            },
        );
        self.value_changed_token = Some(self.characteristic.ValueChanged(&handler)?);

        let status = self
            .characteristic
            .WriteClientCharacteristicConfigurationDescriptorAsync(
                GattClientCharacteristicConfigurationDescriptorValue::Notify,
            )?
            .await?;

        if status != GattCommunicationStatus::Success {
            self.remove_value_handler();
            anyhow::bail!("descriptor write returned {:?}", status);
        }

        info!("Notifications enabled");
        Ok(())
    }

    async fn disable_notifications(&mut self) -> Result<()> {
        self.remove_value_handler();

        let status = self
            .characteristic
            .WriteClientCharacteristicConfigurationDescriptorAsync(
                GattClientCharacteristicConfigurationDescriptorValue::None,
            )?
            .await?;

        if status != GattCommunicationStatus::Success {
            anyhow::bail!("descriptor write returned {:?}", status);
        }
        Ok(())
    }

    fn remove_value_handler(&mut self) {
        if let Some(token) = self.value_changed_token.take() {
            let _ = self.characteristic.RemoveValueChanged(token);
        }
    }
}

impl BleLink for WinBleLink {
    async fn subscribe(&mut self, notifications: NotificationSender) -> Result<(), LinkError> {
        self.enable_notifications(notifications)
            .await
            .map_err(|e| LinkError::Subscription(format!("{:#}", e)))
    }

    async fn unsubscribe(&mut self) -> Result<(), LinkError> {
        self.disable_notifications()
            .await
            .map_err(|e| LinkError::Unsubscribe(format!("{:#}", e)))
    }

    fn is_connected(&self) -> bool {
        self.device
            .ConnectionStatus()
            .map(|s| s == BluetoothConnectionStatus::Connected)
            .unwrap_or(false)
    }
}

impl Drop for WinBleLink {
    fn drop(&mut self) {
        self.remove_value_handler();
        let _ = self.device.Close();
        info!("Disconnected from device");
    }
}
