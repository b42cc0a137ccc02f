//! System output volume through the default render endpoint.

use crate::domain::actuators::VolumeActuator;
use crate::domain::error::ActuatorError;

#[cfg(windows)]
pub use self::endpoint::SystemVolume;
#[cfg(not(windows))]
pub use self::unsupported::SystemVolume;

#[cfg(windows)]
mod endpoint {
    use super::*;
    use tracing::{debug, warn};
    use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
    use windows::Win32::Media::Audio::{eConsole, eRender, IMMDeviceEnumerator, MMDeviceEnumerator};
    use windows::Win32::System::Com::{
        CoCreateInstance, CoInitializeEx, CLSCTX_ALL, COINIT_MULTITHREADED,
    };

    /// Master volume of the default speakers. The endpoint is acquired on
    /// first use and dropped again after a failed call, so a device
    /// change is picked up on the next sample.
    pub struct SystemVolume {
        endpoint: Option<IAudioEndpointVolume>,
    }

    impl SystemVolume {
        pub fn new() -> Self {
            Self { endpoint: None }
        }

        fn endpoint(&mut self) -> Result<&IAudioEndpointVolume, ActuatorError> {
            if self.endpoint.is_none() {
                self.endpoint = Some(Self::open_default_endpoint().map_err(platform)?);
                debug!("Opened default audio endpoint");
            }
            self.endpoint
                .as_ref()
                .ok_or_else(|| ActuatorError::Platform("no audio endpoint".to_string()))
        }

        fn open_default_endpoint() -> windows::core::Result<IAudioEndpointVolume> {
            unsafe {
                // S_FALSE or RPC_E_CHANGED_MODE just mean COM is already up on this thread
                let hr = CoInitializeEx(None, COINIT_MULTITHREADED);
                if hr.is_err() {
                    debug!("CoInitializeEx returned {:?}", hr);
                }

                let enumerator: IMMDeviceEnumerator =
                    CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)?;
                let device = enumerator.GetDefaultAudioEndpoint(eRender, eConsole)?;
                device.Activate::<IAudioEndpointVolume>(CLSCTX_ALL, None)
            }
        }

        fn reset_on_error<T>(
            &mut self,
            result: windows::core::Result<T>,
        ) -> Result<T, ActuatorError> {
            result.map_err(|e| {
                warn!("Audio endpoint call failed: {}", e);
                self.endpoint = None;
                platform(e)
            })
        }
    }

    fn platform(e: windows::core::Error) -> ActuatorError {
        ActuatorError::Platform(e.to_string())
    }

    impl VolumeActuator for SystemVolume {
        fn get_current_volume(&mut self) -> Result<f64, ActuatorError> {
            let result = unsafe { self.endpoint()?.GetMasterVolumeLevelScalar() };
            let level = self.reset_on_error(result)?;
            Ok(f64::from(level).clamp(0.0, 1.0))
        }

        fn set_volume(&mut self, level: f64) -> Result<(), ActuatorError> {
            let level = level.clamp(0.0, 1.0) as f32;
            let result =
                unsafe { self.endpoint()?.SetMasterVolumeLevelScalar(level, std::ptr::null()) };
            self.reset_on_error(result)
        }
    }
}

#[cfg(not(windows))]
mod unsupported {
    use super::*;

    pub struct SystemVolume;

    impl SystemVolume {
        pub fn new() -> Self {
            Self
        }
    }

    impl VolumeActuator for SystemVolume {
        fn get_current_volume(&mut self) -> Result<f64, ActuatorError> {
            Err(ActuatorError::Unsupported("system volume control"))
        }

        fn set_volume(&mut self, _level: f64) -> Result<(), ActuatorError> {
            Err(ActuatorError::Unsupported("system volume control"))
        }
    }
}
