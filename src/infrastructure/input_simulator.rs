use crate::domain::actuators::KeyActuator;
use crate::domain::error::ActuatorError;

#[cfg(windows)]
pub use self::send_input::InputSimulator;
#[cfg(not(windows))]
pub use self::unsupported::InputSimulator;

#[cfg(windows)]
mod send_input {
    use super::*;
    use tracing::debug;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
        KEYEVENTF_KEYUP, VIRTUAL_KEY, VK_MEDIA_PLAY_PAUSE,
    };

    pub struct InputSimulator;

    impl InputSimulator {
        pub fn new() -> Self {
            Self
        }

        fn send_key(&self, key: VIRTUAL_KEY, flags: KEYBD_EVENT_FLAGS) -> anyhow::Result<()> {
            let input = INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: key,
                        wScan: 0,
                        dwFlags: flags,
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            };

            let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
            if sent == 0 {
                anyhow::bail!("SendInput was blocked for key {:?}", key);
            }
            Ok(())
        }

        /// Simulate key press
        pub fn key_down(&self, key: VIRTUAL_KEY) -> anyhow::Result<()> {
            debug!("Key Down: {:?}", key);
            self.send_key(key, KEYBD_EVENT_FLAGS::default())
        }

        /// Simulate key release
        pub fn key_up(&self, key: VIRTUAL_KEY) -> anyhow::Result<()> {
            debug!("Key Up: {:?}", key);
            self.send_key(key, KEYEVENTF_KEYUP)
        }

        /// Simulate key press and release
        pub fn key_press(&self, key: VIRTUAL_KEY) -> anyhow::Result<()> {
            self.key_down(key)?;
            self.key_up(key)?;
            Ok(())
        }
    }

    impl KeyActuator for InputSimulator {
        fn send_media_play_pause(&mut self) -> Result<(), ActuatorError> {
            self.key_press(VK_MEDIA_PLAY_PAUSE)
                .map_err(|e| ActuatorError::Platform(format!("{:#}", e)))
        }
    }
}

#[cfg(not(windows))]
mod unsupported {
    use super::*;

    pub struct InputSimulator;

    impl InputSimulator {
        pub fn new() -> Self {
            Self
        }
    }

    impl KeyActuator for InputSimulator {
        fn send_media_play_pause(&mut self) -> Result<(), ActuatorError> {
            Err(ActuatorError::Unsupported("media key injection"))
        }
    }
}
