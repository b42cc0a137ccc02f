//! OS collaborators driven by the sensor interpreter.

use crate::domain::error::ActuatorError;

/// System output volume, as a scalar in `[0.0, 1.0]`.
pub trait VolumeActuator {
    fn get_current_volume(&mut self) -> Result<f64, ActuatorError>;
    fn set_volume(&mut self, level: f64) -> Result<(), ActuatorError>;
}

/// Media key injection.
pub trait KeyActuator {
    fn send_media_play_pause(&mut self) -> Result<(), ActuatorError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// In-memory volume endpoint.
    #[derive(Debug, Default)]
    pub struct FakeVolume {
        pub level: f64,
        pub writes: Vec<f64>,
        pub reads: usize,
        pub fail_reads: bool,
        pub fail_writes: bool,
    }

    impl FakeVolume {
        pub fn at(level: f64) -> Self {
            Self {
                level,
                ..Default::default()
            }
        }
    }

    impl VolumeActuator for FakeVolume {
        fn get_current_volume(&mut self) -> Result<f64, ActuatorError> {
            self.reads += 1;
            if self.fail_reads {
                return Err(ActuatorError::Platform("endpoint unavailable".to_string()));
            }
            Ok(self.level)
        }

        fn set_volume(&mut self, level: f64) -> Result<(), ActuatorError> {
            if self.fail_writes {
                return Err(ActuatorError::Platform("endpoint unavailable".to_string()));
            }
            self.level = level;
            self.writes.push(level);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeKeys {
        /// Every attempt, failed or not.
        pub presses: usize,
        pub fail: bool,
    }

    impl KeyActuator for FakeKeys {
        fn send_media_play_pause(&mut self) -> Result<(), ActuatorError> {
            self.presses += 1;
            if self.fail {
                return Err(ActuatorError::Platform("input blocked".to_string()));
            }
            Ok(())
        }
    }
}
