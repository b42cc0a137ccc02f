pub mod actuators;
pub mod error;
pub mod gestures;
pub mod interpreter;
pub mod lifecycle;
pub mod models;
pub mod sample;
pub mod settings;
pub mod status;
pub mod volume;
