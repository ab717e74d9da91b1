//! Infrastructure layer: crypto, storage backends, biometrics, HTTP validators

pub mod biometric;
pub mod crypto;
pub mod platform;
pub mod storage;
pub mod validation;

pub use platform::{NativePlatform, WebPlatform};
