//! Concrete platform bundles
//!
//! The host constructs exactly one of these and hands it to `KeyStorage`.

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::domain::credential::{
    BiometricApi, BiometricGate, PlatformCapabilities, PlatformKind, SecretBackend,
    SecureKeystore, SessionStorage,
};
use crate::infrastructure::biometric::{NativeBiometricGate, WebBiometricGate};
use crate::infrastructure::storage::{
    InMemoryKeystore, InMemorySessionStorage, KeyringKeystore, NativeSecureBackend,
    WebSessionBackend,
};

/// Native shell: hardware keystore plus OS biometric prompt
#[derive(Debug)]
pub struct NativePlatform {
    gate: NativeBiometricGate,
    backend: NativeSecureBackend,
}

impl NativePlatform {
    pub fn new(
        keystore: Arc<dyn SecureKeystore>,
        biometrics: Arc<dyn BiometricApi>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            gate: NativeBiometricGate::new(biometrics),
            backend: NativeSecureBackend::new(keystore, config.key_prefix.clone()),
        }
    }

    /// Native platform over the OS keyring
    pub fn with_os_keyring(biometrics: Arc<dyn BiometricApi>, config: &StorageConfig) -> Self {
        let keystore = Arc::new(KeyringKeystore::new(config.keyring_service.clone()));
        Self::new(keystore, biometrics, config)
    }

    /// Native platform over an in-memory keystore, for tests and demos
    pub fn in_memory(biometrics: Arc<dyn BiometricApi>, config: &StorageConfig) -> Self {
        Self::new(Arc::new(InMemoryKeystore::new()), biometrics, config)
    }
}

impl PlatformCapabilities for NativePlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Native
    }

    fn biometric_gate(&self) -> &dyn BiometricGate {
        &self.gate
    }

    fn secret_backend(&self) -> &dyn SecretBackend {
        &self.backend
    }
}

/// Web shell: encrypted session storage, no biometrics
#[derive(Debug)]
pub struct WebPlatform {
    gate: WebBiometricGate,
    backend: WebSessionBackend,
}

impl WebPlatform {
    pub fn new(storage: Arc<dyn SessionStorage>, config: &StorageConfig) -> Self {
        Self {
            gate: WebBiometricGate,
            backend: WebSessionBackend::new(
                storage,
                config.key_prefix.clone(),
                config.cipher_key_name.clone(),
            ),
        }
    }

    /// Web platform whose session is the current process
    pub fn ephemeral(config: &StorageConfig) -> Self {
        Self::new(Arc::new(InMemorySessionStorage::new()), config)
    }
}

impl PlatformCapabilities for WebPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Web
    }

    fn biometric_gate(&self) -> &dyn BiometricGate {
        &self.gate
    }

    fn secret_backend(&self) -> &dyn SecretBackend {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::biometric::UnsupportedBiometricApi;

    #[tokio::test]
    async fn test_kinds() {
        let config = StorageConfig::default();
        let native = NativePlatform::in_memory(Arc::new(UnsupportedBiometricApi), &config);
        let web = WebPlatform::ephemeral(&config);

        assert_eq!(native.kind(), PlatformKind::Native);
        assert_eq!(web.kind(), PlatformKind::Web);
        assert!(!web.biometric_gate().is_available().await);
    }
}
