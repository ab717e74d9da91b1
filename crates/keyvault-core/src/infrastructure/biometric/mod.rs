//! Biometric gate implementations
//!
//! - **Native**: delegates to the OS prompt through a host-supplied
//!   `BiometricApi`; every non-success is collapsed into one failure shape.
//! - **Web**: never available, always fails closed.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::credential::{
    AuthenticationResult, BiometricApi, BiometricAvailability, BiometricGate, BiometricMethod,
};
use crate::error::{Error, Result};

/// Failure message for any unsuccessful native prompt
pub const BIOMETRIC_FAILED: &str = "Biometric authentication failed";

/// Failure message for the web gate
pub const BIOMETRIC_UNSUPPORTED_ON_WEB: &str = "Biometric authentication is not supported on web";

/// Gate backed by the OS biometric prompt
pub struct NativeBiometricGate {
    api: Arc<dyn BiometricApi>,
}

impl std::fmt::Debug for NativeBiometricGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBiometricGate").finish_non_exhaustive()
    }
}

impl NativeBiometricGate {
    pub fn new(api: Arc<dyn BiometricApi>) -> Self {
        Self { api }
    }

    async fn availability(&self) -> BiometricAvailability {
        match self.api.check_availability().await {
            Ok(availability) => availability,
            Err(e) => {
                tracing::debug!(error = %e, "Biometric availability check failed");
                BiometricAvailability::default()
            }
        }
    }
}

#[async_trait]
impl BiometricGate for NativeBiometricGate {
    async fn is_available(&self) -> bool {
        self.availability().await.is_available
    }

    async fn supported_methods(&self) -> Vec<BiometricMethod> {
        let availability = self.availability().await;
        match (availability.is_available, availability.method) {
            (true, Some(method)) => vec![method],
            _ => Vec::new(),
        }
    }

    async fn authenticate(&self, prompt: &str) -> AuthenticationResult {
        match self.api.authenticate(prompt).await {
            Ok(()) => AuthenticationResult::success(),
            Err(e) => {
                // The OS reason (cancel, lockout, no hardware) is dropped here
                tracing::debug!(error = %e, "Biometric prompt did not succeed");
                AuthenticationResult::failure(BIOMETRIC_FAILED)
            }
        }
    }
}

/// Gate for the web shell, which has no biometric prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct WebBiometricGate;

#[async_trait]
impl BiometricGate for WebBiometricGate {
    async fn is_available(&self) -> bool {
        false
    }

    async fn supported_methods(&self) -> Vec<BiometricMethod> {
        Vec::new()
    }

    async fn authenticate(&self, _prompt: &str) -> AuthenticationResult {
        AuthenticationResult::failure(BIOMETRIC_UNSUPPORTED_ON_WEB)
    }
}

/// `BiometricApi` for hosts without a biometric prompt (e.g. desktop CLI)
///
/// Reports no hardware and refuses every prompt, so gated operations fail
/// closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedBiometricApi;

#[async_trait]
impl BiometricApi for UnsupportedBiometricApi {
    async fn check_availability(&self) -> Result<BiometricAvailability> {
        Ok(BiometricAvailability::default())
    }

    async fn authenticate(&self, _prompt: &str) -> Result<()> {
        Err(Error::BiometricDenied(
            "No biometric hardware available".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedApi {
        availability: Result<BiometricAvailability>,
        accept: bool,
    }

    #[async_trait]
    impl BiometricApi for ScriptedApi {
        async fn check_availability(&self) -> Result<BiometricAvailability> {
            match &self.availability {
                Ok(a) => Ok(*a),
                Err(_) => Err(Error::BiometricDenied("hardware error".to_string())),
            }
        }

        async fn authenticate(&self, _prompt: &str) -> Result<()> {
            if self.accept {
                Ok(())
            } else {
                Err(Error::BiometricDenied("user cancelled (code -2)".to_string()))
            }
        }
    }

    fn gate(availability: Result<BiometricAvailability>, accept: bool) -> NativeBiometricGate {
        NativeBiometricGate::new(Arc::new(ScriptedApi {
            availability,
            accept,
        }))
    }

    #[tokio::test]
    async fn test_native_available_reports_method() {
        let gate = gate(
            Ok(BiometricAvailability {
                is_available: true,
                method: Some(BiometricMethod::FaceRecognition),
            }),
            true,
        );
        assert!(gate.is_available().await);
        assert_eq!(
            gate.supported_methods().await,
            vec![BiometricMethod::FaceRecognition]
        );
        assert!(gate.authenticate("Unlock").await.success);
    }

    #[tokio::test]
    async fn test_native_failure_is_normalized() {
        let gate = gate(Ok(BiometricAvailability::default()), false);
        let result = gate.authenticate("Unlock").await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(BIOMETRIC_FAILED));
    }

    #[tokio::test]
    async fn test_native_availability_error_means_unavailable() {
        let gate = gate(Err(Error::BiometricDenied("x".to_string())), false);
        assert!(!gate.is_available().await);
        assert!(gate.supported_methods().await.is_empty());
    }

    #[tokio::test]
    async fn test_web_gate_always_fails_closed() {
        let gate = WebBiometricGate;
        assert!(!gate.is_available().await);
        assert!(gate.supported_methods().await.is_empty());

        let result = gate.authenticate("Unlock").await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(BIOMETRIC_UNSUPPORTED_ON_WEB));
    }

    #[tokio::test]
    async fn test_unsupported_api_through_native_gate() {
        let gate = NativeBiometricGate::new(Arc::new(UnsupportedBiometricApi));
        assert!(!gate.is_available().await);
        assert_eq!(
            gate.authenticate("Unlock").await.error.as_deref(),
            Some(BIOMETRIC_FAILED)
        );
    }
}
