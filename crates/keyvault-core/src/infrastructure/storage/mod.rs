//! Secret storage backends and the host facilities they sit on

pub mod keystore;
pub mod native;
pub mod session;
pub mod web;

pub use keystore::{DEFAULT_KEYRING_SERVICE, InMemoryKeystore, KeyringKeystore};
pub use native::NativeSecureBackend;
pub use session::InMemorySessionStorage;
pub use web::WebSessionBackend;
