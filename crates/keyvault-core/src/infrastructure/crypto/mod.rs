//! Symmetric encryption for the web fallback

pub mod cipher;

pub use cipher::{EncryptedBlob, SessionCipher, SessionKey};
