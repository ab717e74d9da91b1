//! Domain layer: credential types, rules, and the storage façade

pub mod credential;
