//! Deterministic collaborators for reproducible graphs in tests.

use crate::compile::{CredentialHasher, HostIpError, HostIpLookup};
use std::net::Ipv4Addr;

/// Prefix of every hash produced by [`StaticHasher`].
pub const STATIC_HASH_PREFIX: &str = "$static$";

/// "Hashes" a password by prefixing it. Never use outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticHasher;

impl CredentialHasher for StaticHasher {
    fn hash(&self, password: &str) -> Result<String, bcrypt::BcryptError> {
        Ok(format!("{}{}", STATIC_HASH_PREFIX, password))
    }
}

/// Always fails, like a hasher given an unusable cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingHasher;

impl CredentialHasher for FailingHasher {
    fn hash(&self, _password: &str) -> Result<String, bcrypt::BcryptError> {
        Err(bcrypt::BcryptError::CostNotAllowed(0))
    }
}

/// Fixed host address, or a failed lookup when `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticHostIp(pub Option<Ipv4Addr>);

impl StaticHostIp {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self(Some(ip))
    }

    pub fn unavailable() -> Self {
        Self(None)
    }
}

impl HostIpLookup for StaticHostIp {
    fn host_ip(&self) -> Result<Ipv4Addr, HostIpError> {
        self.0.ok_or(HostIpError::NoAddress)
    }
}
