use crate::compile::HostIpError;
use nix::ifaddrs::getifaddrs;
use std::net::Ipv4Addr;

/// One-way salted hash for basic-auth passwords. The proxy verifies them.
pub trait CredentialHasher {
    fn hash(&self, password: &str) -> Result<String, bcrypt::BcryptError>;
}

/// Resolves the address substituted for the server IP header token.
pub trait HostIpLookup {
    fn host_ip(&self) -> Result<Ipv4Addr, HostIpError>;
}

/// bcrypt at the library's default cost, one of the formats the proxy accepts.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl BcryptHasher {
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, bcrypt::BcryptError> {
        bcrypt::hash(password, self.cost)
    }
}

/// First non-loopback IPv4 address of the host's interfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceLookup;

impl HostIpLookup for InterfaceLookup {
    fn host_ip(&self) -> Result<Ipv4Addr, HostIpError> {
        let addrs = getifaddrs().map_err(HostIpError::Interfaces)?;
        addrs
            .filter_map(|ifa| {
                let sin = ifa.address.as_ref()?.as_sockaddr_in()?;
                Some(Ipv4Addr::from(sin.ip()))
            })
            .find(|ip| !ip.is_loopback())
            .ok_or(HostIpError::NoAddress)
    }
}
