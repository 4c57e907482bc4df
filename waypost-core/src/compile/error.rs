use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to hash password for user '{username}': {source}")]
    Hash {
        username: String,
        #[source]
        source: bcrypt::BcryptError,
    },
}

#[derive(Debug, Error)]
pub enum HostIpError {
    #[error("failed to enumerate network interfaces: {0}")]
    Interfaces(#[source] nix::Error),

    #[error("no non-loopback IPv4 address found")]
    NoAddress,
}
