// ABOUTME: Error types for backend-info index allocation
// ABOUTME: Reports when no positive KVM index is left to hand out

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KvmError {
    #[error("KVM index space exhausted: {highest} is already allocated")]
    IndexExhausted { highest: u32 },
}

pub type Result<T> = std::result::Result<T, KvmError>;
