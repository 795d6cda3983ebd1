use blake3::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypeError;

macro_rules! define_id {
    ($name:ident, $label:literal) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Derive a fresh id from record content, the current timestamp
            /// and a random nonce.
            pub fn generate(content: &[u8]) -> Self {
                let mut hasher = Hasher::new();
                hasher.update(content);
                hasher.update(&chrono::Utc::now().timestamp_micros().to_le_bytes());
                hasher.update(&rand::random::<u64>().to_le_bytes());
                Self(hasher.finalize().into())
            }

            pub fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn from_hex(s: &str) -> Result<Self, TypeError> {
                let bytes = hex::decode(s).map_err(|_| TypeError::InvalidId($label))?;
                if bytes.len() != 32 {
                    return Err(TypeError::InvalidId($label));
                }
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({}...)"), &self.to_hex()[..8])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl std::str::FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }
    };
}

define_id!(TaskId, "task");
define_id!(AgentId, "agent");
define_id!(SubmissionId, "submission");
define_id!(PaymentId, "payment");
