//! Compiled-template cache keys.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::application::render::EngineChain;
use crate::domain::engine::EngineId;

/// Identity of one compiled template: the document identifier, the bound
/// engine, the chain state relevant to its engine family, and a digest of the
/// raw body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    identifier: String,
    engine: EngineId,
    chain: String,
    body_digest: String,
}

impl CacheKey {
    pub fn new(identifier: &str, engine: &EngineId, chain: &EngineChain, body: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            engine: engine.clone(),
            chain: chain.key_fragment(),
            body_digest: hash_body(body),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.identifier, self.engine)?;
        if !self.chain.is_empty() {
            write!(f, "|{}", self.chain)?;
        }
        write!(f, "|{}", self.body_digest)
    }
}

/// Hex-encoded SHA-256 of a template body.
pub fn hash_body(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}
