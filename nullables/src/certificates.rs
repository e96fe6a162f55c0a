//! Nullable certificate registry: in-memory holder levels.

use scholar_governance::CertificateLevels;
use scholar_types::Address;
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory stand-in for the certificate-issuance collaborator.
#[derive(Default)]
pub struct NullCertificates {
    levels: Mutex<HashMap<Address, u8>>,
}

impl NullCertificates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Certify `holder` at `level` (0 clears it).
    pub fn set_level(&self, holder: Address, level: u8) {
        let mut levels = self.levels.lock().unwrap();
        if level == 0 {
            levels.remove(&holder);
        } else {
            levels.insert(holder, level);
        }
    }
}

impl CertificateLevels for NullCertificates {
    fn holder_level(&self, holder: &Address) -> u8 {
        self.levels
            .lock()
            .unwrap()
            .get(holder)
            .copied()
            .unwrap_or(0)
    }
}
