// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use sha2::{Digest, Sha512_256};

/// 4-byte method fingerprint
pub type Selector = [u8; 4];

/// Tag prefixed to logged method return values
pub const RETURN_METHOD_SELECTOR: Selector = [0x15, 0x1f, 0x7c, 0x75];

/// First four bytes of the SHA-512/256 digest of the signature
pub fn method_selector(signature: &str) -> Selector {
    let digest = Sha512_256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}
