// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Contract manifests
//!
//! ```toml
//! name = "calc"
//!
//! [[methods]]
//! signature = "add(uint64,uint64)uint64"
//!
//! [[methods]]
//! signature = "join()void"
//! config = { opt_in = "all", no_op = "never" }
//! ```

use abi_router::{Contract, Method, MethodConfig, RouterError, SelectorTable};
use anyhow::{bail, Context};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodEntry {
    pub signature: String,
    #[serde(default)]
    pub config: MethodConfig,
}

impl Manifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid manifest {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let manifest: Manifest = toml::from_str(s)?;
        if manifest.name.is_empty() {
            bail!("contract name must not be empty");
        }
        Ok(manifest)
    }

    /// Descriptor of the manifest's methods, rejecting anything the router
    /// would reject at registration
    pub fn contract(&self) -> anyhow::Result<Contract> {
        let mut selectors = SelectorTable::new();
        let mut methods = Vec::with_capacity(self.methods.len());
        for entry in &self.methods {
            let method = Method::from_signature(&entry.signature)?;
            let signature = method.signature();
            if entry.config.is_never() {
                return Err(RouterError::NeverExecuted(signature).into());
            }
            selectors.insert(&signature)?;
            methods.push(method);
        }
        log::debug!("manifest {}: {} methods", self.name, methods.len());
        Ok(Contract::new(self.name.as_str(), methods))
    }
}
