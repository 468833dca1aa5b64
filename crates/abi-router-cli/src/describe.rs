// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::manifest::{Manifest, MethodEntry};
use abi_router::{Contract, Method, MethodConfig};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Contract descriptor options
#[derive(Args)]
#[clap(next_help_heading = "Describe Options")]
pub struct DescribeArgs {
    /// Path to a contract manifest in TOML
    #[clap(
        long,
        short = 'm',
        conflicts_with_all = ["name", "signatures"],
        required_unless_present = "name"
    )]
    pub manifest: Option<PathBuf>,

    /// Contract name, when listing signatures on the command line
    #[clap(long, short = 'n', requires = "signatures")]
    pub name: Option<String>,

    /// Method signatures, registered with the default call config
    pub signatures: Vec<String>,
}

impl DescribeArgs {
    fn into_manifest(self) -> anyhow::Result<Manifest> {
        match (self.manifest, self.name) {
            (Some(path), _) => Manifest::load(&path),
            (None, Some(name)) => Ok(Manifest {
                name,
                methods: self
                    .signatures
                    .into_iter()
                    .map(|signature| MethodEntry {
                        signature,
                        config: MethodConfig::default(),
                    })
                    .collect(),
            }),
            (None, None) => anyhow::bail!("either --manifest or --name is required"),
        }
    }
}

pub fn execute(args: DescribeArgs) -> anyhow::Result<()> {
    let contract = args.into_manifest()?.contract()?;
    println!("{}", describe(&contract)?);
    Ok(())
}

fn describe(contract: &Contract) -> anyhow::Result<String> {
    contract
        .to_json()
        .with_context(|| format!("failed to serialize contract {}", contract.name))
}

/// One `0x<selector>  <signature>` line per signature, in canonical form
pub fn selector_lines(signatures: &[String]) -> anyhow::Result<Vec<String>> {
    signatures
        .iter()
        .map(|signature| {
            let method = Method::from_signature(signature)?;
            Ok(format!(
                "0x{}  {}",
                hex::encode(method.selector()),
                method.signature()
            ))
        })
        .collect()
}

pub fn print_selectors(signatures: &[String]) -> anyhow::Result<()> {
    for line in selector_lines(signatures)? {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_lines() {
        let lines = selector_lines(&[
            "add(uint64,uint64)uint64".to_string(),
            "add(uint64,uint64)uint128".to_string(),
        ])
        .unwrap();
        assert_eq!(
            lines,
            vec![
                "0xfe6bdf69  add(uint64,uint64)uint64",
                "0x8aa3b61f  add(uint64,uint64)uint128"
            ]
        );
        assert!(selector_lines(&["add(uint63)void".to_string()]).is_err());
    }

    #[test]
    fn test_describe_from_signatures() {
        let args = DescribeArgs {
            manifest: None,
            name: Some("calc".to_string()),
            signatures: vec!["add(uint64,uint64)uint64".to_string()],
        };
        let contract = args.into_manifest().unwrap().contract().unwrap();
        let json: serde_json::Value = serde_json::from_str(&describe(&contract).unwrap()).unwrap();
        assert_eq!(json["name"], "calc");
        assert_eq!(json["methods"][0]["returns"]["type"], "uint64");
    }

    #[test]
    fn test_cli_arguments() {
        use crate::{Cli, Commands};
        use clap::Parser;

        let cli = Cli::try_parse_from(["abi-router", "-v", "describe", "--name", "calc", "ping()void"])
            .unwrap();
        assert!(cli.general_config.verbose);
        assert!(matches!(cli.command, Commands::Describe(DescribeArgs { name: Some(_), .. })));

        assert!(Cli::try_parse_from(["abi-router", "describe"]).is_err());
        assert!(Cli::try_parse_from(["abi-router", "describe", "-m", "a.toml", "-n", "x"]).is_err());
        assert!(Cli::try_parse_from(["abi-router", "selector"]).is_err());
    }
}
