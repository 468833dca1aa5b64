// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Lowering of expression trees to TEAL assembly text

mod constants;
mod lower;
mod ops;
mod optimize;

pub use ops::{Op, TealComponent};

use crate::error::IrError;
use crate::expr::Expr;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const MIN_PROGRAM_VERSION: u64 = 2;
pub const MAX_PROGRAM_VERSION: u64 = 8;
pub const DEFAULT_PROGRAM_VERSION: u64 = 6;

/// Lowering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Program version; gates which instructions may be emitted.
    pub version: u64,
    /// Whether repeated constants are pooled into constant blocks.
    pub assemble_constants: bool,
    pub optimize: OptimizeOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeOptions {
    /// Whether scratch slots that only forward a value are removed.
    pub scratch_slots: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            version: DEFAULT_PROGRAM_VERSION,
            assemble_constants: false,
            optimize: OptimizeOptions::default(),
        }
    }
}

impl CompileOptions {
    pub fn with_version(version: u64) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, IrError> {
        toml::from_str(s).map_err(|e| IrError::InvalidOptions(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), IrError> {
        if !(MIN_PROGRAM_VERSION..=MAX_PROGRAM_VERSION).contains(&self.version) {
            return Err(IrError::UnsupportedVersion {
                version: self.version,
                min: MIN_PROGRAM_VERSION,
                max: MAX_PROGRAM_VERSION,
            });
        }
        Ok(())
    }
}

/// Lower `program` to assembly components, applying the requested passes
pub fn compile_components(
    program: &Expr,
    options: &CompileOptions,
) -> Result<Vec<TealComponent>, IrError> {
    options.validate()?;
    let mut components = lower::Lowering::new(options).lower_program(program)?;
    if options.optimize.scratch_slots {
        components = optimize::remove_redundant_slots(components);
    }
    if options.assemble_constants {
        components = constants::assemble_constants(components);
    }
    Ok(components)
}

/// Lower `program` to assembly text, starting with the version pragma
pub fn compile(program: &Expr, options: &CompileOptions) -> Result<String, IrError> {
    let components = compile_components(program, options)?;
    Ok(format!(
        "#pragma version {}\n{}",
        options.version,
        components.iter().join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::TypeSpec;
    use crate::subroutine::{AbiReturnSubroutine, Param, Subroutine};
    use crate::types::{OnComplete, TealType};

    #[test]
    fn test_cond_lowering() {
        let program = Expr::cond(vec![
            (
                Expr::eq(Expr::on_completion(), Expr::on_complete(OnComplete::OptIn)),
                Expr::approve(),
            ),
            (Expr::int(1), Expr::reject()),
        ]);
        let teal = compile(&program, &CompileOptions::default()).unwrap();
        assert_eq!(
            teal,
            "#pragma version 6
txn OnCompletion
int OptIn
==
bnz main_l0
int 1
bnz main_l1
err
main_l0:
int 1
return
main_l1:
int 0
return"
        );
    }

    #[test]
    fn test_subroutines_follow_main() {
        let hello = Subroutine::new(
            "hello",
            vec![],
            TealType::None,
            Expr::log(Expr::bytes(b"hi".to_vec())),
        );
        let program = Expr::seq(vec![hello.call(vec![]), Expr::approve()]);
        let teal = compile(&program, &CompileOptions::default()).unwrap();
        assert_eq!(
            teal,
            "#pragma version 6
callsub hello_0
int 1
return
hello_0:
byte 0x6869
log
retsub"
        );
    }

    #[test]
    fn test_subroutine_params_use_their_own_slots() {
        let double = AbiReturnSubroutine::new(
            "double",
            vec![Param::abi("x", TypeSpec::Uint(64))],
            Some(TypeSpec::Uint(64)),
            Expr::Return(Some(Box::new(Expr::unop(
                crate::expr::UnOp::Itob,
                Expr::add(
                    Expr::unop(crate::expr::UnOp::Btoi, Expr::Param { index: 0, ty: TealType::Bytes }),
                    Expr::unop(crate::expr::UnOp::Btoi, Expr::Param { index: 0, ty: TealType::Bytes }),
                ),
            )))),
        );
        let program = Expr::seq(vec![
            Expr::log(double.call(vec![Expr::app_arg(1)])),
            Expr::approve(),
        ]);
        let teal = compile(&program, &CompileOptions::default()).unwrap();
        assert!(teal.contains("double_0:\nstore 0\nload 0\nbtoi\nload 0\nbtoi\n+\nitob\nretsub"));
    }

    #[test]
    fn test_version_gating() {
        let ret = TypeSpec::Uint(64).new_instance();
        let program = Expr::seq(vec![Expr::MethodReturn(ret), Expr::approve()]);
        let err = compile(&program, &CompileOptions::with_version(4)).unwrap_err();
        assert_eq!(
            err,
            IrError::VersionTooLow {
                op: "log",
                min: 5,
                current: 4
            }
        );
        assert_eq!(err.to_string(), "current version 4 is lower than log's min version 5");
        assert!(compile(&program, &CompileOptions::with_version(5)).is_ok());
        assert!(matches!(
            compile(&program, &CompileOptions::with_version(1)),
            Err(IrError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_method_return_lowering() {
        let ret = TypeSpec::Uint(64).new_instance();
        let program = Expr::seq(vec![
            ret.decode(Expr::app_arg(1)),
            Expr::MethodReturn(ret),
            Expr::approve(),
        ]);
        let teal = compile(&program, &CompileOptions::default()).unwrap();
        assert_eq!(
            teal,
            "#pragma version 6
txna ApplicationArgs 1
store 0
byte 0x151f7c75
load 0
concat
log
int 1
return"
        );
    }

    #[test]
    fn test_tuple_element_lowering() {
        let tuple = TypeSpec::Tuple(vec![TypeSpec::Uint(64), TypeSpec::Bool, TypeSpec::String])
            .new_instance();
        let (a, b, c) = (
            TypeSpec::Uint(64).new_instance(),
            TypeSpec::Bool.new_instance(),
            TypeSpec::String.new_instance(),
        );
        let program = Expr::seq(vec![
            tuple.decode(Expr::app_arg(1)),
            tuple.element(0).unwrap().store_into(&a),
            tuple.element(1).unwrap().store_into(&b),
            tuple.element(2).unwrap().store_into(&c),
            Expr::approve(),
        ]);
        let teal = compile(&program, &CompileOptions::default()).unwrap();
        assert_eq!(
            teal,
            "#pragma version 6
txna ApplicationArgs 1
store 0
load 0
extract 0 8
store 1
load 0
int 64
getbit
byte 0x00
int 0
uncover 2
setbit
store 2
load 0
load 0
int 9
extract_uint16
load 0
len
substring3
store 3
int 1
return"
        );
    }

    #[test]
    fn test_main_return_needs_value() {
        assert_eq!(
            compile(&Expr::Return(None), &CompileOptions::default()),
            Err(IrError::MainReturnWithoutValue)
        );
    }

    #[test]
    fn test_options_from_toml() {
        let options = CompileOptions::from_toml_str(
            "version = 8\nassemble_constants = true\n[optimize]\nscratch_slots = true\n",
        )
        .unwrap();
        assert_eq!(options.version, 8);
        assert!(options.assemble_constants);
        assert!(options.optimize.scratch_slots);
        assert_eq!(CompileOptions::from_toml_str("").unwrap(), CompileOptions::default());
        assert!(CompileOptions::from_toml_str("verison = 8").is_err());
    }
}
