// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Handler wrapping
//!
//! Turns a registered handler into the branch body executed when its guard
//! holds: argument decoding from application arguments, the call itself, the
//! logged return value and the final approval.

use crate::error::RouterError;
use std::fmt::{self, Display, Formatter};
use teal_ir::abi::{AbiValue, ReturnedValue, TypeSpec};
use teal_ir::{AbiReturnSubroutine, Expr, Subroutine, TealType};

/// Application arguments usable by a method call. Argument 0 carries the
/// selector, so at most `METHOD_ARG_NUM_LIMIT` ABI arguments fit.
pub const METHOD_ARG_NUM_LIMIT: usize = 15;

/// Something that can be registered with the router
#[derive(Debug, Clone, Copy)]
pub enum Handler<'h> {
    Expr(&'h Expr),
    Subroutine(&'h Subroutine),
    AbiMethod(&'h AbiReturnSubroutine),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Expr,
    Subroutine,
    AbiMethod,
}

impl Display for HandlerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandlerKind::Expr => "expression",
            HandlerKind::Subroutine => "subroutine",
            HandlerKind::AbiMethod => "ABI-returning subroutine",
        };
        write!(f, "{}", s)
    }
}

impl<'h> Handler<'h> {
    pub fn kind(&self) -> HandlerKind {
        match self {
            Handler::Expr(_) => HandlerKind::Expr,
            Handler::Subroutine(_) => HandlerKind::Subroutine,
            Handler::AbiMethod(_) => HandlerKind::AbiMethod,
        }
    }
}

impl<'h> From<&'h Expr> for Handler<'h> {
    fn from(expr: &'h Expr) -> Self {
        Handler::Expr(expr)
    }
}

impl<'h> From<&'h Subroutine> for Handler<'h> {
    fn from(subroutine: &'h Subroutine) -> Self {
        Handler::Subroutine(subroutine)
    }
}

impl<'h> From<&'h AbiReturnSubroutine> for Handler<'h> {
    fn from(method: &'h AbiReturnSubroutine) -> Self {
        Handler::AbiMethod(method)
    }
}

pub fn wrap_handler(is_method_call: bool, handler: Handler<'_>) -> Result<Expr, RouterError> {
    if is_method_call {
        match handler {
            Handler::AbiMethod(method) => wrap_method_call(method),
            other => Err(RouterError::NotAbiMethod(other.kind())),
        }
    } else {
        wrap_bare_call(handler)
    }
}

/// Bare calls take no arguments and produce no value
pub fn wrap_bare_call(handler: Handler<'_>) -> Result<Expr, RouterError> {
    let kind = handler.kind();
    match handler {
        Handler::Expr(expr) => {
            let ty = expr.type_of();
            if ty != TealType::None {
                return Err(RouterError::BareCallReturnType {
                    kind,
                    found: ty.to_string(),
                });
            }
            if expr.has_return() {
                Ok(expr.clone())
            } else {
                Ok(Expr::seq(vec![expr.clone(), Expr::approve()]))
            }
        }
        Handler::Subroutine(subroutine) => {
            let ty = subroutine.type_of();
            if ty != TealType::None {
                return Err(RouterError::BareCallReturnType {
                    kind,
                    found: ty.to_string(),
                });
            }
            check_no_args(kind, subroutine.argument_count())?;
            Ok(Expr::seq(vec![subroutine.call(vec![]), Expr::approve()]))
        }
        Handler::AbiMethod(method) => {
            if !method.is_void() {
                return Err(RouterError::BareCallReturnType {
                    kind,
                    found: method.type_of(),
                });
            }
            check_no_args(kind, method.argument_count())?;
            Ok(Expr::seq(vec![method.call(vec![]), Expr::approve()]))
        }
    }
}

fn check_no_args(kind: HandlerKind, count: usize) -> Result<(), RouterError> {
    if count != 0 {
        return Err(RouterError::BareCallArgumentCount { kind, count });
    }
    Ok(())
}

/// Group the arguments past the 14th into one trailing tuple.
/// Returns the per-application-argument specs and the grouped specs, if any.
pub fn pack_overflow_args(mut specs: Vec<TypeSpec>) -> (Vec<TypeSpec>, Option<Vec<TypeSpec>>) {
    if specs.len() <= METHOD_ARG_NUM_LIMIT {
        return (specs, None);
    }
    let grouped = specs.split_off(METHOD_ARG_NUM_LIMIT - 1);
    specs.push(TypeSpec::Tuple(grouped.clone()));
    (specs, Some(grouped))
}

pub fn wrap_method_call(method: &AbiReturnSubroutine) -> Result<Expr, RouterError> {
    if !method.is_abi_routable() {
        return Err(RouterError::NotRoutable {
            name: method.name().to_string(),
            argument_count: method.argument_count(),
            abi_argument_count: method.abi_args().len(),
        });
    }

    let specs = method.abi_args().into_iter().cloned().collect();
    let (arg_specs, grouped) = pack_overflow_args(specs);

    let mut args: Vec<AbiValue> = arg_specs.iter().map(TypeSpec::new_instance).collect();
    let mut body: Vec<Expr> = args
        .iter()
        .enumerate()
        .map(|(i, arg)| arg.decode(Expr::app_arg(i + 1)))
        .collect();

    if let Some(grouped) = grouped {
        let tuple = args.remove(METHOD_ARG_NUM_LIMIT - 1);
        for (index, spec) in grouped.iter().enumerate() {
            let expanded = spec.new_instance();
            body.push(tuple.element(index)?.store_into(&expanded));
            args.push(expanded);
        }
    }

    let call = method.invoke(&args);
    match method.output() {
        None => body.push(call),
        Some(spec) => {
            let output = spec.new_instance();
            body.push(ReturnedValue::new(spec.clone(), call).store_into(&output));
            body.push(Expr::MethodReturn(output));
        }
    }
    body.push(Expr::approve());
    Ok(Expr::seq(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use teal_ir::Param;

    fn uint64() -> TypeSpec {
        TypeSpec::Uint(64)
    }

    fn method(name: &str, params: Vec<TypeSpec>, output: Option<TypeSpec>) -> AbiReturnSubroutine {
        let params = params
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Param::abi(format!("a{}", i), spec))
            .collect();
        AbiReturnSubroutine::new(name, params, output, Expr::Return(None))
    }

    #[test]
    fn test_bare_expr_gets_approval_appended() {
        let log = Expr::log(Expr::bytes(b"hi".to_vec()));
        assert_eq!(
            wrap_handler(false, Handler::from(&log)).unwrap(),
            Expr::seq(vec![log.clone(), Expr::approve()])
        );

        let returning = Expr::seq(vec![log, Expr::reject()]);
        assert_eq!(
            wrap_handler(false, Handler::from(&returning)).unwrap(),
            returning
        );
    }

    #[test]
    fn test_bare_expr_must_be_none() {
        let value = Expr::int(1);
        assert_eq!(
            wrap_handler(false, Handler::from(&value)),
            Err(RouterError::BareCallReturnType {
                kind: HandlerKind::Expr,
                found: "uint64".to_string()
            })
        );
    }

    #[test]
    fn test_bare_subroutine() {
        let noop = Subroutine::new("noop", vec![], TealType::None, Expr::Return(None));
        assert_eq!(
            wrap_handler(false, Handler::from(&noop)).unwrap(),
            Expr::seq(vec![noop.call(vec![]), Expr::approve()])
        );

        let with_arg = Subroutine::new(
            "with_arg",
            vec![Param::stack("x", TealType::Uint64)],
            TealType::None,
            Expr::Return(None),
        );
        assert_eq!(
            wrap_handler(false, Handler::from(&with_arg)),
            Err(RouterError::BareCallArgumentCount {
                kind: HandlerKind::Subroutine,
                count: 1
            })
        );

        let valued = Subroutine::new("valued", vec![], TealType::Uint64, Expr::int(1));
        assert!(matches!(
            wrap_handler(false, Handler::from(&valued)),
            Err(RouterError::BareCallReturnType { .. })
        ));
    }

    #[test]
    fn test_bare_abi_method() {
        let void = method("void", vec![], None);
        assert_eq!(
            wrap_handler(false, Handler::from(&void)).unwrap(),
            Expr::seq(vec![void.call(vec![]), Expr::approve()])
        );

        let returning = method("returning", vec![], Some(uint64()));
        assert_eq!(
            wrap_handler(false, Handler::from(&returning)),
            Err(RouterError::BareCallReturnType {
                kind: HandlerKind::AbiMethod,
                found: "uint64".to_string()
            })
        );

        let with_arg = method("with_arg", vec![uint64()], None);
        assert!(matches!(
            wrap_handler(false, Handler::from(&with_arg)),
            Err(RouterError::BareCallArgumentCount { count: 1, .. })
        ));
    }

    #[test]
    fn test_method_call_needs_abi_method() {
        let expr = Expr::approve();
        assert_eq!(
            wrap_handler(true, Handler::from(&expr)),
            Err(RouterError::NotAbiMethod(HandlerKind::Expr))
        );

        let mixed = AbiReturnSubroutine::new(
            "mixed",
            vec![Param::abi("a", uint64()), Param::stack("b", TealType::Uint64)],
            None,
            Expr::Return(None),
        );
        assert_eq!(
            wrap_handler(true, Handler::from(&mixed)),
            Err(RouterError::NotRoutable {
                name: "mixed".to_string(),
                argument_count: 2,
                abi_argument_count: 1
            })
        );
    }

    #[test]
    fn test_method_call_decodes_and_logs() {
        let add = method("add", vec![uint64(), uint64()], Some(uint64()));
        let wrapped = wrap_handler(true, Handler::from(&add)).unwrap();
        let Expr::Seq(body) = wrapped else {
            panic!("expected a sequence");
        };
        assert_eq!(body.len(), 5);
        assert!(matches!(&body[0], Expr::Store { value, .. } if **value == Expr::app_arg(1)));
        assert!(matches!(&body[1], Expr::Store { value, .. } if **value == Expr::app_arg(2)));
        assert!(matches!(&body[2], Expr::Store { value, .. } if matches!(**value, Expr::Call { .. })));
        assert!(matches!(&body[3], Expr::MethodReturn(out) if out.spec() == &uint64()));
        assert_eq!(body[4], Expr::approve());
    }

    #[test]
    fn test_void_method_call() {
        let ping = method("ping", vec![], None);
        let wrapped = wrap_handler(true, Handler::from(&ping)).unwrap();
        assert_eq!(
            wrapped,
            Expr::seq(vec![ping.invoke(&[]), Expr::approve()])
        );
        assert!(!wrapped.iter().any(|e| matches!(e, Expr::MethodReturn(_))));
    }

    #[test]
    fn test_pack_overflow_args() {
        let specs: Vec<TypeSpec> = (0..15).map(|_| uint64()).collect();
        assert_eq!(pack_overflow_args(specs.clone()), (specs, None));

        let mut specs: Vec<TypeSpec> = (0..14).map(|_| uint64()).collect();
        specs.extend([TypeSpec::Bool, TypeSpec::String, TypeSpec::Byte]);
        let (packed, grouped) = pack_overflow_args(specs);
        assert_eq!(packed.len(), METHOD_ARG_NUM_LIMIT);
        let tail = vec![TypeSpec::Bool, TypeSpec::String, TypeSpec::Byte];
        assert_eq!(packed[14], TypeSpec::Tuple(tail.clone()));
        assert_eq!(grouped, Some(tail));
    }

    #[test]
    fn test_many_args_are_detupled_in_order() {
        let params: Vec<TypeSpec> = (0..17).map(|_| uint64()).collect();
        let wide = method("wide", params, None);
        let Expr::Seq(body) = wrap_handler(true, Handler::from(&wide)).unwrap() else {
            panic!("expected a sequence");
        };
        // 15 decodes, 3 element copies, the call and the approval
        assert_eq!(body.len(), 15 + 3 + 2);
        for (i, decode) in body[..15].iter().enumerate() {
            assert!(matches!(decode, Expr::Store { value, .. } if **value == Expr::app_arg(i + 1)));
        }
        let Expr::Store { slot: tuple_slot, .. } = &body[14] else {
            panic!("expected the tuple decode");
        };
        let mut expanded = vec![];
        for (i, copy) in body[15..18].iter().enumerate() {
            let Expr::Store { slot, value } = copy else {
                panic!("expected an element copy");
            };
            let Expr::TupleElement { tuple, index } = value.as_ref() else {
                panic!("expected a tuple element");
            };
            assert_eq!(tuple.slot(), *tuple_slot);
            assert_eq!(*index, i);
            expanded.push(*slot);
        }
        let Expr::Call { args, .. } = &body[18] else {
            panic!("expected the call");
        };
        assert_eq!(args.len(), 17);
        assert_eq!(
            args[14..].to_vec(),
            expanded.into_iter().map(Expr::Load).collect::<Vec<_>>()
        );
        assert_eq!(body[19], Expr::approve());
    }
}
