// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! ABI type descriptors and value placeholders consumed by the router

pub mod layout;
pub mod selector;
pub mod type_spec;
pub mod value;

pub use layout::{ElementLocation, TupleLayout};
pub use selector::{method_selector, Selector, RETURN_METHOD_SELECTOR};
pub use type_spec::{split_top_level, TypeSpec};
pub use value::{AbiValue, ReturnedValue, TupleElement};
