//! Transformation pass modules.
//!
//! Each pass is a self-contained rewrite of a [`SchemaIr`](crate::ir::SchemaIr).
//! Passes run in order (1-7), with identity recovery between passes 1 and 2,
//! and each assumes the output of the previous ones.

pub mod p1_strip_annotations;
pub mod p2_exclude_imports;
pub mod p3_nullable;
pub mod p4_collections;
pub mod p5_mixed_content;
pub mod p6_preserve_order;
pub mod p7_capitalize;
pub mod pass_result;
pub(crate) mod pass_utils;

pub use pass_result::PassResult;
