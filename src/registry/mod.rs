//! Instruction registry
//!
//! A fixed table mapping instruction names to parameter schemas and
//! command templates:
//! name -> Instruction -> (schema check) -> RenderedCommand

pub mod instruction;
pub mod render;

pub use instruction::{Instruction, InstructionSchema, DEFAULT_NAMESPACE};
pub use render::{
    render, render_instruction, validate, ParameterSet, RenderedCommand, ValidatedParams, KUBECTL,
};
