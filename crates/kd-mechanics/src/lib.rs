//! Game mechanics for the koidice engine.
//!
//! - [`directive`]: parse free-form attribute directives (`力量60 san-1d6`) and
//!   apply them to a character store
//! - [`pool`]: exploding d10 dice pools
//! - [`check`]: percentile checks that rewrite an attribute, for sanity loss
//!   and skill growth
//! - [`generator`]: roll Call of Cthulhu investigators

pub mod check;
pub mod directive;
pub mod error;
pub mod generator;
pub mod pool;

pub use check::{
    CheckOutcome, CheckRule, GrowthCheck, GrowthFormula, Magnitude, SanityCheck, SuccessLevel,
    classify, run_check,
};
pub use directive::{
    AppliedChange, AppliedDirective, Directive, OpKind, OpValue, Operation, apply_directive,
    parse_directive,
};
pub use error::{MechError, MechResult};
pub use generator::{Edition, GeneratedStat, Investigator, generate, generate_many};
pub use pool::{DrawMark, PoolOutcome, PoolSpec, parse_pool_spec, resolve_pool, roll_pool};
