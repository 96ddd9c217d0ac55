//! The per-variable/per-subexpression binding (§3 "SMT Variable Binding",
//! §4.3).
//!
//! A binding carries four solver expressions: the two-element `type` tag,
//! the `num`/`str` value channels (only one of which is meaningful, per
//! `type`), and the `taint` flag. Bindings live in an arena and are referred
//! to everywhere else by [`BindingId`], never by owning handle (§9), so the
//! encoder's recursion carries no lifetime entanglement beyond the arena
//! itself.

use z3::ast::{Ast, Bool, Datatype, Dynamic, Int, String as Z3String};
use z3::{Context, DatatypeBuilder, DatatypeSort};

/// Index into a [`super::model::SmtModel`]'s binding arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub(crate) usize);

/// The two-element `{NumType, StrType}` datatype sort backing every
/// binding's `type` channel (§4.3 "Sorts and constants").
pub struct ValueTypeSort<'ctx> {
    sort: DatatypeSort<'ctx>,
}

impl<'ctx> ValueTypeSort<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        let sort = DatatypeBuilder::new(ctx, "ValueType")
            .variant("NumType", vec![])
            .variant("StrType", vec![])
            .finish();
        Self { sort }
    }

    /// The `NumType` constant.
    pub fn num_type(&self) -> Dynamic<'ctx> {
        self.sort.variants[0].constructor.apply(&[])
    }

    /// The `StrType` constant.
    pub fn str_type(&self) -> Dynamic<'ctx> {
        self.sort.variants[1].constructor.apply(&[])
    }

    /// `value == NumType`.
    pub fn is_num_type(&self, value: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.sort.variants[0]
            .tester
            .apply(&[value])
            .as_bool()
            .expect("ValueType tester always returns a Bool-sorted value")
    }

    /// `value == StrType`.
    pub fn is_str_type(&self, value: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.sort.variants[1]
            .tester
            .apply(&[value])
            .as_bool()
            .expect("ValueType tester always returns a Bool-sorted value")
    }

    /// A fresh, unconstrained constant of this sort, for a new binding's
    /// `type` channel.
    fn fresh_const(&self, ctx: &'ctx Context, prefix: &str) -> Dynamic<'ctx> {
        Dynamic::from_ast(&Datatype::fresh_const(ctx, prefix, &self.sort.sort))
    }
}

/// One variable or subexpression binding (§3).
pub struct VariableBinding<'ctx> {
    /// Canonical (already case-folded) variable name, or a synthetic
    /// anonymous name for subexpression bindings created during encoding.
    pub name: String,
    /// The `{NumType, StrType}`-sorted type tag.
    pub kind: Dynamic<'ctx>,
    /// The scaled-integer value channel, meaningful iff `kind == NumType`.
    pub num: Int<'ctx>,
    /// The sequence-of-characters value channel, meaningful iff
    /// `kind == StrType`.
    pub str_val: Z3String<'ctx>,
    /// Set when the exact value is not computable; type constraints remain
    /// sound regardless (§3 invariants).
    pub taint: Bool<'ctx>,
}

impl<'ctx> VariableBinding<'ctx> {
    /// Allocates a fresh, wholly unconstrained binding named `name`. The
    /// four channels are independent solver constants; callers add whatever
    /// constraints apply via [`super::model::SmtModel`].
    pub fn fresh(ctx: &'ctx Context, types: &ValueTypeSort<'ctx>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: types.fresh_const(ctx, &format!("{name}$type")),
            num: Int::fresh_const(ctx, &format!("{name}$num")),
            str_val: Z3String::fresh_const(ctx, &format!("{name}$str")),
            taint: Bool::fresh_const(ctx, &format!("{name}$taint")),
            name,
        }
    }
}
