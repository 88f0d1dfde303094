//! Program-type selection against plan caps.

use crate::{
    billing::PlanCode,
    programs::{ProgramType, ProgramTypeSet},
};

/// Normalize a tenant's chosen program types for `plan`.
///
/// `full` always gets every type. Other plans keep the valid, de-duplicated
/// tags in the order given, truncated to the plan cap; an empty result falls
/// back to stamp cards.
pub fn normalize_program_choices<S: AsRef<str>>(raw: &[S], plan: PlanCode) -> ProgramTypeSet {
    if plan == PlanCode::Full {
        return ProgramTypeSet::all();
    }

    let mut choices = raw
        .iter()
        .filter_map(|tag| ProgramType::parse(tag.as_ref()))
        .collect::<ProgramTypeSet>();

    let cap = usize::try_from(plan.limits().max_program_types).unwrap_or(usize::MAX);

    choices.truncate(cap);

    if choices.is_empty() {
        return ProgramTypeSet::base();
    }

    choices
}

/// Whether `program_type` may be used under `plan` with `selected` types.
///
/// Unknown tags are always refused. Unset or empty selections mean stamp
/// cards only.
pub fn is_program_allowed_for_plan(
    program_type: &str,
    selected: Option<&[ProgramType]>,
    plan: PlanCode,
) -> bool {
    let Some(ty) = ProgramType::parse(program_type) else {
        return false;
    };

    if plan == PlanCode::Full {
        return true;
    }

    match selected.filter(|types| !types.is_empty()) {
        Some(types) => types.contains(&ty),
        None => ty == ProgramType::Sellos,
    }
}
