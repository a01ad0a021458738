//! Resolves a merged entry's `@ register [point]` clause: which of the
//! register target's `RegistrationInterface`s applies, and (if a
//! registration-point value was given) which of that interface's point
//! constructors builds it.

use crate::ast::Value;
use crate::diagnostic;
use crate::merge::MergedEntry;
use crate::resolved::{ResolvedRegistration, ResolvedValue};
use crate::validate::ctor;
use platdesc_api::{CtorDescriptor, ErrorKind, ParsingException, RegistrationInterface, TypeCatalog, TypeId};
use std::collections::HashMap;

pub fn resolve(
    merged: &MergedEntry,
    entry_type: &TypeId,
    var_types: &HashMap<String, TypeId>,
    catalog: &dyn TypeCatalog,
    file: &str,
    source: &str,
) -> Result<Option<ResolvedRegistration>, ParsingException> {
    let Some(reg) = &merged.registration else {
        return Ok(None);
    };
    let Some(target_name) = &reg.register else {
        return Ok(None);
    };

    let target_type = var_types.get(target_name).ok_or_else(|| {
        diagnostic::report(
            ErrorKind::MissingReference,
            file,
            source,
            reg.position,
            &format!("'{target_name}' is not a declared variable"),
            true,
        )
    })?;

    let descriptor = catalog.descriptor(target_type).ok_or_else(|| {
        diagnostic::report(
            ErrorKind::NoUsableRegisterInterface,
            file,
            source,
            reg.position,
            &format!("'{target_name}' offers no registration interfaces"),
            true,
        )
    })?;

    let candidates: Vec<&RegistrationInterface> = descriptor
        .registration_interfaces
        .iter()
        .filter(|iface| catalog.is_assignable(entry_type, &iface.peripheral_type))
        .collect();

    if candidates.is_empty() {
        return Err(diagnostic::report(
            ErrorKind::NoUsableRegisterInterface,
            file,
            source,
            reg.position,
            &format!(
                "'{}' has no registration interface accepting a '{entry_type}'",
                target_name
            ),
            true,
        ));
    }

    let interface = if candidates.len() == 1 {
        candidates[0]
    } else {
        let max = candidates
            .iter()
            .position(|c| {
                candidates
                    .iter()
                    .all(|other| catalog.is_assignable(&c.peripheral_type, &other.peripheral_type))
            });
        match max {
            Some(i) => candidates[i],
            None => {
                return Err(diagnostic::report(
                    ErrorKind::AmbiguousRegistrationPointType,
                    file,
                    source,
                    reg.position,
                    &format!("'{target_name}' offers more than one equally-specific registration interface for a '{entry_type}'"),
                    true,
                ))
            }
        }
    };

    let (point_ctor_index, point_args) = match &reg.point {
        Some(point_value) => resolve_point_ctor(
            &interface.point_ctors,
            point_value,
            var_types,
            catalog,
            file,
            source,
        )?,
        None => {
            // §4.4 step 3: an absent point value only falls back to the
            // null registration point when the entry isn't itself a bus
            // peripheral competing for this same interface's own
            // bus-registration candidate — a bus peripheral with a real
            // address-taking interface must supply one explicitly.
            let entry_requires_explicit_point = catalog
                .descriptor(entry_type)
                .is_some_and(|d| d.is_bus_peripheral)
                && !interface.point_ctors.is_empty();
            if entry_requires_explicit_point {
                return Err(diagnostic::report(
                    ErrorKind::NoCtorForRegistrationPoint,
                    file,
                    source,
                    reg.position,
                    &format!(
                        "'{entry_type}' is a bus peripheral and must supply a registration-point value when registering on '{target_name}'"
                    ),
                    true,
                ));
            }
            (None, Vec::new())
        }
    };

    Ok(Some(ResolvedRegistration {
        register: target_name.clone(),
        interface: interface.clone(),
        point_ctor_index,
        point_args,
        position: reg.position,
    }))
}

fn resolve_point_ctor(
    ctors: &[CtorDescriptor],
    point_value: &Value,
    var_types: &HashMap<String, TypeId>,
    catalog: &dyn TypeCatalog,
    file: &str,
    source: &str,
) -> Result<(Option<usize>, Vec<ResolvedValue>), ParsingException> {
    let mut viable = Vec::new();
    for (index, ctor) in ctors.iter().enumerate() {
        let Some(first) = ctor.params.first() else {
            continue;
        };
        if let Ok(first_arg) = ctor::convert(point_value, &first.kind, var_types, catalog) {
            let rest_ok = ctor.params[1..].iter().all(|p| p.has_default);
            if rest_ok {
                let mut args = vec![first_arg];
                for p in &ctor.params[1..] {
                    args.push(ctor::default_for_public(&p.kind));
                }
                viable.push((index, args));
            }
        }
    }

    match viable.len() {
        0 => Err(diagnostic::report(
            ErrorKind::NoCtorForRegistrationPoint,
            file,
            source,
            point_value.position(),
            "no registration-point constructor accepts this value",
            true,
        )),
        1 => {
            let (index, args) = viable.into_iter().next().unwrap();
            Ok((Some(index), args))
        }
        _ => Err(diagnostic::report(
            ErrorKind::AmbiguousCtorForRegistrationPoint,
            file,
            source,
            point_value.position(),
            "more than one registration-point constructor accepts this value",
            true,
        )),
    }
}
