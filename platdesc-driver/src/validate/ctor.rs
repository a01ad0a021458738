//! Constructor overload resolution (§ the builder's object-construction
//! step). Given a target type's descriptor and the attributes an entry
//! supplied, picks the one constructor overload those attributes
//! satisfy — the reflection-free stand-in for what a host with real
//! reflection would do by inspecting `Type.GetConstructors()`.

use crate::ast::Value;
use crate::diagnostic;
use crate::resolved::ResolvedValue;
use platdesc_api::{
    CtorDescriptor, ErrorKind, ParamKind, ParsingException, SimpleValue, TypeCatalog, TypeDescriptor, TypeId,
};
use std::collections::HashMap;

pub struct CtorResolution {
    pub index: usize,
    pub args: Vec<ResolvedValue>,
}

struct Candidate {
    index: usize,
    matched: usize,
    args: Vec<ResolvedValue>,
}

/// Splits an entry's merged attributes into constructor-attribute
/// candidates and property attributes, the way §3's
/// `ConstructorOrPropertyAttribute.is-property` flag is resolved: a
/// name that matches a property on the type is always a property
/// attribute, never a constructor argument, regardless of whether some
/// overload also declares a same-named parameter.
pub fn classify(
    descriptor: &TypeDescriptor,
    attrs: &[(String, Value)],
) -> (Vec<(String, Value)>, Vec<(String, Value)>) {
    let mut ctor_attrs = Vec::new();
    let mut property_attrs = Vec::new();

    for (name, value) in attrs {
        if descriptor.properties.iter().any(|p| &p.name == name) {
            property_attrs.push((name.clone(), value.clone()));
        } else {
            ctor_attrs.push((name.clone(), value.clone()));
        }
    }

    (ctor_attrs, property_attrs)
}

pub fn resolve(
    type_id: &TypeId,
    ctors: &[CtorDescriptor],
    attrs: &[(String, Value)],
    var_types: &HashMap<String, TypeId>,
    catalog: &dyn TypeCatalog,
    file: &str,
    source: &str,
    position: crate::position::Position,
) -> Result<CtorResolution, ParsingException> {
    let mut candidates = Vec::new();
    let mut rejections = Vec::new();
    let mut saw_enum_mismatch = false;

    for (index, ctor) in ctors.iter().enumerate() {
        match try_candidate(ctor, attrs, var_types, catalog) {
            Ok((args, matched)) => candidates.push(Candidate { index, matched, args }),
            Err(reason) => {
                if reason.contains("enum") {
                    saw_enum_mismatch = true;
                }
                rejections.push(format!("{}: {reason}", ctor.signature(type_id.as_str())));
            }
        }
    }

    if candidates.is_empty() {
        return Err(diagnostic::report(
            no_ctor_kind(saw_enum_mismatch),
            file,
            source,
            position,
            &format!(
                "no constructor for '{}' accepts the given attributes:\n{}",
                type_id,
                rejections.join("\n")
            ),
            false,
        ));
    }

    let max_matched = candidates.iter().map(|c| c.matched).max().unwrap();
    let mut best: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.matched == max_matched)
        .collect();

    if best.len() == 1 {
        let c = best.pop().unwrap();
        return Ok(CtorResolution { index: c.index, args: c.args });
    }

    let winner_pos = best.iter().position(|c| {
        best.iter()
            .enumerate()
            .all(|(j, other)| j == c.index || dominates(&c.args, &other.args, catalog))
    });

    match winner_pos {
        Some(i) => {
            let c = best.remove(i);
            Ok(CtorResolution { index: c.index, args: c.args })
        }
        None => Err(diagnostic::report(
            ErrorKind::AmbiguousCtorForRegistrationPoint,
            file,
            source,
            position,
            &format!("ambiguous constructor for '{type_id}': more than one overload matches"),
            true,
        )),
    }
}

fn no_ctor_kind(saw_enum_mismatch: bool) -> ErrorKind {
    if saw_enum_mismatch {
        ErrorKind::EnumMismatch
    } else {
        ErrorKind::NoCtorForRegistrationPoint
    }
}

fn dominates(a: &[ResolvedValue], b: &[ResolvedValue], catalog: &dyn TypeCatalog) -> bool {
    // Only Named-parameter positional args carry a static type to
    // compare; everything else ties.
    let mut any_strict = false;
    for (av, bv) in a.iter().zip(b.iter()) {
        if let (ResolvedValue::Object(ao), ResolvedValue::Object(bo)) = (av, bv) {
            if ao.type_id != bo.type_id {
                if !catalog.is_assignable(&ao.type_id, &bo.type_id) {
                    return false;
                }
                if catalog.is_more_derived(&ao.type_id, &bo.type_id) {
                    any_strict = true;
                }
            }
        }
    }
    any_strict
}

fn try_candidate(
    ctor: &CtorDescriptor,
    attrs: &[(String, Value)],
    var_types: &HashMap<String, TypeId>,
    catalog: &dyn TypeCatalog,
) -> Result<(Vec<ResolvedValue>, usize), String> {
    let mut args = Vec::with_capacity(ctor.params.len());
    let mut matched = 0usize;
    let mut consumed = vec![false; attrs.len()];

    for param in &ctor.params {
        if matches!(param.kind, ParamKind::Machine) {
            args.push(ResolvedValue::Reference(String::new()));
            continue;
        }
        let found = attrs.iter().position(|(name, _)| name == &param.name);
        match found {
            Some(i) => {
                let (_, value) = &attrs[i];
                let resolved = convert(value, &param.kind, var_types, catalog)
                    .map_err(|e| format!("parameter '{}': {e}", param.name))?;
                consumed[i] = true;
                matched += 1;
                args.push(resolved);
            }
            None => {
                if param.has_default {
                    args.push(default_for(&param.kind));
                } else {
                    return Err(format!("missing required parameter '{}'", param.name));
                }
            }
        }
    }

    // §4.6: after every parameter is resolved, any attribute this
    // candidate didn't consume disqualifies it outright — there is no
    // such thing as a constructor argument the object just ignores.
    let leftover: Vec<&str> = attrs
        .iter()
        .zip(consumed.iter())
        .filter(|(_, used)| !**used)
        .map(|((name, _), _)| name.as_str())
        .collect();
    if !leftover.is_empty() {
        return Err(format!("unconsumed attribute(s): {}", leftover.join(", ")));
    }

    Ok((args, matched))
}

pub fn default_for_public(kind: &ParamKind) -> ResolvedValue {
    default_for(kind)
}

fn default_for(kind: &ParamKind) -> ResolvedValue {
    match kind {
        ParamKind::String => ResolvedValue::Simple(SimpleValue::String(String::new())),
        ParamKind::Bool => ResolvedValue::Simple(SimpleValue::Bool(false)),
        ParamKind::Range => ResolvedValue::Simple(SimpleValue::Range(0, 0)),
        ParamKind::Number(_) => ResolvedValue::Simple(SimpleValue::Empty),
        ParamKind::Enum(_) | ParamKind::Named(_) | ParamKind::Machine => {
            ResolvedValue::Simple(SimpleValue::Empty)
        }
    }
}

pub fn convert(
    value: &Value,
    kind: &ParamKind,
    var_types: &HashMap<String, TypeId>,
    catalog: &dyn TypeCatalog,
) -> Result<ResolvedValue, String> {
    match (value, kind) {
        (Value::Simple(SimpleValue::String(s), _), ParamKind::String) => {
            Ok(ResolvedValue::Simple(SimpleValue::String(s.clone())))
        }
        (Value::Simple(SimpleValue::Bool(b), _), ParamKind::Bool) => {
            Ok(ResolvedValue::Simple(SimpleValue::Bool(*b)))
        }
        (Value::Simple(SimpleValue::Range(a, b), _), ParamKind::Range) => {
            Ok(ResolvedValue::Simple(SimpleValue::Range(*a, *b)))
        }
        (Value::Simple(SimpleValue::Number(n), _), ParamKind::Number(target)) => {
            if n.fits(*target) {
                Ok(ResolvedValue::Simple(SimpleValue::Number(n.clone())))
            } else {
                Err(format!("'{n}' does not fit the expected numeric type"))
            }
        }
        (Value::Simple(SimpleValue::Enum(e), _), ParamKind::Enum(target)) => {
            let path = e.reversed_path();
            if path.len() < 2 || path[1].eq_ignore_ascii_case(target.bare_name()) {
                Ok(ResolvedValue::Simple(SimpleValue::Enum(e.clone())))
            } else {
                Err(format!(
                    "enum literal '{e}' does not belong to enum type '{target}' (enum mismatch)"
                ))
            }
        }
        (Value::Reference(name, _), ParamKind::Named(target)) => {
            let actual = var_types
                .get(name)
                .ok_or_else(|| format!("'{name}' is not a declared variable"))?;
            if catalog.is_assignable(actual, target) {
                Ok(ResolvedValue::Reference(name.clone()))
            } else {
                Err(format!("'{name}' has type '{actual}', not assignable to '{target}'"))
            }
        }
        (Value::Object(obj), ParamKind::Named(target)) => {
            let obj_type = catalog
                .resolve(&obj.type_name)
                .ok_or_else(|| format!("type '{}' is not known", obj.type_name))?;
            if !catalog.is_assignable(&obj_type, target) {
                return Err(format!("'{}' is not assignable to '{target}'", obj.type_name));
            }
            resolve_nested_object(obj, &obj_type, var_types, catalog)
        }
        (Value::Simple(SimpleValue::Empty, _), _) => Ok(ResolvedValue::Simple(SimpleValue::Empty)),
        (other, kind) => Err(format!("'{other:?}' does not match expected kind {kind:?}")),
    }
}

/// Resolves an inline `ObjectValue`'s own constructor and, per §3's
/// `is-property` flag, routes every attribute that names a property on
/// its type to a post-construction property set rather than a
/// constructor argument.
fn resolve_nested_object(
    obj: &crate::ast::ObjectValue,
    obj_type: &TypeId,
    var_types: &HashMap<String, TypeId>,
    catalog: &dyn TypeCatalog,
) -> Result<ResolvedValue, String> {
    let descriptor = catalog
        .descriptor(obj_type)
        .ok_or_else(|| format!("type '{obj_type}' has no descriptor"))?;
    let attrs: Vec<(String, Value)> = obj
        .attributes
        .iter()
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect();
    let (ctor_attrs, property_attrs) = classify(descriptor, &attrs);

    let resolution = resolve(
        obj_type,
        &descriptor.ctors,
        &ctor_attrs,
        var_types,
        catalog,
        "",
        "",
        obj.position,
    )
    .map_err(|e| e.to_string())?;

    let properties = property_attrs
        .iter()
        .map(|(name, value)| convert_property(value, var_types, catalog).map(|rv| (name.clone(), rv)))
        .collect::<Result<Vec<_>, String>>()?;

    Ok(ResolvedValue::Object(Box::new(crate::resolved::ResolvedObject {
        type_id: obj_type.clone(),
        ctor_index: resolution.index,
        ctor_args: resolution.args,
        properties,
        position: obj.position,
    })))
}

/// Used for attributes that resolved as post-construction property
/// sets rather than ctor args: conversion here is permissive (the host
/// property setter is the final type-checker, surfaced as
/// `PropertySettingException` if it rejects the value).
pub fn convert_property(
    value: &Value,
    var_types: &HashMap<String, TypeId>,
    catalog: &dyn TypeCatalog,
) -> Result<ResolvedValue, String> {
    match value {
        Value::Simple(s, _) => Ok(ResolvedValue::Simple(s.clone())),
        Value::Reference(name, _) => {
            if var_types.contains_key(name) {
                Ok(ResolvedValue::Reference(name.clone()))
            } else {
                Err(format!("'{name}' is not a declared variable"))
            }
        }
        Value::Object(obj) => {
            let obj_type = catalog
                .resolve(&obj.type_name)
                .ok_or_else(|| format!("type '{}' is not known", obj.type_name))?;
            resolve_nested_object(obj, &obj_type, var_types, catalog)
        }
    }
}
