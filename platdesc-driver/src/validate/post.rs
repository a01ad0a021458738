//! Resolves one already-merged entry: picks its constructor overload,
//! converts every remaining attribute into a post-construction
//! property set, and resolves its registration and IRQ attributes.

use crate::diagnostic;
use crate::include::SourceMap;
use crate::merge::MergedEntry;
use crate::resolved::ResolvedEntry;
use crate::validate::{ctor, irq, registration};
use platdesc_api::{ErrorKind, ParsingException, TypeCatalog, TypeId};
use std::collections::HashMap;

pub fn resolve_entry(
    merged: MergedEntry,
    var_types: &HashMap<String, TypeId>,
    catalog: &dyn TypeCatalog,
    sources: &SourceMap,
) -> Result<ResolvedEntry, ParsingException> {
    let file = merged.file.clone();
    let source = sources.get(&file).cloned().unwrap_or_else(|| "".into());

    if merged.alias.is_some() && merged.registration.is_none() {
        return Err(diagnostic::report(
            ErrorKind::AliasWithoutRegistration,
            &file,
            &source,
            merged.position,
            &format!("'{}' has an alias but no registration", merged.variable),
            true,
        ));
    }
    if merged.alias.is_some() {
        if let Some(reg) = &merged.registration {
            if reg.register.is_none() {
                return Err(diagnostic::report(
                    ErrorKind::AliasWithNoneRegistration,
                    &file,
                    &source,
                    reg.position,
                    &format!("'{}' has an alias but its registration is 'none'", merged.variable),
                    true,
                ));
            }
        }
    }

    let type_id = catalog.resolve(&merged.type_name).ok_or_else(|| {
        diagnostic::report(
            ErrorKind::TypeNotResolved,
            &file,
            &source,
            merged.position,
            &format!("type '{}' could not be resolved", merged.type_name),
            true,
        )
    })?;

    let descriptor = catalog.descriptor(&type_id).ok_or_else(|| {
        diagnostic::report(
            ErrorKind::TypeNotResolved,
            &file,
            &source,
            merged.position,
            &format!("type '{}' has no descriptor", merged.type_name),
            true,
        )
    })?;

    let attrs: Vec<(String, crate::ast::Value)> = merged
        .attributes
        .iter()
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect();

    // §3: a name is "is-property" solely because a settable-or-not
    // property of that name exists on the type, decided once here,
    // before constructor overload resolution ever sees the rest.
    let (ctor_attrs, property_attrs) = ctor::classify(descriptor, &attrs);

    let resolution = ctor::resolve(
        &type_id,
        &descriptor.ctors,
        &ctor_attrs,
        var_types,
        catalog,
        &file,
        &source,
        merged.position,
    )?;

    let mut properties = Vec::new();
    for (name, value) in &property_attrs {
        let settable = descriptor
            .properties
            .iter()
            .find(|p| &p.name == name)
            .map(|p| p.settable)
            .unwrap_or(false);
        if !settable {
            return Err(diagnostic::report(
                ErrorKind::PropertyNotWritable,
                &file,
                &source,
                value.position(),
                &format!("'{name}' is not a settable property of '{type_id}'"),
                true,
            ));
        }
        let resolved = ctor::convert_property(value, var_types, catalog).map_err(|e| {
            diagnostic::report(
                ErrorKind::TypeMismatch,
                &file,
                &source,
                value.position(),
                &format!("property '{name}': {e}"),
                true,
            )
        })?;
        properties.push((name.clone(), resolved));
    }

    let reg = registration::resolve(&merged, &type_id, var_types, catalog, &file, &source)?;
    let irqs = irq::resolve(&merged, &type_id, var_types, catalog, &file, &source)?;

    Ok(ResolvedEntry {
        variable: merged.variable,
        type_id,
        alias: merged.alias,
        registration: reg,
        ctor_index: resolution.index,
        ctor_args: resolution.args,
        properties,
        irqs,
        init_lines: merged.init_lines,
        position: merged.position,
    })
}
