pub mod ctor;
pub mod irq;
pub mod post;
pub mod pre;
pub mod registration;

use crate::ast::Entry;
use crate::diagnostic;
use crate::include::SourceMap;
use crate::merge;
use crate::resolved::{ResolvedDescription, ResolvedEntry};
use platdesc_api::{ErrorKind, ParsingException, TypeCatalog, TypeId};
use std::collections::{HashMap, HashSet};

/// Runs every validation pass over the flattened, per-variable entry
/// lists produced by [`crate::include`] and returns the resolved IR the
/// builder consumes.
pub fn validate(
    entries_by_var: Vec<(String, Vec<Entry>)>,
    builtins: &[(String, TypeId)],
    catalog: &dyn TypeCatalog,
    sources: &SourceMap,
) -> Result<ResolvedDescription, ParsingException> {
    for (_, entries) in &entries_by_var {
        for entry in entries {
            let source = sources.get(&entry.file).cloned().unwrap_or_else(|| "".into());
            pre::check_entry(entry, &source)?;
        }
    }

    let mut var_types: HashMap<String, TypeId> = builtins.iter().cloned().collect();
    for (var, entries) in &entries_by_var {
        let first = &entries[0];
        let type_name = first.type_name.as_deref().expect("store guarantees first entry creates");
        let source = sources.get(&first.file).cloned().unwrap_or_else(|| "".into());
        let type_id = catalog.resolve(type_name).ok_or_else(|| {
            diagnostic::report(
                ErrorKind::TypeNotResolved,
                &first.file,
                &source,
                first.position,
                &format!("type '{type_name}' could not be resolved"),
                true,
            )
        })?;
        var_types.insert(var.clone(), type_id);
    }

    for (var, entries) in &entries_by_var {
        let type_id = &var_types[var];
        let Some(descriptor) = catalog.descriptor(type_id) else {
            continue;
        };
        let property_names: HashSet<&str> =
            descriptor.properties.iter().map(|p| p.name.as_str()).collect();
        let ctor_only: HashSet<&str> = descriptor
            .ctors
            .iter()
            .flat_map(|c| c.params.iter())
            .map(|p| p.name.as_str())
            .filter(|name| !property_names.contains(name))
            .collect();

        for entry in entries.iter().skip(1) {
            let source = sources.get(&entry.file).cloned().unwrap_or_else(|| "".into());
            for attr in &entry.attributes {
                if let crate::ast::Attribute::CtorOrProperty(a) = attr {
                    // `none` just cancels an earlier-merged value for this
                    // name; it is not an attempt to set a ctor-only
                    // parameter after the fact, so it is exempt.
                    let is_cancellation =
                        matches!(a.value, crate::ast::Value::Simple(platdesc_api::SimpleValue::Empty, _));
                    if ctor_only.contains(a.name.as_str()) && !is_cancellation {
                        return Err(diagnostic::report(
                            ErrorKind::CtorAttributesInNonCreatingEntry,
                            &entry.file,
                            &source,
                            a.position,
                            &format!("'{}' is a constructor-only parameter and cannot be set on an updating entry", a.name),
                            true,
                        ));
                    }
                }
            }
        }
    }

    let mut objects = Vec::with_capacity(entries_by_var.len());
    for (var, entries) in entries_by_var {
        let merged = merge::merge(var, entries);
        let resolved: ResolvedEntry = post::resolve_entry(merged, &var_types, catalog, sources)?;
        objects.push(resolved);
    }

    Ok(ResolvedDescription { objects })
}
