//! Resolves the IRQ attributes of one merged entry: which of its own
//! numbered outputs or GPIO-typed properties are sources, which
//! declared peripherals are destinations, and the sanity checks that
//! don't need a live object graph to answer (arity against a fixed
//! receiver count is deferred to the builder, which is the only place
//! that runs sees the actual live pin count).

use crate::diagnostic;
use crate::merge::MergedEntry;
use crate::resolved::{ResolvedIrq, ResolvedIrqDestination, ResolvedIrqSource};
use platdesc_api::{ErrorKind, ParsingException, TypeCatalog, TypeId};
use std::collections::{HashMap, HashSet};

pub fn resolve(
    merged: &MergedEntry,
    entry_type: &TypeId,
    var_types: &HashMap<String, TypeId>,
    catalog: &dyn TypeCatalog,
    file: &str,
    source: &str,
) -> Result<Vec<ResolvedIrq>, ParsingException> {
    let mut out = Vec::new();
    let mut used_sources = HashSet::new();
    let mut used_destinations = HashSet::new();

    for irq in &merged.irqs {
        let sources = if irq.sources.is_empty() {
            vec![impute_default_source(entry_type, catalog, file, source, irq.position)?]
        } else {
            irq.sources
                .iter()
                .map(|end| resolve_source(end, entry_type, catalog, file, source))
                .collect::<Result<Vec<_>, _>>()?
        };

        for s in &sources {
            let key = source_key(s);
            if !used_sources.insert(key.clone()) {
                return Err(diagnostic::report(
                    ErrorKind::IrqSourceUsedMoreThanOnce,
                    file,
                    source,
                    irq.position,
                    &format!("IRQ source '{key}' is wired more than once"),
                    true,
                ));
            }
        }

        let mut destinations = Vec::new();
        for dest in &irq.destinations {
            let crate::ast::IrqDestinationSpec::Peripheral {
                peripheral,
                local_receiver,
                ends,
                position,
            } = dest
            else {
                continue;
            };

            let dest_type = var_types.get(peripheral).ok_or_else(|| {
                diagnostic::report(
                    ErrorKind::IrqDestinationDoesNotExist,
                    file,
                    source,
                    *position,
                    &format!("'{peripheral}' is not a declared variable"),
                    true,
                )
            })?;
            let descriptor = catalog.descriptor(dest_type);

            if let Some(local_index) = local_receiver {
                let supports = descriptor.map(|d| d.supports_local_receiver).unwrap_or(false);
                if !supports {
                    return Err(diagnostic::report(
                        ErrorKind::NotLocalGpioReceiver,
                        file,
                        source,
                        *position,
                        &format!("'{peripheral}' does not expose a local receiver ':{local_index}'"),
                        true,
                    ));
                }
            }

            for end in ends {
                let key = format!("{peripheral}:{:?}#{end}", local_receiver);
                if !used_destinations.insert(key) {
                    return Err(diagnostic::report(
                        ErrorKind::IrqDestinationUsedMoreThanOnce,
                        file,
                        source,
                        *position,
                        &format!("destination pin {end} on '{peripheral}' is wired more than once"),
                        true,
                    ));
                }
            }

            destinations.push(ResolvedIrqDestination {
                peripheral: peripheral.clone(),
                local_receiver: *local_receiver,
                ends: ends.clone(),
                position: *position,
            });
        }

        out.push(ResolvedIrq {
            sources,
            destinations,
            position: irq.position,
        });
    }

    Ok(out)
}

fn source_key(s: &ResolvedIrqSource) -> String {
    match s {
        ResolvedIrqSource::Default => "<default>".to_string(),
        ResolvedIrqSource::Numbered(n) => format!("#{n}"),
        ResolvedIrqSource::Named(n) => n.clone(),
    }
}

fn resolve_source(
    end: &crate::ast::IrqSourceEnd,
    entry_type: &TypeId,
    catalog: &dyn TypeCatalog,
    file: &str,
    source: &str,
) -> Result<ResolvedIrqSource, ParsingException> {
    match end {
        crate::ast::IrqSourceEnd::Numbered(n, position) => {
            let supports = catalog
                .descriptor(entry_type)
                .map(|d| d.supports_numbered_output)
                .unwrap_or(false);
            if supports {
                Ok(ResolvedIrqSource::Numbered(*n))
            } else {
                Err(diagnostic::report(
                    ErrorKind::IrqSourceIsNotNumberedGpioOutput,
                    file,
                    source,
                    *position,
                    &format!("'{entry_type}' has no numbered IRQ outputs"),
                    true,
                ))
            }
        }
        crate::ast::IrqSourceEnd::Named(name, position) => {
            let has_property = catalog
                .descriptor(entry_type)
                .map(|d| d.properties.iter().any(|p| &p.name == name && p.is_gpio))
                .unwrap_or(false);
            if has_property {
                Ok(ResolvedIrqSource::Named(name.clone()))
            } else {
                Err(diagnostic::report(
                    ErrorKind::IrqSourceDoesNotExist,
                    file,
                    source,
                    *position,
                    &format!("'{entry_type}' has no GPIO-typed property named '{name}'"),
                    true,
                ))
            }
        }
    }
}

fn impute_default_source(
    entry_type: &TypeId,
    catalog: &dyn TypeCatalog,
    file: &str,
    source: &str,
    position: crate::position::Position,
) -> Result<ResolvedIrqSource, ParsingException> {
    let Some(descriptor) = catalog.descriptor(entry_type) else {
        return Err(diagnostic::report(
            ErrorKind::IrqSourceDoesNotExist,
            file,
            source,
            position,
            &format!("'{entry_type}' has no known IRQ source to impute"),
            true,
        ));
    };

    let default_props: Vec<&str> = descriptor
        .properties
        .iter()
        .filter(|p| p.is_default_interrupt)
        .map(|p| p.name.as_str())
        .collect();

    match default_props.len() {
        1 => Ok(ResolvedIrqSource::Named(default_props[0].to_string())),
        0 if descriptor.supports_numbered_output => Ok(ResolvedIrqSource::Default),
        0 => Err(diagnostic::report(
            ErrorKind::IrqSourceDoesNotExist,
            file,
            source,
            position,
            &format!("'{entry_type}' declares no default IRQ source"),
            true,
        )),
        _ => Err(diagnostic::report(
            ErrorKind::AmbiguousDefaultIrqSource,
            file,
            source,
            position,
            &format!("'{entry_type}' declares more than one default IRQ source"),
            true,
        )),
    }
}
