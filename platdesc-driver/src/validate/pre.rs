//! Checks that apply to one raw, pre-merge [`Entry`] in isolation —
//! the things that are wrong regardless of what any other contributing
//! entry for the same variable says.

use crate::ast::{Attribute, Entry};
use crate::diagnostic;
use platdesc_api::{ErrorKind, ParsingException};
use std::collections::HashSet;

pub fn check_entry(entry: &Entry, source: &str) -> Result<(), ParsingException> {
    check_duplicate_names(entry, source)?;
    check_init_count(entry, source)?;
    Ok(())
}

fn check_duplicate_names(entry: &Entry, source: &str) -> Result<(), ParsingException> {
    let mut seen = HashSet::new();
    for attr in &entry.attributes {
        if let Attribute::CtorOrProperty(a) = attr {
            if !seen.insert(a.name.clone()) {
                return Err(diagnostic::report(
                    ErrorKind::PropertyOrCtorNameUsedMoreThanOnce,
                    &entry.file,
                    source,
                    a.position,
                    &format!("'{}' is set more than once in this entry", a.name),
                    true,
                ));
            }
        }
    }
    Ok(())
}

fn check_init_count(entry: &Entry, source: &str) -> Result<(), ParsingException> {
    let inits: Vec<_> = entry
        .attributes
        .iter()
        .filter(|a| matches!(a, Attribute::Init(_)))
        .collect();
    if inits.len() > 1 {
        let position = match inits[1] {
            Attribute::Init(i) => i.position,
            _ => unreachable!(),
        };
        return Err(diagnostic::report(
            ErrorKind::MoreThanOneInitAttribute,
            &entry.file,
            source,
            position,
            "an entry may contain at most one init attribute",
            true,
        ));
    }
    Ok(())
}

