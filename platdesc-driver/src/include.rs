//! Resolves `using` directives into a flat, declaration-ordered entry
//! list: each included file is parsed, has its own `using`s resolved
//! first, and — if the directive carried a `prefix` — has every
//! variable name it declares (and every reference to one of those
//! names) rewritten with that prefix before being spliced in.

use crate::ast::{Attribute, Description, Entry, IrqDestinationSpec, Value};
use crate::diagnostic;
use crate::parser;
use platdesc_api::{ErrorKind, ParsingException, UsingResolver};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Every file's raw text, keyed by the same `file` name carried on its
/// entries — kept around so later phases can quote a source line for
/// diagnostics that span multiple files.
pub type SourceMap = HashMap<Arc<str>, Arc<str>>;

pub fn process_file(
    path: &Path,
    resolver: &dyn UsingResolver,
) -> Result<(Vec<Entry>, SourceMap), ParsingException> {
    let mut stack = Vec::new();
    let mut sources = SourceMap::new();
    let entries = process_path(path, resolver, &mut stack, &mut sources)?;
    Ok((entries, sources))
}

pub fn process_description(
    source: &str,
    file_name: &str,
    resolver: &dyn UsingResolver,
) -> Result<(Vec<Entry>, SourceMap), ParsingException> {
    let file: Arc<str> = Arc::from(file_name);
    let description = parser::parse(source, file.clone())?;
    let mut stack = Vec::new();
    let mut sources = SourceMap::new();
    sources.insert(file, description.source.clone());
    let entries = process_description_inner(description, None, resolver, &mut stack, &mut sources)?;
    Ok((entries, sources))
}

fn process_path(
    path: &Path,
    resolver: &dyn UsingResolver,
    stack: &mut Vec<PathBuf>,
    sources: &mut SourceMap,
) -> Result<Vec<Entry>, ParsingException> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if let Some(pos) = stack.iter().position(|p| p == &canonical) {
        return Err(cycle_error(&stack[pos..], &canonical));
    }

    let source = std::fs::read_to_string(path).map_err(|e| {
        platdesc_api::ParsingException::new(
            ErrorKind::UsingFileNotFound,
            format!("could not read '{}': {e}", path.display()),
        )
    })?;

    let file: Arc<str> = Arc::from(path.to_string_lossy().as_ref());
    let description = parser::parse(&source, file.clone())?;
    sources.insert(file, description.source.clone());

    stack.push(canonical);
    let result = process_description_inner(description, Some(path), resolver, stack, sources);
    stack.pop();
    result
}

fn process_description_inner(
    description: Description,
    including_file: Option<&Path>,
    resolver: &dyn UsingResolver,
    stack: &mut Vec<PathBuf>,
    sources: &mut SourceMap,
) -> Result<Vec<Entry>, ParsingException> {
    let mut entries = Vec::new();

    for using in &description.usings {
        let resolved = resolver.resolve(&using.path, including_file).map_err(|e| {
            diagnostic::report(
                ErrorKind::UsingFileNotFound,
                &description.file,
                &description.source,
                using.position,
                &format!("cannot resolve 'using \"{}\"': {e}", using.path),
                true,
            )
        })?;

        let mut included = process_path(&resolved, resolver, stack, sources)?;
        if let Some(prefix) = &using.prefix {
            apply_prefix(&mut included, prefix);
        }
        entries.extend(included);
    }

    entries.extend(description.entries);
    Ok(entries)
}

fn cycle_error(cycle: &[PathBuf], closing: &Path) -> ParsingException {
    let mut chain: Vec<String> = cycle.iter().map(|p| p.display().to_string()).collect();
    chain.push(closing.display().to_string());
    platdesc_api::ParsingException::new(
        ErrorKind::RecurringUsing,
        format!("recurring 'using' cycle: {}", chain.join(" -> ")),
    )
}

fn apply_prefix(entries: &mut [Entry], prefix: &str) {
    let declared: HashSet<String> = entries
        .iter()
        .filter(|e| e.is_creating())
        .map(|e| e.variable.clone())
        .collect();

    let renamed = |name: &str| -> String {
        if declared.contains(name) {
            format!("{prefix}{name}")
        } else {
            name.to_string()
        }
    };

    for entry in entries.iter_mut() {
        if declared.contains(&entry.variable) {
            entry.variable = renamed(&entry.variable);
        }
        for reg in entry.registrations.iter_mut() {
            if let Some(register) = &reg.register {
                reg.register = Some(renamed(register));
            }
            if let Some(point) = &mut reg.point {
                rename_value(point, &renamed);
            }
        }
        for attr in entry.attributes.iter_mut() {
            match attr {
                Attribute::CtorOrProperty(a) => rename_value(&mut a.value, &renamed),
                Attribute::Irq(irq) => {
                    for source in irq.sources.iter_mut() {
                        if let crate::ast::IrqSourceEnd::Named(name, _) = source {
                            *name = renamed(name);
                        }
                    }
                    for dest in irq.destinations.iter_mut() {
                        if let IrqDestinationSpec::Peripheral { peripheral, .. } = dest {
                            *peripheral = renamed(peripheral);
                        }
                    }
                }
                Attribute::Init(_) => {}
            }
        }
    }
}

fn rename_value(value: &mut Value, renamed: &impl Fn(&str) -> String) {
    match value {
        Value::Reference(name, _) => *name = renamed(name),
        Value::Object(obj) => {
            for attr in obj.attributes.iter_mut() {
                rename_value(&mut attr.value, renamed);
            }
        }
        Value::Simple(_, _) => {}
    }
}
