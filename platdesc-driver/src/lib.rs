//! Compiles a platform description into a live object graph attached
//! to a host [`Machine`](platdesc_api::Machine).
//!
//! The pipeline mirrors `drmemd`'s shape (tokenize/parse, validate,
//! then act on the result) but runs synchronously start to finish:
//! `process_file`/`process_description` do not return until the whole
//! description has been built or a [`ParsingException`] is raised.
//! There is no actor loop here the way `drmemd::core::State` runs one
//! — a platform description is compiled once, at startup, not driven
//! by an ongoing message stream.

pub mod ast;
pub mod build;
pub mod diagnostic;
pub mod graph;
pub mod include;
pub mod lexer;
pub mod merge;
pub mod parser;
pub mod position;
pub mod resolved;
pub mod store;
pub mod validate;

use platdesc_api::{InitHandler, Machine, ParsingException, TypeCatalog, UsingResolver};
use std::path::Path;

/// Compiles the description at `path`, resolving any `using`
/// directives relative to it through `resolver`, and builds the
/// resulting objects against `catalog`/`machine`.
pub fn process_file(
    path: &Path,
    resolver: &dyn UsingResolver,
    catalog: &dyn TypeCatalog,
    machine: &mut dyn Machine,
    init: &dyn InitHandler,
) -> Result<(), ParsingException> {
    let (entries, sources) = include::process_file(path, resolver)?;
    run(entries, sources, catalog, machine, init)
}

/// Same as [`process_file`], but takes the description's text directly
/// rather than reading it from disk; `using` directives are still
/// resolved through `resolver`, relative to no backing file.
pub fn process_description(
    source: &str,
    file_name: &str,
    resolver: &dyn UsingResolver,
    catalog: &dyn TypeCatalog,
    machine: &mut dyn Machine,
    init: &dyn InitHandler,
) -> Result<(), ParsingException> {
    let (entries, sources) = include::process_description(source, file_name, resolver)?;
    run(entries, sources, catalog, machine, init)
}

fn run(
    entries: Vec<ast::Entry>,
    sources: include::SourceMap,
    catalog: &dyn TypeCatalog,
    machine: &mut dyn Machine,
    init: &dyn InitHandler,
) -> Result<(), ParsingException> {
    let mut store = store::VariableStore::new();
    let machine_type = catalog.type_of(machine.handle());
    store.register_builtin(machine.keyword(), machine_type.as_str());

    let mut builtins = vec![(machine.keyword().to_string(), machine_type)];
    let mut preexisting = vec![(machine.keyword().to_string(), machine.handle())];
    for (name, handle, type_id) in machine.registered_peripherals() {
        store.register_builtin(&name, type_id.as_str());
        builtins.push((name.clone(), type_id));
        preexisting.push((name, handle));
    }

    for entry in entries {
        let file = entry.file.clone();
        let source = sources.get(&file).cloned().unwrap_or_else(|| "".into());
        store.add_entry(entry, 0).map_err(|e| {
            diagnostic::report(e.kind, &file, &source, e.position, &e.message, true)
        })?;
    }

    let entries_by_var = store.into_entries();
    let resolved = validate::validate(entries_by_var, &builtins, catalog, &sources)?;

    tracing::info!(objects = resolved.objects.len(), "platform description validated");
    build::build(resolved, preexisting, catalog, machine, init)
}
