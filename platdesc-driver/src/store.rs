//! Tracks every variable mentioned across a description and its
//! includes: the static type it was first declared with, and every
//! contributing entry, in declaration order, so [`crate::merge`] can
//! fold them into one effective entry per variable.
//!
//! Grounded on the way `drmemd::driver::DriverDb` keeps one registry
//! entry per driver name and refuses a second registration under the
//! same name — here the analogous rule is "a variable's static type is
//! fixed at first declaration".

use crate::ast::Entry;
use crate::position::Position;
use platdesc_api::ErrorKind;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclarationPlace {
    pub position: Position,
    pub file_index: usize,
}

struct Variable {
    type_name: Option<String>,
    declared_at: DeclarationPlace,
    entries: Vec<Entry>,
}

#[derive(Default)]
pub struct VariableStore {
    order: Vec<String>,
    variables: HashMap<String, Variable>,
}

pub struct StoreError {
    pub kind: ErrorKind,
    pub position: Position,
    pub message: String,
}

impl VariableStore {
    pub fn new() -> Self {
        VariableStore::default()
    }

    /// Registers a host-provided builtin (the implicit `machine`
    /// variable, typically) that descriptions can reference but never
    /// declare themselves.
    pub fn register_builtin(&mut self, name: &str, type_name: &str) {
        self.order.push(name.to_string());
        self.variables.insert(
            name.to_string(),
            Variable {
                type_name: Some(type_name.to_string()),
                declared_at: DeclarationPlace {
                    position: Position::synthetic(),
                    file_index: usize::MAX,
                },
                entries: Vec::new(),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn static_type_of(&self, name: &str) -> Option<&str> {
        self.variables.get(name).and_then(|v| v.type_name.as_deref())
    }

    /// Folds one parsed entry into the store, enforcing the
    /// first-declaration-fixes-type invariant. `file_index` identifies
    /// which contributing file this entry came from, purely for
    /// diagnostics.
    pub fn add_entry(&mut self, entry: Entry, file_index: usize) -> Result<(), StoreError> {
        if entry.is_empty_entry() {
            return Err(StoreError {
                kind: ErrorKind::EmptyEntry,
                position: entry.position,
                message: format!("entry for '{}' declares neither a type nor any attributes", entry.variable),
            });
        }

        match self.variables.get_mut(&entry.variable) {
            None => {
                if !entry.is_creating() {
                    return Err(StoreError {
                        kind: ErrorKind::TypeNotSpecifiedInFirstVariableUse,
                        position: entry.position,
                        message: format!(
                            "'{}' is used before it is declared with a type",
                            entry.variable
                        ),
                    });
                }
                self.order.push(entry.variable.clone());
                self.variables.insert(
                    entry.variable.clone(),
                    Variable {
                        type_name: entry.type_name.clone(),
                        declared_at: DeclarationPlace {
                            position: entry.position,
                            file_index,
                        },
                        entries: vec![entry],
                    },
                );
                Ok(())
            }
            Some(existing) => {
                if entry.is_creating() {
                    return Err(StoreError {
                        kind: ErrorKind::VariableAlreadyDeclared,
                        position: entry.position,
                        message: format!(
                            "'{}' was already declared at {}",
                            entry.variable, existing.declared_at.position
                        ),
                    });
                }
                existing.entries.push(entry);
                Ok(())
            }
        }
    }

    /// Every declared variable, in first-declaration order, with all of
    /// its contributing entries (also in declaration order).
    pub fn into_entries(self) -> Vec<(String, Vec<Entry>)> {
        let VariableStore { order, mut variables } = self;
        order
            .into_iter()
            .filter_map(|name| variables.remove(&name).map(|v| (name, v.entries)))
            .filter(|(_, entries)| !entries.is_empty())
            .collect()
    }
}
