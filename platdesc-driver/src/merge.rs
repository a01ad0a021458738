//! Folds every contributing entry for one variable into a single
//! effective entry: later entries win over earlier ones for anything
//! they mention, and a `none` value cancels a prior contribution
//! rather than literally setting it to "no value".

use crate::ast::{
    CtorOrPropertyAttribute, Entry, IrqAttribute, IrqDestinationSpec, RegistrationInfo, Value,
};
use crate::position::Position;
use platdesc_api::SimpleValue;
use std::sync::Arc;

pub struct MergedEntry {
    pub variable: String,
    pub type_name: String,
    pub alias: Option<String>,
    pub registration: Option<RegistrationInfo>,
    pub attributes: Vec<CtorOrPropertyAttribute>,
    pub irqs: Vec<IrqAttribute>,
    pub init_lines: Vec<String>,
    pub position: Position,
    pub file: Arc<str>,
}

/// `entries` must be non-empty, in declaration order, with the first
/// one carrying a type name; [`crate::store::VariableStore`]
/// guarantees both.
pub fn merge(variable: String, entries: Vec<Entry>) -> MergedEntry {
    let first = &entries[0];
    let type_name = first.type_name.clone().expect("first entry always creates");
    let position = first.position;
    let file = first.file.clone();

    let mut alias = None;
    let mut registration: Option<RegistrationInfo> = None;
    let mut attrs: Vec<CtorOrPropertyAttribute> = Vec::new();
    let mut irqs: Vec<IrqAttribute> = Vec::new();
    let mut init_lines = Vec::new();

    for entry in entries {
        if entry.alias.is_some() {
            alias = entry.alias;
        }
        if let Some(reg) = entry.registrations.into_iter().last() {
            registration = Some(reg);
        }
        for attr in entry.attributes {
            match attr {
                crate::ast::Attribute::CtorOrProperty(a) => merge_attribute(&mut attrs, a),
                crate::ast::Attribute::Irq(irq) => merge_irq(&mut irqs, irq),
                crate::ast::Attribute::Init(init) => init_lines.extend(init.lines),
            }
        }
    }

    MergedEntry {
        variable,
        type_name,
        alias,
        registration,
        attributes: attrs,
        irqs,
        init_lines,
        position,
        file,
    }
}

fn merge_attribute(attrs: &mut Vec<CtorOrPropertyAttribute>, incoming: CtorOrPropertyAttribute) {
    attrs.retain(|existing| existing.name != incoming.name);
    if !matches!(incoming.value, Value::Simple(SimpleValue::Empty, _)) {
        attrs.push(incoming);
    }
}

fn merge_irq(irqs: &mut Vec<IrqAttribute>, incoming: IrqAttribute) {
    let cancels_all = incoming.sources.is_empty()
        && matches!(incoming.destinations.as_slice(), [IrqDestinationSpec::Cancel(_)]);
    if cancels_all {
        irqs.clear();
        return;
    }
    if matches!(incoming.destinations.as_slice(), [IrqDestinationSpec::Cancel(_)]) {
        let sources_key: Vec<_> = incoming.sources.iter().map(irq_source_key).collect();
        irqs.retain(|existing| {
            let existing_key: Vec<_> = existing.sources.iter().map(irq_source_key).collect();
            existing_key != sources_key
        });
        return;
    }
    irqs.push(incoming);
}

fn irq_source_key(end: &crate::ast::IrqSourceEnd) -> String {
    match end {
        crate::ast::IrqSourceEnd::Numbered(n, _) => format!("#{n}"),
        crate::ast::IrqSourceEnd::Named(n, _) => n.clone(),
    }
}
