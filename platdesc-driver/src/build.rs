//! Turns resolved IR into a live object graph: create every object in
//! dependency order, wire up properties and IRQ lines (inserting
//! fan-in combiners where more than one source feeds a destination),
//! register peripherals into their parents, then run each entry's
//! init block.

use crate::graph;
use crate::resolved::{ResolvedDescription, ResolvedEntry, ResolvedIrqSource, ResolvedObject, ResolvedValue};
use platdesc_api::{
    ErrorKind, HostValue, InitHandler, Machine, ObjectHandle, ParsingException, TypeCatalog,
};
use std::collections::HashMap;

pub fn build(
    resolved: ResolvedDescription,
    preexisting: Vec<(String, ObjectHandle)>,
    catalog: &dyn TypeCatalog,
    machine: &mut dyn Machine,
    init: &dyn InitHandler,
) -> Result<(), ParsingException> {
    let machine_handle = machine.handle();
    let by_var: HashMap<String, ResolvedEntry> = resolved
        .objects
        .into_iter()
        .map(|e| (e.variable.clone(), e))
        .collect();
    let names: Vec<String> = by_var.keys().cloned().collect();

    let creation_order = graph::topo_sort(&names, |n| {
        by_var
            .get(n)
            .map(|e| collect_refs(&e.ctor_args))
            .unwrap_or_default()
    })
    .map_err(|c| cycle_exception(ErrorKind::CreationOrderCycle, &c.path))?;

    // §4.7's second, independent sort: edges follow registration-point
    // references only (the register target and any references inside
    // the point constructor's own arguments), ignoring property-value
    // references entirely.
    let registration_order = graph::topo_sort(&names, |n| {
        by_var
            .get(n)
            .and_then(|e| e.registration.as_ref())
            .map(|reg| {
                let mut refs = vec![reg.register.clone()];
                refs.extend(collect_refs(&reg.point_args));
                refs
            })
            .unwrap_or_default()
    })
    .map_err(|c| cycle_exception(ErrorKind::RegistrationOrderCycle, &c.path))?;

    tracing::info!(count = creation_order.len(), "creating platform description objects");

    let mut created: HashMap<String, ObjectHandle> = preexisting.into_iter().collect();
    for name in &creation_order {
        let entry = &by_var[name];
        let args = entry
            .ctor_args
            .iter()
            .map(|a| to_host_value(a, &created, machine_handle, catalog))
            .collect::<Result<Vec<_>, _>>()?;
        let handle = catalog
            .construct(&entry.type_id, entry.ctor_index, args, machine_handle)
            .map_err(|e| {
                ParsingException::new(
                    ErrorKind::ConstructionException,
                    format!("constructing '{name}': {e}"),
                )
            })?;
        tracing::debug!(variable = %name, r#type = %entry.type_id, "created");
        created.insert(name.clone(), handle);
    }

    for name in &creation_order {
        let entry = &by_var[name];
        let handle = created[name];
        for (prop_name, value) in &entry.properties {
            let host_value = to_host_value(value, &created, machine_handle, catalog)?;
            catalog.set_property(handle, prop_name, host_value).map_err(|e| {
                ParsingException::new(
                    ErrorKind::PropertySettingException,
                    format!("'{name}.{prop_name}': {e}"),
                )
            })?;
        }
    }

    wire_irqs(&by_var, &creation_order, &created, catalog)?;

    register(&by_var, &registration_order, &created, catalog, machine)?;

    for name in &creation_order {
        let entry = &by_var[name];
        if entry.init_lines.is_empty() {
            continue;
        }
        let handle = created[name];
        run_init(name, handle, &entry.init_lines, init)?;
    }

    machine.post_creation_actions();
    Ok(())
}

fn cycle_exception(kind: ErrorKind, path: &[String]) -> ParsingException {
    ParsingException::new(kind, format!("cycle detected: {}", path.join(" -> ")))
}

fn collect_refs(values: &[ResolvedValue]) -> Vec<String> {
    let mut out = Vec::new();
    for v in values {
        collect_refs_one(v, &mut out);
    }
    out
}

fn collect_refs_one(value: &ResolvedValue, out: &mut Vec<String>) {
    match value {
        ResolvedValue::Simple(_) => {}
        ResolvedValue::Reference(name) => {
            if !name.is_empty() {
                out.push(name.clone());
            }
        }
        ResolvedValue::Object(obj) => {
            for a in &obj.ctor_args {
                collect_refs_one(a, out);
            }
            for (_, v) in &obj.properties {
                collect_refs_one(v, out);
            }
        }
    }
}

fn to_host_value(
    value: &ResolvedValue,
    created: &HashMap<String, ObjectHandle>,
    machine_handle: ObjectHandle,
    catalog: &dyn TypeCatalog,
) -> Result<HostValue, ParsingException> {
    match value {
        ResolvedValue::Simple(s) => Ok(HostValue::Simple(s.clone())),
        ResolvedValue::Reference(name) => {
            if name.is_empty() {
                return Ok(HostValue::Object(machine_handle));
            }
            created
                .get(name)
                .copied()
                .map(HostValue::Object)
                .ok_or_else(|| {
                    ParsingException::new(
                        ErrorKind::InternalError,
                        format!("'{name}' was referenced before it was created"),
                    )
                })
        }
        ResolvedValue::Object(obj) => {
            construct_nested(obj, created, machine_handle, catalog).map(HostValue::Object)
        }
    }
}

fn construct_nested(
    obj: &ResolvedObject,
    created: &HashMap<String, ObjectHandle>,
    machine_handle: ObjectHandle,
    catalog: &dyn TypeCatalog,
) -> Result<ObjectHandle, ParsingException> {
    let args = obj
        .ctor_args
        .iter()
        .map(|a| to_host_value(a, created, machine_handle, catalog))
        .collect::<Result<Vec<_>, _>>()?;
    let handle = catalog
        .construct(&obj.type_id, obj.ctor_index, args, machine_handle)
        .map_err(|e| {
            ParsingException::new(
                ErrorKind::ConstructionException,
                format!("constructing inline '{}': {e}", obj.type_id),
            )
        })?;
    for (name, value) in &obj.properties {
        let host_value = to_host_value(value, created, machine_handle, catalog)?;
        catalog.set_property(handle, name, host_value).map_err(|e| {
            ParsingException::new(
                ErrorKind::PropertySettingException,
                format!("inline '{}.{name}': {e}", obj.type_id),
            )
        })?;
    }
    Ok(handle)
}

/// A destination pin, shared across every entry that wires a source
/// into it. Fan-in is counted globally against this key, not per
/// entry: three distinct peripherals each targeting the same `cpu:0@0`
/// share one combiner, built only once total sources exceeds one.
#[derive(Clone, PartialEq, Eq, Hash)]
struct DestKey {
    peripheral: String,
    local_receiver: Option<u32>,
    end: u32,
}

fn wire_irqs(
    by_var: &HashMap<String, ResolvedEntry>,
    order: &[String],
    created: &HashMap<String, ObjectHandle>,
    catalog: &dyn TypeCatalog,
) -> Result<(), ParsingException> {
    let mut key_order: Vec<DestKey> = Vec::new();
    let mut contributions: HashMap<DestKey, Vec<ObjectHandle>> = HashMap::new();

    for name in order {
        let entry = &by_var[name];
        let self_handle = created[name];

        for irq in &entry.irqs {
            let mut source_handles = Vec::with_capacity(irq.sources.len());
            for source in &irq.sources {
                source_handles.push(resolve_irq_source(name, self_handle, source, catalog)?);
            }

            for dest in &irq.destinations {
                for end in &dest.ends {
                    let key = DestKey {
                        peripheral: dest.peripheral.clone(),
                        local_receiver: dest.local_receiver,
                        end: *end,
                    };
                    if !contributions.contains_key(&key) {
                        key_order.push(key.clone());
                    }
                    contributions
                        .entry(key)
                        .or_default()
                        .extend(source_handles.iter().copied());
                }
            }
        }
    }

    for key in &key_order {
        let dest_handle = created.get(&key.peripheral).copied().ok_or_else(|| {
            ParsingException::new(
                ErrorKind::IrqDestinationDoesNotExist,
                format!("'{}' was never created", key.peripheral),
            )
        })?;
        let target = match key.local_receiver {
            Some(local_index) => catalog.local_receiver(dest_handle, local_index).map_err(|e| {
                ParsingException::new(
                    ErrorKind::NotLocalGpioReceiver,
                    format!("'{}': local receiver {local_index}: {e}", key.peripheral),
                )
            })?,
            None => dest_handle,
        };

        let sources = &contributions[key];
        if sources.len() > 1 {
            let combiner = catalog.make_irq_combiner(sources.len()).map_err(|e| {
                ParsingException::new(
                    ErrorKind::ConstructionException,
                    format!("'{}' pin {}: building IRQ combiner: {e}", key.peripheral, key.end),
                )
            })?;
            for (input_index, src) in sources.iter().enumerate() {
                catalog
                    .connect_gpio(*src, combiner, input_index as u32)
                    .map_err(|e| {
                        ParsingException::new(
                            ErrorKind::ConstructionException,
                            format!(
                                "'{}' pin {}: wiring IRQ combiner input {input_index}: {e}",
                                key.peripheral, key.end
                            ),
                        )
                    })?;
            }
            catalog.connect_gpio(combiner, target, key.end).map_err(|e| {
                ParsingException::new(
                    ErrorKind::IrqDestinationIsNotIrqReceiver,
                    format!("'{}' pin {}: {e}", key.peripheral, key.end),
                )
            })?;
        } else {
            catalog.connect_gpio(sources[0], target, key.end).map_err(|e| {
                ParsingException::new(
                    ErrorKind::IrqDestinationIsNotIrqReceiver,
                    format!("'{}' pin {}: {e}", key.peripheral, key.end),
                )
            })?;
        }
    }

    Ok(())
}

fn resolve_irq_source(
    owner: &str,
    self_handle: ObjectHandle,
    source: &ResolvedIrqSource,
    catalog: &dyn TypeCatalog,
) -> Result<ObjectHandle, ParsingException> {
    match source {
        ResolvedIrqSource::Default | ResolvedIrqSource::Numbered(_) => {
            let index = match source {
                ResolvedIrqSource::Numbered(n) => *n,
                _ => 0,
            };
            if !catalog.numbered_output_exists(self_handle, index) {
                return Err(ParsingException::new(
                    ErrorKind::IrqSourcePinDoesNotExist,
                    format!("'{owner}' has no numbered output {index}"),
                ));
            }
            catalog
                .numbered_output(self_handle, index)
                .map_err(|e| {
                    ParsingException::new(
                        ErrorKind::UninitializedSourceIrqObject,
                        format!("'{owner}' output {index}: {e}"),
                    )
                })?
                .ok_or_else(|| {
                    ParsingException::new(
                        ErrorKind::UninitializedSourceIrqObject,
                        format!("'{owner}' output {index} is not initialized"),
                    )
                })
        }
        ResolvedIrqSource::Named(property) => catalog
            .gpio_property(self_handle, property)
            .map_err(|e| {
                ParsingException::new(
                    ErrorKind::UninitializedSourceIrqObject,
                    format!("'{owner}.{property}': {e}"),
                )
            })?
            .ok_or_else(|| {
                ParsingException::new(
                    ErrorKind::UninitializedSourceIrqObject,
                    format!("'{owner}.{property}' is not initialized"),
                )
            }),
    }
}

/// Whether `target`'s own container registration (if it has one) has
/// already been applied on the machine — the dependency a nested
/// registration chain (peripheral registers onto a bus that itself
/// registers onto another bus) needs satisfied before it can proceed. A
/// target with no registration of its own (a root bus, or a builtin the
/// host already registered before the driver ran) only needs to exist.
fn registration_target_ready(
    target: &str,
    by_var: &HashMap<String, ResolvedEntry>,
    created: &HashMap<String, ObjectHandle>,
    machine: &dyn Machine,
) -> bool {
    let Some(&handle) = created.get(target) else {
        return false;
    };
    match by_var.get(target).and_then(|e| e.registration.as_ref()) {
        Some(_) => machine.is_registered(handle),
        None => true,
    }
}

fn register(
    by_var: &HashMap<String, ResolvedEntry>,
    order: &[String],
    created: &HashMap<String, ObjectHandle>,
    catalog: &dyn TypeCatalog,
    machine: &mut dyn Machine,
) -> Result<(), ParsingException> {
    let mut pending: Vec<&String> = order.iter().filter(|n| by_var[*n].registration.is_some()).collect();

    loop {
        let before = pending.len();
        let mut still_pending = Vec::with_capacity(before);

        for name in std::mem::take(&mut pending) {
            let entry = &by_var[name];
            let reg = entry.registration.as_ref().unwrap();

            if !registration_target_ready(&reg.register, by_var, created, &*machine) {
                still_pending.push(name);
                continue;
            }

            let point = match reg.point_ctor_index {
                None => catalog.null_registration_point(),
                Some(ctor_index) => {
                    let args: Vec<HostValue> = reg
                        .point_args
                        .iter()
                        .map(|a| to_host_value(a, created, machine.handle(), catalog))
                        .collect::<Result<_, _>>()?;
                    catalog
                        .construct(&reg.interface.registration_point_type, ctor_index, args, machine.handle())
                        .map_err(|e| {
                            ParsingException::new(
                                ErrorKind::ConstructionException,
                                format!("'{name}' registration point: {e}"),
                            )
                        })?
                }
            };

            let self_handle = created[name];
            let container = created[&reg.register];

            // §4.8 step 4: a register whose static type turns out not to
            // implement the peripheral interface is a permanent
            // `CastException`, not something retrying would ever fix.
            if !catalog.is_assignable(&catalog.type_of(self_handle), &reg.interface.peripheral_type) {
                return Err(ParsingException::new(
                    ErrorKind::CastException,
                    format!(
                        "'{name}' does not implement the registration interface required by '{}'",
                        reg.register
                    ),
                ));
            }

            match catalog.register(container, point, &reg.interface, self_handle) {
                Ok(()) => {
                    if let Some(alias) = &entry.alias {
                        machine.set_local_name(self_handle, alias).map_err(|e| {
                            ParsingException::new(
                                ErrorKind::NameSettingException,
                                format!("'{name}' as '{alias}': {e}"),
                            )
                        })?;
                    }
                }
                Err(e) => {
                    return Err(ParsingException::new(
                        ErrorKind::RegistrationException,
                        format!("registering '{name}' on '{}': {e}", reg.register),
                    ));
                }
            }
        }

        let after = still_pending.len();
        pending = still_pending;
        if after == before {
            break;
        }
    }

    if !pending.is_empty() {
        let names: Vec<String> = pending.iter().map(|s| s.to_string()).collect();
        return Err(cycle_exception(ErrorKind::RegistrationOrderCycle, &names));
    }
    Ok(())
}

fn run_init(
    name: &str,
    handle: ObjectHandle,
    lines: &[String],
    init: &dyn InitHandler,
) -> Result<(), ParsingException> {
    tracing::debug!(variable = %name, lines = lines.len(), "running init block");
    init.validate(handle, lines).map_err(|message| {
        ParsingException::new(
            ErrorKind::InitSectionValidationError,
            format!("'{name}': {message}"),
        )
    })?;
    let mut errors = Vec::new();
    init.execute(handle, lines, &mut |message| errors.push(message));
    if let Some(first) = errors.into_iter().next() {
        return Err(ParsingException::new(
            ErrorKind::InitSectionValidationError,
            format!("'{name}': {first}"),
        ));
    }
    Ok(())
}
