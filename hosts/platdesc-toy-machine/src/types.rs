//! The type catalog's static half: descriptors for every type this host
//! exposes, built once at startup and never mutated afterward.

use platdesc_api::{
    CtorDescriptor, NumberKind, ParamDescriptor, ParamKind, PropertyDescriptor,
    RegistrationInterface, TypeDescriptor, TypeId,
};
use std::collections::HashMap;

pub fn bus() -> TypeId {
    TypeId::new("Peripherals.Bus")
}
pub fn bus_address() -> TypeId {
    TypeId::new("Peripherals.Bus.Address")
}
pub fn bus_device() -> TypeId {
    TypeId::new("Peripherals.BusDevice")
}
pub fn memory() -> TypeId {
    TypeId::new("Peripherals.Memory")
}
pub fn gpio_port() -> TypeId {
    TypeId::new("Peripherals.Gpio.Port")
}
pub fn gpio_line() -> TypeId {
    TypeId::new("Peripherals.Gpio.Line")
}
pub fn timer() -> TypeId {
    TypeId::new("Peripherals.Timer")
}
pub fn cpu() -> TypeId {
    TypeId::new("Peripherals.Cpu")
}
pub fn interrupt_controller() -> TypeId {
    TypeId::new("Peripherals.InterruptController")
}
pub fn combiner() -> TypeId {
    TypeId::new("Peripherals.Gpio.Combiner")
}
pub fn endian() -> TypeId {
    TypeId::new("Peripherals.Endian")
}
pub fn timer_mode() -> TypeId {
    TypeId::new("Peripherals.Timer.Mode")
}
pub fn machine_type() -> TypeId {
    TypeId::new("Peripherals.Machine")
}

/// Direct supertypes for each type, used to answer `is_assignable`.
/// Flat and tiny enough that a linear walk beats building a real
/// lattice.
pub fn supertypes() -> HashMap<TypeId, Vec<TypeId>> {
    let mut m = HashMap::new();
    m.insert(memory(), vec![bus_device()]);
    m.insert(gpio_port(), vec![bus_device()]);
    m
}

pub fn descriptors() -> HashMap<TypeId, TypeDescriptor> {
    let mut d = HashMap::new();

    d.insert(
        machine_type(),
        TypeDescriptor {
            ctors: vec![],
            properties: vec![],
            registration_interfaces: vec![],
            supports_local_receiver: false,
            supports_numbered_output: false,
            is_bus_peripheral: false,
        },
    );

    d.insert(
        bus(),
        TypeDescriptor {
            ctors: vec![CtorDescriptor::new(vec![])],
            properties: vec![],
            registration_interfaces: vec![RegistrationInterface {
                peripheral_type: bus_device(),
                registration_point_type: bus_address(),
                point_ctors: vec![CtorDescriptor::new(vec![ParamDescriptor::required(
                    "address",
                    ParamKind::Number(NumberKind::U32),
                )])],
            }],
            supports_local_receiver: false,
            supports_numbered_output: false,
            is_bus_peripheral: false,
        },
    );

    // Never constructed directly; only reached through a bus's
    // `point_ctors`. Registered mainly so `resolve()` has something to
    // hand back if a description ever names it explicitly.
    d.insert(bus_address(), TypeDescriptor::default());
    d.insert(bus_device(), TypeDescriptor::default());
    d.insert(gpio_line(), TypeDescriptor::default());
    d.insert(endian(), TypeDescriptor::default());
    d.insert(timer_mode(), TypeDescriptor::default());
    d.insert(combiner(), TypeDescriptor::default());

    d.insert(
        memory(),
        TypeDescriptor {
            ctors: vec![
                CtorDescriptor::new(vec![
                    ParamDescriptor::required("size", ParamKind::Number(NumberKind::U32)),
                    ParamDescriptor::optional("fill", ParamKind::Number(NumberKind::U8)),
                    ParamDescriptor::optional("endian", ParamKind::Enum(endian())),
                ]),
                CtorDescriptor::new(vec![
                    ParamDescriptor::required("size", ParamKind::Number(NumberKind::U32)),
                    ParamDescriptor::optional("contents", ParamKind::String),
                ]),
            ],
            properties: vec![PropertyDescriptor {
                name: "fill".into(),
                kind: ParamKind::Number(NumberKind::U8),
                settable: true,
                is_gpio: false,
                is_default_interrupt: false,
            }],
            registration_interfaces: vec![],
            supports_local_receiver: false,
            supports_numbered_output: false,
            is_bus_peripheral: true,
        },
    );

    d.insert(
        gpio_port(),
        TypeDescriptor {
            ctors: vec![CtorDescriptor::new(vec![
                ParamDescriptor::required("width", ParamKind::Number(NumberKind::U8)),
                ParamDescriptor::optional("active_low", ParamKind::Bool),
            ])],
            properties: vec![PropertyDescriptor {
                name: "active_low".into(),
                kind: ParamKind::Bool,
                settable: true,
                is_gpio: false,
                is_default_interrupt: false,
            }],
            registration_interfaces: vec![],
            supports_local_receiver: false,
            supports_numbered_output: true,
            is_bus_peripheral: true,
        },
    );

    d.insert(
        timer(),
        TypeDescriptor {
            ctors: vec![CtorDescriptor::new(vec![
                ParamDescriptor::required("period_ms", ParamKind::Number(NumberKind::U32)),
                ParamDescriptor::optional("mode", ParamKind::Enum(timer_mode())),
            ])],
            properties: vec![PropertyDescriptor {
                name: "overflow".into(),
                kind: ParamKind::Named(gpio_line()),
                settable: false,
                is_gpio: true,
                is_default_interrupt: true,
            }],
            registration_interfaces: vec![],
            supports_local_receiver: false,
            supports_numbered_output: false,
            is_bus_peripheral: false,
        },
    );

    d.insert(
        cpu(),
        TypeDescriptor {
            ctors: vec![CtorDescriptor::new(vec![ParamDescriptor::optional(
                "irq_count",
                ParamKind::Number(NumberKind::U8),
            )])],
            properties: vec![],
            registration_interfaces: vec![],
            supports_local_receiver: true,
            supports_numbered_output: false,
            is_bus_peripheral: false,
        },
    );

    d.insert(
        interrupt_controller(),
        TypeDescriptor {
            ctors: vec![CtorDescriptor::new(vec![
                ParamDescriptor::required("lines", ParamKind::Number(NumberKind::U8)),
                ParamDescriptor::optional("upstream", ParamKind::Named(interrupt_controller())),
            ])],
            properties: vec![],
            registration_interfaces: vec![],
            supports_local_receiver: false,
            supports_numbered_output: false,
            is_bus_peripheral: false,
        },
    );

    d
}
