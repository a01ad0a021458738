//! A small illustrative host for `platdesc-driver`: a bus with an
//! address space, memory, a GPIO port, a timer, a CPU with vectored
//! interrupt receivers, and an interrupt controller. Exists to exercise
//! the driver end to end and to give the driver's tests something
//! concrete to build against — not a simulator anyone would ship.

pub mod catalog;
pub mod machine;
mod objects;
mod types;

pub use catalog::ToyCatalog;
pub use machine::ToyMachine;
pub use objects::SetVia;
pub use types::{
    bus, bus_address, bus_device, combiner, cpu, endian, gpio_line, gpio_port,
    interrupt_controller, machine_type, memory, timer,
};

use objects::ToyState;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Builds a fresh toy catalog/machine pair with nothing registered yet
/// beyond the machine object itself (handle 0, keyword `"machine"`).
pub fn new_toy_machine() -> (ToyCatalog, ToyMachine) {
    let mut state = ToyState::default();
    let machine_handle = state.push(objects::ToyObject::Machine);
    let state = Rc::new(RefCell::new(state));
    let catalog = ToyCatalog::new(Rc::clone(&state));
    let machine = ToyMachine::new(state, machine_handle, "machine");
    (catalog, machine)
}

/// Same as [`new_toy_machine`], but with one `Peripherals.Bus` already
/// registered under `name` before the driver ever runs. Exercises
/// `Machine::registered_peripherals` seeding the variable store's
/// builtins, so a description can write `@ sysbus` without declaring it.
pub fn new_toy_machine_with_bus(name: &str) -> (ToyCatalog, ToyMachine) {
    use platdesc_api::Machine as _;

    let (catalog, mut machine) = new_toy_machine();
    let bus = catalog
        .state
        .borrow_mut()
        .push(objects::ToyObject::Bus {
            slots: RefCell::new(HashMap::new()),
        });
    machine
        .set_local_name(bus, name)
        .expect("fresh toy machine has no name collisions");
    (catalog, machine)
}
