//! [`Machine`] implementation over the shared object table. Owns
//! nothing the catalog doesn't already hold; it just answers the
//! driver's bookkeeping questions the catalog's trait doesn't cover
//! (the machine's own keyword/handle, local naming, post-build hook).

use crate::objects::{ToyObject, ToyState};
use crate::types;
use platdesc_api::{HostError, HostResult, Machine, ObjectHandle, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

pub struct ToyMachine {
    pub(crate) state: Rc<RefCell<ToyState>>,
    handle: ObjectHandle,
    keyword: String,
    built: bool,
}

impl ToyMachine {
    pub(crate) fn new(state: Rc<RefCell<ToyState>>, handle: ObjectHandle, keyword: impl Into<String>) -> ToyMachine {
        ToyMachine {
            state,
            handle,
            keyword: keyword.into(),
            built: false,
        }
    }

    /// Whether `post_creation_actions` has run, i.e. the description
    /// finished building successfully.
    pub fn built(&self) -> bool {
        self.built
    }

    pub fn local_name(&self, obj: ObjectHandle) -> Option<String> {
        self.state.borrow().names.get(&obj).cloned()
    }
}

impl Machine for ToyMachine {
    fn keyword(&self) -> &str {
        &self.keyword
    }

    fn handle(&self) -> ObjectHandle {
        self.handle
    }

    fn is_registered(&self, peripheral: ObjectHandle) -> bool {
        let state = self.state.borrow();
        state
            .objects
            .iter()
            .any(|o| matches!(o, ToyObject::Bus { slots } if slots.borrow().values().any(|h| *h == peripheral)))
    }

    fn registered_peripherals(&self) -> Vec<(String, ObjectHandle, TypeId)> {
        let state = self.state.borrow();
        state
            .names
            .iter()
            .map(|(handle, name)| {
                let ty = match state.objects.get(handle.0) {
                    Some(ToyObject::Bus { .. }) => types::bus(),
                    Some(ToyObject::Memory { .. }) => types::memory(),
                    Some(ToyObject::GpioPort { .. }) => types::gpio_port(),
                    Some(ToyObject::Timer { .. }) => types::timer(),
                    Some(ToyObject::Cpu { .. }) => types::cpu(),
                    Some(ToyObject::InterruptController { .. }) => types::interrupt_controller(),
                    _ => types::gpio_line(),
                };
                (name.clone(), *handle, ty)
            })
            .collect()
    }

    fn set_local_name(&mut self, peripheral: ObjectHandle, name: &str) -> HostResult<()> {
        let mut state = self.state.borrow_mut();
        if state.names.values().any(|n| n == name) {
            return Err(HostError::new(format!("name '{name}' is already in use")));
        }
        state.names.insert(peripheral, name.to_string());
        Ok(())
    }

    fn post_creation_actions(&mut self) {
        self.built = true;
        tracing::info!(peripherals = self.state.borrow().names.len(), "platform build complete");
    }
}
