//! [`TypeCatalog`] implementation over the toy object table.
//!
//! `construct`/`set_property`/`register` all take `&self` per the
//! trait, so the object table lives behind a `RefCell` the way a real
//! host might guard a device table with a mutex; this host is
//! single-threaded, so `RefCell` is enough.

use crate::objects::{Endian, Endpoint, SetVia, ToyObject, ToyState};
use crate::types;
use platdesc_api::{
    HostError, HostResult, HostValue, ObjectHandle, RegistrationInterface, SimpleValue,
    TypeCatalog, TypeDescriptor, TypeId,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct ToyCatalog {
    pub(crate) state: Rc<RefCell<ToyState>>,
    types: HashMap<TypeId, TypeDescriptor>,
    supertypes: HashMap<TypeId, Vec<TypeId>>,
}

impl ToyCatalog {
    pub(crate) fn new(state: Rc<RefCell<ToyState>>) -> ToyCatalog {
        ToyCatalog {
            state,
            types: types::descriptors(),
            supertypes: types::supertypes(),
        }
    }

    /// A human-readable dump of a live object's current state. Not part
    /// of `TypeCatalog` — exists so callers (tests, a future debug
    /// console) can inspect what got built without this host growing a
    /// second, parallel query API.
    pub fn debug_object(&self, handle: ObjectHandle) -> String {
        format!("{:?}", self.state.borrow().objects.get(handle.0))
    }

    /// The handle registered under `name` via `Machine::set_local_name`.
    pub fn find_named(&self, name: &str) -> Option<ObjectHandle> {
        self.state
            .borrow()
            .names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(h, _)| *h)
    }

    /// How many objects have been constructed so far, including the
    /// machine itself and any fan-in combiners the builder inserted.
    pub fn object_count(&self) -> usize {
        self.state.borrow().objects.len()
    }

    /// Whether a `Peripherals.Memory` object's `fill` field was last set
    /// by its constructor or by a post-construction property set. `None`
    /// if `handle` isn't a `Memory`.
    pub fn memory_fill_via(&self, handle: ObjectHandle) -> Option<SetVia> {
        match self.state.borrow().objects.get(handle.0) {
            Some(ToyObject::Memory { fill_via, .. }) => Some(*fill_via),
            _ => None,
        }
    }
}

fn as_u32(value: &HostValue, default: u32) -> Result<u32, HostError> {
    match value {
        HostValue::Simple(SimpleValue::Number(n)) => n
            .as_i64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| HostError::new(format!("'{n}' is not a valid u32"))),
        HostValue::Simple(SimpleValue::Empty) => Ok(default),
        other => Err(HostError::new(format!("expected a number, got {other}"))),
    }
}

fn as_u8(value: &HostValue, default: u8) -> Result<u8, HostError> {
    Ok(as_u32(value, default as u32)?.min(u8::MAX as u32) as u8)
}

fn as_bool(value: &HostValue, default: bool) -> bool {
    match value {
        HostValue::Simple(SimpleValue::Bool(b)) => *b,
        _ => default,
    }
}

fn as_endian(value: &HostValue) -> Endian {
    match value {
        HostValue::Simple(SimpleValue::Enum(e)) if e.member().eq_ignore_ascii_case("big") => {
            Endian::Big
        }
        _ => Endian::Little,
    }
}

impl TypeCatalog for ToyCatalog {
    fn resolve(&self, name: &str) -> Option<TypeId> {
        let direct = TypeId::new(name);
        if self.types.contains_key(&direct) {
            return Some(direct);
        }
        let namespaced = TypeId::new(format!("Peripherals.{name}"));
        if self.types.contains_key(&namespaced) {
            return Some(namespaced);
        }
        self.types
            .keys()
            .find(|t| t.bare_name().eq_ignore_ascii_case(name))
            .cloned()
    }

    fn is_assignable(&self, from: &TypeId, to: &TypeId) -> bool {
        if from == to {
            return true;
        }
        self.supertypes
            .get(from)
            .is_some_and(|supers| supers.iter().any(|s| s == to || self.is_assignable(s, to)))
    }

    fn descriptor(&self, ty: &TypeId) -> Option<&TypeDescriptor> {
        self.types.get(ty)
    }

    fn construct(
        &self,
        ty: &TypeId,
        ctor_index: usize,
        args: Vec<HostValue>,
        _machine_handle: ObjectHandle,
    ) -> HostResult<ObjectHandle> {
        let mut state = self.state.borrow_mut();

        if *ty == types::bus() {
            return Ok(state.push(ToyObject::Bus {
                slots: RefCell::new(HashMap::new()),
            }));
        }

        if *ty == types::bus_address() {
            let address = as_u32(&args[0], 0)?;
            return Ok(state.push(ToyObject::Address(address)));
        }

        if *ty == types::memory() {
            let size = as_u32(&args[0], 0)?;
            let (fill, endian) = match ctor_index {
                0 => (as_u8(&args[1], 0)?, as_endian(&args[2])),
                _ => (0, Endian::Little),
            };
            return Ok(state.push(ToyObject::Memory { size, fill, fill_via: SetVia::Ctor, endian }));
        }

        if *ty == types::gpio_port() {
            let width = as_u8(&args[0], 0)?;
            let active_low = as_bool(&args[1], false);
            let outputs = (0..width).map(|_| state.push(ToyObject::Line)).collect();
            return Ok(state.push(ToyObject::GpioPort { outputs, active_low }));
        }

        if *ty == types::timer() {
            let period_ms = as_u32(&args[0], 0)?;
            let overflow = state.push(ToyObject::Line);
            return Ok(state.push(ToyObject::Timer { period_ms, overflow }));
        }

        if *ty == types::cpu() {
            let irq_count = as_u8(&args[0], 1)?;
            let receivers = (0..irq_count.max(1))
                .map(|_| state.push(ToyObject::Receiver(Endpoint::default())))
                .collect();
            return Ok(state.push(ToyObject::Cpu { receivers }));
        }

        if *ty == types::interrupt_controller() {
            let _lines = as_u8(&args[0], 0)?;
            let upstream = match args.get(1) {
                Some(HostValue::Object(h)) => Some(*h),
                _ => None,
            };
            return Ok(state.push(ToyObject::InterruptController {
                endpoint: Endpoint::default(),
                upstream,
            }));
        }

        Err(HostError::new(format!("'{ty}' has no constructor")))
    }

    fn set_property(&self, obj: ObjectHandle, property: &str, value: HostValue) -> HostResult<()> {
        let mut state = self.state.borrow_mut();
        match state.objects.get_mut(obj.0) {
            Some(ToyObject::Memory { fill, fill_via, .. }) if property == "fill" => {
                *fill = as_u8(&value, *fill)?;
                *fill_via = SetVia::Property;
                Ok(())
            }
            Some(ToyObject::GpioPort { active_low, .. }) if property == "active_low" => {
                *active_low = as_bool(&value, *active_low);
                Ok(())
            }
            Some(_) => Err(HostError::new(format!("no settable property '{property}'"))),
            None => Err(HostError::new(format!("no such object: {obj:?}"))),
        }
    }

    fn type_of(&self, obj: ObjectHandle) -> TypeId {
        let state = self.state.borrow();
        match state.objects.get(obj.0) {
            Some(ToyObject::Machine) => types::machine_type(),
            Some(ToyObject::Bus { .. }) => types::bus(),
            Some(ToyObject::Address(_)) => types::bus_address(),
            Some(ToyObject::Memory { .. }) => types::memory(),
            Some(ToyObject::Line) => types::gpio_line(),
            Some(ToyObject::GpioPort { .. }) => types::gpio_port(),
            Some(ToyObject::Timer { .. }) => types::timer(),
            Some(ToyObject::Cpu { .. }) => types::cpu(),
            Some(ToyObject::InterruptController { .. }) => types::interrupt_controller(),
            Some(ToyObject::Combiner { .. }) => types::combiner(),
            Some(ToyObject::Receiver(_)) | None => types::gpio_line(),
        }
    }

    fn gpio_property(&self, obj: ObjectHandle, property: &str) -> HostResult<Option<ObjectHandle>> {
        let state = self.state.borrow();
        match (state.get(obj)?, property) {
            (ToyObject::Timer { overflow, .. }, "overflow") => Ok(Some(*overflow)),
            _ => Err(HostError::new(format!("no GPIO property '{property}' on {obj:?}"))),
        }
    }

    fn numbered_output(&self, obj: ObjectHandle, index: u32) -> HostResult<Option<ObjectHandle>> {
        let state = self.state.borrow();
        match state.get(obj)? {
            ToyObject::GpioPort { outputs, .. } => {
                Ok(outputs.get(index as usize).copied())
            }
            other => Err(HostError::new(format!("{other:?} has no numbered outputs"))),
        }
    }

    fn numbered_output_exists(&self, obj: ObjectHandle, index: u32) -> bool {
        let state = self.state.borrow();
        matches!(state.get(obj), Ok(ToyObject::GpioPort { outputs, .. }) if (index as usize) < outputs.len())
    }

    fn local_receiver(&self, obj: ObjectHandle, local_index: u32) -> HostResult<ObjectHandle> {
        let state = self.state.borrow();
        match state.get(obj)? {
            ToyObject::Cpu { receivers } => receivers
                .get(local_index as usize)
                .copied()
                .ok_or_else(|| HostError::new(format!("cpu has no receiver {local_index}"))),
            other => Err(HostError::new(format!("{other:?} has no local receivers"))),
        }
    }

    fn connect_gpio(&self, source: ObjectHandle, destination: ObjectHandle, destination_index: u32) -> HostResult<()> {
        let state = self.state.borrow();
        let endpoint = match state.get(destination)? {
            ToyObject::Receiver(endpoint) => endpoint,
            ToyObject::InterruptController { endpoint, .. } => endpoint,
            ToyObject::Combiner { endpoint } => endpoint,
            other => return Err(HostError::new(format!("{other:?} cannot receive a GPIO connection"))),
        };
        endpoint.connections.borrow_mut().insert(destination_index, source);
        Ok(())
    }

    fn make_irq_combiner(&self, _input_count: usize) -> HostResult<ObjectHandle> {
        let mut state = self.state.borrow_mut();
        Ok(state.push(ToyObject::Combiner {
            endpoint: Endpoint::default(),
        }))
    }

    fn register(
        &self,
        container: ObjectHandle,
        point: ObjectHandle,
        iface: &RegistrationInterface,
        peripheral: ObjectHandle,
    ) -> HostResult<()> {
        if !self.is_assignable(&self.type_of(peripheral), &iface.peripheral_type) {
            return Err(HostError::new(
                "peripheral is not assignable to the registration interface",
            ));
        }

        let state = self.state.borrow();
        let address = match state.get(point)? {
            ToyObject::Address(a) => *a,
            // The null registration point: assign the next free slot.
            ToyObject::Line => match state.get(container)? {
                ToyObject::Bus { slots } => slots.borrow().len() as u32,
                other => return Err(HostError::new(format!("{other:?} is not a bus"))),
            },
            other => return Err(HostError::new(format!("{other:?} is not a registration point"))),
        };

        match state.get(container)? {
            ToyObject::Bus { slots } => {
                let mut slots = slots.borrow_mut();
                if slots.contains_key(&address) {
                    return Err(HostError::new(format!("address {address} is already occupied")));
                }
                slots.insert(address, peripheral);
                Ok(())
            }
            other => Err(HostError::new(format!("{other:?} cannot register peripherals"))),
        }
    }

    fn null_registration_point(&self) -> ObjectHandle {
        let mut state = self.state.borrow_mut();
        state.push(ToyObject::Line)
    }
}
