//! Runtime storage for every object the driver constructs. A real host
//! would dispatch through its own type system; here each live object is
//! just a variant of [`ToyObject`] kept in a flat `Vec` indexed by
//! [`ObjectHandle`].

use platdesc_api::{HostError, ObjectHandle};
use std::cell::RefCell;
use std::collections::HashMap;

/// A GPIO-wired endpoint: something another signal can be connected
/// into by index. Used for a CPU's per-line interrupt receivers, an
/// interrupt controller's own input lines, and fan-in combiners.
#[derive(Debug, Default)]
pub struct Endpoint {
    pub connections: RefCell<HashMap<u32, ObjectHandle>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// How a value currently held by a live object last got there. Exists
/// only so tests can tell a constructor argument apart from a
/// post-construction property set when both end up in the same struct
/// field; `debug_object` surfaces it in its Debug dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetVia {
    Ctor,
    Property,
}

#[derive(Debug)]
pub enum ToyObject {
    /// The machine itself, handle 0.
    Machine,
    Bus {
        slots: RefCell<HashMap<u32, ObjectHandle>>,
    },
    /// A `Peripherals.Bus.Address` registration-point value.
    Address(u32),
    Memory {
        size: u32,
        fill: u8,
        fill_via: SetVia,
        endian: Endian,
    },
    /// A signal source/identity with no behavior of its own: a GPIO
    /// port's pin, a timer's overflow line.
    Line,
    GpioPort {
        outputs: Vec<ObjectHandle>,
        active_low: bool,
    },
    Timer {
        period_ms: u32,
        overflow: ObjectHandle,
    },
    Cpu {
        receivers: Vec<ObjectHandle>,
    },
    /// One of a CPU's per-line interrupt receivers.
    Receiver(Endpoint),
    InterruptController {
        endpoint: Endpoint,
        /// The upstream controller this one cascades into, if any.
        upstream: Option<ObjectHandle>,
    },
    Combiner {
        endpoint: Endpoint,
    },
}

/// Everything the catalog and machine share: the object table and the
/// local names peripherals are registered under.
#[derive(Default)]
pub struct ToyState {
    pub objects: Vec<ToyObject>,
    pub names: HashMap<ObjectHandle, String>,
}

impl ToyState {
    pub fn push(&mut self, obj: ToyObject) -> ObjectHandle {
        let handle = ObjectHandle(self.objects.len());
        self.objects.push(obj);
        handle
    }

    pub fn get(&self, handle: ObjectHandle) -> Result<&ToyObject, HostError> {
        self.objects
            .get(handle.0)
            .ok_or_else(|| HostError::new(format!("no such object: {handle:?}")))
    }
}
