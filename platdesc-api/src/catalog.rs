//! The reflective capability catalog the driver resolves types,
//! constructors, properties, and registration interfaces against.
//!
//! In the original this is satisfied by the host language's runtime
//! reflection. Here it is a registry populated by generated
//! descriptors, per the design note in the spec about decoupling the
//! resolver from any one host's reflection API.

use crate::error::HostResult;
use crate::types::{ObjectHandle, RegistrationInterface, TypeDescriptor, TypeId};
use crate::value::HostValue;

pub trait TypeCatalog {
    /// Resolves a bare or fully-qualified type name. Callers try the
    /// bare name, then the bare name under the default peripherals
    /// namespace, per the validator's resolution order.
    fn resolve(&self, name: &str) -> Option<TypeId>;

    /// `to` is assignable from `from`, i.e. a value of type `from` can
    /// be used wherever `to` is expected (equality or a supertype/
    /// interface relationship).
    fn is_assignable(&self, from: &TypeId, to: &TypeId) -> bool;

    fn descriptor(&self, ty: &TypeId) -> Option<&TypeDescriptor>;

    /// All concrete types known to the catalog, most-derived-first
    /// ties broken by registration order; used by tie-break rules that
    /// need to rank candidate types by specificity.
    fn is_more_derived(&self, a: &TypeId, b: &TypeId) -> bool {
        self.is_assignable(a, b) && !self.is_assignable(b, a)
    }

    /// Builds an instance of `ty` using the constructor at
    /// `ctor_index` (an index into `descriptor(ty).ctors`) with the
    /// given already-converted arguments, in parameter order.
    fn construct(
        &self,
        ty: &TypeId,
        ctor_index: usize,
        args: Vec<HostValue>,
        machine_handle: ObjectHandle,
    ) -> HostResult<ObjectHandle>;

    fn set_property(
        &self,
        obj: ObjectHandle,
        property: &str,
        value: HostValue,
    ) -> HostResult<()>;

    fn type_of(&self, obj: ObjectHandle) -> TypeId;

    /// Fetches the GPIO instance referenced by a named property.
    /// `Ok(None)` means the property evaluated to null.
    fn gpio_property(
        &self,
        obj: ObjectHandle,
        property: &str,
    ) -> HostResult<Option<ObjectHandle>>;

    /// Fetches `connections[index]` from a numbered GPIO output
    /// surface. `Ok(None)` distinguishes "key missing" from the
    /// caller's perspective the driver must still tell apart
    /// (`IrqSourcePinDoesNotExist`) from "key present but null"
    /// (`UninitializedSourceIrqObject`) — see
    /// `numbered_output_exists`.
    fn numbered_output(
        &self,
        obj: ObjectHandle,
        index: u32,
    ) -> HostResult<Option<ObjectHandle>>;

    fn numbered_output_exists(&self, obj: ObjectHandle, index: u32) -> bool;

    fn local_receiver(
        &self,
        obj: ObjectHandle,
        local_index: u32,
    ) -> HostResult<ObjectHandle>;

    /// Connects a GPIO source line to a destination's numbered input.
    fn connect_gpio(
        &self,
        source: ObjectHandle,
        destination: ObjectHandle,
        destination_index: u32,
    ) -> HostResult<()>;

    /// Builds a combiner with the given input arity and returns its
    /// handle.
    fn make_irq_combiner(&self, input_count: usize) -> HostResult<ObjectHandle>;

    /// Registers `peripheral` at `point` on `container` through the
    /// registration interface's register method. `container` is the
    /// object named by the entry's `@register` target — the thing that
    /// actually implements the registration interface and owns the
    /// address space `point` is drawn from.
    fn register(
        &self,
        container: ObjectHandle,
        point: ObjectHandle,
        iface: &RegistrationInterface,
        peripheral: ObjectHandle,
    ) -> HostResult<()>;

    /// The singleton null registration point.
    fn null_registration_point(&self) -> ObjectHandle;
}
