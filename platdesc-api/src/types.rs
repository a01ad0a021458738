//! Descriptors that stand in for reflection. A real host language can
//! answer "what constructors does this type have" by inspecting its
//! own runtime type system; this reference host catalog answers the
//! same question from a table of descriptors built at startup. See
//! [`crate::catalog::TypeCatalog`].

use crate::value::NumberKind;
use std::fmt;
use std::sync::Arc;

/// A fully-qualified type name, e.g. `Peripherals.CPU.ARMv7A`. Cheap to
/// clone; interned as an `Arc<str>` the way `drmem_api::driver::Name`
/// wraps driver names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(Arc<str>);

impl TypeId {
    pub fn new(name: impl Into<Arc<str>>) -> TypeId {
        TypeId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last `.`-separated segment, used when a description refers
    /// to a type by its bare name under the default namespace.
    pub fn bare_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeId {
    fn from(value: &str) -> Self {
        TypeId::new(value)
    }
}

/// A handle to a live host object. Opaque; the catalog and machine are
/// the only things that know how to dereference one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub usize);

/// What a constructor parameter accepts, as far as the resolver cares:
/// either "this exact numeric Rust type", "this reference/enum/other
/// type", or "the ambient Machine" (the driver's one implicit
/// default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Bool,
    Number(NumberKind),
    Range,
    /// An enum type, by its fully-qualified name.
    Enum(TypeId),
    /// Any other reference/value type resolved by name; accepts
    /// references, nested object-values, or (if the enum escape hatch
    /// applies) numbers.
    Named(TypeId),
    /// The ambient host `Machine` type. A missing argument for a
    /// parameter of this kind is filled with the running machine
    /// instance rather than rejected.
    Machine,
}

/// A single formal parameter of a constructor or registration-point
/// factory.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    pub name: String,
    pub kind: ParamKind,
    /// `Some` if the parameter has a language-level default value used
    /// when no matching attribute is supplied.
    pub has_default: bool,
}

impl ParamDescriptor {
    pub fn required(name: impl Into<String>, kind: ParamKind) -> Self {
        ParamDescriptor {
            name: name.into(),
            kind,
            has_default: false,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParamKind) -> Self {
        ParamDescriptor {
            name: name.into(),
            kind,
            has_default: true,
        }
    }
}

/// One overload of a type's public constructors.
#[derive(Debug, Clone)]
pub struct CtorDescriptor {
    pub params: Vec<ParamDescriptor>,
}

impl CtorDescriptor {
    pub fn new(params: Vec<ParamDescriptor>) -> Self {
        CtorDescriptor { params }
    }

    /// A human-readable signature for `AmbiguousCtor`/`NoCtor`
    /// diagnostics.
    pub fn signature(&self, type_name: &str) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}", p.name))
            .collect();
        format!("{}({})", type_name, params.join(", "))
    }
}

/// A settable or GPIO-typed property.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: ParamKind,
    pub settable: bool,
    /// `true` if the property's declared type is the host's GPIO
    /// type.
    pub is_gpio: bool,
    /// `true` if the property carries the host's `DefaultInterrupt`
    /// marker, used to disambiguate an imputed IRQ source.
    pub is_default_interrupt: bool,
}

/// One `IPeripheralRegister<TPeripheral, TRegistrationPoint>`
/// implementation a registration-point type provides.
#[derive(Debug, Clone)]
pub struct RegistrationInterface {
    pub peripheral_type: TypeId,
    pub registration_point_type: TypeId,
    /// Constructors usable to build a value of
    /// `registration_point_type` from a simple value (first parameter
    /// accepts the simple value, remaining parameters optional).
    pub point_ctors: Vec<CtorDescriptor>,
}

/// Everything the catalog knows about one type.
#[derive(Debug, Clone, Default)]
pub struct TypeDescriptor {
    pub ctors: Vec<CtorDescriptor>,
    pub properties: Vec<PropertyDescriptor>,
    pub registration_interfaces: Vec<RegistrationInterface>,
    pub supports_local_receiver: bool,
    pub supports_numbered_output: bool,
    /// True for types that are themselves a bus peripheral with a
    /// dedicated bus-registration interface candidate, used by the
    /// null-registration-point tie-break rule.
    pub is_bus_peripheral: bool,
}
