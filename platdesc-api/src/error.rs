//! The error taxonomy shared between the platform description driver
//! and the host it is compiled against.
//!
//! Every diagnostic the driver can raise maps to exactly one
//! [`ErrorKind`]. The numeric codes are part of the stable, public
//! contract described in the driver's external interface: clients may
//! match on `ParsingException::code()` without caring about wording.

use std::fmt;

/// One entry per error kind enumerated in the driver's external
/// interface. Order is significant: it fixes the numeric code used in
/// `Error E<NN>:` diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SyntaxError,
    UsingFileNotFound,
    RecurringUsing,
    EmptyEntry,
    TypeNotSpecifiedInFirstVariableUse,
    VariableAlreadyDeclared,
    TypeNotResolved,
    AliasWithoutRegistration,
    AliasWithNoneRegistration,
    MissingReference,
    NoUsableRegisterInterface,
    AmbiguousRegistrationPointType,
    AmbiguousRegistree,
    NoCtorForRegistrationPoint,
    AmbiguousCtorForRegistrationPoint,
    CtorAttributesInNonCreatingEntry,
    PropertyDoesNotExist,
    PropertyNotWritable,
    TypeMismatch,
    EnumMismatch,
    PropertyOrCtorNameUsedMoreThanOnce,
    MoreThanOneInitAttribute,
    InitSectionValidationError,
    CreationOrderCycle,
    RegistrationOrderCycle,
    IrqDestinationDoesNotExist,
    NotLocalGpioReceiver,
    IrqSourceDoesNotExist,
    AmbiguousDefaultIrqSource,
    IrqSourceIsNotNumberedGpioOutput,
    IrqDestinationIsNotIrqReceiver,
    WrongIrqArity,
    IrqSourceUsedMoreThanOnce,
    IrqDestinationUsedMoreThanOnce,
    UninitializedSourceIrqObject,
    IrqSourcePinDoesNotExist,
    ConstructionException,
    PropertySettingException,
    RegistrationException,
    CastException,
    NameSettingException,
    InternalError,
}

impl ErrorKind {
    /// The stable numeric code printed as `Error E<NN>:`.
    pub fn code(self) -> u32 {
        use ErrorKind::*;

        match self {
            SyntaxError => 1,
            UsingFileNotFound => 2,
            RecurringUsing => 3,
            EmptyEntry => 4,
            TypeNotSpecifiedInFirstVariableUse => 5,
            VariableAlreadyDeclared => 6,
            TypeNotResolved => 7,
            AliasWithoutRegistration => 8,
            AliasWithNoneRegistration => 9,
            MissingReference => 10,
            NoUsableRegisterInterface => 11,
            AmbiguousRegistrationPointType => 12,
            AmbiguousRegistree => 13,
            NoCtorForRegistrationPoint => 14,
            AmbiguousCtorForRegistrationPoint => 15,
            CtorAttributesInNonCreatingEntry => 16,
            PropertyDoesNotExist => 17,
            PropertyNotWritable => 18,
            TypeMismatch => 19,
            EnumMismatch => 20,
            PropertyOrCtorNameUsedMoreThanOnce => 21,
            MoreThanOneInitAttribute => 22,
            InitSectionValidationError => 23,
            CreationOrderCycle => 24,
            RegistrationOrderCycle => 25,
            IrqDestinationDoesNotExist => 26,
            NotLocalGpioReceiver => 27,
            IrqSourceDoesNotExist => 28,
            AmbiguousDefaultIrqSource => 29,
            IrqSourceIsNotNumberedGpioOutput => 30,
            IrqDestinationIsNotIrqReceiver => 31,
            WrongIrqArity => 32,
            IrqSourceUsedMoreThanOnce => 33,
            IrqDestinationUsedMoreThanOnce => 34,
            UninitializedSourceIrqObject => 35,
            IrqSourcePinDoesNotExist => 36,
            ConstructionException => 37,
            PropertySettingException => 38,
            RegistrationException => 39,
            CastException => 40,
            NameSettingException => 41,
            InternalError => 42,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The single rich exception that crosses the driver's public
/// boundary. Carries the offending error kind, its numeric code, and
/// an already-formatted, source-annotated diagnostic (see
/// `platdesc_driver::diagnostic`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingException {
    kind: ErrorKind,
    diagnostic: String,
}

impl ParsingException {
    pub fn new(kind: ErrorKind, diagnostic: String) -> Self {
        ParsingException { kind, diagnostic }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

impl fmt::Display for ParsingException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagnostic)
    }
}

impl std::error::Error for ParsingException {}

pub type Result<T> = std::result::Result<T, ParsingException>;

/// An error raised by host code (a constructor, a property setter, a
/// register method). Mirrors the original's distinction between a
/// `RecoverableException`, which the driver catches and folds into one
/// of its own error kinds, and any other exception, which is expected
/// to propagate untouched (represented here by `panic!` at the host
/// boundary, since Rust has no ambient exception mechanism to
/// "rethrow untouched").
#[derive(Debug, Clone)]
pub struct HostError(String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        HostError(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for HostError {}

pub type HostResult<T> = std::result::Result<T, HostError>;
