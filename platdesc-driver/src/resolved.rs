//! The intermediate representation the validator produces and the
//! builder consumes. Keeping this separate from [`crate::ast`] means
//! the parse tree stays an honest, unannotated parse tree and
//! resolution results (chosen constructor overload, resolved type)
//! live in their own immutable structure instead of being patched into
//! AST nodes in place.

use crate::position::Position;
use platdesc_api::{RegistrationInterface, SimpleValue, TypeId};

pub struct ResolvedDescription {
    pub objects: Vec<ResolvedEntry>,
}

pub struct ResolvedEntry {
    pub variable: String,
    pub type_id: TypeId,
    pub alias: Option<String>,
    pub registration: Option<ResolvedRegistration>,
    pub ctor_index: usize,
    pub ctor_args: Vec<ResolvedValue>,
    pub properties: Vec<(String, ResolvedValue)>,
    pub irqs: Vec<ResolvedIrq>,
    pub init_lines: Vec<String>,
    pub position: Position,
}

#[derive(Clone)]
pub enum ResolvedValue {
    Simple(SimpleValue),
    Reference(String),
    Object(Box<ResolvedObject>),
}

#[derive(Clone)]
pub struct ResolvedObject {
    pub type_id: TypeId,
    pub ctor_index: usize,
    pub ctor_args: Vec<ResolvedValue>,
    pub properties: Vec<(String, ResolvedValue)>,
    pub position: Position,
}

pub struct ResolvedRegistration {
    pub register: String,
    pub interface: RegistrationInterface,
    pub point_ctor_index: Option<usize>,
    pub point_args: Vec<ResolvedValue>,
    pub position: Position,
}

pub struct ResolvedIrq {
    pub sources: Vec<ResolvedIrqSource>,
    pub destinations: Vec<ResolvedIrqDestination>,
    pub position: Position,
}

#[derive(Clone)]
pub enum ResolvedIrqSource {
    /// No source named: impute the entry's single default numbered
    /// output or GPIO property.
    Default,
    Numbered(u32),
    Named(String),
}

#[derive(Clone)]
pub struct ResolvedIrqDestination {
    pub peripheral: String,
    pub local_receiver: Option<u32>,
    pub ends: Vec<u32>,
    pub position: Position,
}
