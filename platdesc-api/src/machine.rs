//! The host Machine: owns created instances, answers registration
//! queries, and receives the post-creation notification at the end of
//! a successful build.

use crate::error::HostResult;
use crate::types::{ObjectHandle, TypeId};

pub trait Machine {
    /// The keyword a description uses to refer to the machine itself
    /// (e.g. `sysbus`'s owner), always pre-declared as a builtin
    /// variable.
    fn keyword(&self) -> &str;

    fn handle(&self) -> ObjectHandle;

    fn is_registered(&self, peripheral: ObjectHandle) -> bool;

    /// Every peripheral already registered on the machine before the
    /// driver starts, along with the local name it is registered
    /// under — these seed the variable store's builtins.
    fn registered_peripherals(&self) -> Vec<(String, ObjectHandle, TypeId)>;

    fn set_local_name(&mut self, peripheral: ObjectHandle, name: &str) -> HostResult<()>;

    /// Invoked once, after a successful build, regardless of whether
    /// any peripherals were created.
    fn post_creation_actions(&mut self);
}
