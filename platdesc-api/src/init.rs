//! The init-script handler: validates and (outside this driver's
//! scope) executes the free-form script lines attached to an `init:`
//! attribute.

use crate::types::ObjectHandle;

pub trait InitHandler {
    /// Checks that `lines` are well-formed script for `container`
    /// without running them. `Err` carries a human-readable reason,
    /// folded into `InitSectionValidationError` by the driver.
    fn validate(&self, container: ObjectHandle, lines: &[String]) -> Result<(), String>;

    /// Runs `lines` against `container`. Any per-line failure is
    /// reported through `on_error` rather than aborting the whole
    /// init phase — executing init scripts is explicitly out of scope
    /// for the driver itself, but the hook is part of the external
    /// contract so a host can wire its own interpreter in.
    fn execute(
        &self,
        container: ObjectHandle,
        lines: &[String],
        on_error: &mut dyn FnMut(String),
    );
}
