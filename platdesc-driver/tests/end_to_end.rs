//! End-to-end scenarios run against `platdesc-toy-machine`: a
//! description's text goes in, a live object graph (or a specific
//! diagnostic) comes out.

use platdesc_api::{ErrorKind, InitHandler, ObjectHandle, UsingResolver};
use platdesc_toy_machine::{new_toy_machine, SetVia};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

struct NoopInit;

impl InitHandler for NoopInit {
    fn validate(&self, _container: ObjectHandle, _lines: &[String]) -> Result<(), String> {
        Ok(())
    }

    fn execute(&self, _container: ObjectHandle, _lines: &[String], _on_error: &mut dyn FnMut(String)) {}
}

/// No description in these tests declares a `using`, so resolution is
/// never actually exercised; it only needs to type-check.
struct NoUsingResolver;

impl UsingResolver for NoUsingResolver {
    fn resolve(&self, include_path: &str, _including_file: Option<&Path>) -> io::Result<PathBuf> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("unexpected 'using \"{include_path}\"'"),
        ))
    }
}

/// Resolves an include path relative to the directory of the file that
/// named it, the way a real host's resolver would.
struct DirResolver;

impl UsingResolver for DirResolver {
    fn resolve(&self, include_path: &str, including_file: Option<&Path>) -> io::Result<PathBuf> {
        let base = including_file
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(base.join(include_path))
    }
}

/// A fresh file path under the system temp directory, unique per call
/// within this test binary's run.
fn temp_file(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("platdesc-test-{}-{}-{name}", std::process::id(), n))
}

#[test]
fn two_entry_update_merges_into_a_single_object() {
    let (catalog, mut machine) = new_toy_machine();
    let source = r#"
        sysbus: Peripherals.Bus;
        mem: Peripherals.Memory @ sysbus 0x1000 as "mem" { size: 0x100; endian: Endian.Little; fill: 1 }
        mem: fill: 9
    "#;

    platdesc_driver::process_description(source, "two_entry_update", &NoUsingResolver, &catalog, &mut machine, &NoopInit)
        .expect("description should build");

    let handle = catalog.find_named("mem").expect("mem should be registered");
    let dump = catalog.debug_object(handle);
    assert!(dump.contains("fill: 9"), "expected the later entry's fill to win, got: {dump}");
    assert!(!dump.contains("fill: 1,"), "the first entry's fill should have been overwritten, got: {dump}");
}

/// `Peripherals.Memory` declares `fill` both as an optional constructor
/// parameter and as a settable property. Per the is-property rule, `fill`
/// given inline at construction must still be applied through the
/// property setter, never consumed as a constructor argument.
#[test]
fn memory_fill_is_classified_as_a_property_not_a_ctor_argument() {
    let (catalog, mut machine) = new_toy_machine();
    let source = r#"
        sysbus: Peripherals.Bus;
        mem: Peripherals.Memory @ sysbus 0x1000 as "mem" { size: 0x40; endian: Endian.Little; fill: 3 }
    "#;

    platdesc_driver::process_description(source, "fill_is_property", &NoUsingResolver, &catalog, &mut machine, &NoopInit)
        .expect("an inline fill attribute should build");

    let handle = catalog.find_named("mem").expect("mem should be registered");
    assert_eq!(
        catalog.memory_fill_via(handle),
        Some(SetVia::Property),
        "fill given inline at construction must still go through the property setter"
    );
}

#[test]
fn alias_without_registration_is_rejected() {
    let (catalog, mut machine) = new_toy_machine();
    let source = r#"
        mem: Peripherals.Memory as "m1" { size: 0x1000 }
    "#;

    let err = platdesc_driver::process_description(source, "alias_without_registration", &NoUsingResolver, &catalog, &mut machine, &NoopInit)
        .expect_err("an alias with no registration must fail");

    assert_eq!(err.kind(), ErrorKind::AliasWithoutRegistration);
}

/// `Peripherals.Memory` is a bus peripheral with a bus-registration
/// candidate that requires an explicit address; an absent registration-
/// point value must not silently fall back to the null registration
/// point the way a non-bus-peripheral's would.
#[test]
fn bus_peripheral_without_an_explicit_address_is_rejected() {
    let (catalog, mut machine) = new_toy_machine();
    let source = r#"
        sysbus: Peripherals.Bus;
        mem: Peripherals.Memory @ sysbus { size: 0x100 }
    "#;

    let err = platdesc_driver::process_description(source, "bus_peripheral_no_address", &NoUsingResolver, &catalog, &mut machine, &NoopInit)
        .expect_err("a bus peripheral with no address must fail, not silently register at the null point");

    assert_eq!(err.kind(), ErrorKind::NoCtorForRegistrationPoint);
}

#[test]
fn irq_fan_in_from_three_peripherals_shares_one_combiner() {
    let (catalog, mut machine) = new_toy_machine();
    let source = r#"
        sysbus: Peripherals.Bus;
        cpu: Peripherals.Cpu { irq_count: 1 }
        p0: Peripherals.Gpio.Port @ sysbus 0x100 { width: 1; 0 -> cpu:0@0 }
        p1: Peripherals.Gpio.Port @ sysbus 0x200 { width: 1; 0 -> cpu:0@0 }
        p2: Peripherals.Gpio.Port @ sysbus 0x300 { width: 1; 0 -> cpu:0@0 }
    "#;

    platdesc_driver::process_description(source, "irq_fan_in", &NoUsingResolver, &catalog, &mut machine, &NoopInit)
        .expect("three single-source entries targeting the same pin should build");

    // machine(1) + sysbus(1) + cpu(1) + its one receiver(1) + 3 ports(3)
    // + their 3 outputs(3) + one shared combiner (not three, 1) + 3
    // registration addresses(3) = 14.
    assert_eq!(catalog.object_count(), 14);

    let combiners: Vec<ObjectHandle> = (0..catalog.object_count())
        .map(ObjectHandle)
        .filter(|h| catalog.debug_object(*h).contains("Combiner {"))
        .collect();
    assert_eq!(combiners.len(), 1, "exactly one combiner should have been built");
    assert!(
        catalog.debug_object(combiners[0]).contains("0: ObjectHandle")
            && catalog.debug_object(combiners[0]).contains("1: ObjectHandle")
            && catalog.debug_object(combiners[0]).contains("2: ObjectHandle"),
        "the combiner should have all three inputs wired: {}",
        catalog.debug_object(combiners[0])
    );
}

#[test]
fn creation_cycle_reports_the_full_path() {
    let (catalog, mut machine) = new_toy_machine();
    let source = r#"
        a: Peripherals.InterruptController { lines: 1; upstream: b }
        b: Peripherals.InterruptController { lines: 1; upstream: a }
    "#;

    let err = platdesc_driver::process_description(source, "creation_cycle", &NoUsingResolver, &catalog, &mut machine, &NoopInit)
        .expect_err("a mutual upstream reference must be rejected as a cycle");

    assert_eq!(err.kind(), ErrorKind::CreationOrderCycle);
    let message = err.to_string();
    assert!(message.contains('a') && message.contains('b'), "cycle message should name both variables: {message}");
}

#[test]
fn none_cancellation_across_an_include_drops_the_optional_ctor_param() {
    let include_path = temp_file("cpu.desc");
    let main_path = temp_file("main.desc");

    std::fs::write(&include_path, "cpu: Peripherals.Cpu @none { irq_count: 4 }\n").unwrap();
    std::fs::write(
        &main_path,
        format!(
            "using \"{}\"\ncpu: irq_count: none\n",
            include_path.file_name().unwrap().to_string_lossy()
        ),
    )
    .unwrap();

    let (catalog, mut machine) = new_toy_machine();
    platdesc_driver::process_file(&main_path, &DirResolver, &catalog, &mut machine, &NoopInit)
        .expect("cancelling an optional ctor-only parameter should not block the build");

    // `irq_count` defaults to 1 once cancelled, not the 4 the include
    // set: one Cpu object plus its one receiver, on top of the machine.
    assert_eq!(catalog.object_count(), 3);

    std::fs::remove_file(&include_path).ok();
    std::fs::remove_file(&main_path).ok();
}

#[test]
fn enum_mismatch_is_reported_when_the_literal_belongs_to_another_enum() {
    let (catalog, mut machine) = new_toy_machine();
    let source = r#"
        t: Peripherals.Timer { period_ms: 100; mode: Other.Low }
    "#;

    let err = platdesc_driver::process_description(source, "enum_mismatch", &NoUsingResolver, &catalog, &mut machine, &NoopInit)
        .expect_err("a literal from a different enum's namespace must be rejected");

    assert_eq!(err.kind(), ErrorKind::EnumMismatch);
}

/// Running the same description against two independent fresh machines
/// produces the same object graph both times.
#[test]
fn merging_the_same_description_twice_is_idempotent() {
    let source = r#"
        sysbus: Peripherals.Bus;
        mem: Peripherals.Memory @ sysbus 0x1000 as "mem" { size: 0x40; endian: Endian.Little; fill: 7 }
    "#;

    let (catalog_a, mut machine_a) = new_toy_machine();
    platdesc_driver::process_description(source, "idempotence_a", &NoUsingResolver, &catalog_a, &mut machine_a, &NoopInit)
        .expect("first run should build");

    let (catalog_b, mut machine_b) = new_toy_machine();
    platdesc_driver::process_description(source, "idempotence_b", &NoUsingResolver, &catalog_b, &mut machine_b, &NoopInit)
        .expect("second run against a fresh machine should build identically");

    assert_eq!(catalog_a.object_count(), catalog_b.object_count());
    let mem_a = catalog_a.find_named("mem").unwrap();
    let mem_b = catalog_b.find_named("mem").unwrap();
    assert_eq!(catalog_a.debug_object(mem_a), catalog_b.debug_object(mem_b));
}

#[test]
fn construction_with_no_irq_attributes_does_not_build_a_combiner() {
    let (catalog, mut machine) = new_toy_machine();
    let source = r#"
        sysbus: Peripherals.Bus;
        p0: Peripherals.Gpio.Port @ sysbus 0x100 { width: 2 }
    "#;

    platdesc_driver::process_description(source, "no_irqs", &NoUsingResolver, &catalog, &mut machine, &NoopInit)
        .expect("a port with no irq attribute should build");

    let has_combiner = (0..catalog.object_count())
        .map(ObjectHandle)
        .any(|h| catalog.debug_object(h).contains("Combiner {"));
    assert!(!has_combiner, "no combiner should be created unless a destination is shared by more than one source");
}
