//! End-to-end pipeline tests over real directories.

use std::fs;
use std::path::{Path, PathBuf};

use shade::{ObfuscateError, ObfuscateOptions, Obfuscator};
use shade_core::{ObfuscateEvent, StringScrambler};
use shade_cst::parse_program;

/// Recorded pipeline events: `(path, error message if any)`.
type Events = Vec<(PathBuf, Option<String>)>;

fn run(
    dir: &Path,
    options: ObfuscateOptions,
) -> (Result<shade::ObfuscateSummary, ObfuscateError>, Events) {
    let mut events: Events = Vec::new();
    let mut sink = |event: ObfuscateEvent<'_>| match event {
        ObfuscateEvent::FileStarted { path } => events.push((path.to_path_buf(), None)),
        ObfuscateEvent::FileError { path, message } => {
            events.push((path.to_path_buf(), Some(message)))
        }
    };
    let result = Obfuscator::new().obfuscate(dir, options, &mut sink);
    (result, events)
}

fn scrambled(name: &str) -> String {
    format!("s{}", StringScrambler::new().scramble(name))
}

#[test]
fn obfuscates_a_directory_of_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("counter.php"),
        "<?php
class Counter {
    private $total = 0;
    private function bump($amount) {
        $this->total += $amount;
    }
    public function add($amount) {
        $this->bump($amount);
        return $this->total;
    }
}
",
    )
    .expect("write");

    let (result, events) = run(dir.path(), ObfuscateOptions::default());
    let summary = result.expect("run succeeds");
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(events.len(), 1);

    let out = fs::read_to_string(dir.path().join("counter.php")).expect("read");
    let total = scrambled("total");
    let bump = scrambled("bump");
    let amount = scrambled("amount");
    assert!(!out.contains("total"), "property name must be gone: {out}");
    assert!(!out.contains("bump"));
    assert!(!out.contains("amount"));
    assert!(out.contains(&format!("private ${total} = 0;")));
    assert!(out.contains(&format!("private function {bump}(${amount})")));
    assert!(out.contains(&format!("$this->{bump}(${amount})")));
    assert!(out.contains(&format!("$this->{total} += ${amount}")));
    // Public API survives.
    assert!(out.contains("public function add("));
    // The transformed output is still valid PHP.
    parse_program(&out).expect("output parses");
}

#[test]
fn method_and_property_may_share_a_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("shared.php"),
        "<?php
class Box {
    private $value;
    private function value() { return $this->value; }
    public function get() { return $this->value(); }
}
",
    )
    .expect("write");

    let (result, _) = run(dir.path(), ObfuscateOptions::default());
    result.expect("run succeeds");

    let out = fs::read_to_string(dir.path().join("shared.php")).expect("read");
    let value = scrambled("value");
    // Same source name, same deterministic scramble - but declaration
    // and use sites of both kinds must all be rewritten.
    assert!(out.contains(&format!("private ${value};")));
    assert!(out.contains(&format!("private function {value}()")));
    assert!(out.contains(&format!("$this->{value};")));
    assert!(out.contains(&format!("$this->{value}();")));
}

#[test]
fn computed_calls_disable_method_renaming_per_file_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    // a.php renames its private method; b.php must not, and must not
    // inherit a.php's rename map either.
    fs::write(
        dir.path().join("a.php"),
        "<?php
class First {
    private function helper() { return 1; }
    public function run() { return $this->helper(); }
}
",
    )
    .expect("write");
    fs::write(
        dir.path().join("b.php"),
        "<?php
class Second {
    private function helper() { return 2; }
    public function run($m) { return $this->$m(); }
    public function direct() { return $this->helper(); }
}
",
    )
    .expect("write");

    let (result, _) = run(dir.path(), ObfuscateOptions::default());
    result.expect("run succeeds");

    let helper = scrambled("helper");
    let a = fs::read_to_string(dir.path().join("a.php")).expect("read");
    assert!(a.contains(&format!("private function {helper}()")));
    assert!(!a.contains("helper()"));

    let b = fs::read_to_string(dir.path().join("b.php")).expect("read");
    assert!(b.contains("private function helper()"));
    assert!(b.contains("$this->helper()"));
    assert!(!b.contains(&helper));
}

#[test]
fn rename_state_does_not_leak_across_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    // a.php declares private $count, so its fetches are renamed. b.php
    // fetches a property of the same name without declaring it; with
    // per-file state it must stay untouched.
    fs::write(
        dir.path().join("a.php"),
        "<?php
class Holder {
    private $count = 0;
    public function get() { return $this->count; }
}
",
    )
    .expect("write");
    fs::write(
        dir.path().join("b.php"),
        "<?php
class Viewer {
    public function get($holder) { return $holder->count + $this->count; }
}
",
    )
    .expect("write");

    let (result, _) = run(dir.path(), ObfuscateOptions::default());
    result.expect("run succeeds");

    let count = scrambled("count");
    let a = fs::read_to_string(dir.path().join("a.php")).expect("read");
    assert!(a.contains(&format!("$this->{count}")));

    let b = fs::read_to_string(dir.path().join("b.php")).expect("read");
    assert!(b.contains("->count"));
    assert!(!b.contains(&count));
}

#[test]
fn superglobals_and_self_reference_survive() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("session.php"),
        "<?php
function load($key) {
    return $_SESSION[$key] ?? $_POST[$key] ?? null;
}
",
    )
    .expect("write");

    let (result, _) = run(dir.path(), ObfuscateOptions::default());
    result.expect("run succeeds");

    let out = fs::read_to_string(dir.path().join("session.php")).expect("read");
    let key = scrambled("key");
    assert!(out.contains("$_SESSION"));
    assert!(out.contains("$_POST"));
    assert!(out.contains(&format!("${key}")));
    assert!(!out.contains("$key"));
}

#[test]
fn error_policy_ignore_skips_and_continues() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.php"), "<?php $ok = 1;").expect("write");
    fs::write(dir.path().join("b.php"), "<?php class {").expect("write");
    fs::write(dir.path().join("c.php"), "<?php $also = 2;").expect("write");
    let broken = fs::read_to_string(dir.path().join("b.php")).expect("read");

    let (result, events) = run(
        dir.path(),
        ObfuscateOptions {
            strip_whitespace: false,
            ignore_errors: true,
        },
    );
    let summary = result.expect("run succeeds overall");
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 1);

    // Three started events plus one error event for b.php.
    let errors: Vec<_> = events.iter().filter(|(_, msg)| msg.is_some()).collect();
    assert_eq!(events.len(), 4);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].0.ends_with("b.php"));

    // The failing file is left byte-identical.
    assert_eq!(
        fs::read_to_string(dir.path().join("b.php")).expect("read"),
        broken
    );
    // The other two were transformed.
    assert!(!fs::read_to_string(dir.path().join("a.php"))
        .expect("read")
        .contains("$ok"));
    assert!(!fs::read_to_string(dir.path().join("c.php"))
        .expect("read")
        .contains("$also"));
}

#[test]
fn error_policy_abort_stops_at_the_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.php"), "<?php $ok = 1;").expect("write");
    fs::write(dir.path().join("b.php"), "<?php class {").expect("write");
    fs::write(dir.path().join("c.php"), "<?php $also = 2;").expect("write");

    let (result, _) = run(
        dir.path(),
        ObfuscateOptions {
            strip_whitespace: false,
            ignore_errors: false,
        },
    );
    let err = result.expect_err("run aborts");
    match err {
        ObfuscateError::Parse { path, .. } => assert!(path.ends_with("b.php")),
        other => panic!("expected parse error, got {other}"),
    }

    // a.php was processed before the failure; c.php never was.
    assert!(!fs::read_to_string(dir.path().join("a.php"))
        .expect("read")
        .contains("$ok"));
    assert_eq!(
        fs::read_to_string(dir.path().join("c.php")).expect("read"),
        "<?php $also = 2;"
    );
}

#[test]
fn strip_whitespace_is_applied_as_a_post_step() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("app.php"),
        "<?php\n// entry point\nclass App {\n    private $state = 1;\n}\n",
    )
    .expect("write");

    let (result, _) = run(
        dir.path(),
        ObfuscateOptions {
            strip_whitespace: true,
            ignore_errors: false,
        },
    );
    result.expect("run succeeds");

    let out = fs::read_to_string(dir.path().join("app.php")).expect("read");
    assert!(!out.contains('\n'));
    assert!(!out.contains("//"));
    parse_program(&out).expect("stripped output parses");
}

#[test]
fn rerunning_on_obfuscated_output_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("stable.php"),
        "<?php
class Stable {
    private $state;
    private function step() { return $this->state; }
    public function run() { return $this->step(); }
}
",
    )
    .expect("write");

    let (first, _) = run(dir.path(), ObfuscateOptions::default());
    first.expect("first run succeeds");
    let after_first = fs::read_to_string(dir.path().join("stable.php")).expect("read");

    // Stability, not idempotence: the second run must succeed, and its
    // output must still parse.
    let (second, _) = run(dir.path(), ObfuscateOptions::default());
    second.expect("second run succeeds");
    let after_second = fs::read_to_string(dir.path().join("stable.php")).expect("read");
    parse_program(&after_second).expect("output parses");
    assert_ne!(after_first, after_second);
}

#[test]
fn non_matching_files_are_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("app.php"), "<?php $x = 1;").expect("write");
    fs::write(dir.path().join("README.md"), "# not php $x").expect("write");

    let (result, _) = run(dir.path(), ObfuscateOptions::default());
    result.expect("run succeeds");

    assert_eq!(
        fs::read_to_string(dir.path().join("README.md")).expect("read"),
        "# not php $x"
    );
}
