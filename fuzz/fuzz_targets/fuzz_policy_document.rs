//! Fuzz target for policy document parsing.
//!
//! Goal: reading a document (package line, `# METADATA` block, Rego syntax) should **never
//! panic**. A parse error is the expected outcome for most inputs.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_policy_document
//! ```

#![no_main]

use arbitrary::Arbitrary;
use iacguard_types::DocPath;
use libfuzzer_sys::fuzz_target;

/// Structured input so libFuzzer reaches the annotation parser more often.
#[derive(Arbitrary, Debug)]
struct DocumentInput {
    annotation: Vec<String>,
    package: String,
    body: String,
}

fuzz_target!(|input: DocumentInput| {
    if input.annotation.len() > 40 || input.body.len() > 16 * 1024 {
        return;
    }

    let mut source = String::from("# METADATA\n");
    for line in &input.annotation {
        source.push_str("# ");
        source.push_str(line);
        source.push('\n');
    }
    source.push_str("package ");
    source.push_str(&input.package);
    source.push('\n');
    source.push_str(&input.body);

    let path = DocPath::new("fuzz/document.rego");
    let _ = iacguard_rego::parse_module(&path, source.into_bytes());
});
