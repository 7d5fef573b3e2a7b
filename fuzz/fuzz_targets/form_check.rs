//! Fuzz target for urlencoded bodies and uploaded files.
//!
//! Decodes an arbitrary body, attaches an arbitrary upload and runs a
//! checker covering every built-in value and file rule.

#![no_main]

use arbitrary::Arbitrary;
use formcheck_validation::{Checker, FileHandle, Form, RuleParser, detect_content_type};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzForm {
    /// Raw request body
    body: Vec<u8>,
    /// Uploaded file content
    upload: Vec<u8>,
}

const RULES: &[(&str, &str)] = &[
    ("name", "required,alpha,rangelen:1:32"),
    ("email", "email"),
    ("age", "integer,range:0:150"),
    ("score", "number,min:0,max:10"),
    ("lat", "latitude"),
    ("lng", "longitude"),
    ("phone", "phone"),
    ("site", "url"),
    ("confirm", "same:name"),
    ("upload", "required,image,rangefilesize:1:4096"),
    ("doc", "filetype:application/pdf:text/plain"),
];

fuzz_target!(|data: FuzzForm| {
    let _ = detect_content_type(&data.upload);

    let Ok(mut form) = Form::from_urlencoded(&data.body) else {
        return;
    };
    form.add_file("upload", FileHandle::from_bytes("upload.bin", data.upload.clone()));

    let checker = match Checker::from_rule_strings(RULES.iter().copied(), &RuleParser::new()) {
        Ok(checker) => checker,
        Err(err) => panic!("built-in rules must parse: {err}"),
    };

    let Ok(errors) = checker.check(&form) else {
        panic!("check without a store failed");
    };
    let _ = errors.to_json();

    // File rules must leave the upload readable from the start
    let files = form.files("upload");
    let last = files.last().map(|file| file.read_all().ok());
    assert_eq!(last, Some(Some(data.upload)));
});
