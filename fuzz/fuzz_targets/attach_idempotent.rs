#![no_main]

use folio::transforms::AttachAttributes;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(result) = folio::markdown::parse(s)
    {
        let mut once = result.value.content;
        AttachAttributes::apply(&mut once);

        // A second run must not find anything new to attach
        let mut twice = once.clone();
        AttachAttributes::apply(&mut twice);
        assert_eq!(once, twice, "attribute attachment is not idempotent");
    }
});
