#![no_main]

use folio::{Processor, ProcessorOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let options = ProcessorOptions::new()
            .author_id("XYZ")
            .file("cat.png", "http://host/cat.png")
            .file("clip.mp4", "http://host/clip.mp4");
        if let Ok(processor) = Processor::new(options) {
            let _ = processor.process(s);
        }
    }
});
