#![no_main]
use boxdata::DecodeOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let opts = DecodeOptions {
        structure_cache: false,
        ..Default::default()
    };
    let _ = boxdata::decode_with(data, &opts);
});
