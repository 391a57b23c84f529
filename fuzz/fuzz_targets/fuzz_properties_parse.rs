#![no_main]
use libfuzzer_sys::fuzz_target;
use loghive::Properties;

fuzz_target!(|data: &str| {
    // Must not panic on any input, valid or not
    let _ = Properties::parse(data);
    if let Ok(props) = Properties::from_toml(data) {
        for key in props.keys() {
            let _ = props.has_prefix(key);
        }
    }
});
