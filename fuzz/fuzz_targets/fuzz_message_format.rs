#![no_main]
use libfuzzer_sys::fuzz_target;
use loghive::fmt::message::substitute;
use loghive::fmt::{FormatTemplate, FormatValues};

fuzz_target!(|data: &str| {
    let params = vec!["p0".to_string(), "p1".to_string()];
    let _ = substitute(data, &params);

    let template = FormatTemplate::parse(data);
    let values = FormatValues::new().level("INFO").logger("fuzz").msg(data);
    let _ = template.render(&values);
});
