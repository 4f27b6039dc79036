#![no_main]
use libfuzzer_sys::fuzz_target;

extern crate brace;

use brace::{context, Partials};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = String::from_utf8(data.to_vec()) {
        let partials: Partials = vec![("p", "{{#each xs}}{{this}}{{/each}}")]
            .into_iter()
            .collect();
        let ctx = context! { xs => &vec![1, 2], flag => &true };
        let _ = brace::render(&s, &ctx, &partials);
    }
});
