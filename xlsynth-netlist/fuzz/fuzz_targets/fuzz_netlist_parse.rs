// SPDX-License-Identifier: Apache-2.0

//! Feeds arbitrary text to the parser: it must return a netlist or an error,
//! never panic, and a successful parse must be reproducible.

#![no_main]

use libfuzzer_sys::fuzz_target;

use xlsynth_netlist::cell_library::fake_cell_library;
use xlsynth_netlist::netlist::parse::parse_netlist_str;

fuzz_target!(|data: &[u8]| {
    let _ = env_logger::builder().is_test(true).try_init();
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let library = fake_cell_library();
    if let Ok(first) = parse_netlist_str(&library, text) {
        let second = parse_netlist_str(&library, text).expect("second parse should succeed");
        assert_eq!(first, second);
    }
});
