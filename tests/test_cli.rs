// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use sinumerik::cli::init_tracing;

#[test]
fn test_init_tracing_once() {
    assert!(init_tracing().is_ok());
    // a second subscriber is refused instead of panicking
    assert!(init_tracing().is_err());
}
