// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.


/// Helper for converting a floating number without fractional part to an
/// integer, or a suitable error.
pub fn num_to_int<T>(inp: f64, err: impl FnOnce(f64) -> T) -> Result<i64, T> {
    if inp.is_finite() && inp.fract() == 0.0 && inp.abs() < i64::MAX as f64 {
        Ok(inp as i64)
    } else {
        Err(err(inp))
    }
}

/// Integer operand of the bitwise and integer-division operators: the value
/// truncated toward zero.
#[cfg(feature = "process")]
pub fn truncate(inp: f64) -> i64 {
    inp.trunc() as i64
}
