//! 256-bit machine word and the arithmetic the interpreter needs on top of
//! `primitive_types::U256`.
//!
//! Unsigned operations wrap modulo 2^256. Signed operations use the two's
//! complement view of the same bits.

use crate::error::PrimitiveError;
use primitive_types::{U256, U512};

/// 256-bit stack/memory value
pub type Word = U256;

/// Parse a word from a hex (`0x` prefixed) or decimal string
pub fn parse_word(s: &str) -> Result<Word, PrimitiveError> {
    let s = s.trim();
    match s.strip_prefix("0x") {
        Some(hex) if hex.is_empty() => Ok(Word::zero()),
        Some(hex) => {
            Word::from_str_radix(hex, 16).map_err(|_| PrimitiveError::Word(s.to_string()))
        }
        None => Word::from_dec_str(s).map_err(|_| PrimitiveError::Word(s.to_string())),
    }
}

/// Convert to usize if the value fits
pub fn to_usize(value: Word) -> Option<usize> {
    if value > Word::from(usize::MAX) {
        return None;
    }
    Some(value.low_u64() as usize)
}

/// Convert to u64 if the value fits
pub fn to_u64(value: Word) -> Option<u64> {
    if value.bits() > 64 {
        return None;
    }
    Some(value.low_u64())
}

/// Bool as 0/1
pub fn from_bool(b: bool) -> Word {
    if b {
        Word::one()
    } else {
        Word::zero()
    }
}

/// Big-endian 32-byte encoding
pub fn to_bytes(value: Word) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

fn is_negative(v: &Word) -> bool {
    v.bit(255)
}

fn twos_complement(v: Word) -> Word {
    (!v).overflowing_add(Word::one()).0
}

fn low_256(v: U512) -> Word {
    U256([v.0[0], v.0[1], v.0[2], v.0[3]])
}

/// Division, 0 when dividing by zero
pub fn div(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    a / b
}

/// Remainder, 0 when dividing by zero
pub fn rem(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    a % b
}

/// Signed division (two's complement)
pub fn sdiv(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    let a_neg = is_negative(&a);
    let b_neg = is_negative(&b);
    let abs_a = if a_neg { twos_complement(a) } else { a };
    let abs_b = if b_neg { twos_complement(b) } else { b };
    let result = abs_a / abs_b;
    if a_neg != b_neg {
        twos_complement(result)
    } else {
        result
    }
}

/// Signed remainder, sign follows the dividend
pub fn smod(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    let a_neg = is_negative(&a);
    let abs_a = if a_neg { twos_complement(a) } else { a };
    let abs_b = if is_negative(&b) { twos_complement(b) } else { b };
    let result = abs_a % abs_b;
    if a_neg {
        twos_complement(result)
    } else {
        result
    }
}

/// (a + b) mod n without intermediate overflow; 0 when n is zero
pub fn addmod(a: Word, b: Word, n: Word) -> Word {
    if n.is_zero() {
        return Word::zero();
    }
    low_256((U512::from(a) + U512::from(b)) % U512::from(n))
}

/// (a * b) mod n without intermediate overflow; 0 when n is zero
pub fn mulmod(a: Word, b: Word, n: Word) -> Word {
    if n.is_zero() {
        return Word::zero();
    }
    low_256(a.full_mul(b) % U512::from(n))
}

/// base^exp mod 2^256, with the overflow flag
pub fn overflowing_exp(base: Word, exp: Word) -> (Word, bool) {
    base.overflowing_pow(exp)
}

/// Extend the sign of the (b+1)-byte value in x
pub fn signextend(b: Word, x: Word) -> Word {
    if b >= Word::from(31u64) {
        return x;
    }
    let bit = b.low_u64() as usize * 8 + 7;
    let mask = (Word::one() << bit) - Word::one();
    if x.bit(bit) {
        x | !mask
    } else {
        x & mask
    }
}

/// The i-th byte of x counting from the most significant end
pub fn byte(i: Word, x: Word) -> Word {
    if i >= Word::from(32u64) {
        return Word::zero();
    }
    Word::from(x.byte(31 - i.low_u64() as usize))
}

/// Logical shift left
pub fn shl(shift: Word, value: Word) -> Word {
    if shift >= Word::from(256u64) {
        return Word::zero();
    }
    value << shift.low_u64() as usize
}

/// Logical shift right
pub fn shr(shift: Word, value: Word) -> Word {
    if shift >= Word::from(256u64) {
        return Word::zero();
    }
    value >> shift.low_u64() as usize
}

/// Arithmetic shift right
pub fn sar(shift: Word, value: Word) -> Word {
    let negative = is_negative(&value);
    if shift >= Word::from(256u64) {
        return if negative { Word::MAX } else { Word::zero() };
    }
    let s = shift.low_u64() as usize;
    if s == 0 {
        return value;
    }
    let shifted = value >> s;
    if negative {
        shifted | (Word::MAX << (256 - s))
    } else {
        shifted
    }
}

/// Signed less-than
pub fn slt(a: Word, b: Word) -> bool {
    match (is_negative(&a), is_negative(&b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

/// Signed greater-than
pub fn sgt(a: Word, b: Word) -> bool {
    slt(b, a)
}
