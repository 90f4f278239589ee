//! Comparison and bitwise logic: LT, GT, SLT, SGT, EQ, ISZERO, AND, OR, XOR,
//! NOT, BYTE, SHL, SHR, SAR

use crate::error::EvmResult;
use crate::interpreter::{Control, Interpreter};
use flow_primitives::{word, Word};

impl Interpreter {
    fn compare(&mut self, f: impl FnOnce(Word, Word) -> bool) -> EvmResult<Control> {
        let [(a, la), (b, lb)] = self.stack.popn()?;
        self.stack.push(word::from_bool(f(a, b)), la | lb)?;
        Ok(Control::Continue)
    }

    fn bitwise(&mut self, f: impl FnOnce(Word, Word) -> Word) -> EvmResult<Control> {
        let [(a, la), (b, lb)] = self.stack.popn()?;
        self.stack.push(f(a, b), la | lb)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_lt(&mut self) -> EvmResult<Control> {
        self.compare(|a, b| a < b)
    }

    pub(super) fn op_gt(&mut self) -> EvmResult<Control> {
        self.compare(|a, b| a > b)
    }

    pub(super) fn op_slt(&mut self) -> EvmResult<Control> {
        self.compare(word::slt)
    }

    pub(super) fn op_sgt(&mut self) -> EvmResult<Control> {
        self.compare(word::sgt)
    }

    pub(super) fn op_eq(&mut self) -> EvmResult<Control> {
        self.compare(|a, b| a == b)
    }

    pub(super) fn op_iszero(&mut self) -> EvmResult<Control> {
        let (a, label) = self.stack.pop()?;
        self.stack.push(word::from_bool(a.is_zero()), label)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_and(&mut self) -> EvmResult<Control> {
        self.bitwise(|a, b| a & b)
    }

    pub(super) fn op_or(&mut self) -> EvmResult<Control> {
        self.bitwise(|a, b| a | b)
    }

    pub(super) fn op_xor(&mut self) -> EvmResult<Control> {
        self.bitwise(|a, b| a ^ b)
    }

    pub(super) fn op_not(&mut self) -> EvmResult<Control> {
        let (a, label) = self.stack.pop()?;
        self.stack.push(!a, label)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_byte(&mut self) -> EvmResult<Control> {
        self.bitwise(word::byte)
    }

    pub(super) fn op_shl(&mut self) -> EvmResult<Control> {
        self.bitwise(word::shl)
    }

    pub(super) fn op_shr(&mut self) -> EvmResult<Control> {
        self.bitwise(word::shr)
    }

    pub(super) fn op_sar(&mut self) -> EvmResult<Control> {
        self.bitwise(word::sar)
    }
}

#[cfg(test)]
mod tests {
    use crate::instructions::testing::{p, top, w};
    use flow_primitives::{TaintLabel, Word};

    const LT: u8 = 0x10;
    const SLT: u8 = 0x12;
    const EQ: u8 = 0x14;
    const ISZERO: u8 = 0x15;
    const AND: u8 = 0x16;
    const XOR: u8 = 0x18;
    const NOT: u8 = 0x19;
    const BYTE: u8 = 0x1a;
    const SHL: u8 = 0x1b;
    const SAR: u8 = 0x1d;

    #[test]
    fn test_comparison_joins_labels() {
        // 1 < 2
        let (value, label) = top(&[LT], &[(w(2), p(1)), (w(1), p(0))]);
        assert_eq!(value, w(1));
        assert_eq!(label, p(0) | p(1));

        let (value, label) = top(&[EQ], &[(w(5), TaintLabel::VALUE), (w(6), TaintLabel::SAFE)]);
        assert_eq!(value, w(0));
        assert_eq!(label, TaintLabel::VALUE);
    }

    #[test]
    fn test_signed_comparison() {
        // -1 < 0
        let (value, _) = top(&[SLT], &[(w(0), TaintLabel::SAFE), (Word::MAX, TaintLabel::SAFE)]);
        assert_eq!(value, w(1));
    }

    #[test]
    fn test_unary_ops_pass_label_through() {
        let (value, label) = top(&[ISZERO], &[(w(0), p(4))]);
        assert_eq!(value, w(1));
        assert_eq!(label, p(4));

        let (value, label) = top(&[NOT], &[(w(0), p(5))]);
        assert_eq!(value, Word::MAX);
        assert_eq!(label, p(5));
    }

    #[test]
    fn test_bitwise() {
        let (value, label) = top(&[AND], &[(w(0b1100), p(0)), (w(0b1010), TaintLabel::SAFE)]);
        assert_eq!(value, w(0b1000));
        assert_eq!(label, p(0));

        let (value, _) = top(&[XOR], &[(w(0b1100), TaintLabel::SAFE), (w(0b1010), TaintLabel::SAFE)]);
        assert_eq!(value, w(0b0110));
    }

    #[test]
    fn test_byte_and_shifts() {
        // BYTE 31 of 0xab
        let (value, label) = top(&[BYTE], &[(w(0xab), p(1)), (w(31), p(0))]);
        assert_eq!(value, w(0xab));
        assert_eq!(label, p(0) | p(1));

        // 1 << 4
        let (value, _) = top(&[SHL], &[(w(1), TaintLabel::SAFE), (w(4), TaintLabel::SAFE)]);
        assert_eq!(value, w(16));

        let (value, label) = top(&[SAR], &[(Word::MAX, p(2)), (w(300), TaintLabel::SAFE)]);
        assert_eq!(value, Word::MAX);
        assert_eq!(label, p(2));
    }
}
