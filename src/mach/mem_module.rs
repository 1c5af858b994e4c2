use super::module::expect_args;
use super::{Arg, Machine, Module};
use crate::error;
use crate::mem::{Error, IntMemRef, Memory};

type Result<T> = std::result::Result<T, Error>;

/// ## Block operations on integer memory
///
/// Module type 1, id 11. Ranges are inclusive and walk fields of the
/// reference's own width, so an 8-bit range steps one byte at a time.

#[derive(Debug, Default)]
pub struct MemModule;

impl MemModule {
    pub const MODULE_TYPE: u8 = 1;
    pub const MODULE_ID: u8 = 11;

    pub fn new() -> MemModule {
        MemModule
    }
}

impl Module for MemModule {
    fn name(&self) -> &str {
        "Mem"
    }

    fn module_type(&self) -> u8 {
        MemModule::MODULE_TYPE
    }

    fn module_id(&self) -> u8 {
        MemModule::MODULE_ID
    }

    fn dispatch(
        &self,
        machine: &mut Machine,
        opcode: u16,
        overload: u8,
        args: &[Arg],
    ) -> Result<Option<i32>> {
        let memory = machine.memory_mut();
        match (opcode, overload) {
            (0, 0) => {
                expect_args(args, 2)?;
                let values = ints(memory, &args[1..])?;
                setarray(memory, args[0].int_ref()?, &values)?;
            }
            (1, 0) | (1, 1) => {
                expect_args(args, 2 + overload as usize)?;
                let value = match overload {
                    0 => 0,
                    _ => args[2].int(memory)?,
                };
                setrng(memory, args[0].int_ref()?, args[1].int_ref()?, value)?;
            }
            (2, 0) => {
                expect_args(args, 3)?;
                let count = count(args[2].int(memory)?)?;
                cpyrng(memory, args[0].int_ref()?, args[1].int_ref()?, count)?;
            }
            (3, 0) => {
                expect_args(args, 3)?;
                let step = args[1].int(memory)? as isize;
                let values = ints(memory, &args[2..])?;
                setarray_stepped(memory, args[0].int_ref()?, step, &values)?;
            }
            (4, 0) | (4, 1) => {
                expect_args(args, 3 + overload as usize)?;
                let step = args[1].int(memory)? as isize;
                let count = count(args[2].int(memory)?)?;
                let value = match overload {
                    0 => 0,
                    _ => args[3].int(memory)?,
                };
                setrng_stepped(memory, args[0].int_ref()?, step, count, value)?;
            }
            (6, 0) => {
                expect_args(args, 3)?;
                let offset = args[1].int(memory)? as isize;
                let refs = args[2..]
                    .iter()
                    .map(Arg::int_ref)
                    .collect::<Result<Vec<IntMemRef>>>()?;
                cpyvars(memory, args[0].int_ref()?, offset, &refs)?;
            }
            (100, 0) => {
                expect_args(args, 2)?;
                return Ok(Some(sum(memory, args[0].int_ref()?, args[1].int_ref()?)?));
            }
            (101, 0) => {
                expect_args(args, 2)?;
                if args.len() % 2 != 0 {
                    return Err(error!(TypeMismatch; "SUMS TAKES PAIRS"));
                }
                let ranges = args
                    .chunks(2)
                    .map(|pair| -> Result<(IntMemRef, IntMemRef)> {
                        Ok((pair[0].int_ref()?, pair[1].int_ref()?))
                    })
                    .collect::<Result<Vec<(IntMemRef, IntMemRef)>>>()?;
                return Ok(Some(sums(memory, &ranges)?));
            }
            _ => {
                return Err(error!(UnknownOpcode; &format!(
                    "Mem:{:05}, {}",
                    opcode, overload
                )))
            }
        }
        Ok(None)
    }
}

fn ints(memory: &Memory, args: &[Arg]) -> Result<Vec<i32>> {
    args.iter().map(|arg| arg.int(memory)).collect()
}

fn count(n: i32) -> Result<usize> {
    if n < 0 {
        Err(error!(IndexOutOfRange; &format!("NEGATIVE COUNT {}", n)))
    } else {
        Ok(n as usize)
    }
}

/// Number of fields in the inclusive range `first..=last`.
fn range_len(first: IntMemRef, last: IntMemRef) -> Result<usize> {
    if !first.same_field_kind(&last) {
        return Err(error!(InvalidBank; &format!("RANGE {} TO {}", first, last)));
    }
    if last.index() < first.index() {
        return Err(error!(IndexOutOfRange; &format!("RANGE {} TO {}", first, last)));
    }
    Ok(last.index() - first.index() + 1)
}

/// Writes `values` to consecutive fields starting at `origin`.
pub fn setarray(memory: &mut Memory, origin: IntMemRef, values: &[i32]) -> Result<()> {
    setarray_stepped(memory, origin, 1, values)
}

pub fn setrng(memory: &mut Memory, first: IntMemRef, last: IntMemRef, value: i32) -> Result<()> {
    let len = range_len(first, last)?;
    setrng_stepped(memory, first, 1, len, value)
}

/// Copies `count` fields. Overlapping ranges copy as if through a
/// temporary buffer.
pub fn cpyrng(memory: &mut Memory, source: IntMemRef, dest: IntMemRef, count: usize) -> Result<()> {
    check_span(source, 1, count)?;
    check_span(dest, 1, count)?;
    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        values.push(memory.int_value(&source.offset(i as isize)?)?);
    }
    setarray(memory, dest, &values)
}

pub fn setarray_stepped(
    memory: &mut Memory,
    origin: IntMemRef,
    step: isize,
    values: &[i32],
) -> Result<()> {
    check_span(origin, step, values.len())?;
    let mut at = origin;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            at = at.offset(step)?;
        }
        memory.set_int_value(&at, *value)?;
    }
    Ok(())
}

pub fn setrng_stepped(
    memory: &mut Memory,
    origin: IntMemRef,
    step: isize,
    count: usize,
    value: i32,
) -> Result<()> {
    check_span(origin, step, count)?;
    let mut at = origin;
    for i in 0..count {
        if i > 0 {
            at = at.offset(step)?;
        }
        memory.set_int_value(&at, value)?;
        if step == 0 {
            break;
        }
    }
    Ok(())
}

/// Fails unless all `count` fields visited from `origin` in steps of
/// `step` lie inside its bank. Nothing is written on failure.
fn check_span(origin: IntMemRef, step: isize, count: usize) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let last = origin.index() as i128 + step as i128 * (count as i128 - 1);
    if last < 0 || last >= origin.fields_in_bank() as i128 {
        return Err(error!(IndexOutOfRange; &format!(
            "{} FIELDS FROM {} STEP {}",
            count, origin, step
        )));
    }
    Ok(())
}

/// For each reference, copies the field `offset` past it into the next
/// field starting at `origin`.
pub fn cpyvars(
    memory: &mut Memory,
    origin: IntMemRef,
    offset: isize,
    refs: &[IntMemRef],
) -> Result<()> {
    let values = refs
        .iter()
        .map(|r| memory.int_value(&r.offset(offset)?))
        .collect::<Result<Vec<i32>>>()?;
    setarray(memory, origin, &values)
}

pub fn sum(memory: &Memory, first: IntMemRef, last: IntMemRef) -> Result<i32> {
    let len = range_len(first, last)?;
    let mut total: i32 = 0;
    for i in 0..len {
        total = total.wrapping_add(memory.int_value(&first.offset(i as isize)?)?);
    }
    Ok(total)
}

pub fn sums(memory: &Memory, ranges: &[(IntMemRef, IntMemRef)]) -> Result<i32> {
    let mut total: i32 = 0;
    for (first, last) in ranges {
        total = total.wrapping_add(sum(memory, *first, *last)?);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::{BitWidth, ErrorCode, IntBank};

    fn a(index: usize) -> IntMemRef {
        IntMemRef::new(IntBank::A, index)
    }

    fn words(memory: &Memory, range: std::ops::Range<usize>) -> Vec<i32> {
        range.map(|i| memory.int_value(&a(i)).unwrap()).collect()
    }

    #[test]
    fn test_setarray_and_setrng() {
        let mut memory = Memory::new();
        setarray(&mut memory, a(2), &[5, 6, 7]).unwrap();
        assert_eq!(words(&memory, 0..6), vec![0, 0, 5, 6, 7, 0]);
        setrng(&mut memory, a(3), a(4), 9).unwrap();
        assert_eq!(words(&memory, 0..6), vec![0, 0, 5, 9, 9, 0]);
        setrng(&mut memory, a(0), a(5), 0).unwrap();
        assert_eq!(words(&memory, 0..6), vec![0; 6]);
    }

    #[test]
    fn test_ranges_must_agree() {
        let mut memory = Memory::new();
        let b = IntMemRef::new(IntBank::B, 4);
        assert_eq!(setrng(&mut memory, a(0), b, 1).unwrap_err().code(), ErrorCode::InvalidBank);
        assert_eq!(
            setrng(&mut memory, a(4), a(0), 1).unwrap_err().code(),
            ErrorCode::IndexOutOfRange
        );
    }

    #[test]
    fn test_cpyrng_overlapping() {
        let mut memory = Memory::new();
        setarray(&mut memory, a(0), &[1, 2, 3, 4]).unwrap();
        cpyrng(&mut memory, a(0), a(1), 4).unwrap();
        assert_eq!(words(&memory, 0..5), vec![1, 1, 2, 3, 4]);
    }

    #[test]
    fn test_stepped() {
        let mut memory = Memory::new();
        setarray_stepped(&mut memory, a(0), 3, &[1, 2, 3]).unwrap();
        assert_eq!(words(&memory, 0..7), vec![1, 0, 0, 2, 0, 0, 3]);
        setrng_stepped(&mut memory, a(1), 2, 3, 8).unwrap();
        assert_eq!(words(&memory, 0..7), vec![1, 8, 0, 8, 0, 8, 3]);
    }

    #[test]
    fn test_huge_counts_fail_without_writing() {
        let mut memory = Memory::new();
        let huge = i32::max_value() as usize;
        let err = setrng_stepped(&mut memory, a(0), 1, huge, 1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::IndexOutOfRange);
        assert_eq!(words(&memory, 0..3), vec![0; 3]);
        let err = cpyrng(&mut memory, a(0), a(10), huge).unwrap_err();
        assert_eq!(err.code(), ErrorCode::IndexOutOfRange);
        assert_eq!(
            setarray_stepped(&mut memory, a(4), -3, &[1, 2, 3]).unwrap_err().code(),
            ErrorCode::IndexOutOfRange
        );
        assert_eq!(words(&memory, 0..5), vec![0; 5]);
    }

    #[test]
    fn test_zero_step_and_last_field() {
        let mut memory = Memory::new();
        setrng_stepped(&mut memory, a(3), 0, i32::max_value() as usize, 6).unwrap();
        assert_eq!(words(&memory, 2..5), vec![0, 6, 0]);
        let last_byte = IntMemRef::with_width(IntBank::A, BitWidth::Bits8, 4 * 2000 - 1);
        setrng_stepped(&mut memory, last_byte, -1, 4, 0xFF).unwrap();
        assert_eq!(memory.read_word('A', 1999).unwrap(), -1);
        assert!(cpyrng(&mut memory, a(1998), a(0), 3).is_err());
    }

    #[test]
    fn test_cpyvars() {
        let mut memory = Memory::new();
        setarray(&mut memory, a(10), &[10, 11, 12, 13]).unwrap();
        cpyvars(&mut memory, a(0), 1, &[a(10), a(12)]).unwrap();
        assert_eq!(words(&memory, 0..2), vec![11, 13]);
    }

    #[test]
    fn test_sum_over_bytes() {
        let mut memory = Memory::new();
        memory.write_word('A', 0, 0x0102_0304).unwrap();
        let first = IntMemRef::with_width(IntBank::A, BitWidth::Bits8, 0);
        let last = IntMemRef::with_width(IntBank::A, BitWidth::Bits8, 3);
        assert_eq!(sum(&memory, first, last).unwrap(), 10);
        setarray(&mut memory, a(1), &[5, 5]).unwrap();
        assert_eq!(sums(&memory, &[(first, last), (a(1), a(2))]).unwrap(), 20);
    }
}
