//! Host-layout value structures and the set of fixed-width host types.
//!
//! Every structure here is `#[repr(C)]` without padding so the driver can write it
//! straight into a caller variable through its byte view, and a dynamic record can
//! read it back out of an owned buffer with `FromBytes::read_from_prefix`.

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::constant::CDataType;

/// Fixed-width host type that can be bound to, or read from, a column.
///
/// `C_TYPE` is both the type a static record binds the variable as and the type a
/// dynamic record accessor requests.
pub trait CValue: FromBytes + IntoBytes + Immutable + Copy + 'static {
    const C_TYPE: CDataType;
}

macro_rules! impl_c_value {
    ($($t:ty => $c:ident),+ $(,)?) => {
        $(
            impl CValue for $t {
                const C_TYPE: CDataType = CDataType::$c;
            }
        )+
    };
}

impl_c_value!(
    u8 => UTINYINT,
    i8 => TINYINT,
    i16 => SHORT,
    u16 => USHORT,
    i32 => LONG,
    u32 => ULONG,
    i64 => SBIGINT,
    u64 => UBIGINT,
    f32 => FLOAT,
    f64 => DOUBLE,
    DateStruct => DATE,
    TimeStruct => TIME,
    TimestampStruct => TIMESTAMP,
    NumericStruct => NUMERIC,
    Guid => GUID,
);

// ============================================================================
// Temporal Types
// ============================================================================

/// DATE - 6 bytes
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct DateStruct {
    pub year: i16,
    pub month: u16,
    pub day: u16,
}

impl DateStruct {
    pub fn new(year: i16, month: u16, day: u16) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for DateStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// TIME - 6 bytes
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct TimeStruct {
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl TimeStruct {
    pub fn new(hour: u16, minute: u16, second: u16) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }
}

impl fmt::Display for TimeStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// TIMESTAMP - 16 bytes, `fraction` is in nanoseconds
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct TimestampStruct {
    pub year: i16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub fraction: u32,
}

impl TimestampStruct {
    pub fn date(&self) -> DateStruct {
        DateStruct::new(self.year, self.month, self.day)
    }

    pub fn time(&self) -> TimeStruct {
        TimeStruct::new(self.hour, self.minute, self.second)
    }
}

impl From<DateStruct> for TimestampStruct {
    fn from(date: DateStruct) -> Self {
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
            ..Default::default()
        }
    }
}

impl fmt::Display for TimestampStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date(), self.time())?;
        if self.fraction != 0 {
            write!(f, ".{:09}", self.fraction)?;
        }
        Ok(())
    }
}

// ============================================================================
// Fixed-point and GUID
// ============================================================================

/// NUMERIC - 19 bytes
///
/// `val` is the little-endian magnitude of the unscaled value; `sign` is 1 for
/// positive and 0 for negative.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct NumericStruct {
    pub precision: u8,
    pub scale: i8,
    pub sign: u8,
    pub val: [u8; 16],
}

impl NumericStruct {
    /// Build from an unscaled integer, e.g. `new(-12345, 7, 2)` is `-123.45`.
    pub fn new(unscaled: i128, precision: u8, scale: i8) -> Self {
        Self {
            precision,
            scale,
            sign: u8::from(unscaled >= 0),
            val: unscaled.unsigned_abs().to_le_bytes(),
        }
    }

    /// The signed unscaled value; `None` when the magnitude does not fit an `i128`.
    pub fn unscaled(&self) -> Option<i128> {
        let magnitude = self.magnitude();
        if self.sign == 0 {
            0i128.checked_sub_unsigned(magnitude)
        } else {
            i128::try_from(magnitude).ok()
        }
    }

    fn magnitude(&self) -> u128 {
        u128::from_le_bytes(self.val)
    }
}

impl fmt::Display for NumericStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.magnitude();
        let sign = if self.sign == 0 && magnitude != 0 { "-" } else { "" };
        let digits = magnitude.to_string();
        if self.scale <= 0 {
            let zeros = if magnitude == 0 { 0 } else { usize::from(self.scale.unsigned_abs()) };
            return write!(f, "{sign}{digits}{}", "0".repeat(zeros));
        }
        let scale = self.scale as usize;
        let digits = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

/// GUID - 16 bytes
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-",
            self.data1, self.data2, self.data3, self.data4[0], self.data4[1]
        )?;
        for byte in &self.data4[2..] {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
