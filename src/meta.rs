use serde::{Serialize, Serializer};

/// Declarative description of a fixed-width numeric type.
#[derive(Debug, Serialize)]
pub struct TypeInfo<T> {
    pub name: &'static str,
    pub size: usize,
    pub align: usize,
    pub min: T,
    pub max: T,
    pub default: T,
}

pub static INT8: TypeInfo<i8> = TypeInfo {
    name: "i8",
    size: 1,
    align: 1,
    min: i8::MIN,
    max: i8::MAX,
    default: 0,
};

pub static INT16: TypeInfo<i16> = TypeInfo {
    name: "i16",
    size: 2,
    align: 2,
    min: i16::MIN,
    max: i16::MAX,
    default: 0,
};

pub static INT32: TypeInfo<i32> = TypeInfo {
    name: "i32",
    size: 4,
    align: 4,
    min: i32::MIN,
    max: i32::MAX,
    default: 0,
};

pub static INT64: TypeInfo<i64> = TypeInfo {
    name: "i64",
    size: 8,
    align: 8,
    min: i64::MIN,
    max: i64::MAX,
    default: 0,
};

pub static UINT8: TypeInfo<u8> = TypeInfo {
    name: "u8",
    size: 1,
    align: 1,
    min: 0,
    max: u8::MAX,
    default: 0,
};

pub static UINT16: TypeInfo<u16> = TypeInfo {
    name: "u16",
    size: 2,
    align: 2,
    min: 0,
    max: u16::MAX,
    default: 0,
};

pub static UINT32: TypeInfo<u32> = TypeInfo {
    name: "u32",
    size: 4,
    align: 4,
    min: 0,
    max: u32::MAX,
    default: 0,
};

pub static UINT64: TypeInfo<u64> = TypeInfo {
    name: "u64",
    size: 8,
    align: 8,
    min: 0,
    max: u64::MAX,
    default: 0,
};

pub static FLOAT32: TypeInfo<f32> = TypeInfo {
    name: "f32",
    size: 4,
    align: 4,
    min: -f32::MAX,
    max: f32::MAX,
    default: 0.0,
};

pub static FLOAT64: TypeInfo<f64> = TypeInfo {
    name: "f64",
    size: 8,
    align: 8,
    min: -f64::MAX,
    max: f64::MAX,
    default: 0.0,
};

/// One of the descriptors above. Serializes as the full descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NumericType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl NumericType {
    pub fn name(self) -> &'static str {
        match self {
            NumericType::I8 => INT8.name,
            NumericType::I16 => INT16.name,
            NumericType::I32 => INT32.name,
            NumericType::I64 => INT64.name,
            NumericType::U8 => UINT8.name,
            NumericType::U16 => UINT16.name,
            NumericType::U32 => UINT32.name,
            NumericType::U64 => UINT64.name,
            NumericType::F32 => FLOAT32.name,
            NumericType::F64 => FLOAT64.name,
        }
    }

    pub fn size(self) -> usize {
        match self {
            NumericType::I8 => INT8.size,
            NumericType::I16 => INT16.size,
            NumericType::I32 => INT32.size,
            NumericType::I64 => INT64.size,
            NumericType::U8 => UINT8.size,
            NumericType::U16 => UINT16.size,
            NumericType::U32 => UINT32.size,
            NumericType::U64 => UINT64.size,
            NumericType::F32 => FLOAT32.size,
            NumericType::F64 => FLOAT64.size,
        }
    }

    pub fn align(self) -> usize {
        match self {
            NumericType::I8 => INT8.align,
            NumericType::I16 => INT16.align,
            NumericType::I32 => INT32.align,
            NumericType::I64 => INT64.align,
            NumericType::U8 => UINT8.align,
            NumericType::U16 => UINT16.align,
            NumericType::U32 => UINT32.align,
            NumericType::U64 => UINT64.align,
            NumericType::F32 => FLOAT32.align,
            NumericType::F64 => FLOAT64.align,
        }
    }
}

impl Serialize for NumericType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NumericType::I8 => INT8.serialize(serializer),
            NumericType::I16 => INT16.serialize(serializer),
            NumericType::I32 => INT32.serialize(serializer),
            NumericType::I64 => INT64.serialize(serializer),
            NumericType::U8 => UINT8.serialize(serializer),
            NumericType::U16 => UINT16.serialize(serializer),
            NumericType::U32 => UINT32.serialize(serializer),
            NumericType::U64 => UINT64.serialize(serializer),
            NumericType::F32 => FLOAT32.serialize(serializer),
            NumericType::F64 => FLOAT64.serialize(serializer),
        }
    }
}

/// Returns the narrowest signed integer type able to hold `value`. Values
/// outside of every range fall back to the widest one.
pub fn infer_int(value: i128) -> NumericType {
    let fits = |min: i64, max: i64| i128::from(min) <= value && value <= i128::from(max);
    if fits(INT8.min.into(), INT8.max.into()) {
        NumericType::I8
    } else if fits(INT16.min.into(), INT16.max.into()) {
        NumericType::I16
    } else if fits(INT32.min.into(), INT32.max.into()) {
        NumericType::I32
    } else {
        NumericType::I64
    }
}

/// Returns `f32` if the magnitude of `value` fits it, `f64` otherwise.
pub fn infer_float(value: f64) -> NumericType {
    if value.abs() <= f64::from(FLOAT32.max) {
        NumericType::F32
    } else {
        NumericType::F64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_infer_int_boundaries() {
        let cases = [
            (0, NumericType::I8),
            (127, NumericType::I8),
            (-128, NumericType::I8),
            (128, NumericType::I16),
            (-129, NumericType::I16),
            (32_767, NumericType::I16),
            (32_768, NumericType::I32),
            (2_147_483_647, NumericType::I32),
            (2_147_483_648, NumericType::I64),
            (i128::from(i64::MAX), NumericType::I64),
            (i128::from(u64::MAX), NumericType::I64),
        ];
        for (value, expected) in cases {
            assert_eq!(infer_int(value), expected, "{value}");
        }
    }

    #[test]
    fn test_infer_float() {
        assert_eq!(infer_float(1.5), NumericType::F32);
        assert_eq!(infer_float(-1.5e30), NumericType::F32);
        assert_eq!(infer_float(f64::from(f32::MAX)), NumericType::F32);
        assert_eq!(infer_float(1e39), NumericType::F64);
        assert_eq!(infer_float(-1e300), NumericType::F64);
    }

    #[test]
    fn test_every_sized_type_has_a_descriptor() {
        use NumericType::*;
        let descriptors = [I8, I16, I32, I64, U8, U16, U32, U64, F32, F64];
        for ty in descriptors {
            assert!(crate::token::TYPE_NAMES.contains(ty.name()), "{ty:?}");
        }
        let sized = crate::token::TYPE_NAMES
            .iter()
            .filter(|name| !matches!(**name, "str" | "bool" | "void"))
            .count();
        assert_eq!(sized, descriptors.len());
        assert_eq!(U64.size(), 8);
    }

    #[test]
    fn test_unsigned_descriptor_serializes_in_full() {
        let json = serde_json::to_value(NumericType::U16).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "u16",
                "size": 2,
                "align": 2,
                "min": 0,
                "max": 65535,
                "default": 0,
            })
        );
    }

    #[test]
    fn test_descriptor_layout() {
        assert_eq!(NumericType::I32.name(), "i32");
        assert_eq!(NumericType::I32.size(), 4);
        assert_eq!(NumericType::F64.align(), 8);
    }

    #[test]
    fn test_descriptor_serializes_in_full() {
        let json = serde_json::to_value(NumericType::I16).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "i16",
                "size": 2,
                "align": 2,
                "min": -32768,
                "max": 32767,
                "default": 0,
            })
        );
    }
}
