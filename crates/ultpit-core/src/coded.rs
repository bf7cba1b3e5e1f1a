//! Enums read either by name or by the integer code of older parameter files.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, Unexpected, Visitor};

/// An enum with snake_case names and 1-based integer codes.
pub trait Coded: Sized {
    /// Description used in error messages.
    const EXPECTING: &'static str;

    fn from_code(code: u64) -> Option<Self>;

    fn from_name(name: &str) -> Option<Self>;
}

/// Deserializes `T` from a string name or an integer code.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Coded,
{
    deserializer.deserialize_any(CodedVisitor(PhantomData))
}

struct CodedVisitor<T>(PhantomData<T>);

impl<'de, T: Coded> Visitor<'de> for CodedVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(T::EXPECTING)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        T::from_name(v).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        T::from_code(v).ok_or_else(|| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        match u64::try_from(v) {
            Ok(code) => self.visit_u64(code),
            Err(_) => Err(E::invalid_value(Unexpected::Signed(v), &self)),
        }
    }
}
