use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};

/// Read an optional value that a query string may send as `key=`.
///
/// Missing, null and empty (or blank) values all become `None`; anything
/// else is parsed with `FromStr`. Numbers are accepted too, so the same
/// field works for JSON bodies.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    struct EmptyAsNone<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for EmptyAsNone<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        type Value = Option<T>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, a number, or nothing")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> { Ok(None) }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> { Ok(None) }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(None);
            }
            v.parse::<T>().map(Some).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> { self.visit_str(&v.to_string()) }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> { self.visit_str(&v.to_string()) }
    }

    deserializer.deserialize_any(EmptyAsNone(PhantomData))
}
