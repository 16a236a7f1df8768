//! Deserialize a tree whose leaves are text, like the ones XML documents produce.
//!
//! Scalars are parsed against the type the target asks for, not the type they
//! were decoded as. A lone value is accepted where a sequence is expected, since
//! an element that appears once can't be told apart from a list of one.
use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::Deserializer;
use serde_json::{Value as Json, map};

use crate::field::parse_bool;

pub(super) struct TextTree(pub(super) Json);

impl TextTree {
    /// Empty text, what `<tag/>` decodes to.
    fn is_empty_text(&self) -> bool {
        matches!(&self.0, Json::String(text) if text.is_empty())
    }
}

macro_rules! parse_text {
    ($trait_fn:ident, $visit_fn:ident, $ty:ty) => {
        fn $trait_fn<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            match self.0 {
                Json::String(text) => {
                    let parsed: $ty = text.trim().parse().map_err(|_| {
                        <Self::Error as de::Error>::invalid_value(
                            de::Unexpected::Str(&text),
                            &visitor,
                        )
                    })?;
                    visitor.$visit_fn(parsed)
                }
                other => other.$trait_fn(visitor),
            }
        }
    };
}

macro_rules! delegate {
    ($($trait_fn:ident),* $(,)?) => {
        $(
            fn $trait_fn<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                self.0.$trait_fn(visitor)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for TextTree {
    type Error = serde_json::Error;

    parse_text!(deserialize_i8, visit_i8, i8);
    parse_text!(deserialize_i16, visit_i16, i16);
    parse_text!(deserialize_i32, visit_i32, i32);
    parse_text!(deserialize_i64, visit_i64, i64);
    parse_text!(deserialize_i128, visit_i128, i128);
    parse_text!(deserialize_u8, visit_u8, u8);
    parse_text!(deserialize_u16, visit_u16, u16);
    parse_text!(deserialize_u32, visit_u32, u32);
    parse_text!(deserialize_u64, visit_u64, u64);
    parse_text!(deserialize_u128, visit_u128, u128);
    parse_text!(deserialize_f32, visit_f32, f32);
    parse_text!(deserialize_f64, visit_f64, f64);

    delegate!(
        deserialize_char,
        deserialize_bytes,
        deserialize_byte_buf,
        deserialize_unit,
        deserialize_identifier,
        deserialize_ignored_any,
    );

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Json::Array(items) => visitor.visit_seq(Items(items.into_iter())),
            Json::Object(entries) => visitor.visit_map(Entries {
                entries: entries.into_iter(),
                value: None,
            }),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Json::String(text) => match parse_bool(text.trim()) {
                Some(b) => visitor.visit_bool(b),
                None => Err(de::Error::invalid_value(
                    de::Unexpected::Str(&text),
                    &visitor,
                )),
            },
            other => other.deserialize_bool(visitor),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Json::Number(n) => visitor.visit_string(n.to_string()),
            Json::Bool(b) => visitor.visit_string(b.to_string()),
            other => other.deserialize_string(visitor),
        }
    }

    /// Empty text is `None`.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.0.is_null() || self.is_empty_text() {
            return visitor.visit_none();
        }
        visitor.visit_some(self)
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.is_empty_text() {
            return visitor.visit_seq(Items(Vec::new().into_iter()));
        }
        match self.0 {
            Json::Array(items) => visitor.visit_seq(Items(items.into_iter())),
            Json::Null => Json::Null.deserialize_seq(visitor),
            single => visitor.visit_seq(Items(vec![single].into_iter())),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    /// Empty text is an empty map.
    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.is_empty_text() {
            return visitor.visit_map(Entries {
                entries: map::Map::new().into_iter(),
                value: None,
            });
        }
        match self.0 {
            Json::Object(entries) => visitor.visit_map(Entries {
                entries: entries.into_iter(),
                value: None,
            }),
            other => other.deserialize_map(visitor),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.0.deserialize_enum(name, variants, visitor)
    }
}

struct Items(std::vec::IntoIter<Json>);

impl<'de> SeqAccess<'de> for Items {
    type Error = serde_json::Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        self.0
            .next()
            .map(|item| seed.deserialize(TextTree(item)))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

struct Entries {
    entries: map::IntoIter,
    value: Option<Json>,
}

impl<'de> MapAccess<'de> for Entries {
    type Error = serde_json::Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(Json::String(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(TextTree(value)),
            None => Err(de::Error::custom("value is missing")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}
