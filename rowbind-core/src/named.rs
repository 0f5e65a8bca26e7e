use crate::{Args, Dialect, Error, Record, Result, Value, consume_while};
use std::collections::{BTreeMap, HashMap};

fn is_word(c: &char) -> bool {
    c.is_ascii_alphanumeric() || *c == '_'
}

/// Replaces every `<marker>word` token of `query` with the output of `replace`.
///
/// `replace` receives the word and writes the substitution, returning `false`
/// to keep the token as it was.
fn replace_tokens(
    query: &str,
    marker: char,
    mut replace: impl FnMut(&mut String, &str) -> bool,
) -> String {
    let mut out = String::with_capacity(query.len() + 16);
    let mut input = query;
    while let Some(position) = input.find(marker) {
        out.push_str(&input[..position]);
        input = &input[position + marker.len_utf8()..];
        let word = consume_while(&mut input, is_word);
        if word.is_empty() || !replace(&mut out, word) {
            out.push(marker);
            out.push_str(word);
        }
    }
    out.push_str(input);
    out
}

fn lookup(args: Args, key: &str) -> Option<Value> {
    match args {
        Args::Positional(..) => None,
        Args::Map(map) => map.get(key).cloned(),
        Args::Ordered(map) => map.get(key).cloned(),
        Args::Record(record) => record.get_field(key),
    }
}

/// Expands `:name` placeholders when the arguments are a map or a record.
///
/// Tokens are replaced left to right with the dialect bind variable of an
/// increasing index and the value is appended to the returned arguments.
/// Names without a value stay in the query verbatim. Positional arguments are
/// returned untouched.
pub fn expand_named_query(dialect: &dyn Dialect, query: &str, args: Args) -> (String, Vec<Value>) {
    if let Args::Positional(values) = args {
        return (query.to_string(), values.to_vec());
    }
    let mut values = Vec::new();
    let query = replace_tokens(query, ':', |out, key| match lookup(args, key) {
        Some(value) => {
            dialect.write_bind_var(out, values.len());
            values.push(value);
            true
        }
        None => false,
    });
    (query, values)
}

/// Rewrites every `?Field` token to `?`, collecting the field values of `record`.
pub fn struct_to_args(query: &str, record: &dyn Record) -> Result<(String, Vec<Value>)> {
    let mut values = Vec::new();
    let mut error = None;
    let query = replace_tokens(query, '?', |out, field| match record.get_field(field) {
        Some(value) => {
            values.push(value);
            out.push('?');
            true
        }
        None => {
            error.get_or_insert_with(|| {
                Error::msg(format!(
                    "Type {} has no field named `{}`",
                    record.type_name(),
                    field
                ))
            });
            false
        }
    });
    match error {
        Some(error) => Err(error),
        None => Ok((query, values)),
    }
}

/// Rewrites every `?key` token to `?`, collecting the values of `map`.
pub fn map_to_args<'a>(query: &str, map: impl Into<MapRef<'a>>) -> Result<(String, Vec<Value>)> {
    let map = map.into();
    let mut values = Vec::new();
    let mut error = None;
    let query = replace_tokens(query, '?', |out, key| match map.get(key) {
        Some(value) => {
            values.push(value.clone());
            out.push('?');
            true
        }
        None => {
            error.get_or_insert_with(|| Error::msg(format!("Map key `{}` is missing", key)));
            false
        }
    });
    match error {
        Some(error) => Err(error),
        None => Ok((query, values)),
    }
}

/// String keyed map accepted by [`map_to_args`].
#[derive(Clone, Copy)]
pub enum MapRef<'a> {
    Hash(&'a HashMap<String, Value>),
    Ordered(&'a BTreeMap<String, Value>),
}

impl<'a> MapRef<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        match *self {
            MapRef::Hash(map) => map.get(key),
            MapRef::Ordered(map) => map.get(key),
        }
    }
}

impl<'a> From<&'a HashMap<String, Value>> for MapRef<'a> {
    fn from(value: &'a HashMap<String, Value>) -> Self {
        MapRef::Hash(value)
    }
}

impl<'a> From<&'a BTreeMap<String, Value>> for MapRef<'a> {
    fn from(value: &'a BTreeMap<String, Value>) -> Self {
        MapRef::Ordered(value)
    }
}
