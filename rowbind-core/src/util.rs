pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

pub fn consume_while<'s>(input: &mut &'s str, predicate: impl FnMut(&char) -> bool) -> &'s str {
    let len = input
        .chars()
        .take_while(predicate)
        .map(char::len_utf8)
        .sum::<usize>();
    if len == 0 {
        return "";
    }
    let result = &input[..len];
    *input = &input[len..];
    result
}

/// Short name of a type, without the module path.
pub fn short_type_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            &$query[..::std::cmp::min($query.len(), 497)].trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_is_skipped_for_empty_items() {
        let mut out = String::from("(");
        separated_by(
            &mut out,
            ["a", "", "b"],
            |out, v| out.push_str(v),
            ", ",
        );
        assert_eq!(out, "(a, b");
    }

    #[test]
    fn consume_while_advances_input() {
        let mut input = "user_id = 1";
        assert_eq!(consume_while(&mut input, |c| c.is_alphanumeric() || *c == '_'), "user_id");
        assert_eq!(input, " = 1");
        assert_eq!(consume_while(&mut input, char::is_ascii_digit), "");
    }

    #[test]
    fn short_names() {
        assert_eq!(short_type_name("my_crate::model::Invoice"), "Invoice");
        assert_eq!(short_type_name("Invoice"), "Invoice");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
    }
}
