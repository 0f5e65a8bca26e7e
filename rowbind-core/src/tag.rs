use crate::{ConfigError, Result};

/// Parsed column tag, `name[, option[:value]]*`.
///
/// Recognized options are `size:<n>`, `default:<literal>`, `primarykey`,
/// `autoincrement` and `notnull`. The name `-` marks the field as transient.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ColumnTag {
    pub name: Option<String>,
    pub transient: bool,
    pub size: Option<u32>,
    pub default: Option<String>,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub not_null: bool,
}

impl ColumnTag {
    pub fn parse(tag: &str) -> Result<Self> {
        let mut result = ColumnTag::default();
        let mut parts = tag.split(',');
        let name = parts.next().unwrap_or_default().trim();
        match name {
            "" => {}
            "-" => result.transient = true,
            _ => result.name = Some(name.to_string()),
        }
        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (option, value) = match part.split_once(':') {
                Some((option, value)) => (option.trim(), Some(value.trim())),
                None => (part, None),
            };
            match (option, value) {
                ("size" | "default", None | Some("")) => {
                    return Err(ConfigError::msg(format!(
                        "Option `{option}` in tag `{tag}` requires a value"
                    )));
                }
                ("size", Some(value)) => {
                    result.size = Some(value.parse().map_err(|_| {
                        ConfigError::msg(format!(
                            "Invalid size `{value}` in tag `{tag}`, expected a positive integer"
                        ))
                    })?)
                }
                ("default", Some(value)) => result.default = Some(value.to_string()),
                ("primarykey" | "autoincrement" | "notnull", Some(_)) => {
                    return Err(ConfigError::msg(format!(
                        "Option `{option}` in tag `{tag}` does not take a value"
                    )));
                }
                ("primarykey", None) => result.primary_key = true,
                ("autoincrement", None) => result.auto_increment = true,
                ("notnull", None) => result.not_null = true,
                _ => {
                    return Err(ConfigError::msg(format!(
                        "Unrecognized option `{option}` in tag `{tag}`"
                    )));
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_tag() {
        let tag =
            ColumnTag::parse("item_id, size:40, default:'none', primarykey, notnull").unwrap();
        assert_eq!(
            tag,
            ColumnTag {
                name: Some("item_id".into()),
                size: Some(40),
                default: Some("'none'".into()),
                primary_key: true,
                not_null: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn empty_name_and_transient() {
        assert_eq!(
            ColumnTag::parse(",autoincrement").unwrap(),
            ColumnTag {
                auto_increment: true,
                ..Default::default()
            }
        );
        assert!(ColumnTag::parse("-").unwrap().transient);
    }

    #[test]
    fn malformed_tags() {
        for tag in [
            "name, size",
            "name, default",
            "name, default:",
            "name, default: ",
            "name, size:",
            "name, primarykey:yes",
            "name, notnull:1",
            "name, unique",
            "name, size:big",
        ] {
            let error = ColumnTag::parse(tag).unwrap_err();
            assert!(
                error.downcast_ref::<ConfigError>().is_some(),
                "tag `{tag}` should be a configuration error"
            );
        }
    }
}
