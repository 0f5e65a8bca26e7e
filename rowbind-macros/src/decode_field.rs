use proc_macro2::TokenStream;
use quote::quote;
use rowbind_core::ColumnTag;
use syn::{Field, GenericArgument, Ident, LitStr, PathArguments, Type};

pub(crate) enum FieldRole {
    Column,
    Transient,
    Embedded,
}

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) role: FieldRole,
    pub(crate) nullable: bool,
    pub(crate) tag: ColumnTag,
}

/// `Option<T>` fields map to nullable columns.
fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    let Some(last) = path.path.segments.last() else {
        return false;
    };
    last.ident == "Option"
        && matches!(
            &last.arguments,
            PathArguments::AngleBracketed(args)
                if matches!(args.args.first(), Some(GenericArgument::Type(..)))
        )
}

pub(crate) fn decode_field(field: &Field) -> FieldMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Record can only be derived for structs with named fields");
    let mut metadata = FieldMetadata {
        nullable: is_option(&field.ty),
        ident,
        ty: field.ty.clone(),
        role: FieldRole::Column,
        tag: ColumnTag::default(),
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("db") {
            let Ok(v) = meta.require_list().and_then(|v| v.parse_args::<LitStr>()) else {
                panic!(
                    "Error while parsing `db`, use it like #[db(\"column_name, size:64, notnull\")]"
                );
            };
            let tag = match ColumnTag::parse(&v.value()) {
                Ok(tag) => tag,
                Err(e) => panic!("Invalid `db` tag on field `{}`: {:#}", metadata.ident, e),
            };
            if tag.transient {
                metadata.role = FieldRole::Transient;
            }
            metadata.tag = tag;
        } else if meta.path().is_ident("record") {
            let mut embed = false;
            let parsed = meta.require_list().and_then(|list| {
                list.parse_nested_meta(|arg| {
                    if arg.path.is_ident("embed") {
                        embed = true;
                        Ok(())
                    } else {
                        Err(arg.error("unknown option"))
                    }
                })
            });
            if parsed.is_err() || !embed {
                panic!("Error while parsing `record`, use it like #[record(embed)]");
            }
            metadata.role = FieldRole::Embedded;
        }
    }
    if matches!(metadata.role, FieldRole::Embedded) && metadata.tag != ColumnTag::default() {
        panic!(
            "Field `{}` is embedded and cannot also have a `db` tag",
            metadata.ident
        );
    }
    metadata
}

/// Expression building the `FieldDef` of the field.
pub(crate) fn encode_field_def(field: &FieldMetadata) -> TokenStream {
    let name = field.ident.to_string();
    let ty = &field.ty;
    match field.role {
        FieldRole::Embedded => quote! {
            ::rowbind::FieldDef::embedded(#name, <#ty as ::rowbind::Record>::fields)
        },
        FieldRole::Transient => quote! {
            ::rowbind::FieldDef {
                transient: true,
                ..::rowbind::FieldDef::new(#name, ::rowbind::Value::Null)
            }
        },
        FieldRole::Column => {
            let tag = &field.tag;
            let nullable = field.nullable;
            let column = option_tokens(tag.name.as_deref());
            let default = option_tokens(tag.default.as_deref());
            let size = match tag.size {
                Some(v) => quote!(Some(#v)),
                None => quote!(None),
            };
            let primary_key = tag.primary_key;
            let auto_increment = tag.auto_increment;
            let not_null = tag.not_null;
            quote! {
                ::rowbind::FieldDef {
                    nullable: #nullable,
                    column: #column,
                    size: #size,
                    default: #default,
                    primary_key: #primary_key,
                    auto_increment: #auto_increment,
                    not_null: #not_null,
                    ..::rowbind::FieldDef::new(
                        #name,
                        <#ty as ::rowbind::AsValue>::as_empty_value(),
                    )
                }
            }
        }
    }
}

fn option_tokens(value: Option<&str>) -> TokenStream {
    match value {
        Some(v) => quote!(Some(#v)),
        None => quote!(None),
    }
}
