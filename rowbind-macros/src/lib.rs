mod decode_field;

use decode_field::{FieldMetadata, FieldRole, decode_field, encode_field_def};
use proc_macro::TokenStream;
use quote::quote;
use syn::{Fields, ItemStruct, parse_macro_input};

/// Implements `rowbind::Record` for a struct with named fields.
///
/// Column options go in
/// `#[db("name, size:<n>, default:<literal>, primarykey, autoincrement, notnull")]`,
/// `#[db("-")]` excludes a field from the table and `#[record(embed)]` splices
/// the fields of a nested record into this one.
#[proc_macro_derive(Record, attributes(db, record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    if !item.generics.params.is_empty() {
        panic!("Record cannot be derived for generic structs");
    }
    let Fields::Named(..) = &item.fields else {
        panic!("Record can only be derived for structs with named fields");
    };
    let fields = item.fields.iter().map(decode_field).collect::<Vec<_>>();
    let field_defs = fields.iter().map(encode_field_def);
    let columns = fields
        .iter()
        .filter(|f| matches!(f.role, FieldRole::Column))
        .collect::<Vec<&FieldMetadata>>();
    let embedded = fields
        .iter()
        .filter(|f| matches!(f.role, FieldRole::Embedded))
        .collect::<Vec<&FieldMetadata>>();
    let get_columns = columns.iter().map(|f| {
        let ident = &f.ident;
        let label = ident.to_string();
        quote! {
            #label => return Some(::rowbind::AsValue::as_value(self.#ident.clone())),
        }
    });
    let get_embedded = embedded.iter().map(|f| {
        let ident = &f.ident;
        quote! {
            if let Some(value) = ::rowbind::Record::get_field(&self.#ident, name) {
                return Some(value);
            }
        }
    });
    let set_columns = columns.iter().map(|f| {
        let ident = &f.ident;
        let ty = &f.ty;
        let label = ident.to_string();
        quote! {
            #label => {
                self.#ident = ::rowbind::Context::with_context(
                    <#ty as ::rowbind::AsValue>::try_from_value(value),
                    || format!("While setting field `{}` of {}", #label, stringify!(#name)),
                )?;
                return Ok(true);
            }
        }
    });
    let set_embedded = embedded.iter().map(|f| {
        let ident = &f.ident;
        quote! {
            if ::rowbind::Record::set_field(&mut self.#ident, name, value.clone())? {
                return Ok(true);
            }
        }
    });
    quote! {
        impl ::rowbind::Record for #name {
            fn fields() -> &'static [::rowbind::FieldDef] {
                static FIELDS: ::std::sync::LazyLock<Vec<::rowbind::FieldDef>> =
                    ::std::sync::LazyLock::new(|| vec![#(#field_defs),*]);
                &FIELDS
            }

            fn field_defs(&self) -> &'static [::rowbind::FieldDef] {
                <Self as ::rowbind::Record>::fields()
            }

            fn get_field(&self, name: &str) -> Option<::rowbind::Value> {
                match name {
                    #(#get_columns)*
                    _ => {}
                }
                #(#get_embedded)*
                None
            }

            #[allow(unused_variables)]
            fn set_field(&mut self, name: &str, value: ::rowbind::Value) -> ::rowbind::Result<bool> {
                match name {
                    #(#set_columns)*
                    _ => {}
                }
                #(#set_embedded)*
                Ok(false)
            }

            fn as_dyn(&self) -> &dyn ::rowbind::Record {
                self
            }

            fn as_dyn_mut(&mut self) -> &mut dyn ::rowbind::Record {
                self
            }
        }
    }
    .into()
}
