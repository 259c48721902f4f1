mod utils;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, Data, DeriveInput, Fields, FieldsNamed, Ident, Path, Type,
};
use utils::{find_attribute, get_list_attr, reject_attributes};

/// Generates `<Name>Repository`, a [`recordset::RecordSet`] wrapper with an
/// index and a `find_by_<field>` method for every `#[index]` field.
///
/// * `#[index]` on a field builds an index on it.
/// * `#[unique]` on an indexed field forbids two records sharing its value.
/// * `#[check(function, ...)]` on the struct requires every record to pass `function`.
#[proc_macro_derive(Repository, attributes(index, unique, check))]
pub fn repository(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match expand(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Indexed fields of the struct.
struct IndexedField<'a> {
    name: &'a Ident,
    ty: &'a Type,
    unique: bool,
}

fn expand(ast: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &ast.ident;

    let fields = match &ast.data {
        Data::Struct(syn::DataStruct {
            fields: Fields::Named(FieldsNamed { named, .. }),
            ..
        }) => named,
        _ => {
            return Err(syn::Error::new(
                name.span(),
                "Repository can only be derived on a struct with named fields",
            ))
        }
    };

    reject_attributes(&ast.attrs, &["index", "unique"])?;
    let checks = get_list_attr(&ast.attrs, "check")?;
    let indexed = process_fields(fields.iter())?;

    let vis = &ast.vis;
    let wrapper_name = format_ident!("{}Repository", name);

    let index_names: Vec<&Ident> = indexed.iter().map(|field| field.name).collect();
    let index_types: Vec<&Type> = indexed.iter().map(|field| field.ty).collect();
    let index_strs: Vec<String> = index_names.iter().map(|name| name.to_string()).collect();
    let find_methods: Vec<Ident> = index_names
        .iter()
        .map(|field| format_ident!("find_by_{}", field))
        .collect();

    let unique: Vec<&IndexedField> = indexed.iter().filter(|field| field.unique).collect();
    let unique_names: Vec<&Ident> = unique.iter().map(|field| field.name).collect();
    let unique_strs: Vec<String> = unique_names.iter().map(|name| name.to_string()).collect();

    let validation = validation(name, &unique_names, &unique_strs, &checks);

    let expanded = quote! {
        #[derive(Clone)]
        #vis struct #wrapper_name {
            _set: recordset::RecordSet<#name>,
            #(pub #index_names: recordset::Index<#name, #index_types>,)*
        }

        impl std::ops::Deref for #wrapper_name {
            type Target = recordset::RecordSet<#name>;

            fn deref(&self) -> &Self::Target {
                &self._set
            }
        }

        impl #wrapper_name {
            #(
                pub fn #find_methods(
                    &self,
                    #index_names: #index_types,
                ) -> recordset::SetResult<Vec<recordset::Record<#name>>> {
                    self.#index_names.select(&#index_names)
                }
            )*
        }

        impl #name {
            /// A builder enforcing the unique fields and checks of this type.
            pub fn builder() -> recordset::SetResult<recordset::RecordSetBuilder<#name>> {
                let builder = recordset::RecordSet::<#name>::builder();
                #(
                    let builder = builder.constraint(recordset::Constraint::unique(
                        #unique_strs,
                        |record: &#name| record.#unique_names.clone(),
                    ))?;
                )*
                #(
                    let builder = builder.constraint(recordset::Constraint::check(#checks))?;
                )*
                Ok(builder)
            }

            /// Index a built set.
            pub fn repository(
                set: recordset::RecordSet<#name>,
            ) -> recordset::SetResult<#wrapper_name> {
                #(
                    let #index_names = set.create_index(
                        #index_strs,
                        |record: &#name| record.#index_names.clone(),
                    )?;
                )*
                #validation

                Ok(#wrapper_name {
                    _set: set,
                    #(#index_names),*
                })
            }
        }
    };

    Ok(expanded)
}

/// Check a set which may not have been built with the generated builder.
fn validation(
    name: &Ident,
    unique_names: &[&Ident],
    unique_strs: &[String],
    checks: &[Path],
) -> proc_macro2::TokenStream {
    if unique_names.is_empty() && checks.is_empty() {
        return quote! {};
    }

    quote! {
        for record in set.iter() {
            #(
                if #unique_names.select(&record.data.#unique_names)?.len() > 1 {
                    return Err(recordset::RecordSetError::Exists {
                        constraint: #unique_strs.to_owned(),
                        id: record.id,
                    });
                }
            )*
            #(
                let check: fn(&#name) -> bool = #checks;
                if !check(&record.data) {
                    return Err(recordset::RecordSetError::Condition);
                }
            )*
        }
    }
}

/// Process fields and decide which of them get an index.
fn process_fields<'a>(
    fields: impl Iterator<Item = &'a syn::Field>,
) -> syn::Result<Vec<IndexedField<'a>>> {
    let mut indexed = vec![];

    for field in fields {
        reject_attributes(&field.attrs, &["check"])?;

        let unique = find_attribute(&field.attrs, "unique");

        if find_attribute(&field.attrs, "index").is_none() {
            if let Some(attr) = unique {
                return Err(syn::Error::new(
                    attr.span(),
                    "#[unique] can only be used together with #[index]",
                ));
            }
            continue;
        }

        let name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new(field.span(), "indexed fields must be named"))?;

        indexed.push(IndexedField {
            name,
            ty: &field.ty,
            unique: unique.is_some(),
        });
    }

    Ok(indexed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_err(ast: DeriveInput) -> String {
        match expand(&ast) {
            Ok(tokens) => panic!("expected a compile error, got {}", tokens),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn expand_repository() {
        let tokens = expand(&syn::parse_quote! {
            #[check(is_adult)]
            struct Person {
                #[index]
                #[unique]
                name: String,
                age: u8,
            }
        })
        .expect("Expand failed")
        .to_string();

        assert!(tokens.contains("PersonRepository"));
        assert!(tokens.contains("find_by_name"));
        assert!(!tokens.contains("find_by_age"));
        assert!(tokens.contains("is_adult"));
    }

    #[test]
    fn unique_requires_index() {
        let message = expand_err(syn::parse_quote! {
            struct Person {
                #[unique]
                name: String,
            }
        });

        assert_eq!(message, "#[unique] can only be used together with #[index]");
    }

    #[test]
    fn index_on_struct() {
        let message = expand_err(syn::parse_quote! {
            #[index]
            struct Person {
                name: String,
            }
        });

        assert_eq!(message, "#[index] is not allowed here");
    }

    #[test]
    fn unique_on_struct() {
        let message = expand_err(syn::parse_quote! {
            #[unique]
            struct Person {
                #[index]
                name: String,
            }
        });

        assert_eq!(message, "#[unique] is not allowed here");
    }

    #[test]
    fn check_on_field() {
        let message = expand_err(syn::parse_quote! {
            struct Person {
                #[check(is_adult)]
                age: u8,
            }
        });

        assert_eq!(message, "#[check] is not allowed here");
    }

    #[test]
    fn malformed_check() {
        let message = expand_err(syn::parse_quote! {
            #[check = "is_adult"]
            struct Person {
                age: u8,
            }
        });

        assert_eq!(message, "expected #[check(function, ...)]");

        let message = expand_err(syn::parse_quote! {
            #[check("is_adult")]
            struct Person {
                age: u8,
            }
        });

        assert_eq!(message, "expected a path to a function");
    }

    #[test]
    fn tuple_struct() {
        let message = expand_err(syn::parse_quote! {
            struct Person(String, u8);
        });

        assert_eq!(
            message,
            "Repository can only be derived on a struct with named fields"
        );
    }
}
