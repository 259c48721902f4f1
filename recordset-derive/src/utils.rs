use syn::{spanned::Spanned, Attribute, Meta, NestedMeta, Path};

/// This returns the attribute if a bare `#[attr_name]` was found.
pub fn find_attribute<'a>(attrs: &'a [Attribute], attr_name: &str) -> Option<&'a Attribute> {
    attrs
        .iter()
        .find(|attr| attr.path.is_ident(attr_name) && attr.tokens.is_empty())
}

/// Fail on the first attribute which is not allowed in this position.
pub fn reject_attributes(attrs: &[Attribute], forbidden: &[&str]) -> syn::Result<()> {
    for attr in attrs {
        if let Some(name) = forbidden.iter().find(|name| attr.path.is_ident(name)) {
            return Err(syn::Error::new(
                attr.span(),
                format!("#[{}] is not allowed here", name),
            ));
        }
    }

    Ok(())
}

/// Collect the paths of every `#[attr_name(a, b::c)]` attribute.
pub fn get_list_attr(attrs: &[Attribute], attr_name: &str) -> syn::Result<Vec<Path>> {
    let mut paths = vec![];

    for attr in attrs.iter().filter(|attr| attr.path.is_ident(attr_name)) {
        match attr.parse_meta()? {
            Meta::List(list) => {
                for nested in list.nested {
                    match nested {
                        NestedMeta::Meta(Meta::Path(path)) => paths.push(path),
                        other => {
                            return Err(syn::Error::new(
                                other.span(),
                                "expected a path to a function",
                            ))
                        }
                    }
                }
            }
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    format!("expected #[{}(function, ...)]", attr_name),
                ))
            }
        }
    }

    Ok(paths)
}
