//! Attribute inspection used while building the program model.
//!
//! Test-only code is left out of the model: `#[cfg(test)]` modules and impls,
//! and `#[test]` functions inside impl blocks.

use proc_macro2::{TokenStream, TokenTree};
use syn::{Attribute, Meta};

/// Whether the item is only compiled for tests.
///
/// True for `#[test]`, `cfg(test)` and `cfg(all(test, ...))`. Predicates that
/// also hold outside tests, such as `cfg(any(test, feature = "x"))` or
/// `cfg(not(test))`, do not count.
#[must_use]
pub fn is_test_only(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        if attr.path().is_ident("test") {
            return true;
        }
        match &attr.meta {
            Meta::List(list) if list.path.is_ident("cfg") => requires_test(list.tokens.clone()),
            _ => false,
        }
    })
}

/// Whether a `cfg` predicate can only hold when `test` is set.
fn requires_test(tokens: TokenStream) -> bool {
    let tokens: Vec<TokenTree> = tokens.into_iter().collect();
    match tokens.as_slice() {
        [TokenTree::Ident(ident)] => ident == "test",
        [TokenTree::Ident(ident), TokenTree::Group(group)] if ident == "all" => {
            split_predicates(group.stream()).into_iter().any(requires_test)
        }
        _ => false,
    }
}

fn split_predicates(tokens: TokenStream) -> Vec<TokenStream> {
    let mut predicates = vec![TokenStream::new()];
    for token in tokens {
        if matches!(&token, TokenTree::Punct(p) if p.as_char() == ',') {
            predicates.push(TokenStream::new());
        } else if let Some(last) = predicates.last_mut() {
            last.extend(std::iter::once(token));
        }
    }
    predicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn check(attr: Attribute) -> bool {
        is_test_only(&[attr])
    }

    #[test]
    fn test_functions_and_cfg_test() {
        assert!(check(parse_quote!(#[test])));
        assert!(check(parse_quote!(#[cfg(test)])));
        assert!(check(parse_quote!(#[cfg(all(test, feature = "slow"))])));
        assert!(!check(parse_quote!(#[inline])));
    }

    #[test]
    fn negations_and_features_are_not_test_only() {
        assert!(!check(parse_quote!(#[cfg(not(test))])));
        assert!(!check(parse_quote!(#[cfg(feature = "test")])));
        assert!(!check(parse_quote!(#[cfg(feature = "testing")])));
        assert!(!check(parse_quote!(#[cfg_attr(test, derive(Debug))])));
    }

    #[test]
    fn any_with_test_also_builds_outside_tests() {
        assert!(!check(parse_quote!(#[cfg(any(test, feature = "fixtures"))])));
        assert!(!check(parse_quote!(#[cfg(all(unix, any(test, feature = "fixtures")))])));
        assert!(check(parse_quote!(#[cfg(all(unix, test))])));
    }
}
