use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Field, Fields, Lit, Meta, Token, Type,
    parse_macro_input,
};

/// How a field takes part in reconciliation.
enum ReconcileMode {
    /// Filled when the decoded value is at its natural sentinel.
    Sentinel,
    /// Filled when the decoded value equals the given expression.
    Unset(Expr),
    /// Filled from the enclosing object's own members.
    Flatten,
}

/// Serde attributes the generated decoder honours.
#[derive(Default)]
struct SerdeField {
    rename: Option<String>,
    aliases: Vec<String>,
    skip: bool,
    flatten: bool,
}

fn serde_field(attrs: &[Attribute]) -> SerdeField {
    let mut out = SerdeField::default();
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        // #[serde(rename = "RGB", skip_serializing_if = "...")]
        let Ok(nested) = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
        else {
            continue;
        };
        for meta in nested {
            match meta {
                Meta::Path(path) if path.is_ident("flatten") => out.flatten = true,
                Meta::Path(path) if path.is_ident("skip") || path.is_ident("skip_deserializing") => {
                    out.skip = true
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    if let Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    {
                        out.rename = Some(s.value());
                    }
                }
                Meta::NameValue(nv) if nv.path.is_ident("alias") => {
                    if let Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    {
                        out.aliases.push(s.value());
                    }
                }
                _ => {}
            }
        }
    }
    out
}

fn reconcile_mode(attrs: &[Attribute]) -> syn::Result<Option<ReconcileMode>> {
    for attr in attrs {
        if !attr.path().is_ident("reconcile") {
            continue;
        }
        if matches!(attr.meta, Meta::Path(_)) {
            return Ok(Some(ReconcileMode::Sentinel));
        }
        let mut mode = ReconcileMode::Sentinel;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("unset") {
                mode = ReconcileMode::Unset(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("flatten") {
                mode = ReconcileMode::Flatten;
                Ok(())
            } else {
                Err(meta.error("expected `unset = <value>` or `flatten`"))
            }
        })?;
        return Ok(Some(mode));
    }
    Ok(None)
}

/// `required_nearby_improved_resources` -> `requiredNearbyImprovedResources`
fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.trim_start_matches("r#").chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn json_key(field: &Field, serde: &SerdeField) -> String {
    match &serde.rename {
        Some(rename) => rename.clone(),
        None => camel_case(&field.ident.as_ref().map(|i| i.to_string()).unwrap_or_default()),
    }
}

fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<Vec<&'a Field>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields.named.iter().collect()),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} only works on structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} only works on structs"),
        )),
    }
}

/// Derive macro for a `Deserialize` implementation that never rejects an object
/// because of one bad field.
///
/// The generated visitor:
/// - starts from `Default::default()`
/// - decodes each known key on its own and leaves the default in place when
///   the value has the wrong shape (logged at trace level)
/// - hands unknown keys to a `#[serde(flatten)]` field through
///   `crate::decode::Flatten`, or skips them
/// - honours `#[serde(rename = "...")]`, `#[serde(alias = "...")]` and
///   `#[serde(skip)]`; every other key is the camelCase spelling of the field
///   name
#[proc_macro_derive(LenientDeserialize, attributes(serde))]
pub fn derive_lenient_deserialize(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match lenient_deserialize(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn lenient_deserialize(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let fields = named_fields(input, "LenientDeserialize")?;

    let mut match_arms = Vec::new();
    let mut flatten: Option<(&syn::Ident, &Type)> = None;

    for field in &fields {
        let serde = serde_field(&field.attrs);
        if serde.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        if serde.flatten {
            flatten = Some((ident, ty));
            continue;
        }
        let key = json_key(field, &serde);
        let aliases = &serde.aliases;
        match_arms.push(quote! {
            #key #(| #aliases)* => {
                let raw = map.next_value::<::serde_json::Value>()?;
                match ::serde_json::from_value::<#ty>(raw) {
                    Ok(decoded) => value.#ident = decoded,
                    Err(e) => ::log::trace!(
                        "{}: ignoring malformed `{}`: {}",
                        stringify!(#name),
                        #key,
                        e
                    ),
                }
            }
        });
    }

    let fallback_arm = match flatten {
        Some((ident, ty)) => quote! {
            _ => {
                let raw = map.next_value::<::serde_json::Value>()?;
                if let Err(e) = <#ty as crate::decode::Flatten>::absorb(&mut value.#ident, &key, raw) {
                    ::log::trace!(
                        "{}: ignoring malformed `{}`: {}",
                        stringify!(#name),
                        key,
                        e
                    );
                }
            }
        },
        None => quote! {
            _ => {
                let _ = map.next_value::<::serde::de::IgnoredAny>()?;
            }
        },
    };

    Ok(quote! {
        impl<'de> ::serde::Deserialize<'de> for #name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                struct LenientVisitor;

                impl<'de> ::serde::de::Visitor<'de> for LenientVisitor {
                    type Value = #name;

                    fn expecting(&self, formatter: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                        formatter.write_str(concat!("struct ", stringify!(#name)))
                    }

                    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
                    where
                        A: ::serde::de::MapAccess<'de>,
                    {
                        let mut value = <#name as ::core::default::Default>::default();
                        while let Some(key) = map.next_key::<String>()? {
                            match key.as_str() {
                                #(#match_arms)*
                                #fallback_arm
                            }
                        }
                        Ok(value)
                    }
                }

                deserializer.deserialize_map(LenientVisitor)
            }
        }
    })
}

/// Derive macro that generates `crate::reconcile::Reconcile` from a per-field
/// table.
///
/// # Usage
///
/// ```ignore
/// use civdata_derive::Reconcile;
///
/// #[derive(Default, Reconcile)]
/// struct BaseUnit {
///     #[reconcile]
///     pub unit_type: String,          // filled while blank
///
///     #[reconcile(unset = -1)]
///     pub cost: i32,                  // filled while still -1
///
///     #[reconcile(flatten)]
///     pub stats: Stats,               // read from the object's own members
///
///     pub name: String,               // never touched here
/// }
/// ```
///
/// Only fields carrying `#[reconcile]` take part. A field is overwritten only
/// while it holds its sentinel, and only with a raw value that is not itself
/// the sentinel, so a second pass changes nothing.
#[proc_macro_derive(Reconcile, attributes(reconcile))]
pub fn derive_reconcile(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match reconcile(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn reconcile(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let fields = named_fields(input, "Reconcile")?;

    let mut steps = Vec::new();
    let mut keys = Vec::new();

    for field in &fields {
        let Some(mode) = reconcile_mode(&field.attrs)? else {
            continue;
        };
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let key = json_key(field, &serde_field(&field.attrs));

        let step = match mode {
            ReconcileMode::Sentinel => {
                keys.push(key.clone());
                quote! {
                    if let Some(found) = <#ty as crate::reconcile::RawField>::read_raw(raw, #key) {
                        if crate::reconcile::RawField::merge_unset(&mut self.#ident, found) {
                            filled += 1;
                        }
                    }
                }
            }
            ReconcileMode::Unset(unset) => {
                keys.push(key.clone());
                quote! {
                    if self.#ident == (#unset) {
                        if let Some(found) = <#ty as crate::reconcile::RawField>::read_raw(raw, #key) {
                            if found != (#unset) {
                                self.#ident = found;
                                filled += 1;
                            }
                        }
                    }
                }
            }
            ReconcileMode::Flatten => {
                keys.push("*".to_string());
                quote! {
                    if let Some(found) = <#ty as crate::reconcile::FlatRawField>::read_flat(raw) {
                        if crate::reconcile::RawField::merge_unset(&mut self.#ident, found) {
                            filled += 1;
                        }
                    }
                }
            }
        };
        steps.push(step);
    }

    let key_count = keys.len();

    Ok(quote! {
        impl crate::reconcile::Reconcile for #name {
            #[allow(unused_variables, unused_mut)]
            fn reconcile_fields(&mut self, raw: crate::reconcile::RawEntry<'_>) -> usize {
                let mut filled = 0usize;
                #(#steps)*
                filled
            }

            fn reconciled_keys() -> &'static [&'static str] {
                static KEYS: [&str; #key_count] = [#(#keys),*];
                &KEYS
            }
        }
    })
}
