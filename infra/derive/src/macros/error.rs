use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, Field, Fields, Ident, Type, Variant};

struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
}

pub fn expand_error(input: DeriveInput) -> TokenStream {
    let name = &input.ident;
    let ext = format_ident!("{name}Ext");

    let syn::Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(name, "jsk_error can only be applied to enums")
            .to_compile_error();
    };

    let variants = match data.variants.iter().map(inspect_variant).collect::<syn::Result<Vec<_>>>()
    {
        Ok(variants) => variants,
        Err(err) => return err.to_compile_error(),
    };

    let derives = missing_derives(&input);
    let context_arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let ident = v.ident;
        quote! { #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });
    let conversions = variants.iter().filter_map(|v| source_conversion(name, &ext, v));

    quote! {
        #derives
        #input

        /// Result alias bound to this module's error type.
        pub type Result<T, E = #name> = ::std::result::Result<T, E>;

        /// Attaches a human-readable context to a failed result.
        pub trait #ext<T> {
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for ::std::result::Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    #[allow(unreachable_patterns)]
                    match &mut err {
                        #(#context_arms)*
                        _ => {}
                    }
                    err
                })
            }
        }

        #(#conversions)*

        #[allow(dead_code)]
        fn format_context(context: &Option<::std::borrow::Cow<'static, str>>) -> ::std::borrow::Cow<'static, str> {
            context.as_ref().map_or(::std::borrow::Cow::Borrowed(""), |c| ::std::borrow::Cow::Owned(format!(" ({c})")))
        }
    }
}

fn inspect_variant(variant: &Variant) -> syn::Result<ErrorVariant<'_>> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new_spanned(
            variant,
            "jsk_error variants must use named fields",
        ));
    };

    let mut has_context = false;
    let mut source = None;

    for field in &fields.named {
        let Some(ident) = &field.ident else { continue };
        if ident == "context" {
            if !is_context_type(&field.ty) {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "context field must be Option<Cow<'static, str>>",
                ));
            }
            has_context = true;
        } else if ident == "source" || marked_as_source(field) {
            source = Some((ident, &field.ty));
        }
    }

    if source.is_some() && !has_context {
        return Err(syn::Error::new_spanned(
            &variant.ident,
            "jsk_error variants with a source also need `context: Option<Cow<'static, str>>`",
        ));
    }

    Ok(ErrorVariant { ident: &variant.ident, source, has_context })
}

fn source_conversion(name: &Ident, ext: &Ident, variant: &ErrorVariant<'_>) -> Option<TokenStream> {
    let (field, ty) = variant.source?;
    let ident = variant.ident;

    Some(quote! {
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self { Self::#ident { #field, context: None } }
        }

        impl<T> #ext<T> for ::std::result::Result<T, #ty> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
            }
        }
    })
}

fn marked_as_source(field: &Field) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident("source") || attr.path().is_ident("from"))
}

fn missing_derives(input: &DeriveInput) -> TokenStream {
    let mut present = FxHashSet::default();
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(last) = meta.path.segments.last() {
                present.insert(last.ident.to_string());
            }
            Ok(())
        });
    }

    let mut derives = Vec::new();
    if !present.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if !present.contains("Error") {
        derives.push(quote! { ::thiserror::Error });
    }

    if derives.is_empty() { quote! {} } else { quote! { #[derive(#(#derives),*)] } }
}

/// Matches `Option<Cow<'static, str>>` by its last path segments.
fn is_context_type(ty: &Type) -> bool {
    let Some(inner) = single_generic(ty, "Option") else {
        return false;
    };
    let Type::Path(path) = inner else {
        return false;
    };
    let Some(cow) = path.path.segments.last().filter(|seg| seg.ident == "Cow") else {
        return false;
    };
    let syn::PathArguments::AngleBracketed(args) = &cow.arguments else {
        return false;
    };

    let mut args = args.args.iter();
    let static_lifetime = matches!(
        args.next(),
        Some(syn::GenericArgument::Lifetime(lt)) if lt.ident == "static"
    );
    let str_type = matches!(
        args.next(),
        Some(syn::GenericArgument::Type(Type::Path(p)))
            if p.path.segments.last().is_some_and(|seg| seg.ident == "str")
    );

    static_lifetime && str_type
}

fn single_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last().filter(|seg| seg.ident == wrapper)?;
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else { return None };
    match args.args.first() {
        Some(syn::GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}
