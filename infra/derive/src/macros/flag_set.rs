use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::parse::Parser;
use syn::{Attribute, Expr, Fields, Ident, ItemStruct, LitStr, Path, Type};

const SUPPORTED_TYPES: [&str; 4] = ["bool", "i64", "f64", "String"];

struct FlagField {
    ident: Ident,
    ty: Type,
    name: LitStr,
    docs: Vec<Attribute>,
    default: Option<Expr>,
    computed: Option<Path>,
    handler: Option<Path>,
}

pub fn expand_flag_set(args: TokenStream, input: ItemStruct) -> TokenStream {
    match expand(args, input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(args: TokenStream, input: ItemStruct) -> syn::Result<TokenStream> {
    let prefix = parse_args(args)?;

    if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "flag_set structs cannot be generic",
        ));
    }

    let Fields::Named(fields) = &input.fields else {
        return Err(syn::Error::new_spanned(&input, "flag_set requires a struct with named fields"));
    };

    let mut seen = FxHashSet::default();
    let mut flags = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let flag = parse_field(field)?;
        if !seen.insert(flag.name.value()) {
            return Err(syn::Error::new_spanned(
                &flag.ident,
                format!("flag `{}` is declared more than once", flag.name.value()),
            ));
        }
        flags.push(flag);
    }

    let ident = &input.ident;
    let vis = &input.vis;
    let attrs = input.attrs.iter().filter(|attr| !attr.path().is_ident("derive"));

    let consts = flags.iter().map(|flag| {
        let konst = const_ident(flag);
        let name = &flag.name;
        quote! { pub const #konst: &'static str = #name; }
    });
    let specs = flags.iter().map(spec_expr);
    let accessors = flags.iter().map(accessors);
    let prefix = prefix.map(|p| quote! { .prefix(#p) });

    Ok(quote! {
        #(#attrs)*
        #[derive(Debug, Clone)]
        #vis struct #ident {
            registry: ::jsk_flags::FlagRegistry,
        }

        impl #ident {
            #(#consts)*

            /// Declared flags in field order.
            #[must_use]
            pub fn specs() -> ::std::vec::Vec<::jsk_flags::FlagSpec> {
                ::std::vec![#(#specs),*]
            }

            /// Registry builder pre-loaded with this set's flags.
            #[must_use]
            pub fn builder() -> ::jsk_flags::RegistryBuilder {
                ::jsk_flags::FlagRegistry::builder() #prefix .flags(Self::specs())
            }

            /// Declares the flags against the process environment.
            ///
            /// # Errors
            /// Returns [`::jsk_flags::FlagError::Declaration`] if the schema is malformed.
            pub fn new() -> ::jsk_flags::Result<Self> {
                Self::builder().build().map(Self::from_registry)
            }

            #[must_use]
            pub const fn from_registry(registry: ::jsk_flags::FlagRegistry) -> Self {
                Self { registry }
            }

            #[must_use]
            pub const fn registry(&self) -> &::jsk_flags::FlagRegistry {
                &self.registry
            }

            #(#accessors)*
        }
    })
}

fn parse_args(args: TokenStream) -> syn::Result<Option<LitStr>> {
    let mut prefix = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("prefix") {
            prefix = Some(meta.value()?.parse::<LitStr>()?);
            Ok(())
        } else {
            Err(meta.error("unsupported flag_set argument"))
        }
    });
    parser.parse2(args)?;
    Ok(prefix)
}

fn parse_field(field: &syn::Field) -> syn::Result<FlagField> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "flag fields must be named"));
    };

    let type_name = match &field.ty {
        Type::Path(path) if path.qself.is_none() => {
            path.path.segments.last().map(|seg| seg.ident.to_string())
        },
        _ => None,
    };
    if !type_name.is_some_and(|name| SUPPORTED_TYPES.contains(&name.as_str())) {
        return Err(syn::Error::new_spanned(
            &field.ty,
            "unsupported flag type; expected one of bool, i64, f64, String",
        ));
    }

    let mut flag = FlagField {
        name: LitStr::new(&default_name(&ident), Span::call_site()),
        ident,
        ty: field.ty.clone(),
        docs: field.attrs.iter().filter(|attr| attr.path().is_ident("doc")).cloned().collect(),
        default: None,
        computed: None,
        handler: None,
    };

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("flag")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                flag.name = meta.value()?.parse()?;
            } else if meta.path.is_ident("default") {
                flag.default = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("computed") {
                flag.computed = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("handler") {
                flag.handler = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("expected `name`, `default`, `computed` or `handler`"));
            }
            Ok(())
        })?;
    }

    if flag.default.is_some() && flag.computed.is_some() {
        return Err(syn::Error::new_spanned(
            &flag.ident,
            "a flag takes either `default` or `computed`, not both",
        ));
    }

    Ok(flag)
}

fn default_name(ident: &Ident) -> String {
    let raw = ident.to_string();
    raw.trim_start_matches("r#").to_uppercase()
}

fn const_ident(flag: &FlagField) -> Ident {
    format_ident!("{}", default_name(&flag.ident))
}

fn spec_expr(flag: &FlagField) -> TokenStream {
    let name = &flag.name;
    let ty = &flag.ty;

    let default = flag.default.as_ref().map(|expr| quote! { .default_value(<#ty>::from(#expr)) });
    let computed = flag.computed.as_ref().map(|path| quote! { .computed::<#ty, _>(#path) });
    let handler = flag.handler.as_ref().map(|path| quote! { .handler(#path) });

    quote! { ::jsk_flags::FlagSpec::of::<#ty>(#name) #default #computed #handler }
}

fn accessors(flag: &FlagField) -> TokenStream {
    let getter = &flag.ident;
    let setter = format_ident!("set_{}", default_name(&flag.ident).to_lowercase());
    let konst = const_ident(flag);
    let ty = &flag.ty;
    let docs = &flag.docs;

    quote! {
        #(#docs)*
        ///
        /// # Errors
        /// Propagates resolution failures from the underlying registry.
        pub fn #getter(&self) -> ::jsk_flags::Result<#ty> {
            self.registry.get_as::<#ty>(Self::#konst)
        }

        /// Stores a standing override for this flag.
        ///
        /// # Errors
        /// Propagates failures from [`::jsk_flags::FlagRegistry::set`].
        pub fn #setter(&self, value: impl Into<#ty>) -> ::jsk_flags::Result<()> {
            self.registry.set(Self::#konst, value.into())
        }
    }
}
