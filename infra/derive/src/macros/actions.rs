use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Attribute, Fields, Ident, ItemStruct, LitStr, Type};

const RESERVED: &[&str] = &["bus", "teardown", "create"];
/// Derives the generated surface already provides.
const GENERATED_DERIVES: &[&str] = &["Clone", "Debug"];

struct ActionField<'a> {
    ident: &'a Ident,
    value: &'a Type,
    input: Type,
    docs: Vec<&'a Attribute>,
}

pub fn expand_actions(args: TokenStream, input: ItemStruct) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new_spanned(args, "actions takes no arguments").to_compile_error();
    }
    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &ItemStruct) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "actions does not support generic action sets",
        ));
    }
    let Fields::Named(fields) = &input.fields else {
        return Err(syn::Error::new_spanned(
            &input.fields,
            "actions requires a struct with named fields, one per action",
        ));
    };

    let actions = fields.named.iter().map(parse_field).collect::<syn::Result<Vec<_>>>()?;
    check_names(&actions)?;
    check_derives(&input.attrs)?;

    let vis = &input.vis;
    let name = &input.ident;
    let outer_attrs = input.attrs.iter().filter(|attr| !attr.path().is_ident("derive"));

    let idents: Vec<_> = actions.iter().map(|a| a.ident).collect();
    let labels: Vec<_> = actions.iter().map(|a| LitStr::new(&label(a.ident), a.ident.span())).collect();
    let values: Vec<_> = actions.iter().map(|a| a.value).collect();
    let inputs: Vec<_> = actions.iter().map(|a| &a.input).collect();

    let dispatch_fns = actions.iter().map(|a| {
        let ident = a.ident;
        let input = &a.input;
        let docs = &a.docs;
        quote! {
            #(#docs)*
            pub fn #ident(&self, args: #input) -> ::core::result::Result<(), ::actbus::BusError> {
                self.#ident.call(args)
            }
        }
    });

    let stream_fns = actions.iter().map(|a| {
        let ident = a.ident;
        let stream = stream_ident(ident);
        let value = a.value;
        let doc = format!(" Stream accessor for `{}$`.", label(ident));
        quote! {
            #[doc = #doc]
            pub fn #stream(&self) -> ::core::result::Result<::actbus::ActionStream<#value>, ::actbus::BusError> {
                self.#ident.stream()
            }
        }
    });

    Ok(quote! {
        #(#outer_attrs)*
        #[derive(Clone)]
        #vis struct #name {
            bus: ::actbus::ActionBus,
            #( #idents: ::actbus::Dispatcher<#inputs, #values>, )*
        }

        #[automatically_derived]
        impl #name {
            /// Declared action names, in declaration order.
            pub const ACTIONS: &'static [&'static str] = &[#(#labels),*];

            /// Builds the surface over `bus`, binding each action to its transform.
            ///
            /// No channel is created here; channels appear on first dispatch or stream access.
            ///
            /// # Errors
            /// Returns [`::actbus::BusError::TypeMismatch`] if a transform registered for a
            /// declared action has different argument or value types.
            pub fn create(
                bus: &::actbus::ActionBus,
                transforms: &::actbus::TransformTable,
            ) -> ::core::result::Result<Self, ::actbus::BusError> {
                ::core::result::Result::Ok(Self {
                    bus: ::core::clone::Clone::clone(bus),
                    #( #idents: bus.dispatcher::<#inputs, #values>(#labels, transforms)?, )*
                })
            }

            #(#dispatch_fns)*

            #(#stream_fns)*

            /// The bus this surface dispatches on.
            pub const fn bus(&self) -> &::actbus::ActionBus {
                &self.bus
            }

            /// Closes every channel of the underlying bus. See [`::actbus::ActionBus::teardown`].
            pub fn teardown(&self) -> usize {
                self.bus.teardown()
            }
        }

        #[automatically_derived]
        impl ::core::fmt::Debug for #name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct(stringify!(#name))
                    .field("actions", &Self::ACTIONS)
                    .field("bus", &self.bus)
                    .finish()
            }
        }
    })
}

fn parse_field(field: &syn::Field) -> syn::Result<ActionField<'_>> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "action fields must be named"));
    };

    let mut input = None;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("input") {
                input = Some(meta.value()?.parse::<Type>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported action option, expected `input = Type`"))
            }
        })?;
    }

    Ok(ActionField {
        ident,
        value: &field.ty,
        input: input.unwrap_or_else(|| field.ty.clone()),
        docs: field.attrs.iter().filter(|attr| attr.path().is_ident("doc")).collect(),
    })
}

fn check_names(actions: &[ActionField<'_>]) -> syn::Result<()> {
    let declared: FxHashSet<String> = actions.iter().map(|a| label(a.ident)).collect();

    for action in actions {
        let name = label(action.ident);
        if RESERVED.contains(&name.as_str()) {
            return Err(syn::Error::new_spanned(
                action.ident,
                format!("`{name}` is reserved on generated action surfaces"),
            ));
        }
        let stream = stream_ident(action.ident).to_string();
        if declared.contains(&stream) {
            return Err(syn::Error::new_spanned(
                action.ident,
                format!("stream accessor `{stream}` collides with a declared action"),
            ));
        }
    }
    Ok(())
}

fn check_derives(attrs: &[Attribute]) -> syn::Result<()> {
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        attr.parse_nested_meta(|meta| {
            let name = meta.path.get_ident().map(ToString::to_string).unwrap_or_default();
            if GENERATED_DERIVES.contains(&name.as_str()) {
                Ok(())
            } else {
                Err(meta.error("action surfaces only derive `Clone` and `Debug`, which are generated"))
            }
        })?;
    }
    Ok(())
}

/// The action name, without any `r#` prefix.
fn label(ident: &Ident) -> String {
    ident.unraw().to_string()
}

fn stream_ident(ident: &Ident) -> Ident {
    format_ident!("{}_stream", ident.unraw())
}
