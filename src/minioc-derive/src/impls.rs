use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::spanned::Spanned;
use syn::visit_mut::{self, VisitMut};
use syn::{
    AngleBracketedGenericArguments, Attribute, Error as SynError, FnArg, GenericArgument, Ident,
    ImplItem, ImplItemFn, ItemImpl, Pat, PathArguments, Result as SynResult, ReturnType, Type,
    TypePath,
};

use crate::attrs::AttributeData;

pub const NOT_INHERENT_ERROR: &str = "`#[injectable]` should be annotated on an inherent `impl` block";

const RETURN_TYPE_ERROR: &str = "a constructor's return type should be `Self` or `Result<Self, E>`";

#[derive(Debug)]
struct ConstructorData {
    identifier: Ident,
    arguments: Vec<ArgumentData>,
    return_type: ReturnTypeData,
}

#[derive(Debug)]
struct ArgumentData {
    span: Span,
    name: Option<String>,
    kind: ArgumentKind,
    target: Type,
}

#[derive(Debug)]
enum ArgumentKind {
    Single,
    All,
}

#[derive(Debug)]
enum ReturnTypeData {
    Infallible,
    Result,
}

struct AttributeRemovalVisitor;

impl AttributeRemovalVisitor {
    fn is_custom_attribute(attr: &Attribute) -> bool {
        attr.path().is_ident("inject") || attr.path().is_ident("all")
    }
}

impl VisitMut for AttributeRemovalVisitor {
    fn visit_attributes_mut(&mut self, attrs: &mut Vec<Attribute>) {
        attrs.retain(|attr| !Self::is_custom_attribute(attr));
        attrs
            .iter_mut()
            .for_each(|attr| visit_mut::visit_attribute_mut(self, attr));
    }
}

pub fn expand_implementation(
    mut impls: ItemImpl,
    attr_data: AttributeData,
) -> SynResult<TokenStream2> {
    if let Some((_, path, _)) = &impls.trait_ {
        return Err(SynError::new(path.span(), NOT_INHERENT_ERROR));
    }

    let self_type = get_self_type(&impls)?;
    let constructors = impls
        .items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(is_annotated_with_inject)
        .map(|item_fn| parse_constructor(item_fn, &self_type))
        .collect::<SynResult<Vec<_>>>()?;

    let expanded = expand_injectable_implementation(&impls, &constructors, &attr_data);

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_impl_mut(&mut impls);

    Ok(quote! {
        #impls
        #expanded
    })
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn is_annotated_with_inject(item_fn: &&ImplItemFn) -> bool {
    item_fn.attrs.iter().any(|attr| attr.path().is_ident("inject"))
}

fn parse_constructor(item_fn: &ImplItemFn, self_type: &TypePath) -> SynResult<ConstructorData> {
    let signature = &item_fn.sig;
    if let Some(FnArg::Receiver(rec)) = signature.inputs.first() {
        return Err(SynError::new(
            rec.span(),
            "method is not allowed to be annotated with `#[inject]`",
        ));
    }
    if let Some(asyncness) = &signature.asyncness {
        return Err(SynError::new(
            asyncness.span(),
            "async function is not allowed to be annotated with `#[inject]`",
        ));
    }

    let arguments = signature
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Typed(arg) => parse_argument(arg),
            FnArg::Receiver(_) => unreachable!("a constructor should not have a receiver argument"),
        })
        .collect::<SynResult<Vec<_>>>()?;
    let return_type = parse_constructor_return_type(&signature.output, self_type)?;

    Ok(ConstructorData {
        identifier: signature.ident.clone(),
        arguments,
        return_type,
    })
}

fn parse_argument(arg: &syn::PatType) -> SynResult<ArgumentData> {
    let kind = if arg.attrs.iter().any(|attr| attr.path().is_ident("all")) {
        ArgumentKind::All
    } else {
        ArgumentKind::Single
    };

    let name = match arg.pat.as_ref() {
        Pat::Ident(ident) => Some(ident.ident.to_string()),
        _ => None,
    };

    let target = match kind {
        ArgumentKind::Single => generic_argument_of(&arg.ty, "Arc").ok_or_else(|| {
            SynError::new(arg.ty.span(), "a constructor parameter should be `Arc<T>`")
        })?,
        ArgumentKind::All => generic_argument_of(&arg.ty, "Vec")
            .and_then(|element| generic_argument_of(&element, "Arc"))
            .ok_or_else(|| {
                SynError::new(
                    arg.ty.span(),
                    "a parameter annotated with `#[all]` should be `Vec<Arc<T>>`",
                )
            })?,
    };

    Ok(ArgumentData {
        span: arg.span(),
        name,
        kind,
        target,
    })
}

/// Extracts `T` from a path type ending in `wrapper<T>`.
fn generic_argument_of(ty: &Type, wrapper: &str) -> Option<Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    if last.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }) =
        &last.arguments
    else {
        return None;
    };
    match args.first() {
        Some(GenericArgument::Type(ty)) if args.len() == 1 => Some(ty.clone()),
        _ => None,
    }
}

fn is_self_type(ty: &Type, self_type: &TypePath) -> bool {
    match ty {
        Type::Path(path) => path == self_type || path.path.is_ident("Self"),
        _ => false,
    }
}

fn parse_constructor_return_type(
    output: &ReturnType,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let ReturnType::Type(_, return_type) = output else {
        return Err(SynError::new(output.span(), RETURN_TYPE_ERROR));
    };

    if is_self_type(return_type, self_type) {
        return Ok(ReturnTypeData::Infallible);
    }

    let Type::Path(path) = return_type.as_ref() else {
        return Err(SynError::new(return_type.span(), RETURN_TYPE_ERROR));
    };
    let Some(last) = path
        .path
        .segments
        .last()
        .filter(|segment| segment.ident == "Result")
    else {
        return Err(SynError::new(return_type.span(), RETURN_TYPE_ERROR));
    };
    let PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }) =
        &last.arguments
    else {
        return Err(SynError::new(return_type.span(), RETURN_TYPE_ERROR));
    };

    match args.first() {
        Some(GenericArgument::Type(ok_type))
            if args.len() == 2 && is_self_type(ok_type, self_type) =>
        {
            Ok(ReturnTypeData::Result)
        }
        _ => Err(SynError::new(return_type.span(), RETURN_TYPE_ERROR)),
    }
}

fn expand_constructor(constructor: &ConstructorData) -> TokenStream2 {
    let identifier = &constructor.identifier;

    let parameters = constructor
        .arguments
        .iter()
        .map(|arg| {
            let target = &arg.target;
            match (&arg.kind, &arg.name) {
                (ArgumentKind::Single, Some(name)) => quote! {
                    ::minioc::introspect::ParameterInfo::new::<#target>(#name),
                },
                (ArgumentKind::Single, None) => quote! {
                    ::minioc::introspect::ParameterInfo::unnamed::<#target>(),
                },
                (ArgumentKind::All, name) => {
                    let name = name.as_deref().unwrap_or("_");
                    quote! {
                        ::minioc::introspect::ParameterInfo::all::<#target>(#name),
                    }
                }
            }
        })
        .collect::<TokenStream2>();

    let get_dep_statements = constructor
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            let target = &arg.target;
            match arg.kind {
                ArgumentKind::Single => quote! { let #dep = args.next::<#target>()?; },
                ArgumentKind::All => quote! { let #dep = args.next_all::<#target>()?; },
            }
        })
        .collect::<TokenStream2>();

    let dep_args = constructor
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            quote! { #dep, }
        })
        .collect::<TokenStream2>();

    let wire_deps = match constructor.return_type {
        ReturnTypeData::Infallible => quote! { Ok(Self::#identifier(#dep_args)) },
        ReturnTypeData::Result => quote! {
            Self::#identifier(#dep_args).map_err(::std::convert::Into::into)
        },
    };

    quote! {
        .constructor(
            ::std::vec![#parameters],
            |args: &mut ::minioc::introspect::Arguments| -> ::std::result::Result<
                Self,
                ::minioc::introspect::BoxError,
            > {
                #get_dep_statements
                #wire_deps
            },
        )
    }
}

fn expand_injectable_implementation(
    impls: &ItemImpl,
    constructors: &[ConstructorData],
    attr_data: &AttributeData,
) -> TokenStream2 {
    let self_type = &impls.self_ty;
    let (impl_generics, _, where_clause) = impls.generics.split_for_impl();

    let constructors = constructors
        .iter()
        .map(expand_constructor)
        .collect::<TokenStream2>();

    let disposable = if attr_data.disposable {
        quote! { .disposable() }
    } else {
        quote! {}
    };

    let upcasts = attr_data
        .interfaces
        .iter()
        .map(|interface| {
            quote! {
                impl #impl_generics ::minioc::introspect::Upcast<#interface> for #self_type
                #where_clause
                {
                    fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<#interface> {
                        self
                    }
                }
            }
        })
        .collect::<TokenStream2>();

    quote! {
        impl #impl_generics ::minioc::introspect::Injectable for #self_type #where_clause {
            fn type_info() -> ::minioc::introspect::TypeInfo {
                ::minioc::introspect::TypeInfo::concrete::<Self>()
                    #constructors
                    #disposable
                    .build()
            }
        }

        #upcasts
    }
}
