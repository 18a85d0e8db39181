mod attrs;
mod impls;

use proc_macro::TokenStream;
use syn::{Error as SynError, ItemImpl};

/// Implements `Injectable` for the self type of an `impl` block.
///
/// Every associated function annotated with `#[inject]` becomes a constructor,
/// in declaration order. Its parameters must be `Arc<T>`, or `Vec<Arc<T>>`
/// when annotated with `#[all]`, and it must return `Self` or
/// `Result<Self, E>`. A parameter bound to an identifier is named after it.
/// Any other pattern leaves it unnamed, and the container never picks a
/// constructor with an unnamed parameter.
///
/// `#[injectable(implements(dyn A, dyn B))]` additionally lets the type be
/// registered as the listed trait objects, and `#[injectable(dispose)]` marks
/// it as disposable.
#[proc_macro_attribute]
pub fn injectable(attr: TokenStream, item: TokenStream) -> TokenStream {
    let expanded = attrs::parse_attributes(attr).and_then(|attr_data| {
        let impls = syn::parse::<ItemImpl>(item)
            .map_err(|err| SynError::new(err.span(), impls::NOT_INHERENT_ERROR))?;
        impls::expand_implementation(impls, attr_data)
    });

    expanded.unwrap_or_else(SynError::into_compile_error).into()
}
