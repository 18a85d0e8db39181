use proc_macro::TokenStream;
use syn::meta;
use syn::parse::{Parse, Parser};
use syn::punctuated::Punctuated;
use syn::{parenthesized, Result as SynResult, Token, Type};

#[derive(Debug, Default)]
pub struct AttributeData {
    pub interfaces: Vec<Type>,
    pub disposable: bool,
}

pub fn parse_attributes(attr: TokenStream) -> SynResult<AttributeData> {
    let mut data = AttributeData::default();
    if attr.is_empty() {
        return Ok(data);
    }

    let parser = meta::parser(|meta| {
        if meta.path.is_ident("implements") {
            let content;
            parenthesized!(content in meta.input);
            let types: Punctuated<Type, Token![,]> =
                content.parse_terminated(Type::parse, Token![,])?;
            data.interfaces.extend(types);
            Ok(())
        } else if meta.path.is_ident("dispose") {
            data.disposable = true;
            Ok(())
        } else {
            Err(meta.error("expects `implements(...)` or `dispose`"))
        }
    });
    parser.parse(attr)?;

    Ok(data)
}
