//! Procedural macros for annotation_models
//!
//! `#[derive(AnnotationSchema)]` turns a struct with named fields into an
//! annotation schema:
//!
//! ```ignore
//! #[derive(AnnotationSchema)]
//! #[annotation(name = "synapse")]
//! struct Synapse {
//!     #[annotation(nested)]
//!     pre_pt: BoundSpatialPoint,
//!     size: f32,
//! }
//! ```
//!
//! Struct attributes: `name = ".."`, `reference`.
//! Field attributes: `rename = ".."`, `index`, `drop_column`, `nested`,
//! `numeric`, `postgis_geometry = ".."`, `reference_type = ".."`.

use inflector::Inflector;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, LitStr,
    PathArguments, Type,
};

/// Derive `annotation_models::schema::AnnotationSchema`
#[proc_macro_derive(AnnotationSchema, attributes(annotation))]
pub fn derive_annotation_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct SchemaArgs {
    name: Option<String>,
    reference: bool,
}

#[derive(Default)]
struct FieldArgs {
    rename: Option<String>,
    index: bool,
    drop_column: bool,
    nested: bool,
    numeric: bool,
    postgis_geometry: Option<String>,
    reference_type: Option<String>,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "AnnotationSchema only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "AnnotationSchema only supports structs",
            ))
        }
    };

    let schema_args = parse_schema_args(&input.attrs)?;
    let schema_name = schema_args
        .name
        .unwrap_or_else(|| ident.to_string().to_snake_case());
    let reference = schema_args.reference;

    let mut inserts = Vec::new();
    for field in fields {
        let args = parse_field_args(&field.attrs)?;
        let field_ident = match &field.ident {
            Some(field_ident) => field_ident,
            None => continue,
        };
        let name = args
            .rename
            .clone()
            .unwrap_or_else(|| field_ident.to_string().trim_start_matches("r#").to_string());
        let kind = field_kind(&field.ty, &args);
        let index = args.index;
        let drop_column = args.drop_column;
        let postgis_geometry = optional_string(&args.postgis_geometry);
        let reference_type = optional_string(&args.reference_type);

        inserts.push(quote! {
            schema.fields.insert(
                ::std::string::String::from(#name),
                ::annotation_models::schema::Field {
                    kind: #kind,
                    metadata: ::annotation_models::schema::FieldMetadata {
                        index: #index,
                        drop_column: #drop_column,
                        postgis_geometry: #postgis_geometry,
                        reference_type: #reference_type,
                    },
                },
            );
        });
    }

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::annotation_models::schema::AnnotationSchema for #ident #ty_generics #where_clause {
            fn schema() -> ::annotation_models::schema::Schema {
                let mut schema = ::annotation_models::schema::Schema::new(#schema_name);
                schema.reference = #reference;
                #(#inserts)*
                schema
            }
        }
    })
}

fn parse_schema_args(attrs: &[Attribute]) -> syn::Result<SchemaArgs> {
    let mut args = SchemaArgs::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("annotation")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                args.name = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("reference") {
                args.reference = true;
                Ok(())
            } else {
                Err(meta.error("unsupported annotation schema attribute"))
            }
        })?;
    }

    Ok(args)
}

fn parse_field_args(attrs: &[Attribute]) -> syn::Result<FieldArgs> {
    let mut args = FieldArgs::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("annotation")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                args.rename = Some(lit.value());
            } else if meta.path.is_ident("index") {
                args.index = true;
            } else if meta.path.is_ident("drop_column") {
                args.drop_column = true;
            } else if meta.path.is_ident("nested") {
                args.nested = true;
            } else if meta.path.is_ident("numeric") {
                args.numeric = true;
            } else if meta.path.is_ident("postgis_geometry") {
                let lit: LitStr = meta.value()?.parse()?;
                args.postgis_geometry = Some(lit.value());
            } else if meta.path.is_ident("reference_type") {
                let lit: LitStr = meta.value()?.parse()?;
                args.reference_type = Some(lit.value());
            } else {
                return Err(meta.error("unsupported annotation field attribute"));
            }
            Ok(())
        })?;
    }

    Ok(args)
}

fn optional_string(value: &Option<String>) -> TokenStream2 {
    match value {
        Some(value) => quote!(::core::option::Option::Some(::std::string::String::from(#value))),
        None => quote!(::core::option::Option::None),
    }
}

/// The `T` of `Wrapper<T>` when `ty` is that wrapper
fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn field_kind(ty: &Type, args: &FieldArgs) -> TokenStream2 {
    let ty = generic_inner(ty, "Option").unwrap_or(ty);

    if args.nested {
        let (inner, many) = match generic_inner(ty, "Vec") {
            Some(inner) => (inner, true),
            None => (ty, false),
        };
        return quote! {
            ::annotation_models::schema::FieldKind::Nested(::annotation_models::schema::NestedGroup {
                fields: <#inner as ::annotation_models::schema::AnnotationSchema>::schema().into_fields(),
                many: #many,
            })
        };
    }

    if args.numeric {
        return quote!(::annotation_models::schema::FieldKind::Numeric);
    }

    if let Some(items) = generic_inner(ty, "Vec") {
        let items = scalar_kind(items);
        return quote!(::annotation_models::schema::FieldKind::List(::std::boxed::Box::new(#items)));
    }

    scalar_kind(ty)
}

fn scalar_kind(ty: &Type) -> TokenStream2 {
    let ty = match ty {
        Type::Reference(reference) => &*reference.elem,
        other => other,
    };

    let ident = match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    };

    match ident.as_deref() {
        Some("i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "isize" | "usize") => {
            quote!(::annotation_models::schema::FieldKind::Integer)
        }
        // Segment ids overflow a signed 64-bit integer column
        Some("u64" | "u128" | "i128") => quote!(::annotation_models::schema::FieldKind::Numeric),
        Some("f32" | "f64") => quote!(::annotation_models::schema::FieldKind::Float),
        Some("String" | "str") => quote!(::annotation_models::schema::FieldKind::String),
        Some("bool") => quote!(::annotation_models::schema::FieldKind::Boolean),
        Some(other) => {
            quote!(::annotation_models::schema::FieldKind::Other(::std::string::String::from(#other)))
        }
        None => {
            let rendered = ty.to_token_stream().to_string();
            quote!(::annotation_models::schema::FieldKind::Other(::std::string::String::from(#rendered)))
        }
    }
}
