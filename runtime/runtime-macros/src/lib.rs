//! Builtin Command Macros
//!
//! Provides proc macros for registering shell builtins with minimal boilerplate:
//! - `#[shell_command]` - Marks a method as a builtin with a name and description
//! - `#[shell_commands]` - Generates `get_command()` and `list_commands()` for the impl block

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr};

/// Parsed arguments from #[shell_command(name = "...", description = "...")]
struct ShellCommandAttrArgs {
    name: String,
    description: String,
}

impl syn::parse::Parse for ShellCommandAttrArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut description = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<syn::Token![=]>()?;
            let value: LitStr = input.parse()?;

            match ident.to_string().as_str() {
                "name" => name = Some(value.value()),
                "description" => description = Some(value.value()),
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ))
                }
            }

            if input.peek(syn::Token![,]) {
                input.parse::<syn::Token![,]>()?;
            }
        }

        Ok(ShellCommandAttrArgs {
            name: name.ok_or_else(|| syn::Error::new(input.span(), "missing `name`"))?,
            description: description
                .ok_or_else(|| syn::Error::new(input.span(), "missing `description`"))?,
        })
    }
}

/// Attribute macro to mark a method as a shell builtin.
///
/// Only meaningful inside an impl block annotated with `#[shell_commands]`,
/// which consumes it. Used standalone it validates its arguments and passes
/// the method through untouched.
///
/// # Example
/// ```ignore
/// #[shell_command(name = "ls", description = "List VFS users")]
/// fn cmd_ls(args: &[&str], ctx: &mut CommandContext<'_>) -> io::Result<Intercept> { ... }
/// ```
#[proc_macro_attribute]
pub fn shell_command(attr: TokenStream, item: TokenStream) -> TokenStream {
    if let Err(e) = syn::parse::<ShellCommandAttrArgs>(attr) {
        return e.to_compile_error().into();
    }
    let func: ImplItemFn = parse_macro_input!(item as ImplItemFn);
    quote!(#func).into()
}

struct ShellCommandInfo {
    name: String,
    description: String,
    method_ident: Ident,
}

/// Parses builtin metadata from a #[shell_command(...)] attribute
fn parse_shell_command_attr(attr: &Attribute) -> Option<syn::Result<ShellCommandAttrArgs>> {
    if !attr.path().is_ident("shell_command") {
        return None;
    }
    Some(attr.parse_args())
}

/// Attribute macro to generate the builtin registry for an impl block.
///
/// This macro:
/// 1. Collects all methods marked with `#[shell_command]`
/// 2. Generates `get_command()` returning the handler for a builtin name
/// 3. Generates `list_commands()` returning `(name, description)` pairs in
///    declaration order
///
/// Handlers must have the `crate::shell::commands::CommandFn` signature.
///
/// # Example
/// ```ignore
/// #[shell_commands]
/// impl FsCommands {
///     #[shell_command(name = "mkdir", description = "Create a VFS user directory")]
///     fn cmd_mkdir(...) -> ... { }
/// }
/// ```
#[proc_macro_attribute]
pub fn shell_commands(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);

    let mut commands: Vec<ShellCommandInfo> = Vec::new();
    let mut methods: Vec<ImplItemFn> = Vec::new();
    let mut other_items: Vec<ImplItem> = Vec::new();

    for item in input.items {
        match item {
            ImplItem::Fn(mut method) => {
                for attr in &method.attrs {
                    match parse_shell_command_attr(attr) {
                        Some(Ok(args)) => commands.push(ShellCommandInfo {
                            name: args.name,
                            description: args.description,
                            method_ident: method.sig.ident.clone(),
                        }),
                        Some(Err(e)) => return e.to_compile_error().into(),
                        None => {}
                    }
                }

                method.attrs.retain(|a| !a.path().is_ident("shell_command"));
                methods.push(method);
            }
            other => other_items.push(other),
        }
    }

    let get_command_arms = commands.iter().map(|cmd| {
        let name = &cmd.name;
        let method_ident = &cmd.method_ident;
        quote! {
            #name => Some(Self::#method_ident as crate::shell::commands::CommandFn)
        }
    });

    let list_entries = commands.iter().map(|cmd| {
        let name = &cmd.name;
        let description = &cmd.description;
        quote! { (#name, #description) }
    });

    let self_ty = &input.self_ty;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let output = quote! {
        impl #impl_generics #self_ty #ty_generics #where_clause {
            #(#methods)*

            #(#other_items)*

            /// Get a builtin handler by name.
            pub fn get_command(name: &str) -> Option<crate::shell::commands::CommandFn> {
                match name {
                    #(#get_command_arms,)*
                    _ => None,
                }
            }

            /// List all builtins as `(name, description)` pairs.
            pub fn list_commands() -> &'static [(&'static str, &'static str)] {
                &[#(#list_entries),*]
            }
        }
    };

    output.into()
}
