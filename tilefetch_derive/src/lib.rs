//! Procedural macros shared by the tilefetch crates.
//!
//! The only macro is [`macro@context`], an attribute that attaches a formatted
//! [`anyhow`](https://docs.rs/anyhow) context message to every error returned by the
//! annotated function:
//!
//! ```ignore
//! #[context("opening archive '{}'", path.display())]
//! fn open(path: &Path) -> anyhow::Result<Archive> { ... }
//! ```
//!
//! Arguments are evaluated only when the function fails. Prefix the arguments with
//! `move,` when the formatted values have to be moved into the wrapped body.
//!
//! `classify = Path,` gives every failure one error kind: the error, rendered with its full
//! chain, becomes `Path(message)` and the context is added on top. `Path` is resolved where
//! the function is defined, typically a `TileError` variant carrying a message:
//!
//! ```ignore
//! #[context(classify = TileError::ServiceResolution, "resolving service '{}'", config.url)]
//! async fn connect(config: &SourceConfig) -> anyhow::Result<Service> { ... }
//! ```

mod args;

use crate::args::ContextArgs;
use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use quote::{ToTokens, quote};
use syn::{ItemFn, ReturnType, parse_macro_input};

#[proc_macro_attribute]
pub fn context(args: TokenStream, input: TokenStream) -> TokenStream {
	let args = parse_macro_input!(args as ContextArgs);
	let mut function = parse_macro_input!(input as ItemFn);

	let wrapped = if function.sig.asyncness.is_some() {
		match wrap_async(&function, &args) {
			Ok(body) => body,
			Err(err) => return err.to_compile_error().into(),
		}
	} else {
		wrap_sync(&function, &args)
	};

	function.block.stmts = vec![syn::Stmt::Expr(syn::Expr::Verbatim(wrapped), None)];
	function.into_token_stream().into()
}

fn wrap_async(function: &ItemFn, args: &ContextArgs) -> syn::Result<TokenStream2> {
	let ReturnType::Type(_, return_type) = &function.sig.output else {
		return Err(syn::Error::new_spanned(
			&function.sig,
			"#[context] requires the function to return a Result",
		));
	};
	let body = &function.block;
	let move_token = &args.move_token;
	let map_err = error_mapper(args);
	let result = Ident::new("__result", Span::mixed_site());

	Ok(quote! {
		let #result: #return_type = async #move_token #body.await;
		#result.map_err(#map_err)
	})
}

fn wrap_sync(function: &ItemFn, args: &ContextArgs) -> TokenStream2 {
	let body = &function.block;
	let return_type = &function.sig.output;
	let move_token = &args.move_token;
	let map_err = error_mapper(args);
	// A value moved into the closure makes it `FnOnce`, so the body may move out of captures.
	let once = Ident::new("__once", Span::mixed_site());

	quote! {
		let #once = ::core::iter::empty::<()>();
		(#move_token || #return_type {
			::core::mem::drop(#once);
			#body
		})().map_err(#map_err)
	}
}

/// The closure handed to `map_err`: optional classification, then the context message.
fn error_mapper(args: &ContextArgs) -> TokenStream2 {
	let message = &args.message;
	let err = Ident::new("__err", Span::mixed_site());

	match &args.classify {
		Some(kind) => quote! {
			|#err| ::anyhow::Error::from(#kind(format!("{:#}", #err)))
				.context(format!(#message))
				.into()
		},
		None => quote! {
			|#err| #err.context(format!(#message)).into()
		},
	}
}
