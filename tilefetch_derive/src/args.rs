use proc_macro2::TokenStream;
use syn::{
	Path, Token,
	parse::{Parse, ParseStream, Result},
};

mod kw {
	syn::custom_keyword!(classify);
}

/// Arguments of `#[context(...)]`.
///
/// Optional leading options, each followed by a comma, then the `format!` arguments:
/// - `move` moves the body into the wrapper,
/// - `classify = Path` turns every error into `Path(message)` before the context is added.
pub struct ContextArgs {
	pub move_token: Option<Token![move]>,
	pub classify: Option<Path>,
	pub message: TokenStream,
}

impl Parse for ContextArgs {
	fn parse(input: ParseStream<'_>) -> Result<Self> {
		let mut move_token = None;
		let mut classify = None;

		loop {
			if input.peek(Token![move]) {
				if move_token.is_some() {
					return Err(input.error("`move` given twice"));
				}
				move_token = Some(input.parse::<Token![move]>()?);
			} else if input.peek(kw::classify) && input.peek2(Token![=]) {
				if classify.is_some() {
					return Err(input.error("`classify` given twice"));
				}
				input.parse::<kw::classify>()?;
				input.parse::<Token![=]>()?;
				classify = Some(input.parse::<Path>()?);
			} else {
				break;
			}
			input.parse::<Token![,]>()?;
		}

		if input.is_empty() {
			return Err(input.error("#[context] expects a format string"));
		}

		Ok(ContextArgs {
			move_token,
			classify,
			message: input.parse()?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::ContextArgs;
	use quote::ToTokens;
	use syn::parse_str;

	#[test]
	fn plain_message() {
		let args: ContextArgs = parse_str("\"reading {}\", path").unwrap();
		assert!(args.move_token.is_none());
		assert!(args.classify.is_none());
		assert_eq!(args.message.to_string(), "\"reading {}\" , path");
	}

	#[test]
	fn move_prefix() {
		let args: ContextArgs = parse_str("move, \"tile {coord:?}\"").unwrap();
		assert!(args.move_token.is_some());
		assert_eq!(args.message.to_string(), "\"tile {coord:?}\"");
	}

	#[test]
	fn classify_prefix() {
		let args: ContextArgs = parse_str("classify = TileError::Archive, move, \"opening {path:?}\"").unwrap();
		assert!(args.move_token.is_some());
		assert_eq!(
			args.classify.unwrap().to_token_stream().to_string(),
			"TileError :: Archive"
		);
		assert_eq!(args.message.to_string(), "\"opening {path:?}\"");
	}

	#[test]
	fn classify_is_a_plain_argument_without_equals() {
		let args: ContextArgs = parse_str("\"{}\", classify").unwrap();
		assert!(args.classify.is_none());
		assert_eq!(args.message.to_string(), "\"{}\" , classify");
	}

	#[test]
	fn malformed_options_are_rejected() {
		assert!(parse_str::<ContextArgs>("move \"x\"").is_err());
		assert!(parse_str::<ContextArgs>("classify = , \"x\"").is_err());
		assert!(parse_str::<ContextArgs>("move, move, \"x\"").is_err());
	}

	#[test]
	fn empty_is_rejected() {
		let err = parse_str::<ContextArgs>("").err().unwrap();
		assert!(err.to_string().contains("format string"));
		assert!(parse_str::<ContextArgs>("classify = Kind,").is_err());
	}
}
