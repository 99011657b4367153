mod error;
mod grammar;

pub use error::ParseError;

use crate::Expr;

/// Parse applicability expression text into an unresolved [`Expr`].
///
/// # Errors
///
/// Returns [`ParseError`] on unbalanced parentheses, empty operands, unknown
/// operator tokens, or trailing input after a complete expression.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    use winnow::Parser;
    grammar::expression.parse(input).map_err(|e| {
        let offset = e.offset();
        let mut message = e.inner().to_string().replace('\n', "; ");
        if message.is_empty() {
            message = match input.get(offset..) {
                Some(rest) if !rest.is_empty() => format!("unexpected input '{rest}'"),
                _ => "unexpected end of input".to_owned(),
            };
        }
        ParseError::new(message, offset)
    })
}
