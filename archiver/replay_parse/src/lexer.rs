//! Archive-script tokenizer.

use logos::Logos;

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("new")]
    New,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"-?[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"-?[0-9]+[eE][+-]?[0-9]+")]
    Float,

    #[regex(r"-?[0-9]+")]
    Int,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,

    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

/// A token with its source span and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned<'src> {
    pub token: Token,
    pub text: &'src str,
    pub offset: usize,
}

/// Tokenize a source string.
///
/// Comments are dropped; an unrecognizable character yields `Err` with
/// its byte offset.
pub fn tokenize(source: &str) -> Result<Vec<Spanned<'_>>, usize> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::LineComment) => {}
            Ok(token) => tokens.push(Spanned {
                token,
                text: lexer.slice(),
                offset: lexer.span().start,
            }),
            Err(()) => return Err(lexer.span().start),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_statement() {
        let tokens = tokenize("Point0 = Point.new(3, -4); // done").unwrap();
        let kinds: Vec<Token> = tokens.iter().map(|t| t.token).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Ident,
                Token::Eq,
                Token::Ident,
                Token::Dot,
                Token::New,
                Token::LParen,
                Token::Int,
                Token::Comma,
                Token::Int,
                Token::RParen,
                Token::Semi,
            ]
        );
    }

    #[test]
    fn test_tokenize_literals() {
        let tokens = tokenize(r#"null true 2.5 1e9 "a\"b""#).unwrap();
        let kinds: Vec<Token> = tokens.iter().map(|t| t.token).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Null,
                Token::True,
                Token::Float,
                Token::Float,
                Token::Str,
            ]
        );
    }

    #[test]
    fn test_unrecognized_character() {
        assert_eq!(tokenize("a ? b"), Err(2));
    }
}
