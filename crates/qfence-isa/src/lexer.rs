//! Lexer for calibration programs.
//!
//! Calibration programs are line oriented, so the parser lexes one line at
//! a time. Body lines are only lexed far enough to recognise their keyword;
//! the remainder is sliced verbatim out of the source using the token span.

use logos::Logos;

/// Tokens of a calibration program line.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    // Block headers
    #[token("DEFCAL")]
    Defcal,

    // Body keywords
    #[token("FENCE")]
    Fence,

    #[token("NONBLOCKING")]
    Nonblocking,

    #[token("PULSE")]
    Pulse,

    #[token("SET-FREQUENCY")]
    SetFrequency,

    #[token("SHIFT-FREQUENCY")]
    ShiftFrequency,

    #[token("SET-PHASE")]
    SetPhase,

    #[token("SHIFT-PHASE")]
    ShiftPhase,

    #[token("SET-SCALE")]
    SetScale,

    #[token("SWAP-PHASES")]
    SwapPhases,

    #[token("DELAY")]
    Delay,

    #[token("CAPTURE")]
    Capture,

    #[token("RAW-CAPTURE")]
    RawCapture,

    // Literals
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u32>().ok())]
    IntLiteral(u32),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len()-1].to_string())
    })]
    StringLiteral(String),

    /// A formal parameter such as `%theta`.
    #[regex(r"%[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Parameter(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Punctuation
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token("-")]
    Minus,

    #[token("+")]
    Plus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Defcal => write!(f, "DEFCAL"),
            Token::Fence => write!(f, "FENCE"),
            Token::Nonblocking => write!(f, "NONBLOCKING"),
            Token::Pulse => write!(f, "PULSE"),
            Token::SetFrequency => write!(f, "SET-FREQUENCY"),
            Token::ShiftFrequency => write!(f, "SHIFT-FREQUENCY"),
            Token::SetPhase => write!(f, "SET-PHASE"),
            Token::ShiftPhase => write!(f, "SHIFT-PHASE"),
            Token::SetScale => write!(f, "SET-SCALE"),
            Token::SwapPhases => write!(f, "SWAP-PHASES"),
            Token::Delay => write!(f, "DELAY"),
            Token::Capture => write!(f, "CAPTURE"),
            Token::RawCapture => write!(f, "RAW-CAPTURE"),
            Token::FloatLiteral(v) => write!(f, "{v}"),
            Token::IntLiteral(v) => write!(f, "{v}"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Parameter(s) => write!(f, "%{s}"),
            Token::Identifier(s) => write!(f, "{s}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Minus => write!(f, "-"),
            Token::Plus => write!(f, "+"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
        }
    }
}

/// A token with its span information.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Tokenize one line of a calibration program.
pub fn tokenize(line: &str) -> Vec<Result<SpannedToken, (std::ops::Range<usize>, String)>> {
    let mut lexer = Token::lexer(line);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        if let Ok(token) = result {
            tokens.push(Ok(SpannedToken { token, span }));
        } else {
            let slice = &line[span.clone()];
            tokens.push(Err((span, format!("Invalid token: '{slice}'"))));
        }
    }

    tokens
}

/// Lex only the first token of a line, returning it with its span.
pub fn first_token(line: &str) -> Option<Result<SpannedToken, (std::ops::Range<usize>, String)>> {
    let mut lexer = Token::lexer(line);
    let result = lexer.next()?;
    let span = lexer.span();
    Some(match result {
        Ok(token) => Ok(SpannedToken { token, span }),
        Err(()) => {
            let slice = &line[span.clone()];
            Err((span, format!("Invalid token: '{slice}'")))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<Token> {
        tokenize(line)
            .into_iter()
            .filter_map(Result::ok)
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_header_tokens() {
        assert_eq!(
            tokens("DEFCAL CZ 31 32:"),
            vec![
                Token::Defcal,
                Token::Identifier("CZ".into()),
                Token::IntLiteral(31),
                Token::IntLiteral(32),
                Token::Colon,
            ]
        );
    }

    #[test]
    fn test_parameterized_header() {
        assert_eq!(
            tokens("DEFCAL RX(%theta) 0:"),
            vec![
                Token::Defcal,
                Token::Identifier("RX".into()),
                Token::LParen,
                Token::Parameter("theta".into()),
                Token::RParen,
                Token::IntLiteral(0),
                Token::Colon,
            ]
        );
    }

    #[test]
    fn test_hyphenated_keywords() {
        assert_eq!(tokens("SHIFT-PHASE")[0], Token::ShiftPhase);
        assert_eq!(tokens("RAW-CAPTURE")[0], Token::RawCapture);
        assert_eq!(
            tokens("SET-FREQUENCY 0 \"rf\" 5.1e9"),
            vec![
                Token::SetFrequency,
                Token::IntLiteral(0),
                Token::StringLiteral("rf".into()),
                Token::FloatLiteral(5.1e9),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(tokens("FENCE 0 # trailing"), vec![Token::Fence, Token::IntLiteral(0)]);
        assert!(tokens("# only a comment").is_empty());
    }

    #[test]
    fn test_first_token_span() {
        let line = "    NONBLOCKING PULSE 0 \"rf\" flat(iq: 1.0)";
        let first = first_token(line).unwrap().unwrap();
        assert_eq!(first.token, Token::Nonblocking);
        assert_eq!(&line[first.span], "NONBLOCKING");
    }
}
