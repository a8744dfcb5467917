//! Parser for calibration programs.
//!
//! A program is a sequence of blocks. The header sits at column zero and
//! every indented line below it belongs to the body:
//!
//! ```text
//! DEFFRAME 31 "rf":
//!     SAMPLE-RATE: 1e9
//! DEFCAL CZ 31 32:
//!     FENCE
//!     # entangling pulse
//!     NONBLOCKING PULSE 31 32 "cz" flat(duration: 1.6e-7, iq: 1.0)
//!     FENCE 31 32
//! ```
//!
//! Only `DEFCAL` blocks are collected. Any other top-level line (frame and
//! waveform definitions, declarations, gates) is skipped together with its
//! indented body. Comment lines inside a `DEFCAL` body are kept as
//! [`CalInstruction::Other`]; blank lines are not.

use qfence_ir::QubitId;
use tracing::debug;

use crate::calibration::{CalInstruction, CalibrationDefinition, CalibrationSet, Fence, FrameOpKind};
use crate::error::{IsaError, IsaResult};
use crate::lexer::{SpannedToken, Token, first_token, tokenize};

/// Parse a calibration program. A later definition for the same operator
/// and operands overrides an earlier one.
pub fn parse_calibrations(source: &str) -> IsaResult<CalibrationSet> {
    let mut set = CalibrationSet::new();
    let mut current = Block::Idle;
    let mut skipped = 0usize;

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        if raw.starts_with([' ', '\t']) {
            match &mut current {
                Block::Definition(pending) => pending.body.push(parse_body_line(trimmed, line)?),
                Block::Foreign => {}
                Block::Idle if trimmed.starts_with('#') => {}
                Block::Idle => {
                    return Err(IsaError::UnexpectedToken {
                        line,
                        expected: "DEFCAL".into(),
                        found: trimmed.split_whitespace().next().unwrap_or_default().into(),
                    });
                }
            }
            continue;
        }

        if trimmed.starts_with('#') {
            continue;
        }
        if let Block::Definition(done) = std::mem::replace(&mut current, Block::Idle) {
            set.insert(done.finish()?);
        }
        let is_defcal = matches!(
            first_token(trimmed),
            Some(Ok(SpannedToken {
                token: Token::Defcal,
                ..
            }))
        );
        current = if is_defcal {
            Block::Definition(HeaderParser::new(raw, line)?.parse_header()?)
        } else {
            skipped += 1;
            Block::Foreign
        };
    }

    if let Block::Definition(done) = current {
        set.insert(done.finish()?);
    }

    if skipped > 0 {
        debug!(skipped, definitions = set.len(), "skipped non-DEFCAL blocks");
    }
    Ok(set)
}

/// The block the following indented lines belong to.
enum Block {
    /// Nothing open yet.
    Idle,
    /// A `DEFCAL` whose body is being collected.
    Definition(PendingDefinition),
    /// Some other top-level statement; its body is skipped.
    Foreign,
}

/// A header whose body is still being collected.
struct PendingDefinition {
    name: String,
    parameters: Vec<String>,
    operands: Vec<QubitId>,
    body: Vec<CalInstruction>,
}

impl PendingDefinition {
    fn finish(self) -> IsaResult<CalibrationDefinition> {
        CalibrationDefinition::new(self.name, self.parameters, self.operands, self.body)
    }
}

/// Token cursor over one header line.
struct HeaderParser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    line: usize,
}

impl HeaderParser {
    fn new(source: &str, line: usize) -> IsaResult<Self> {
        let mut tokens = Vec::new();
        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, message)) => {
                    return Err(IsaError::Lexer {
                        line,
                        message: format!("{message} at column {}", span.start + 1),
                    });
                }
            }
        }
        Ok(Self {
            tokens,
            pos: 0,
            line,
        })
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    fn eof(&self, message: &str) -> IsaError {
        IsaError::UnexpectedEof {
            line: self.line,
            message: message.into(),
        }
    }

    fn unexpected(&self, expected: &str, found: &Token) -> IsaError {
        IsaError::UnexpectedToken {
            line: self.line,
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    #[allow(clippy::needless_pass_by_value)]
    fn expect(&mut self, expected: Token) -> IsaResult<()> {
        let found = self
            .advance()
            .ok_or_else(|| self.eof(&format!("expected {expected}")))?;
        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(self.unexpected(&expected.to_string(), &found));
        }
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// `DEFCAL <name>[(%p, ...)] <site>*:`
    fn parse_header(&mut self) -> IsaResult<PendingDefinition> {
        self.expect(Token::Defcal)?;

        let name = match self.advance() {
            Some(Token::Identifier(name)) => name,
            Some(other) => return Err(self.unexpected("operator name", &other)),
            None => return Err(self.eof("expected operator name")),
        };

        let mut parameters = Vec::new();
        if self.consume(&Token::LParen) {
            loop {
                match self.advance() {
                    Some(Token::Parameter(p)) => parameters.push(p),
                    Some(other) => return Err(self.unexpected("%parameter", &other)),
                    None => return Err(self.eof("expected %parameter")),
                }
                if !self.consume(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        }

        let mut operands = Vec::new();
        while let Some(Token::IntLiteral(site)) = self.peek() {
            operands.push(QubitId(*site));
            self.advance();
        }

        self.expect(Token::Colon)?;
        if let Some(trailing) = self.advance() {
            return Err(self.unexpected("end of line", &trailing));
        }
        debug_assert!(self.is_eof());

        Ok(PendingDefinition {
            name,
            parameters,
            operands,
            body: Vec::new(),
        })
    }
}

/// Parse one trimmed body line.
fn parse_body_line(text: &str, line: usize) -> IsaResult<CalInstruction> {
    let Some(Ok(first)) = first_token(text) else {
        return Ok(CalInstruction::Other(text.to_string()));
    };
    let rest = |span_end: usize| text[span_end..].trim().to_string();

    let instruction = match first.token {
        Token::Fence => CalInstruction::Fence(parse_fence_sites(&text[first.span.end..], line)?),
        Token::Pulse => CalInstruction::Pulse {
            nonblocking: false,
            args: rest(first.span.end),
        },
        Token::Nonblocking => {
            let after = &text[first.span.end..];
            match first_token(after) {
                Some(Ok(SpannedToken {
                    token: Token::Pulse,
                    span,
                })) => CalInstruction::Pulse {
                    nonblocking: true,
                    args: after[span.end..].trim().to_string(),
                },
                Some(Ok(other)) => {
                    return Err(IsaError::UnexpectedToken {
                        line,
                        expected: "PULSE".into(),
                        found: other.token.to_string(),
                    });
                }
                Some(Err((_, message))) => return Err(IsaError::Lexer { line, message }),
                None => {
                    return Err(IsaError::UnexpectedEof {
                        line,
                        message: "expected PULSE after NONBLOCKING".into(),
                    });
                }
            }
        }
        Token::SetFrequency => frame(FrameOpKind::SetFrequency, rest(first.span.end)),
        Token::ShiftFrequency => frame(FrameOpKind::ShiftFrequency, rest(first.span.end)),
        Token::SetPhase => frame(FrameOpKind::SetPhase, rest(first.span.end)),
        Token::ShiftPhase => frame(FrameOpKind::ShiftPhase, rest(first.span.end)),
        Token::SetScale => frame(FrameOpKind::SetScale, rest(first.span.end)),
        Token::SwapPhases => frame(FrameOpKind::SwapPhases, rest(first.span.end)),
        Token::Delay => CalInstruction::Delay {
            args: rest(first.span.end),
        },
        Token::Capture => CalInstruction::Capture {
            raw: false,
            args: rest(first.span.end),
        },
        Token::RawCapture => CalInstruction::Capture {
            raw: true,
            args: rest(first.span.end),
        },
        _ => CalInstruction::Other(text.to_string()),
    };

    Ok(instruction)
}

fn frame(op: FrameOpKind, args: String) -> CalInstruction {
    CalInstruction::Frame { op, args }
}

/// Sites following `FENCE`. None means a global fence.
fn parse_fence_sites(rest: &str, line: usize) -> IsaResult<Fence> {
    let mut sites = Vec::new();
    for result in tokenize(rest) {
        match result {
            Ok(SpannedToken {
                token: Token::IntLiteral(site),
                ..
            }) => sites.push(QubitId(site)),
            Ok(other) => {
                return Err(IsaError::UnexpectedToken {
                    line,
                    expected: "site index".into(),
                    found: other.token.to_string(),
                });
            }
            Err((_, message)) => return Err(IsaError::Lexer { line, message }),
        }
    }

    Ok(if sites.is_empty() {
        Fence::Global
    } else {
        Fence::Scoped(sites)
    })
}
