pub mod tree;

mod block;
mod state;

use self::{
    block::Fragment,
    state::Context,
    tree::{
        BoolLiteral, Else, ElseIf, EndFor, EndIf, Expression, FloatLiteral, For, Ident, If, Infix,
        IntLiteral, Interpolation, Literal, Node, Prefix, StringLiteral, Trim,
    },
};
use super::{
    lex::{Lexer, Token, TokenKind},
    template::Template,
    Keyword, Operator,
};
use crate::log::{
    expected_keyword, unexpected_control, Error, INVALID_SYNTAX, UNEXPECTED_EOF, UNEXPECTED_TOKEN,
    UNRECOGNIZABLE_NUMBER,
};

use std::mem::replace;

/// Binding power of an expression, from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Or,
    And,
    Equals,
    LessGreater,
    Prefix,
}

impl Precedence {
    /// Return the [`Precedence`] of the given [`Operator`].
    fn of(operator: Operator) -> Self {
        match operator {
            Operator::Or => Self::Or,
            Operator::And => Self::And,
            Operator::Equal | Operator::NotEqual => Self::Equals,
            Operator::Greater
            | Operator::Lesser
            | Operator::GreaterOrEqual
            | Operator::LesserOrEqual => Self::LessGreater,
        }
    }
}

/// Reads tokens from a [`Lexer`] and builds a [`Template`].
pub struct Parser<'source> {
    /// [`Lexer`] supplying tokens.
    lexer: Lexer<'source>,
    /// The token being parsed.
    cursor: Token,
    /// The token after the cursor.
    peeked: Token,
}

impl<'source> Parser<'source> {
    /// Create a new [`Parser`] over the given source text.
    pub fn new(source: &'source str) -> Self {
        let mut lexer = Lexer::new(source);
        let cursor = lexer.next_token();
        let peeked = lexer.next_token();

        Self {
            lexer,
            cursor,
            peeked,
        }
    }

    /// Compile a [`Template`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source text has invalid syntax,
    /// describing the position of the offending tokens.
    pub fn compile(mut self) -> Result<Template<'source>, Error> {
        let mut nodes = Vec::new();

        while self.cursor.kind != TokenKind::Eof {
            match self.parse_fragment(Context::Root)? {
                Fragment::Node(node) => nodes.push(node),
                // Context::Root admits no closing tags.
                _ => unreachable!(),
            }
        }

        Ok(Template::new(nodes, self.lexer.source))
    }

    /// Parse the next [`Fragment`] of the template.
    ///
    /// Returns a [`Node`] for literals, interpolations and complete
    /// blocks, or the closing tag that ends the body being collected.
    fn parse_fragment(&mut self, context: Context) -> Result<Fragment, Error> {
        match self.cursor.kind {
            TokenKind::Literal => {
                let token = self.advance();

                Ok(Fragment::Node(Node::Literal(Literal { token })))
            }
            TokenKind::Interpolation => {
                let token = self.advance();
                let trim = Trim {
                    left: token.left_trim,
                    right: token.right_trim,
                };

                Ok(Fragment::Node(Node::Interpolation(Interpolation {
                    token,
                    trim,
                })))
            }
            TokenKind::ControlStart => self.parse_control(context),
            TokenKind::Illegal => Err(self.error_unexpected(&self.cursor.clone())),
            TokenKind::Eof => Err(Error::build(UNEXPECTED_EOF)),
            _ => Err(self.error_unexpected(&self.cursor.clone())),
        }
    }

    /// Parse a `%{ ... }` control tag beginning at the cursor.
    ///
    /// The tag must open with a keyword that is legal in the given
    /// [`Context`].
    fn parse_control(&mut self, context: Context) -> Result<Fragment, Error> {
        let start = self.advance();

        let keyword_token = self.advance();
        let keyword = match keyword_token.kind {
            TokenKind::Keyword(keyword) => keyword,
            TokenKind::Illegal => return Err(self.error_unexpected(&keyword_token)),
            _ => {
                return Err(Error::build(UNEXPECTED_TOKEN)
                    .with_help(expected_keyword(&keyword_token.literal))
                    .with_pointer(self.lexer.source, &keyword_token))
            }
        };
        if !context.allows(keyword) {
            return Err(Error::build(UNEXPECTED_TOKEN)
                .with_help(unexpected_control(keyword, context.describe()))
                .with_pointer(self.lexer.source, &keyword_token));
        }

        match keyword {
            Keyword::For => self
                .parse_for(&start, keyword_token)
                .map(|block| Fragment::Node(Node::For(block))),
            Keyword::If => self
                .parse_if(&start, keyword_token)
                .map(|block| Fragment::Node(Node::If(block))),
            Keyword::ElseIf => {
                let condition = self.parse_expression(Precedence::Lowest)?;
                let trim = self.close_tag(&start)?;

                Ok(Fragment::ElseIf(ElseIf {
                    token: keyword_token,
                    trim,
                    condition,
                    body: Vec::new(),
                }))
            }
            Keyword::Else => {
                // An `else if` pair reads the same as `elseif`.
                if self.cursor.kind == TokenKind::Keyword(Keyword::If) {
                    self.advance();
                    let condition = self.parse_expression(Precedence::Lowest)?;
                    let trim = self.close_tag(&start)?;

                    return Ok(Fragment::ElseIf(ElseIf {
                        token: keyword_token,
                        trim,
                        condition,
                        body: Vec::new(),
                    }));
                }
                let trim = self.close_tag(&start)?;

                Ok(Fragment::Else(Else {
                    token: keyword_token,
                    trim,
                    body: Vec::new(),
                }))
            }
            Keyword::EndFor => {
                let trim = self.close_tag(&start)?;

                Ok(Fragment::EndFor(EndFor {
                    token: keyword_token,
                    trim,
                }))
            }
            Keyword::EndIf => {
                let trim = self.close_tag(&start)?;

                Ok(Fragment::EndIf(EndIf {
                    token: keyword_token,
                    trim,
                }))
            }
            // Rejected above, `in` opens no tag.
            Keyword::In => unreachable!(),
        }
    }

    /// Parse a `for` block, with the opening keyword already consumed.
    fn parse_for(&mut self, start: &Token, token: Token) -> Result<For, Error> {
        let arg1 = self.parse_ident()?;
        let arg2 = if self.cursor.kind == TokenKind::Comma {
            self.advance();

            Some(self.parse_ident()?)
        } else {
            None
        };

        if self.cursor.kind != TokenKind::Keyword(Keyword::In) {
            let received = self.advance();
            return Err(Error::build(UNEXPECTED_TOKEN)
                .with_help(format!(
                    "expected keyword `in`, received `{}`",
                    received.literal
                ))
                .with_pointer(self.lexer.source, &received));
        }
        self.advance();

        let iterator = self.parse_ident()?;
        let trim = self.close_tag(start)?;

        let mut body = Vec::new();
        let end = loop {
            if self.cursor.kind == TokenKind::Eof {
                return Err(Error::build(UNEXPECTED_EOF)
                    .with_help("`for` block is never closed, expected `endfor`")
                    .with_pointer(self.lexer.source, &token));
            }
            match self.parse_fragment(Context::Loop)? {
                Fragment::Node(node) => body.push(node),
                Fragment::EndFor(end) => break end,
                // Context::Loop admits no other closing tags.
                _ => unreachable!(),
            }
        };

        Ok(For {
            token,
            trim,
            arg1,
            arg2,
            iterator,
            body,
            end,
        })
    }

    /// Parse an `if` block, with the opening keyword already consumed.
    fn parse_if(&mut self, start: &Token, token: Token) -> Result<If, Error> {
        let condition = self.parse_expression(Precedence::Lowest)?;
        let trim = self.close_tag(start)?;

        let mut consequence = Vec::new();
        let mut else_ifs: Vec<ElseIf> = Vec::new();
        let mut alternative: Option<Else> = None;

        let end = loop {
            if self.cursor.kind == TokenKind::Eof {
                return Err(Error::build(UNEXPECTED_EOF)
                    .with_help("`if` block is never closed, expected `endif`")
                    .with_pointer(self.lexer.source, &token));
            }
            let context = if alternative.is_some() {
                Context::Alternative
            } else {
                Context::Condition
            };
            match self.parse_fragment(context)? {
                Fragment::Node(node) => {
                    if let Some(alternative) = alternative.as_mut() {
                        alternative.body.push(node)
                    } else if let Some(branch) = else_ifs.last_mut() {
                        branch.body.push(node)
                    } else {
                        consequence.push(node)
                    }
                }
                Fragment::ElseIf(branch) => else_ifs.push(branch),
                Fragment::Else(tag) => alternative = Some(tag),
                Fragment::EndIf(end) => break end,
                // Context::Condition and Context::Alternative admit no
                // `endfor`.
                Fragment::EndFor(_) => unreachable!(),
            }
        };

        Ok(If {
            token,
            trim,
            condition,
            consequence,
            else_ifs,
            alternative,
            end,
        })
    }

    /// Parse an expression at the cursor with the given binding power.
    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression, Error> {
        let mut left = self.parse_prefix()?;

        while let TokenKind::Operator(operator) = self.cursor.kind {
            if precedence >= Precedence::of(operator) {
                break;
            }
            left = self.parse_infix(left, operator)?;
        }

        Ok(left)
    }

    /// Parse the value or prefix expression at the cursor.
    fn parse_prefix(&mut self) -> Result<Expression, Error> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident => Ok(Expression::Ident(Ident { token })),
            TokenKind::String => Ok(Expression::String(StringLiteral { token })),
            TokenKind::Int => {
                let value = token.literal.parse::<i64>().map_err(|_| {
                    Error::build(UNRECOGNIZABLE_NUMBER)
                        .with_help(format!("`{}` is not a valid integer", token.literal))
                        .with_pointer(self.lexer.source, &token)
                })?;

                Ok(Expression::Int(IntLiteral { token, value }))
            }
            TokenKind::Float => {
                let value = token.literal.parse::<f64>().map_err(|_| {
                    Error::build(UNRECOGNIZABLE_NUMBER)
                        .with_help(format!("`{}` is not a valid float", token.literal))
                        .with_pointer(self.lexer.source, &token)
                })?;

                Ok(Expression::Float(FloatLiteral { token, value }))
            }
            TokenKind::True => Ok(Expression::Bool(BoolLiteral { token, value: true })),
            TokenKind::False => Ok(Expression::Bool(BoolLiteral {
                token,
                value: false,
            })),
            TokenKind::Not | TokenKind::Minus => {
                let right = self.parse_expression(Precedence::Prefix)?;

                Ok(Expression::Prefix(Box::new(Prefix { token, right })))
            }
            TokenKind::LeftParen => {
                let inner = self.parse_expression(Precedence::Lowest)?;
                if self.cursor.kind != TokenKind::RightParen {
                    let received = self.advance();
                    return Err(Error::build(UNEXPECTED_TOKEN)
                        .with_help("expected `)` to close the group")
                        .with_pointer(self.lexer.source, &received));
                }
                self.advance();

                Ok(Expression::Grouped(Box::new(inner)))
            }
            TokenKind::Illegal => Err(self.error_unexpected(&token)),
            TokenKind::Eof => Err(Error::build(UNEXPECTED_EOF)
                .with_help("expected an expression")
                .with_pointer(self.lexer.source, &token)),
            _ => Err(Error::build(UNEXPECTED_TOKEN)
                .with_help(format!(
                    "expected an expression, received `{}`",
                    token.literal
                ))
                .with_pointer(self.lexer.source, &token)),
        }
    }

    /// Parse an infix expression, with the left side already parsed
    /// and the operator at the cursor.
    fn parse_infix(&mut self, left: Expression, operator: Operator) -> Result<Expression, Error> {
        let token = self.advance();
        let right = self.parse_expression(Precedence::of(operator))?;

        Ok(Expression::Infix(Box::new(Infix {
            left,
            token,
            operator,
            right,
        })))
    }

    /// Parse the [`Ident`] at the cursor.
    fn parse_ident(&mut self) -> Result<Ident, Error> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident => Ok(Ident { token }),
            TokenKind::Illegal => Err(self.error_unexpected(&token)),
            _ => Err(Error::build(UNEXPECTED_TOKEN)
                .with_help(format!(
                    "expected an identifier, received `{}`",
                    token.literal
                ))
                .with_pointer(self.lexer.source, &token)),
        }
    }

    /// Consume the `}` that ends a control tag and return the [`Trim`]
    /// markers collected from both delimiters.
    fn close_tag(&mut self, start: &Token) -> Result<Trim, Error> {
        let end = self.advance();
        match end.kind {
            TokenKind::ControlEnd => Ok(Trim {
                left: start.left_trim,
                right: end.right_trim,
            }),
            TokenKind::Illegal => Err(self.error_unexpected(&end)),
            _ => Err(Error::build(UNEXPECTED_TOKEN)
                .with_help(format!("expected `}}`, received `{}`", end.literal))
                .with_pointer(self.lexer.source, &end)),
        }
    }

    /// Return the cursor [`Token`] and step the parser forward.
    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();

        replace(&mut self.cursor, replace(&mut self.peeked, next))
    }

    /// Return an [`Error`] describing the given token,
    /// surfacing the message carried by an illegal token directly.
    fn error_unexpected(&self, token: &Token) -> Error {
        if token.kind == TokenKind::Illegal {
            Error::build(INVALID_SYNTAX)
                .with_help(token.literal.clone())
                .with_pointer(self.lexer.source, token)
        } else {
            Error::build(UNEXPECTED_TOKEN)
                .with_help(format!("`{}` is not valid here", token.literal))
                .with_pointer(self.lexer.source, token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        tree::{Expression, Node},
        Parser,
    };
    use crate::{
        compile::Operator,
        log::{UNEXPECTED_EOF, UNEXPECTED_TOKEN, UNRECOGNIZABLE_NUMBER},
    };

    #[test]
    fn test_parse_text_and_interpolation() {
        let template = Parser::new("hello, ${name}!").compile().unwrap();
        let nodes = template.nodes();

        assert_eq!(nodes.len(), 3);
        match &nodes[1] {
            Node::Interpolation(interpolation) => {
                assert_eq!(interpolation.token.literal, "name");
                assert!(!interpolation.trim.left);
            }
            node => panic!("unexpected node: {node:?}"),
        }
    }

    #[test]
    fn test_parse_for_two_args() {
        let template = Parser::new("%{ for k, v in map ~}${k}%{~ endfor }")
            .compile()
            .unwrap();

        match &template.nodes()[0] {
            Node::For(block) => {
                assert_eq!(block.arg1.token.literal, "k");
                assert_eq!(block.arg2.as_ref().unwrap().token.literal, "v");
                assert_eq!(block.iterator.token.literal, "map");
                assert_eq!(block.body.len(), 1);
                assert!(block.trim.right);
                assert!(block.end.trim.left);
            }
            node => panic!("unexpected node: {node:?}"),
        }
    }

    #[test]
    fn test_parse_nested_blocks() {
        let source = "%{ for v in list }%{ if v }x%{ endif }%{ endfor }";
        let template = Parser::new(source).compile().unwrap();

        match &template.nodes()[0] {
            Node::For(block) => assert!(matches!(block.body[0], Node::If(_))),
            node => panic!("unexpected node: {node:?}"),
        }
    }

    #[test]
    fn test_parse_if_chain() {
        let source = "%{ if a }1%{ elseif b }2%{ else if c }3%{ else }4%{ endif }";
        let template = Parser::new(source).compile().unwrap();

        match &template.nodes()[0] {
            Node::If(block) => {
                assert_eq!(block.consequence.len(), 1);
                assert_eq!(block.else_ifs.len(), 2);
                assert!(block.alternative.is_some());
            }
            node => panic!("unexpected node: {node:?}"),
        }
    }

    #[test]
    fn test_parse_precedence() {
        let template = Parser::new("%{ if a || b && c == 1 }x%{ endif }")
            .compile()
            .unwrap();

        let condition = match &template.nodes()[0] {
            Node::If(block) => &block.condition,
            node => panic!("unexpected node: {node:?}"),
        };
        match condition {
            Expression::Infix(infix) => {
                assert_eq!(infix.operator, Operator::Or);
                match &infix.right {
                    Expression::Infix(infix) => assert_eq!(infix.operator, Operator::And),
                    expression => panic!("unexpected expression: {expression}"),
                }
            }
            expression => panic!("unexpected expression: {expression}"),
        }
    }

    #[test]
    fn test_parse_prefix_binds_tighter() {
        let template = Parser::new("%{ if !a == b }x%{ endif }").compile().unwrap();

        match &template.nodes()[0] {
            Node::If(block) => match &block.condition {
                Expression::Infix(infix) => {
                    assert!(matches!(infix.left, Expression::Prefix(_)))
                }
                expression => panic!("unexpected expression: {expression}"),
            },
            node => panic!("unexpected node: {node:?}"),
        }
    }

    #[test]
    fn test_parse_grouped() {
        let template = Parser::new("%{ if (a || b) && c }x%{ endif }")
            .compile()
            .unwrap();

        match &template.nodes()[0] {
            Node::If(block) => match &block.condition {
                Expression::Infix(infix) => {
                    assert_eq!(infix.operator, Operator::And);
                    assert!(matches!(infix.left, Expression::Grouped(_)));
                }
                expression => panic!("unexpected expression: {expression}"),
            },
            node => panic!("unexpected node: {node:?}"),
        }
    }

    #[test]
    fn test_parse_unclosed_for() {
        let error = Parser::new("%{ for v in list }text").compile().unwrap_err();

        assert_eq!(error.get_reason(), UNEXPECTED_EOF);
    }

    #[test]
    fn test_parse_unclosed_if() {
        let error = Parser::new("%{ if a }text").compile().unwrap_err();

        assert_eq!(error.get_reason(), UNEXPECTED_EOF);
    }

    #[test]
    fn test_parse_stray_endfor() {
        let error = Parser::new("%{ endfor }").compile().unwrap_err();

        assert_eq!(error.get_reason(), UNEXPECTED_TOKEN);
    }

    #[test]
    fn test_parse_else_before_elseif() {
        let error = Parser::new("%{ if a }1%{ else }2%{ elseif b }3%{ endif }")
            .compile()
            .unwrap_err();

        assert_eq!(error.get_reason(), UNEXPECTED_TOKEN);
    }

    #[test]
    fn test_parse_mismatched_close() {
        let error = Parser::new("%{ if a }text%{ endfor }").compile().unwrap_err();

        assert_eq!(error.get_reason(), UNEXPECTED_TOKEN);
    }

    #[test]
    fn test_parse_bad_number() {
        let error = Parser::new("%{ if v == 1.2.3 }x%{ endif }")
            .compile()
            .unwrap_err();

        assert_eq!(error.get_reason(), UNRECOGNIZABLE_NUMBER);
    }

    #[test]
    fn test_parse_missing_expression() {
        let error = Parser::new("%{ if }x%{ endif }").compile().unwrap_err();

        assert_eq!(error.get_reason(), UNEXPECTED_TOKEN);
    }
}
