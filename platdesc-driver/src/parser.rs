//! Recursive-descent parser turning a token stream into a
//! [`crate::ast::Description`]. Stands in for the teacher's
//! `lrpar`-generated parser (see the grammar note in `SPEC_FULL.md`):
//! same job, hand-written because the `.y` grammar it would have been
//! generated from was not part of the retrieved corpus.

use crate::ast::*;
use crate::diagnostic;
use crate::lexer::{self, Token, TokenKind};
use crate::position::Position;
use platdesc_api::{EnumLiteral, ErrorKind, NumberLiteral, ParsingException, SimpleValue};
use std::sync::Arc;

pub fn parse(source: &str, file: Arc<str>) -> Result<Description, ParsingException> {
    let tokens = lexer::tokenize(source).map_err(|e| {
        diagnostic::report(
            ErrorKind::SyntaxError,
            &file,
            source,
            e.position,
            &e.message,
            false,
        )
    })?;
    Parser {
        tokens,
        pos: 0,
        source,
        file,
    }
    .parse_description()
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
    file: Arc<str>,
}

type PResult<T> = Result<T, ParsingException>;

impl<'a> Parser<'a> {
    fn cur(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at_eof(&self) -> bool {
        matches!(self.cur().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn syntax_error(&self, position: Position, message: impl Into<String>) -> ParsingException {
        diagnostic::report(
            ErrorKind::SyntaxError,
            &self.file,
            self.source,
            position,
            &message.into(),
            true,
        )
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<Token> {
        if &self.cur().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.syntax_error(
                self.cur().position,
                format!("expected {:?}, found {:?}", kind, self.cur().kind),
            ))
        }
    }

    fn expect_ident(&mut self) -> PResult<(String, Position)> {
        match self.cur().kind.clone() {
            TokenKind::Identifier(s) => {
                let p = self.advance().position;
                Ok((s, p))
            }
            other => Err(self.syntax_error(
                self.cur().position,
                format!("expected an identifier, found {other:?}"),
            )),
        }
    }

    fn parse_description(&mut self) -> PResult<Description> {
        let mut usings = Vec::new();
        while matches!(self.cur().kind, TokenKind::Using) {
            usings.push(self.parse_using()?);
        }
        let mut entries = Vec::new();
        while !self.at_eof() {
            entries.push(self.parse_entry()?);
        }
        Ok(Description {
            source: Arc::from(self.source),
            file: self.file.clone(),
            usings,
            entries,
        })
    }

    fn parse_using(&mut self) -> PResult<Using> {
        let start = self.expect(&TokenKind::Using)?.position;
        let path = self.expect_string()?;
        let prefix = if matches!(self.cur().kind, TokenKind::Prefix) {
            self.advance();
            Some(self.expect_string()?)
        } else {
            None
        };
        self.consume_semicolon_if_present();
        Ok(Using {
            path,
            prefix,
            position: start,
        })
    }

    fn expect_string(&mut self) -> PResult<String> {
        match self.cur().kind.clone() {
            TokenKind::String(s) => {
                self.advance();
                Ok(s)
            }
            other => Err(self.syntax_error(
                self.cur().position,
                format!("expected a quoted string, found {other:?}"),
            )),
        }
    }

    fn consume_semicolon_if_present(&mut self) {
        if matches!(self.cur().kind, TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn parse_dotted_name(&mut self) -> PResult<(String, Position)> {
        let (mut name, start) = self.expect_ident()?;
        while matches!(self.cur().kind, TokenKind::Dot) {
            self.advance();
            let (seg, _) = self.expect_ident()?;
            name.push('.');
            name.push_str(&seg);
        }
        Ok((name, start))
    }

    fn parse_entry(&mut self) -> PResult<Entry> {
        let (variable, start) = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;

        let mut type_name = None;
        if matches!(self.cur().kind, TokenKind::Identifier(_)) {
            let (name, _) = self.parse_dotted_name()?;
            type_name = Some(name);
        }

        let mut registrations = Vec::new();
        let mut alias = None;
        if matches!(self.cur().kind, TokenKind::At) {
            registrations.push(self.parse_registration()?);
        }
        if matches!(self.cur().kind, TokenKind::As) {
            self.advance();
            alias = Some(self.expect_string()?);
        }

        let mut attributes = Vec::new();
        if matches!(self.cur().kind, TokenKind::LBrace) {
            self.advance();
            attributes = self.parse_attribute_list()?;
            self.expect(&TokenKind::RBrace)?;
        }
        self.consume_semicolon_if_present();

        Ok(Entry {
            variable,
            type_name,
            alias,
            registrations,
            attributes,
            position: start,
            file: self.file.clone(),
        })
    }

    fn parse_registration(&mut self) -> PResult<RegistrationInfo> {
        let start = self.expect(&TokenKind::At)?.position;
        if matches!(self.cur().kind, TokenKind::None) {
            self.advance();
            return Ok(RegistrationInfo {
                register: None,
                point: None,
                position: start,
            });
        }
        let (register, _) = self.parse_dotted_name()?;
        let point = if self.is_value_start() {
            Some(self.parse_value()?)
        } else {
            None
        };
        Ok(RegistrationInfo {
            register: Some(register),
            point,
            position: start,
        })
    }

    fn is_value_start(&self) -> bool {
        matches!(
            self.cur().kind,
            TokenKind::String(_)
                | TokenKind::Number(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::None
                | TokenKind::LAngle
                | TokenKind::Identifier(_)
        )
    }

    fn parse_attribute_list(&mut self) -> PResult<Vec<Attribute>> {
        let mut attrs = Vec::new();
        while !matches!(self.cur().kind, TokenKind::RBrace | TokenKind::Eof) {
            attrs.push(self.parse_attribute()?);
            self.consume_semicolon_if_present();
        }
        Ok(attrs)
    }

    fn parse_attribute(&mut self) -> PResult<Attribute> {
        // `init: { ... }` is distinguished from other `name: value`
        // attributes by its keyword and braced body.
        if matches!(self.cur().kind, TokenKind::Init) {
            let start = self.advance().position;
            self.expect(&TokenKind::Colon)?;
            self.expect(&TokenKind::LBrace)?;
            let lines = self.parse_init_lines()?;
            self.expect(&TokenKind::RBrace)?;
            return Ok(Attribute::Init(InitAttribute {
                lines,
                position: start,
            }));
        }

        // IRQ attributes start with a source list (numbers/identifiers,
        // or `none`) followed by `->`; ctor/property attributes start
        // with a single identifier followed by `:`. Both begin with a
        // token that could be a number or identifier, so look ahead
        // past the first element for `->` vs `:`/`,`.
        if self.looks_like_irq_attribute() {
            return self.parse_irq_attribute();
        }

        let (name, start) = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let value = self.parse_value()?;
        Ok(Attribute::CtorOrProperty(CtorOrPropertyAttribute {
            name,
            value,
            position: start,
        }))
    }

    fn looks_like_irq_attribute(&self) -> bool {
        if matches!(self.cur().kind, TokenKind::Number(_)) {
            return true;
        }
        if matches!(self.cur().kind, TokenKind::None) {
            return matches!(self.peek_kind(1), TokenKind::Arrow);
        }
        if matches!(self.cur().kind, TokenKind::Identifier(_)) {
            // scan ahead (skipping a comma-separated source list) for `->`
            let mut i = self.pos;
            loop {
                match &self.tokens[i].kind {
                    TokenKind::Identifier(_) | TokenKind::Number(_) | TokenKind::Comma => {
                        i += 1;
                    }
                    TokenKind::Arrow => return true,
                    _ => return false,
                }
                if i >= self.tokens.len() {
                    return false;
                }
            }
        }
        false
    }

    fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind.clone())
            .unwrap_or(TokenKind::Eof)
    }

    fn parse_init_lines(&mut self) -> PResult<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            if matches!(self.cur().kind, TokenKind::RBrace | TokenKind::Eof) {
                break;
            }
            let mut text = String::new();
            while !matches!(self.cur().kind, TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof) {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&self.token_text());
                self.advance();
            }
            if !text.is_empty() {
                lines.push(text);
            }
            self.consume_semicolon_if_present();
        }
        Ok(lines)
    }

    fn token_text(&self) -> String {
        match &self.cur().kind {
            TokenKind::Identifier(s) | TokenKind::Number(s) => s.clone(),
            TokenKind::String(s) => format!("\"{s}\""),
            TokenKind::True => "true".into(),
            TokenKind::False => "false".into(),
            TokenKind::None => "none".into(),
            TokenKind::Dot => ".".into(),
            TokenKind::Colon => ":".into(),
            TokenKind::Comma => ",".into(),
            TokenKind::At => "@".into(),
            other => format!("{other:?}"),
        }
    }

    fn parse_irq_attribute(&mut self) -> PResult<Attribute> {
        let start = self.cur().position;
        let sources = self.parse_irq_sources()?;
        self.expect(&TokenKind::Arrow)?;
        let destinations = self.parse_irq_destinations()?;
        Ok(Attribute::Irq(IrqAttribute {
            sources,
            destinations,
            position: start,
        }))
    }

    fn parse_irq_sources(&mut self) -> PResult<Vec<IrqSourceEnd>> {
        if matches!(self.cur().kind, TokenKind::None) {
            self.advance();
            return Ok(Vec::new());
        }
        let mut sources = Vec::new();
        loop {
            let end = match self.cur().kind.clone() {
                TokenKind::Number(text) => {
                    let p = self.advance().position;
                    let n = parse_int_literal(&text).ok_or_else(|| {
                        self.syntax_error(p, format!("'{text}' is not a valid IRQ index"))
                    })?;
                    IrqSourceEnd::Numbered(n, p)
                }
                TokenKind::Identifier(name) => {
                    let p = self.advance().position;
                    IrqSourceEnd::Named(name, p)
                }
                other => {
                    return Err(self.syntax_error(
                        self.cur().position,
                        format!("expected an IRQ source, found {other:?}"),
                    ))
                }
            };
            sources.push(end);
            if matches!(self.cur().kind, TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(sources)
    }

    fn parse_irq_destinations(&mut self) -> PResult<Vec<IrqDestinationSpec>> {
        if matches!(self.cur().kind, TokenKind::None) {
            let p = self.advance().position;
            return Ok(vec![IrqDestinationSpec::Cancel(p)]);
        }
        let mut out = Vec::new();
        loop {
            let (peripheral, start) = self.expect_ident()?;
            let local_receiver = if matches!(self.cur().kind, TokenKind::Colon) {
                self.advance();
                Some(self.expect_number_u32()?)
            } else {
                None
            };
            self.expect(&TokenKind::At)?;
            let mut ends = vec![self.expect_number_u32()?];
            while matches!(self.cur().kind, TokenKind::Comma) {
                // only consume the comma if it is followed by another
                // index for *this* destination, not the next
                // destination in the list (disambiguated by the next
                // token being a bare number).
                if matches!(self.peek_kind(1), TokenKind::Number(_)) {
                    self.advance();
                    ends.push(self.expect_number_u32()?);
                } else {
                    break;
                }
            }
            out.push(IrqDestinationSpec::Peripheral {
                peripheral,
                local_receiver,
                ends,
                position: start,
            });
            if matches!(self.cur().kind, TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(out)
    }

    fn expect_number_u32(&mut self) -> PResult<u32> {
        match self.cur().kind.clone() {
            TokenKind::Number(text) => {
                let p = self.advance().position;
                parse_int_literal(&text)
                    .ok_or_else(|| self.syntax_error(p, format!("'{text}' is not a valid integer")))
            }
            other => Err(self.syntax_error(
                self.cur().position,
                format!("expected a number, found {other:?}"),
            )),
        }
    }

    fn parse_value(&mut self) -> PResult<Value> {
        let start = self.cur().position;
        match self.cur().kind.clone() {
            TokenKind::String(s) => {
                self.advance();
                Ok(Value::Simple(SimpleValue::String(s), start))
            }
            TokenKind::True => {
                self.advance();
                Ok(Value::Simple(SimpleValue::Bool(true), start))
            }
            TokenKind::False => {
                self.advance();
                Ok(Value::Simple(SimpleValue::Bool(false), start))
            }
            TokenKind::None => {
                self.advance();
                Ok(Value::Simple(SimpleValue::Empty, start))
            }
            TokenKind::Number(text) => {
                self.advance();
                let lit = NumberLiteral::parse(&text).ok_or_else(|| {
                    self.syntax_error(start, format!("'{text}' is not a valid number literal"))
                })?;
                Ok(Value::Simple(SimpleValue::Number(lit), start))
            }
            TokenKind::LAngle => {
                self.advance();
                let lo = self.expect_number_i64()?;
                self.expect(&TokenKind::Comma)?;
                let hi = self.expect_number_i64()?;
                self.expect(&TokenKind::RAngle)?;
                Ok(Value::Simple(SimpleValue::Range(lo, hi), start))
            }
            TokenKind::Identifier(_) => {
                let (name, _) = self.parse_dotted_name()?;
                if matches!(self.cur().kind, TokenKind::LBrace) {
                    self.advance();
                    let attributes = self.parse_ctor_attribute_list()?;
                    self.expect(&TokenKind::RBrace)?;
                    return Ok(Value::Object(ObjectValue {
                        type_name: name,
                        attributes,
                        position: start,
                    }));
                }
                if name.contains('.') {
                    Ok(Value::Simple(SimpleValue::Enum(EnumLiteral::new(&name)), start))
                } else {
                    Ok(Value::Reference(name, start))
                }
            }
            other => Err(self.syntax_error(start, format!("expected a value, found {other:?}"))),
        }
    }

    fn parse_ctor_attribute_list(&mut self) -> PResult<Vec<CtorOrPropertyAttribute>> {
        let mut attrs = Vec::new();
        while !matches!(self.cur().kind, TokenKind::RBrace | TokenKind::Eof) {
            let (name, start) = self.expect_ident()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_value()?;
            attrs.push(CtorOrPropertyAttribute {
                name,
                value,
                position: start,
            });
            self.consume_semicolon_if_present();
        }
        Ok(attrs)
    }

    fn expect_number_i64(&mut self) -> PResult<i64> {
        match self.cur().kind.clone() {
            TokenKind::Number(text) => {
                let p = self.advance().position;
                parse_int_literal_i64(&text)
                    .ok_or_else(|| self.syntax_error(p, format!("'{text}' is not a valid integer")))
            }
            other => Err(self.syntax_error(
                self.cur().position,
                format!("expected a number, found {other:?}"),
            )),
        }
    }
}

fn parse_int_literal(text: &str) -> Option<u32> {
    parse_int_literal_i64(text).and_then(|v| u32::try_from(v).ok())
}

fn parse_int_literal_i64(text: &str) -> Option<i64> {
    NumberLiteral::parse(text).and_then(|l| l.as_i64())
}
