//! Structural model of declared variable types.
//!
//! Parses expressions such as `map(object({ name = string, port = optional(number, 80) }))`
//! so that cosmetic differences (whitespace, attribute order, legacy quoting) do
//! not register as type changes.

use std::collections::BTreeMap;
use std::fmt;

/// A parsed type constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Any,
    String,
    Number,
    Bool,
    List(Box<TypeExpr>),
    Set(Box<TypeExpr>),
    Map(Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    Object(BTreeMap<String, ObjectAttribute>),
}

/// One attribute of an `object({...})` type.
///
/// Default values of `optional(T, default)` are not part of the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAttribute {
    pub ty: TypeExpr,
    pub optional: bool,
}

impl TypeExpr {
    /// Parse a type expression. Returns `None` for anything outside the grammar.
    pub fn parse(text: &str) -> Option<TypeExpr> {
        let mut parser = Parser::new(text);
        let ty = parser.type_expr()?;
        parser.skip_ws();
        parser.at_end().then_some(ty)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeExpr::Any)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Any => f.write_str("any"),
            TypeExpr::String => f.write_str("string"),
            TypeExpr::Number => f.write_str("number"),
            TypeExpr::Bool => f.write_str("bool"),
            TypeExpr::List(inner) => write!(f, "list({})", inner),
            TypeExpr::Set(inner) => write!(f, "set({})", inner),
            TypeExpr::Map(inner) => write!(f, "map({})", inner),
            TypeExpr::Tuple(items) => {
                f.write_str("tuple([")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("])")
            }
            TypeExpr::Object(attrs) => {
                f.write_str("object({")?;
                for (i, (name, attr)) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if attr.optional {
                        write!(f, "{} = optional({})", name, attr.ty)?;
                    } else {
                        write!(f, "{} = {}", name, attr.ty)?;
                    }
                }
                f.write_str("})")
            }
        }
    }
}

/// Whether two declared type strings describe different types.
///
/// Strings that do not parse are compared with all whitespace removed.
pub fn types_differ(old: &str, new: &str) -> bool {
    match (TypeExpr::parse(old), TypeExpr::parse(new)) {
        (Some(a), Some(b)) => a != b,
        _ => strip_ws(old) != strip_ws(new),
    }
}

/// An untyped or `any` declaration accepts every value.
pub fn is_unconstrained(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || TypeExpr::parse(trimmed).is_some_and(|t| t.is_any())
}

fn strip_ws(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<String> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.chars[start..self.pos].iter().collect())
    }

    fn type_expr(&mut self) -> Option<TypeExpr> {
        self.skip_ws();
        // Legacy quoted primitives: "string", "list", "map"
        if self.peek() == Some('"') {
            self.pos += 1;
            let name = self.ident()?;
            if !self.eat('"') {
                return None;
            }
            return Self::bare(&name);
        }

        let name = self.ident()?;
        self.skip_ws();
        if self.peek() != Some('(') {
            return Self::bare(&name);
        }
        self.pos += 1;
        let ty = match name.as_str() {
            "list" => TypeExpr::List(Box::new(self.type_expr()?)),
            "set" => TypeExpr::Set(Box::new(self.type_expr()?)),
            "map" => TypeExpr::Map(Box::new(self.type_expr()?)),
            "tuple" => TypeExpr::Tuple(self.tuple_items()?),
            "object" => TypeExpr::Object(self.object_attrs()?),
            _ => return None,
        };
        self.eat(')').then_some(ty)
    }

    fn bare(name: &str) -> Option<TypeExpr> {
        match name {
            "any" => Some(TypeExpr::Any),
            "string" => Some(TypeExpr::String),
            "number" => Some(TypeExpr::Number),
            "bool" => Some(TypeExpr::Bool),
            "list" => Some(TypeExpr::List(Box::new(TypeExpr::Any))),
            "set" => Some(TypeExpr::Set(Box::new(TypeExpr::Any))),
            "map" => Some(TypeExpr::Map(Box::new(TypeExpr::Any))),
            _ => None,
        }
    }

    fn tuple_items(&mut self) -> Option<Vec<TypeExpr>> {
        if !self.eat('[') {
            return None;
        }
        let mut items = Vec::new();
        loop {
            if self.eat(']') {
                return Some(items);
            }
            items.push(self.type_expr()?);
            if !self.eat(',') {
                return self.eat(']').then_some(items);
            }
        }
    }

    fn object_attrs(&mut self) -> Option<BTreeMap<String, ObjectAttribute>> {
        if !self.eat('{') {
            return None;
        }
        let mut attrs = BTreeMap::new();
        loop {
            if self.eat('}') {
                return Some(attrs);
            }
            let name = self.attr_name()?;
            if !self.eat('=') && !self.eat(':') {
                return None;
            }
            let attr = self.attr_type()?;
            attrs.insert(name, attr);
            // Attributes may be separated by commas or newlines
            self.eat(',');
        }
    }

    fn attr_name(&mut self) -> Option<String> {
        self.skip_ws();
        if self.peek() == Some('"') {
            self.pos += 1;
            let name = self.ident()?;
            return self.eat('"').then_some(name);
        }
        self.ident()
    }

    fn attr_type(&mut self) -> Option<ObjectAttribute> {
        self.skip_ws();
        let save = self.pos;
        if self.ident().as_deref() == Some("optional") && self.eat('(') {
            let ty = self.type_expr()?;
            if self.eat(',') {
                self.skip_default()?;
            }
            if !self.eat(')') {
                return None;
            }
            return Some(ObjectAttribute { ty, optional: true });
        }
        self.pos = save;
        let ty = self.type_expr()?;
        Some(ObjectAttribute {
            ty,
            optional: false,
        })
    }

    /// Skip a default value expression up to the closing `)` of `optional(...)`.
    fn skip_default(&mut self) -> Option<()> {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '"' => self.skip_string()?,
                '(' | '[' | '{' => {
                    depth += 1;
                    self.pos += 1;
                }
                ')' if depth == 0 => return Some(()),
                ')' | ']' | '}' => {
                    depth = depth.checked_sub(1)?;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        None
    }

    fn skip_string(&mut self) -> Option<()> {
        self.pos += 1;
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => self.pos += 1,
                '"' => return Some(()),
                _ => {}
            }
        }
        None
    }
}
