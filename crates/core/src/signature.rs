//! Move type signatures
//!
//! Two recursive unions:
//!
//! - [`TypeSignature`]: a fully concrete type. Contains no type-parameter
//!   slots and no reference modifier.
//! - [`OpenSignature`]: a declaration-site type (struct field, function
//!   parameter) that may mention type parameters (`$0`, `$1`, ...) and carry
//!   a `&` / `&mut` modifier.
//!
//! ## Canonical representation
//!
//! `repr()` renders addresses at full 32-byte width, so the same signature
//! always produces the same string:
//!
//! ```text
//! vector<0x0000…0002::coin::Coin<0x0000…0002::sui::SUI>>
//! ```
//!
//! Parsing accepts short addresses and whitespace around separators.

use crate::address::{Address, AddressParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address of the Move standard library
pub const MOVE_STDLIB_ADDRESS: Address = Address::from_low_byte(1);

/// Address of the chain framework package
pub const FRAMEWORK_ADDRESS: Address = Address::from_low_byte(2);

// =============================================================================
// Errors
// =============================================================================

/// Failure to parse a signature from its string form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureParseError {
    /// Input ended while more tokens were required
    #[error("unexpected end of type signature, expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for
        expected: &'static str,
    },

    /// A token appeared where something else was required
    #[error("unexpected token '{found}' in type signature, expected {expected}")]
    UnexpectedToken {
        /// Token found
        found: String,
        /// What the parser was looking for
        expected: &'static str,
    },

    /// Address component did not parse
    #[error("invalid address in type signature: {0}")]
    InvalidAddress(#[from] AddressParseError),

    /// Identifier is not a valid Move identifier
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// Tokens remained after a complete signature
    #[error("trailing input after type signature: '{0}'")]
    TrailingInput(String),
}

/// Structural problem with a signature (as opposed to a syntax error)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// A type parameter index has no corresponding argument
    #[error("type parameter ${index} out of range ({count} arguments supplied)")]
    ParameterOutOfRange {
        /// Parameter index referenced
        index: u16,
        /// Number of arguments available
        count: usize,
    },

    /// A concrete signature cannot carry a reference modifier
    #[error("reference types are not concrete")]
    ReferenceNotConcrete,

    /// A concrete signature cannot contain type parameters
    #[error("type parameter ${index} in a concrete signature")]
    ParameterNotConcrete {
        /// Parameter index encountered
        index: u16,
    },

    /// Type-argument nesting exceeds the configured limit
    #[error("type nesting depth {depth} exceeds limit {max}")]
    TooDeep {
        /// Observed depth
        depth: usize,
        /// Configured maximum
        max: usize,
    },

    /// Signature contains too many nodes
    #[error("type has {count} nodes, limit is {max}")]
    TooManyNodes {
        /// Observed node count
        count: usize,
        /// Configured maximum
        max: usize,
    },
}

// =============================================================================
// Concrete signatures
// =============================================================================

/// A fully concrete Move type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeSignature {
    /// `bool`
    Bool,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `u128`
    U128,
    /// `u256`
    U256,
    /// `address`
    Address,
    /// `vector<T>`
    Vector(Box<TypeSignature>),
    /// Nominal struct reference
    Datatype(Box<DatatypeRef>),
}

/// `package::module::name<type_arguments>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatatypeRef {
    /// Package the struct is resolved against
    pub package: Address,
    /// Module name
    pub module: String,
    /// Struct name
    #[serde(rename = "type")]
    pub name: String,
    /// Concrete type arguments, in declaration order
    #[serde(rename = "typeParameters")]
    pub type_arguments: Vec<TypeSignature>,
}

impl DatatypeRef {
    /// Build a reference
    pub fn new(
        package: Address,
        module: impl Into<String>,
        name: impl Into<String>,
        type_arguments: Vec<TypeSignature>,
    ) -> Self {
        DatatypeRef {
            package,
            module: module.into(),
            name: name.into(),
            type_arguments,
        }
    }

    /// True if this names `package::module::name`, ignoring type arguments
    pub fn is(&self, package: &Address, module: &str, name: &str) -> bool {
        self.package == *package && self.module == module && self.name == name
    }

    /// `package::module::name` without type arguments
    pub fn base_repr(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.name)
    }
}

impl TypeSignature {
    /// Shorthand for a nominal struct type
    pub fn datatype(
        package: Address,
        module: &str,
        name: &str,
        type_arguments: Vec<TypeSignature>,
    ) -> Self {
        TypeSignature::Datatype(Box::new(DatatypeRef::new(
            package,
            module,
            name,
            type_arguments,
        )))
    }

    /// Shorthand for `vector<T>`
    pub fn vector(element: TypeSignature) -> Self {
        TypeSignature::Vector(Box::new(element))
    }

    /// `0x2::coin::Coin<T>`
    pub fn coin(coin_type: TypeSignature) -> Self {
        Self::datatype(FRAMEWORK_ADDRESS, "coin", "Coin", vec![coin_type])
    }

    /// `0x2::sui::SUI`, the gas currency
    pub fn gas_currency() -> Self {
        Self::datatype(FRAMEWORK_ADDRESS, "sui", "SUI", vec![])
    }

    /// `0x2::coin::Coin<0x2::sui::SUI>`
    pub fn gas_coin() -> Self {
        Self::coin(Self::gas_currency())
    }

    /// `0x1::string::String`
    pub fn string() -> Self {
        Self::datatype(MOVE_STDLIB_ADDRESS, "string", "String", vec![])
    }

    /// `0x2::object::UID`
    pub fn uid() -> Self {
        Self::datatype(FRAMEWORK_ADDRESS, "object", "UID", vec![])
    }

    /// `0x1::option::Option<T>`
    pub fn option(inner: TypeSignature) -> Self {
        Self::datatype(MOVE_STDLIB_ADDRESS, "option", "Option", vec![inner])
    }

    /// Struct reference, if this is a nominal type
    pub fn as_datatype(&self) -> Option<&DatatypeRef> {
        match self {
            TypeSignature::Datatype(d) => Some(d),
            _ => None,
        }
    }

    /// True for `0x2::coin::Coin<_>`
    pub fn is_coin(&self) -> bool {
        self.as_datatype()
            .map(|d| d.is(&FRAMEWORK_ADDRESS, "coin", "Coin") && d.type_arguments.len() == 1)
            .unwrap_or(false)
    }

    /// `T` in `Coin<T>`
    pub fn coin_type_argument(&self) -> Option<&TypeSignature> {
        if self.is_coin() {
            self.as_datatype().and_then(|d| d.type_arguments.first())
        } else {
            None
        }
    }

    /// True for the gas coin type
    pub fn is_gas_coin(&self) -> bool {
        self.coin_type_argument() == Some(&Self::gas_currency())
    }

    /// Canonical string form
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) {
        match self {
            TypeSignature::Bool => out.push_str("bool"),
            TypeSignature::U8 => out.push_str("u8"),
            TypeSignature::U16 => out.push_str("u16"),
            TypeSignature::U32 => out.push_str("u32"),
            TypeSignature::U64 => out.push_str("u64"),
            TypeSignature::U128 => out.push_str("u128"),
            TypeSignature::U256 => out.push_str("u256"),
            TypeSignature::Address => out.push_str("address"),
            TypeSignature::Vector(inner) => {
                out.push_str("vector<");
                inner.write_repr(out);
                out.push('>');
            }
            TypeSignature::Datatype(d) => {
                out.push_str(&d.base_repr());
                if !d.type_arguments.is_empty() {
                    out.push('<');
                    for (i, arg) in d.type_arguments.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        arg.write_repr(out);
                    }
                    out.push('>');
                }
            }
        }
    }

    /// Nesting depth; primitives are depth 1
    pub fn depth(&self) -> usize {
        match self {
            TypeSignature::Vector(inner) => 1 + inner.depth(),
            TypeSignature::Datatype(d) => {
                1 + d.type_arguments.iter().map(|t| t.depth()).max().unwrap_or(0)
            }
            _ => 1,
        }
    }

    /// Total number of nodes in the signature tree
    pub fn node_count(&self) -> usize {
        match self {
            TypeSignature::Vector(inner) => 1 + inner.node_count(),
            TypeSignature::Datatype(d) => {
                1 + d.type_arguments.iter().map(|t| t.node_count()).sum::<usize>()
            }
            _ => 1,
        }
    }

    /// Reject signatures nested deeper, or larger, than the limits allow
    pub fn check_limits(&self, max_depth: usize, max_nodes: usize) -> Result<(), SignatureError> {
        let depth = self.depth();
        if depth > max_depth {
            return Err(SignatureError::TooDeep {
                depth,
                max: max_depth,
            });
        }
        let count = self.node_count();
        if count > max_nodes {
            return Err(SignatureError::TooManyNodes {
                count,
                max: max_nodes,
            });
        }
        Ok(())
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl FromStr for TypeSignature {
    type Err = SignatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s)?;
        let sig = parser.parse_concrete()?;
        parser.finish()?;
        Ok(sig)
    }
}

// =============================================================================
// Open signatures
// =============================================================================

/// Reference modifier on a declaration-site type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefKind {
    /// `&T`
    #[serde(rename = "&")]
    Immutable,
    /// `&mut T`
    #[serde(rename = "&mut")]
    Mutable,
}

/// Declaration-site type: optional reference over an open body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenSignature {
    /// `&` / `&mut`, if any
    #[serde(rename = "ref")]
    pub reference: Option<RefKind>,
    /// The type itself
    pub body: OpenSignatureBody,
}

/// Type that may mention the enclosing declaration's type parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenSignatureBody {
    /// `bool`
    Bool,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `u128`
    U128,
    /// `u256`
    U256,
    /// `address`
    Address,
    /// `vector<T>`
    Vector(Box<OpenSignatureBody>),
    /// Nominal struct reference with open arguments
    Datatype(Box<OpenDatatypeRef>),
    /// Unbound type parameter slot
    TypeParameter(u16),
}

/// Struct reference whose arguments may be open
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenDatatypeRef {
    /// Package address
    pub package: Address,
    /// Module name
    pub module: String,
    /// Struct name
    #[serde(rename = "type")]
    pub name: String,
    /// Type arguments
    #[serde(rename = "typeParameters")]
    pub type_arguments: Vec<OpenSignatureBody>,
}

impl OpenSignature {
    /// Owned (non-reference) open signature
    pub fn value(body: OpenSignatureBody) -> Self {
        OpenSignature {
            reference: None,
            body,
        }
    }

    /// Reference over `body`
    pub fn reference(kind: RefKind, body: OpenSignatureBody) -> Self {
        OpenSignature {
            reference: Some(kind),
            body,
        }
    }

    /// Canonical string form (`&mut 0x…::m::S<$0>`)
    pub fn repr(&self) -> String {
        let prefix = match self.reference {
            None => "",
            Some(RefKind::Immutable) => "&",
            Some(RefKind::Mutable) => "&mut ",
        };
        format!("{}{}", prefix, self.body.repr())
    }
}

impl OpenSignatureBody {
    /// Shorthand for a nominal struct type
    pub fn datatype(
        package: Address,
        module: &str,
        name: &str,
        type_arguments: Vec<OpenSignatureBody>,
    ) -> Self {
        OpenSignatureBody::Datatype(Box::new(OpenDatatypeRef {
            package,
            module: module.to_string(),
            name: name.to_string(),
            type_arguments,
        }))
    }

    /// Substitute `type_arguments` for every parameter slot
    pub fn instantiate(&self, type_arguments: &[TypeSignature]) -> Result<TypeSignature, SignatureError> {
        Ok(match self {
            OpenSignatureBody::Bool => TypeSignature::Bool,
            OpenSignatureBody::U8 => TypeSignature::U8,
            OpenSignatureBody::U16 => TypeSignature::U16,
            OpenSignatureBody::U32 => TypeSignature::U32,
            OpenSignatureBody::U64 => TypeSignature::U64,
            OpenSignatureBody::U128 => TypeSignature::U128,
            OpenSignatureBody::U256 => TypeSignature::U256,
            OpenSignatureBody::Address => TypeSignature::Address,
            OpenSignatureBody::Vector(inner) => {
                TypeSignature::Vector(Box::new(inner.instantiate(type_arguments)?))
            }
            OpenSignatureBody::Datatype(d) => {
                let args = d
                    .type_arguments
                    .iter()
                    .map(|a| a.instantiate(type_arguments))
                    .collect::<Result<Vec<_>, _>>()?;
                TypeSignature::Datatype(Box::new(DatatypeRef {
                    package: d.package,
                    module: d.module.clone(),
                    name: d.name.clone(),
                    type_arguments: args,
                }))
            }
            OpenSignatureBody::TypeParameter(index) => type_arguments
                .get(*index as usize)
                .cloned()
                .ok_or(SignatureError::ParameterOutOfRange {
                    index: *index,
                    count: type_arguments.len(),
                })?,
        })
    }

    /// Canonical string form
    pub fn repr(&self) -> String {
        match self {
            OpenSignatureBody::Bool => "bool".into(),
            OpenSignatureBody::U8 => "u8".into(),
            OpenSignatureBody::U16 => "u16".into(),
            OpenSignatureBody::U32 => "u32".into(),
            OpenSignatureBody::U64 => "u64".into(),
            OpenSignatureBody::U128 => "u128".into(),
            OpenSignatureBody::U256 => "u256".into(),
            OpenSignatureBody::Address => "address".into(),
            OpenSignatureBody::Vector(inner) => format!("vector<{}>", inner.repr()),
            OpenSignatureBody::Datatype(d) => {
                let base = format!("{}::{}::{}", d.package, d.module, d.name);
                if d.type_arguments.is_empty() {
                    base
                } else {
                    let args: Vec<String> = d.type_arguments.iter().map(|a| a.repr()).collect();
                    format!("{}<{}>", base, args.join(", "))
                }
            }
            OpenSignatureBody::TypeParameter(i) => format!("${}", i),
        }
    }
}

impl From<&TypeSignature> for OpenSignatureBody {
    fn from(sig: &TypeSignature) -> Self {
        match sig {
            TypeSignature::Bool => OpenSignatureBody::Bool,
            TypeSignature::U8 => OpenSignatureBody::U8,
            TypeSignature::U16 => OpenSignatureBody::U16,
            TypeSignature::U32 => OpenSignatureBody::U32,
            TypeSignature::U64 => OpenSignatureBody::U64,
            TypeSignature::U128 => OpenSignatureBody::U128,
            TypeSignature::U256 => OpenSignatureBody::U256,
            TypeSignature::Address => OpenSignatureBody::Address,
            TypeSignature::Vector(inner) => {
                OpenSignatureBody::Vector(Box::new(inner.as_ref().into()))
            }
            TypeSignature::Datatype(d) => OpenSignatureBody::Datatype(Box::new(OpenDatatypeRef {
                package: d.package,
                module: d.module.clone(),
                name: d.name.clone(),
                type_arguments: d.type_arguments.iter().map(Into::into).collect(),
            })),
        }
    }
}

impl TryFrom<&OpenSignatureBody> for TypeSignature {
    type Error = SignatureError;

    fn try_from(body: &OpenSignatureBody) -> Result<Self, Self::Error> {
        match body {
            OpenSignatureBody::TypeParameter(index) => {
                Err(SignatureError::ParameterNotConcrete { index: *index })
            }
            // No parameters remain, so instantiating with nothing is exact.
            other => other.instantiate(&[]).map_err(|e| match e {
                SignatureError::ParameterOutOfRange { index, .. } => {
                    SignatureError::ParameterNotConcrete { index }
                }
                e => e,
            }),
        }
    }
}

impl TryFrom<OpenSignature> for TypeSignature {
    type Error = SignatureError;

    fn try_from(open: OpenSignature) -> Result<Self, Self::Error> {
        if open.reference.is_some() {
            return Err(SignatureError::ReferenceNotConcrete);
        }
        TypeSignature::try_from(&open.body)
    }
}

impl FromStr for OpenSignature {
    type Err = SignatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s)?;
        let sig = parser.parse_open_signature()?;
        parser.finish()?;
        Ok(sig)
    }
}

// =============================================================================
// Parser
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Lt,
    Gt,
    Comma,
    ColonColon,
    Amp,
    Param(u16),
}

impl Token {
    fn text(&self) -> String {
        match self {
            Token::Word(w) => w.clone(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Comma => ",".into(),
            Token::ColonColon => "::".into(),
            Token::Amp => "&".into(),
            Token::Param(i) => format!("${}", i),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, SignatureParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '<' => {
                chars.next();
                tokens.push(Token::Lt);
            }
            '>' => {
                chars.next();
                tokens.push(Token::Gt);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '&' => {
                chars.next();
                tokens.push(Token::Amp);
            }
            ':' => {
                chars.next();
                match chars.next() {
                    Some((_, ':')) => tokens.push(Token::ColonColon),
                    _ => {
                        return Err(SignatureParseError::UnexpectedToken {
                            found: ":".into(),
                            expected: "'::'",
                        })
                    }
                }
            }
            '$' => {
                chars.next();
                let mut digits = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let index = digits
                    .parse::<u16>()
                    .map_err(|_| SignatureParseError::UnexpectedToken {
                        found: format!("${}", digits),
                        expected: "type parameter index",
                    })?;
                tokens.push(Token::Param(index));
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(input[start..end].to_string()));
            }
            other => {
                return Err(SignatureParseError::UnexpectedToken {
                    found: other.to_string(),
                    expected: "type signature",
                })
            }
        }
    }
    Ok(tokens)
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, SignatureParseError> {
        Ok(Parser {
            tokens: tokenize(input)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self, expected: &'static str) -> Result<Token, SignatureParseError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(SignatureParseError::UnexpectedEnd { expected })?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, want: Token, expected: &'static str) -> Result<(), SignatureParseError> {
        let token = self.next(expected)?;
        if token == want {
            Ok(())
        } else {
            Err(SignatureParseError::UnexpectedToken {
                found: token.text(),
                expected,
            })
        }
    }

    fn identifier(&mut self, expected: &'static str) -> Result<String, SignatureParseError> {
        match self.next(expected)? {
            Token::Word(w) if is_identifier(&w) => Ok(w),
            Token::Word(w) => Err(SignatureParseError::InvalidIdentifier(w)),
            other => Err(SignatureParseError::UnexpectedToken {
                found: other.text(),
                expected,
            }),
        }
    }

    fn finish(&self) -> Result<(), SignatureParseError> {
        if self.pos < self.tokens.len() {
            let rest: Vec<String> = self.tokens[self.pos..].iter().map(Token::text).collect();
            return Err(SignatureParseError::TrailingInput(rest.join("")));
        }
        Ok(())
    }

    fn parse_concrete(&mut self) -> Result<TypeSignature, SignatureParseError> {
        let body = self.parse_body(false)?;
        // parse_body(false) never yields parameters
        TypeSignature::try_from(&body).map_err(|_| SignatureParseError::UnexpectedToken {
            found: body.repr(),
            expected: "concrete type",
        })
    }

    fn parse_open_signature(&mut self) -> Result<OpenSignature, SignatureParseError> {
        let reference = if self.peek() == Some(&Token::Amp) {
            self.pos += 1;
            if self.peek() == Some(&Token::Word("mut".into())) {
                self.pos += 1;
                Some(RefKind::Mutable)
            } else {
                Some(RefKind::Immutable)
            }
        } else {
            None
        };
        let body = self.parse_body(true)?;
        Ok(OpenSignature { reference, body })
    }

    fn parse_body(&mut self, allow_params: bool) -> Result<OpenSignatureBody, SignatureParseError> {
        let token = self.next("type")?;
        let word = match token {
            Token::Param(i) if allow_params => return Ok(OpenSignatureBody::TypeParameter(i)),
            Token::Word(w) => w,
            other => {
                return Err(SignatureParseError::UnexpectedToken {
                    found: other.text(),
                    expected: "type",
                })
            }
        };

        if self.peek() == Some(&Token::ColonColon) {
            let package = Address::from_hex(&word)?;
            self.pos += 1;
            let module = self.identifier("module name")?;
            self.expect(Token::ColonColon, "'::'")?;
            let name = self.identifier("struct name")?;
            let type_arguments = if self.peek() == Some(&Token::Lt) {
                self.pos += 1;
                let mut args = vec![self.parse_body(allow_params)?];
                loop {
                    match self.next("',' or '>'")? {
                        Token::Comma => args.push(self.parse_body(allow_params)?),
                        Token::Gt => break,
                        other => {
                            return Err(SignatureParseError::UnexpectedToken {
                                found: other.text(),
                                expected: "',' or '>'",
                            })
                        }
                    }
                }
                args
            } else {
                Vec::new()
            };
            return Ok(OpenSignatureBody::Datatype(Box::new(OpenDatatypeRef {
                package,
                module,
                name,
                type_arguments,
            })));
        }

        Ok(match word.as_str() {
            "bool" => OpenSignatureBody::Bool,
            "u8" => OpenSignatureBody::U8,
            "u16" => OpenSignatureBody::U16,
            "u32" => OpenSignatureBody::U32,
            "u64" => OpenSignatureBody::U64,
            "u128" => OpenSignatureBody::U128,
            "u256" => OpenSignatureBody::U256,
            "address" => OpenSignatureBody::Address,
            "vector" => {
                self.expect(Token::Lt, "'<'")?;
                let inner = self.parse_body(allow_params)?;
                self.expect(Token::Gt, "'>'")?;
                OpenSignatureBody::Vector(Box::new(inner))
            }
            _ => {
                return Err(SignatureParseError::UnexpectedToken {
                    found: word,
                    expected: "primitive type, vector, or address::module::Struct",
                })
            }
        })
    }
}
