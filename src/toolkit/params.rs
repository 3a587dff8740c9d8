use crate::models::Amount;
use crate::toolkit::ToolkitError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a fixed-width type code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamTypeError {
    #[error("empty type code")]
    Empty,

    #[error("unknown type code '{0}'")]
    Unknown(String),

    #[error("invalid width in type code '{0}'")]
    InvalidWidth(String),
}

/// Fixed-width parameter type as understood by the host
///
/// Written in the host's compact notation: `50A` (50 characters), `10i0`
/// (4-byte signed integer), `10p2` (packed decimal, 10 digits, 2 decimals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Char { length: u32 },
    Int { digits: u8 },
    Unsigned { digits: u8 },
    Packed { digits: u8, scale: u8 },
    Zoned { digits: u8, scale: u8 },
}

/// Integer digit counts the host accepts, with their byte sizes
const INT_WIDTHS: &[(u8, u8)] = &[(3, 1), (5, 2), (10, 4), (20, 8)];
const MAX_DECIMAL_DIGITS: u8 = 63;

impl ParamType {
    pub const fn chars(length: u32) -> Self {
        ParamType::Char { length }
    }

    /// 4-byte signed integer (`10i0`)
    pub const fn int() -> Self {
        ParamType::Int { digits: 10 }
    }

    pub const fn packed(digits: u8, scale: u8) -> Self {
        ParamType::Packed { digits, scale }
    }

    /// Render a value as the text placed in the call document
    ///
    /// Character values are cut to the declared length; numbers that do not
    /// fit the declared width are rejected.
    pub fn render(&self, name: &str, value: &ParamValue) -> Result<String, ToolkitError> {
        let invalid = |reason: String| ToolkitError::InvalidParam {
            name: name.to_string(),
            reason,
        };

        match *self {
            ParamType::Char { length } => {
                let text = match value {
                    ParamValue::Text(s) => s.clone(),
                    ParamValue::Int(i) => i.to_string(),
                    ParamValue::Amount(a) => a.to_string(),
                    ParamValue::Empty => String::new(),
                };
                Ok(text.chars().take(length as usize).collect())
            }
            ParamType::Int { digits } | ParamType::Unsigned { digits } => {
                let number = match value {
                    ParamValue::Int(i) => *i,
                    ParamValue::Empty => 0,
                    ParamValue::Text(s) => s
                        .trim()
                        .parse()
                        .map_err(|_| invalid(format!("'{}' is not an integer", s)))?,
                    ParamValue::Amount(a) if a.cents() % 100 == 0 => a.cents() / 100,
                    ParamValue::Amount(a) => {
                        return Err(invalid(format!("{} is not a whole number", a)))
                    }
                };

                let (min, max) = self.int_range(digits);
                if number < min || number > max {
                    return Err(invalid(format!("{} does not fit {}", number, self)));
                }
                Ok(number.to_string())
            }
            ParamType::Packed { digits, scale } | ParamType::Zoned { digits, scale } => {
                let amount = match value {
                    ParamValue::Amount(a) => *a,
                    ParamValue::Int(i) => Amount::from(*i),
                    ParamValue::Empty => Amount::ZERO,
                    ParamValue::Text(s) => s
                        .parse()
                        .map_err(|e| invalid(format!("'{}': {}", s, e)))?,
                };
                render_decimal(amount, digits, scale)
                    .ok_or_else(|| invalid(format!("{} does not fit {}", amount, self)))
            }
        }
    }

    fn int_range(&self, digits: u8) -> (i64, i64) {
        let bytes = INT_WIDTHS
            .iter()
            .find(|(d, _)| *d == digits)
            .map(|(_, b)| *b)
            .unwrap_or(4);
        let bits = u32::from(bytes) * 8;

        match self {
            ParamType::Unsigned { .. } if bits >= 64 => (0, i64::MAX),
            ParamType::Unsigned { .. } => (0, (1i64 << bits) - 1),
            _ if bits >= 64 => (i64::MIN, i64::MAX),
            _ => (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1),
        }
    }
}

/// Format hundredths with `scale` decimals, or `None` if the result would
/// exceed `digits` or drop significant decimals
fn render_decimal(amount: Amount, digits: u8, scale: u8) -> Option<String> {
    let cents = amount.cents();
    let negative = cents < 0;
    let abs = u128::from(cents.unsigned_abs());

    let scaled = if scale >= 2 {
        abs.checked_mul(10u128.checked_pow(u32::from(scale - 2))?)?
    } else {
        let divisor = 10u128.pow(u32::from(2 - scale));
        if abs % divisor != 0 {
            return None;
        }
        abs / divisor
    };

    let text = scaled.to_string();
    if text.len() > usize::from(digits) && scaled != 0 {
        return None;
    }

    let scale = usize::from(scale);
    let padded = format!("{:0>width$}", text, width = scale + 1);
    let (whole, frac) = padded.split_at(padded.len() - scale);
    let sign = if negative && scaled != 0 { "-" } else { "" };

    Some(if frac.is_empty() {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{}", sign, whole, frac)
    })
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Char { length } => write!(f, "{}A", length),
            ParamType::Int { digits } => write!(f, "{}i0", digits),
            ParamType::Unsigned { digits } => write!(f, "{}u0", digits),
            ParamType::Packed { digits, scale } => write!(f, "{}p{}", digits, scale),
            ParamType::Zoned { digits, scale } => write!(f, "{}s{}", digits, scale),
        }
    }
}

impl FromStr for ParamType {
    type Err = ParamTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() {
            return Err(ParamTypeError::Empty);
        }

        let split = code
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ParamTypeError::Unknown(code.to_string()))?;
        let (width, rest) = code.split_at(split);
        let mut rest_chars = rest.chars();
        let kind = rest_chars
            .next()
            .ok_or_else(|| ParamTypeError::Unknown(code.to_string()))?;
        let tail = rest_chars.as_str();

        let bad_width = || ParamTypeError::InvalidWidth(code.to_string());
        let width: u32 = width.parse().map_err(|_| bad_width())?;
        if width == 0 {
            return Err(bad_width());
        }

        match kind.to_ascii_lowercase() {
            'a' if tail.is_empty() => Ok(ParamType::Char { length: width }),
            'i' | 'u' => {
                if tail != "0" {
                    return Err(bad_width());
                }
                let digits = u8::try_from(width).map_err(|_| bad_width())?;
                if !INT_WIDTHS.iter().any(|(d, _)| *d == digits) {
                    return Err(bad_width());
                }
                Ok(if kind.eq_ignore_ascii_case(&'i') {
                    ParamType::Int { digits }
                } else {
                    ParamType::Unsigned { digits }
                })
            }
            'p' | 's' => {
                let digits = u8::try_from(width).map_err(|_| bad_width())?;
                let scale: u8 = tail.parse().map_err(|_| bad_width())?;
                if digits > MAX_DECIMAL_DIGITS || scale > digits {
                    return Err(bad_width());
                }
                Ok(if kind.eq_ignore_ascii_case(&'p') {
                    ParamType::Packed { digits, scale }
                } else {
                    ParamType::Zoned { digits, scale }
                })
            }
            _ => Err(ParamTypeError::Unknown(code.to_string())),
        }
    }
}

/// Parameter direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    Both,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Both => "both",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value carried by a parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Amount(Amount),
    /// Placeholder for output-only fields
    Empty,
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<Amount> for ParamValue {
    fn from(value: Amount) -> Self {
        ParamValue::Amount(value)
    }
}

/// A single named scalar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataParam {
    pub name: String,
    pub kind: ParamType,
    pub direction: Direction,
    pub value: ParamValue,
}

impl DataParam {
    pub fn new(
        name: impl Into<String>,
        kind: ParamType,
        direction: Direction,
        value: impl Into<ParamValue>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            direction,
            value: value.into(),
        }
    }

    pub fn input(name: impl Into<String>, kind: ParamType, value: impl Into<ParamValue>) -> Self {
        Self::new(name, kind, Direction::In, value)
    }

    pub fn output(name: impl Into<String>, kind: ParamType) -> Self {
        Self::new(name, kind, Direction::Out, ParamValue::Empty)
    }
}

/// A data structure, optionally repeated `dim` times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructParam {
    pub name: String,
    pub dim: Option<u32>,
    pub direction: Direction,
    pub fields: Vec<DataParam>,
}

impl StructParam {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            dim: None,
            direction,
            fields: Vec::new(),
        }
    }

    pub fn dim(mut self, dim: u32) -> Self {
        self.dim = Some(dim);
        self
    }

    pub fn field(mut self, field: DataParam) -> Self {
        self.fields.push(field);
        self
    }

    /// Add an output field with no value
    pub fn out(self, name: impl Into<String>, kind: ParamType) -> Self {
        let direction = self.direction;
        self.field(DataParam::new(name, kind, direction, ParamValue::Empty))
    }

    /// Add an input field carrying `value`
    pub fn with(self, name: impl Into<String>, kind: ParamType, value: impl Into<ParamValue>) -> Self {
        let direction = self.direction;
        self.field(DataParam::new(name, kind, direction, value))
    }
}

/// One entry of a procedure's parameter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Data(DataParam),
    Struct(StructParam),
}

impl Param {
    pub fn direction(&self) -> Direction {
        match self {
            Param::Data(d) => d.direction,
            Param::Struct(s) => s.direction,
        }
    }
}

impl From<DataParam> for Param {
    fn from(value: DataParam) -> Self {
        Param::Data(value)
    }
}

impl From<StructParam> for Param {
    fn from(value: StructParam) -> Self {
        Param::Struct(value)
    }
}

/// A call to one procedure of a service program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureCall {
    pub program: String,
    pub procedure: String,
    pub params: Vec<Param>,
    pub returns: Option<ParamType>,
}

impl ProcedureCall {
    pub fn new(program: impl Into<String>, procedure: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            procedure: procedure.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    pub fn param(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Declare the procedure's return value, read back under `"return"`
    pub fn returns(mut self, kind: ParamType) -> Self {
        self.returns = Some(kind);
        self
    }

    /// Dimension of the named array structure, if declared
    pub fn dim_of(&self, name: &str) -> Option<u32> {
        self.params.iter().find_map(|p| match p {
            Param::Struct(s) if s.name == name => s.dim,
            _ => None,
        })
    }
}
