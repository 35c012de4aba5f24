use crate::error::{MocError, MocResult};
use std::fmt;

pub const BLOCK_SIZE: usize = 2880;
pub const CARD_SIZE: usize = 80;

/// Longest string that fits between the quotes of a fixed-format card.
const MAX_STRING_LEN: usize = 68;

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: Option<KeywordValue>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Logical(bool),
    Integer(i64),
    String(String),
}

impl Keyword {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            value: None,
            comment: None,
        }
    }

    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn logical<S: Into<String>>(name: S, value: bool) -> Self {
        Self {
            name: name.into(),
            value: Some(KeywordValue::Logical(value)),
            comment: None,
        }
    }

    pub fn integer<S: Into<String>>(name: S, value: i64) -> Self {
        Self {
            name: name.into(),
            value: Some(KeywordValue::Integer(value)),
            comment: None,
        }
    }

    pub fn string<S: Into<String>, V: Into<String>>(name: S, value: V) -> Self {
        Self {
            name: name.into(),
            value: Some(KeywordValue::String(value.into())),
            comment: None,
        }
    }

    pub fn end() -> Self {
        Self::new("END")
    }

    /// Renders the keyword as one fixed-format 80-byte card.
    pub fn to_card(&self) -> MocResult<[u8; CARD_SIZE]> {
        let mut card = [b' '; CARD_SIZE];

        if self.name.len() > 8 || !self.name.is_ascii() {
            return Err(MocError::Fits(format!("invalid keyword name '{}'", self.name)));
        }
        card[..self.name.len()].copy_from_slice(self.name.as_bytes());

        let Some(value) = &self.value else {
            return Ok(card);
        };

        let value_str = match value {
            KeywordValue::Logical(b) => format!("{:>20}", if *b { "T" } else { "F" }),
            KeywordValue::Integer(i) => format!("{:>20}", i),
            KeywordValue::String(s) => {
                if !s.is_ascii() {
                    return Err(MocError::Fits(format!(
                        "{}: string values must be ASCII",
                        self.name
                    )));
                }
                let escaped = s.replace('\'', "''");
                if escaped.len() > MAX_STRING_LEN {
                    return Err(MocError::Fits(format!(
                        "{}: string value longer than {} characters",
                        self.name, MAX_STRING_LEN
                    )));
                }
                format!("'{:<8}'", escaped)
            }
        };

        let mut text = format!("= {}", value_str);
        if let Some(comment) = &self.comment {
            text.push_str(" / ");
            text.push_str(comment);
        }
        let bytes = text.as_bytes();
        let len = bytes.len().min(CARD_SIZE - 8);
        card[8..8 + len].copy_from_slice(&bytes[..len]);

        Ok(card)
    }

    /// Parses one 80-byte card.
    pub fn parse_card(card: &[u8]) -> MocResult<Self> {
        if card.len() != CARD_SIZE {
            return Err(MocError::Fits(format!(
                "header card must be {} bytes, found {}",
                CARD_SIZE,
                card.len()
            )));
        }
        if !card.is_ascii() {
            return Err(MocError::Fits("header card is not ASCII".to_string()));
        }
        let text = String::from_utf8_lossy(card);

        let mut keyword = Keyword::new(text[..8].trim_end());
        if &text[8..10] != "= " {
            return Ok(keyword);
        }

        let rest = text[10..].trim_start();
        let remainder = if let Some(quoted) = rest.strip_prefix('\'') {
            let (value, after) = parse_quoted(quoted)?;
            keyword.value = Some(KeywordValue::String(value));
            after
        } else {
            let end = rest.find('/').unwrap_or(rest.len());
            let token = rest[..end].trim();
            keyword.value = match token {
                "" => None,
                "T" => Some(KeywordValue::Logical(true)),
                "F" => Some(KeywordValue::Logical(false)),
                _ => Some(match token.parse() {
                    Ok(i) => KeywordValue::Integer(i),
                    Err(_) => KeywordValue::String(token.to_string()),
                }),
            };
            &rest[end..]
        };

        if let Some(comment) = remainder.trim_start().strip_prefix('/') {
            let comment = comment.trim();
            if !comment.is_empty() {
                keyword.comment = Some(comment.to_string());
            }
        }

        Ok(keyword)
    }
}

/// Reads a quoted string body (after the opening quote), undoubling `''`.
fn parse_quoted(text: &str) -> MocResult<(String, &str)> {
    let mut value = String::new();
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            if matches!(chars.peek(), Some((_, '\''))) {
                value.push('\'');
                chars.next();
            } else {
                return Ok((value.trim_end().to_string(), &text[i + 1..]));
            }
        } else {
            value.push(c);
        }
    }

    Err(MocError::Fits("unterminated string value".to_string()))
}

impl KeywordValue {
    pub fn as_logical(&self) -> Option<bool> {
        match self {
            Self::Logical(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for KeywordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            Self::Integer(i) => write!(f, "{}", i),
            Self::String(s) => write!(f, "'{}'", s),
        }
    }
}

/// An ordered list of keywords, without the trailing `END`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    keywords: Vec<Keyword>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, keyword: Keyword) {
        self.keywords.push(keyword);
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn get(&self, name: &str) -> Option<&KeywordValue> {
        self.keywords
            .iter()
            .find(|k| k.name == name)
            .and_then(|k| k.value.as_ref())
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(KeywordValue::as_string)
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(KeywordValue::as_integer)
    }

    pub fn get_logical(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(KeywordValue::as_logical)
    }

    pub fn require_integer(&self, name: &str) -> MocResult<i64> {
        self.get_integer(name)
            .ok_or_else(|| MocError::Fits(format!("missing integer keyword {}", name)))
    }

    /// Serializes the keywords plus `END`, space-padded to whole blocks.
    pub fn to_bytes(&self) -> MocResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(BLOCK_SIZE);
        for keyword in self.keywords.iter().chain(std::iter::once(&Keyword::end())) {
            bytes.extend_from_slice(&keyword.to_card()?);
        }
        bytes.resize(padded_len(bytes.len()), b' ');
        Ok(bytes)
    }

    /// Parses cards up to `END`, returning the header and the number of
    /// bytes it occupies including padding.
    pub fn parse(data: &[u8]) -> MocResult<(Self, usize)> {
        let mut header = Header::new();

        for (index, card) in data.chunks_exact(CARD_SIZE).enumerate() {
            let keyword = Keyword::parse_card(card)?;
            match keyword.name.as_str() {
                "END" => {
                    let used = (index + 1) * CARD_SIZE;
                    return Ok((header, padded_len(used)));
                }
                "" | "COMMENT" | "HISTORY" => {}
                _ => header.push(keyword),
            }
        }

        Err(MocError::Fits("header has no END card".to_string()))
    }
}

/// Rounds `len` up to a whole number of FITS blocks.
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}
