//! Form definition types
//!
//! A form definition lists the entries to show and send. It arrives from an
//! external reader (the page-fragment shorthand or a TOML file); field names
//! accept both the long and the one-letter spelling used by the shorthand.

use core::fmt;

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Lengths below count characters. Keys and values go out one byte per
// character, so for them this is also the length on the wire.

/// Maximum key length (receiver key buffer size)
pub const MAX_KEY_LEN: usize = 16;

/// Maximum label, title and placeholder length
pub const MAX_LABEL_LEN: usize = 32;

/// Maximum entry value length
pub const MAX_VALUE_LEN: usize = 64;

/// UTF-8 storage for `chars` characters
const fn utf8_capacity(chars: usize) -> usize {
    4 * chars
}

/// Entry key storage
pub type KeyString = String<{ utf8_capacity(MAX_KEY_LEN) }>;

/// Label, title and placeholder storage
pub type LabelString = String<{ utf8_capacity(MAX_LABEL_LEN) }>;

/// Entry value storage
pub type ValueString = String<{ utf8_capacity(MAX_VALUE_LEN) }>;

/// Maximum entries in one form definition
pub const MAX_FORM_ENTRIES: usize = 32;

/// Errors in a form definition or entry update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchemaError {
    /// Entry key is empty
    EmptyKey,
    /// Entry key exceeds `MAX_KEY_LEN`
    KeyTooLong,
    /// Unknown one-character type code
    UnknownKind(char),
    /// Label, title or placeholder exceeds `MAX_LABEL_LEN`
    LabelTooLong,
    /// Value exceeds `MAX_VALUE_LEN`
    ValueTooLong,
    /// Text value on a checkbox, or checkbox state on a text entry
    ValueKindMismatch,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::EmptyKey => write!(f, "entry key is empty"),
            SchemaError::KeyTooLong => write!(f, "entry key longer than {} characters", MAX_KEY_LEN),
            SchemaError::UnknownKind(code) => write!(f, "unknown entry type '{}'", code),
            SchemaError::LabelTooLong => write!(f, "label longer than {} characters", MAX_LABEL_LEN),
            SchemaError::ValueTooLong => write!(f, "value longer than {} characters", MAX_VALUE_LEN),
            SchemaError::ValueKindMismatch => write!(f, "value does not match entry type"),
        }
    }
}

/// Entry type, identified by a one-character code in form definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryKind {
    /// Free text (`t`)
    #[cfg_attr(feature = "serde", serde(rename = "t"))]
    Text,
    /// Hidden free text (`p`)
    #[cfg_attr(feature = "serde", serde(rename = "p"))]
    Password,
    /// Dotted-quad IPv4 address (`d`)
    #[cfg_attr(feature = "serde", serde(rename = "d"))]
    Ipv4Address,
    /// Signed integer (`n`)
    #[cfg_attr(feature = "serde", serde(rename = "n"))]
    Integer,
    /// Checkbox (`c`)
    #[cfg_attr(feature = "serde", serde(rename = "c"))]
    Boolean,
}

impl EntryKind {
    /// Parse a type code
    pub fn from_code(code: char) -> Result<Self, SchemaError> {
        match code {
            't' => Ok(EntryKind::Text),
            'p' => Ok(EntryKind::Password),
            'd' => Ok(EntryKind::Ipv4Address),
            'n' => Ok(EntryKind::Integer),
            'c' => Ok(EntryKind::Boolean),
            other => Err(SchemaError::UnknownKind(other)),
        }
    }

    /// Type code
    pub fn code(self) -> char {
        match self {
            EntryKind::Text => 't',
            EntryKind::Password => 'p',
            EntryKind::Ipv4Address => 'd',
            EntryKind::Integer => 'n',
            EntryKind::Boolean => 'c',
        }
    }

    /// True for kinds whose value is typed in as text
    pub fn is_textual(self) -> bool {
        !matches!(self, EntryKind::Boolean)
    }
}

/// One entry of a form definition
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntrySchema {
    /// Key sent to the receiver
    #[cfg_attr(feature = "serde", serde(alias = "k"))]
    pub key: KeyString,
    /// Entry type
    #[cfg_attr(feature = "serde", serde(rename = "type", alias = "t"))]
    pub kind: EntryKind,
    /// Label shown next to the input
    #[cfg_attr(feature = "serde", serde(default, alias = "l"))]
    pub label: LabelString,
    /// Initial value
    #[cfg_attr(feature = "serde", serde(default, alias = "v"))]
    pub value: Option<ValueString>,
    /// Placeholder shown in an empty input
    #[cfg_attr(feature = "serde", serde(default, alias = "p"))]
    pub placeholder: Option<LabelString>,
}

impl EntrySchema {
    /// Create a schema entry with an empty label and no initial value
    pub fn new(key: &str, kind: EntryKind) -> Result<Self, SchemaError> {
        Ok(Self {
            key: key_string(key)?,
            kind,
            label: String::new(),
            value: None,
            placeholder: None,
        })
    }

    /// Set the label
    pub fn with_label(mut self, label: &str) -> Result<Self, SchemaError> {
        self.label = label_string(label)?;
        Ok(self)
    }

    /// Set the initial value
    pub fn with_value(mut self, value: &str) -> Result<Self, SchemaError> {
        self.value = Some(value_string(value)?);
        Ok(self)
    }

    /// Set the placeholder
    pub fn with_placeholder(mut self, placeholder: &str) -> Result<Self, SchemaError> {
        self.placeholder = Some(label_string(placeholder)?);
        Ok(self)
    }

    /// Check invariants a deserializer cannot enforce
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.key.is_empty() {
            return Err(SchemaError::EmptyKey);
        }
        check_len(&self.key, MAX_KEY_LEN, SchemaError::KeyTooLong)?;
        check_len(&self.label, MAX_LABEL_LEN, SchemaError::LabelTooLong)?;
        if let Some(value) = &self.value {
            check_len(value, MAX_VALUE_LEN, SchemaError::ValueTooLong)?;
        }
        if let Some(placeholder) = &self.placeholder {
            check_len(placeholder, MAX_LABEL_LEN, SchemaError::LabelTooLong)?;
        }
        Ok(())
    }
}

/// A complete form definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FormDefinition {
    /// Heading shown above the form
    #[cfg_attr(feature = "serde", serde(default, alias = "t"))]
    pub title: Option<LabelString>,
    /// Entries in display and transmission order
    #[cfg_attr(feature = "serde", serde(alias = "e"))]
    pub entries: Vec<EntrySchema, MAX_FORM_ENTRIES>,
}

impl FormDefinition {
    /// Check the title and every entry
    pub fn validate(&self) -> Result<(), SchemaError> {
        if let Some(title) = &self.title {
            check_len(title, MAX_LABEL_LEN, SchemaError::LabelTooLong)?;
        }
        self.entries.iter().try_for_each(EntrySchema::validate)
    }
}

pub(crate) fn key_string(key: &str) -> Result<KeyString, SchemaError> {
    if key.is_empty() {
        return Err(SchemaError::EmptyKey);
    }
    bounded(key, MAX_KEY_LEN, SchemaError::KeyTooLong)
}

pub(crate) fn label_string(label: &str) -> Result<LabelString, SchemaError> {
    bounded(label, MAX_LABEL_LEN, SchemaError::LabelTooLong)
}

pub(crate) fn value_string(value: &str) -> Result<ValueString, SchemaError> {
    bounded(value, MAX_VALUE_LEN, SchemaError::ValueTooLong)
}

fn check_len(text: &str, max_chars: usize, err: SchemaError) -> Result<(), SchemaError> {
    if text.chars().count() > max_chars {
        return Err(err);
    }
    Ok(())
}

fn bounded<const N: usize>(
    text: &str,
    max_chars: usize,
    err: SchemaError,
) -> Result<String<N>, SchemaError> {
    check_len(text, max_chars, err)?;
    let mut s = String::new();
    s.push_str(text).map_err(|_| err)?;
    Ok(s)
}
