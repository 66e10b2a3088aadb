//! Live configuration entries
//!
//! A `ConfigEntry` pairs an immutable key and kind with the value the
//! operator has entered so far. The value may change freely until the
//! payload is built.

use super::form::{
    key_string, value_string, EntryKind, EntrySchema, KeyString, SchemaError, ValueString,
};

/// Current value of an entry
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryValue {
    /// Nothing entered; the entry is left out of the payload
    Unset,
    /// Typed-in text (text, password, address and integer entries)
    Text(ValueString),
    /// Checkbox state
    Checked(bool),
}

/// A form entry with its current value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigEntry {
    key: KeyString,
    kind: EntryKind,
    value: EntryValue,
}

impl ConfigEntry {
    /// Create an empty entry
    ///
    /// Checkboxes start unchecked rather than unset, so they are always sent.
    pub fn new(key: &str, kind: EntryKind) -> Result<Self, SchemaError> {
        Ok(Self {
            key: key_string(key)?,
            kind,
            value: Self::initial_value(kind),
        })
    }

    /// Create an entry holding the schema's initial value
    pub fn from_schema(schema: &EntrySchema) -> Result<Self, SchemaError> {
        schema.validate()?;
        let mut entry = Self {
            key: schema.key.clone(),
            kind: schema.kind,
            value: Self::initial_value(schema.kind),
        };

        if let Some(value) = schema.value.as_deref() {
            match schema.kind {
                EntryKind::Boolean => entry.value = EntryValue::Checked(is_truthy(value)),
                _ => entry.set_text(value)?,
            }
        }
        Ok(entry)
    }

    fn initial_value(kind: EntryKind) -> EntryValue {
        match kind {
            EntryKind::Boolean => EntryValue::Checked(false),
            _ => EntryValue::Unset,
        }
    }

    /// Entry key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Entry type
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Current value
    pub fn value(&self) -> &EntryValue {
        &self.value
    }

    /// True if the entry contributes to the payload
    pub fn has_value(&self) -> bool {
        match &self.value {
            EntryValue::Unset => false,
            EntryValue::Text(text) => !text.is_empty(),
            EntryValue::Checked(_) => true,
        }
    }

    /// Replace the text of a text-like entry
    pub fn set_text(&mut self, text: &str) -> Result<(), SchemaError> {
        if !self.kind.is_textual() {
            return Err(SchemaError::ValueKindMismatch);
        }
        self.value = EntryValue::Text(value_string(text)?);
        Ok(())
    }

    /// Set the state of a checkbox entry
    pub fn set_checked(&mut self, checked: bool) -> Result<(), SchemaError> {
        if self.kind != EntryKind::Boolean {
            return Err(SchemaError::ValueKindMismatch);
        }
        self.value = EntryValue::Checked(checked);
        Ok(())
    }

    /// Forget the current value
    pub fn clear(&mut self) {
        self.value = EntryValue::Unset;
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim(), "" | "0" | "false")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_text_entry_is_unset() {
        let entry = ConfigEntry::new("ssid", EntryKind::Text).unwrap();
        assert_eq!(entry.value(), &EntryValue::Unset);
        assert!(!entry.has_value());
    }

    #[test]
    fn test_empty_text_has_no_value() {
        let mut entry = ConfigEntry::new("ssid", EntryKind::Text).unwrap();
        entry.set_text("").unwrap();
        assert!(!entry.has_value());
        entry.set_text("home").unwrap();
        assert!(entry.has_value());
    }

    #[test]
    fn test_checkbox_always_has_value() {
        let mut entry = ConfigEntry::new("dhcp", EntryKind::Boolean).unwrap();
        assert_eq!(entry.value(), &EntryValue::Checked(false));
        assert!(entry.has_value());

        entry.clear();
        assert!(!entry.has_value());
    }

    #[test]
    fn test_kind_mismatch() {
        let mut text = ConfigEntry::new("ssid", EntryKind::Text).unwrap();
        assert_eq!(text.set_checked(true), Err(SchemaError::ValueKindMismatch));

        let mut check = ConfigEntry::new("dhcp", EntryKind::Boolean).unwrap();
        assert_eq!(check.set_text("on"), Err(SchemaError::ValueKindMismatch));
    }

    #[test]
    fn test_from_schema_initial_values() {
        let ip = EntrySchema::new("ip", EntryKind::Ipv4Address)
            .and_then(|s| s.with_value("10.0.0.1"))
            .unwrap();
        let entry = ConfigEntry::from_schema(&ip).unwrap();
        assert_eq!(entry.key(), "ip");
        assert_eq!(entry.kind(), EntryKind::Ipv4Address);
        assert!(matches!(entry.value(), EntryValue::Text(t) if t.as_str() == "10.0.0.1"));

        let on = EntrySchema::new("dhcp", EntryKind::Boolean)
            .and_then(|s| s.with_value("true"))
            .unwrap();
        assert_eq!(
            ConfigEntry::from_schema(&on).unwrap().value(),
            &EntryValue::Checked(true)
        );

        let off = EntrySchema::new("dhcp", EntryKind::Boolean)
            .and_then(|s| s.with_value("false"))
            .unwrap();
        assert_eq!(
            ConfigEntry::from_schema(&off).unwrap().value(),
            &EntryValue::Checked(false)
        );
    }

    #[test]
    fn test_latin1_value_limit_in_characters() {
        let mut entry = ConfigEntry::new("s", EntryKind::Text).unwrap();
        let text: std::string::String = core::iter::repeat('\u{e9}').take(40).collect();
        entry.set_text(&text).unwrap();

        let payload = crate::codec::encode_entries(&[entry]).unwrap();
        let (body, _) = payload.split_crc();
        // Header, key item, then a 40-byte text item
        assert_eq!(body.len(), 1 + 2 + 2 + 40);
        assert!(body[5..].iter().all(|&b| b == 0xE9));
    }

    #[test]
    fn test_mismatched_value_reported_as_kind_mismatch() {
        use crate::codec::{encode_entries, EncodeError, EncodeErrorKind};

        let checkbox_with_text = ConfigEntry {
            key: key_string("dhcp").unwrap(),
            kind: EntryKind::Boolean,
            value: EntryValue::Text(value_string("yes").unwrap()),
        };
        assert_eq!(
            encode_entries(&[checkbox_with_text]),
            Err(EncodeError::at(0, EncodeErrorKind::ValueKindMismatch))
        );

        let text_with_state = ConfigEntry {
            key: key_string("ssid").unwrap(),
            kind: EntryKind::Text,
            value: EntryValue::Checked(true),
        };
        assert_eq!(
            encode_entries(&[text_with_state]),
            Err(EncodeError::at(0, EncodeErrorKind::ValueKindMismatch))
        );
    }
}
