//! Board catalog - Maps device signatures to board definitions
//!
//! Serial boards are identified by their USB vendor/product ID pairs,
//! network boards by the name they advertise. The index is a TOML file
//! listing one `[[board]]` table per board definition.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read board index: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse board index: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A board definition as handed to the rest of the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardDefinition {
    /// Human-readable board name (e.g., "Arduino Uno")
    pub name: String,
    /// Fully-qualified board name (e.g., "arduino:avr:uno")
    pub fqbn: String,
}

impl BoardDefinition {
    pub fn new(name: impl Into<String>, fqbn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fqbn: fqbn.into(),
        }
    }
}

/// Query interface used by the device resolver
///
/// Implementations return matches in catalog order; callers rely on that
/// order when picking a single board.
pub trait BoardCatalog {
    /// Boards whose USB signature matches the vendor/product pair
    fn find_boards_by_vendor_product(&self, vendor_id: &str, product_id: &str) -> Vec<BoardDefinition>;

    /// Boards whose identifier matches an advertised device name
    fn find_boards_by_name(&self, name: &str) -> Vec<BoardDefinition>;
}

/// USB vendor/product ID pair as written in the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsbSignature {
    pub vid: String,
    pub pid: String,
}

impl UsbSignature {
    fn matches(&self, vendor_id: &str, product_id: &str) -> bool {
        same_hex_id(&self.vid, vendor_id) && same_hex_id(&self.pid, product_id)
    }
}

/// A single board entry in the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEntry {
    pub name: String,
    pub fqbn: String,
    /// Board identifier matched against advertised network names
    #[serde(default)]
    pub id: Option<String>,
    /// Additional advertised names for this board
    #[serde(default)]
    pub aliases: Vec<String>,
    /// USB signatures for serial matching
    #[serde(default)]
    pub usb: Vec<UsbSignature>,
}

impl BoardEntry {
    pub fn definition(&self) -> BoardDefinition {
        BoardDefinition::new(self.name.clone(), self.fqbn.clone())
    }

    fn matches_name(&self, name: &str) -> bool {
        self.id
            .iter()
            .chain(self.aliases.iter())
            .any(|candidate| candidate.eq_ignore_ascii_case(name))
    }
}

/// The board index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogIndex {
    /// Version of the board index format
    #[serde(default = "default_version")]
    pub version: String,
    /// Board entries in catalog order
    #[serde(default)]
    pub board: Vec<BoardEntry>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for CatalogIndex {
    fn default() -> Self {
        Self {
            version: default_version(),
            board: Vec::new(),
        }
    }
}

impl CatalogIndex {
    /// Load the board index from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load the board index from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let index: CatalogIndex = toml::from_str(content)?;
        Ok(index)
    }

    /// All board entries in catalog order
    pub fn boards(&self) -> &[BoardEntry] {
        &self.board
    }
}

impl BoardCatalog for CatalogIndex {
    fn find_boards_by_vendor_product(&self, vendor_id: &str, product_id: &str) -> Vec<BoardDefinition> {
        self.board
            .iter()
            .filter(|entry| entry.usb.iter().any(|sig| sig.matches(vendor_id, product_id)))
            .map(BoardEntry::definition)
            .collect()
    }

    fn find_boards_by_name(&self, name: &str) -> Vec<BoardDefinition> {
        self.board
            .iter()
            .filter(|entry| entry.matches_name(name))
            .map(BoardEntry::definition)
            .collect()
    }
}

/// Compare two hex IDs ignoring case, `0x` prefix and leading zeros
fn same_hex_id(a: &str, b: &str) -> bool {
    match (normalize_hex_id(a), normalize_hex_id(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn normalize_hex_id(id: &str) -> Option<u32> {
    let id = id.trim();
    let digits = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .unwrap_or(id);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
version = "1.0"

[[board]]
name = "Arduino Uno"
fqbn = "arduino:avr:uno"
id = "uno"
usb = [{ vid = "0x2341", pid = "0x0043" }, { vid = "0x2341", pid = "0x0001" }]

[[board]]
name = "Arduino Uno (clone)"
fqbn = "arduino:avr:uno"
usb = [{ vid = "0x2341", pid = "0x0043" }]

[[board]]
name = "Generic ESP8266 Module"
fqbn = "esp8266:esp8266:generic"
id = "esp8266-device"
aliases = ["esp8266"]
"#;

    #[test]
    fn test_vendor_product_matching() {
        let index = CatalogIndex::from_toml(INDEX).unwrap();

        let boards = index.find_boards_by_vendor_product("2341", "0043");
        assert_eq!(boards.len(), 2);
        assert_eq!(boards[0].name, "Arduino Uno");
        assert_eq!(boards[1].name, "Arduino Uno (clone)");

        let boards = index.find_boards_by_vendor_product("0x2341", "0X0001");
        assert_eq!(boards, vec![BoardDefinition::new("Arduino Uno", "arduino:avr:uno")]);

        assert!(index.find_boards_by_vendor_product("1a86", "7523").is_empty());
        assert!(index.find_boards_by_vendor_product("", "").is_empty());
    }

    #[test]
    fn test_name_matching() {
        let index = CatalogIndex::from_toml(INDEX).unwrap();

        let boards = index.find_boards_by_name("esp8266-device");
        assert_eq!(boards[0].fqbn, "esp8266:esp8266:generic");

        // Aliases and case-insensitive ids
        assert_eq!(index.find_boards_by_name("ESP8266").len(), 1);
        assert_eq!(index.find_boards_by_name("UNO").len(), 1);

        assert!(index.find_boards_by_name("yun").is_empty());
    }

    #[test]
    fn test_hex_normalization() {
        assert!(same_hex_id("0x0043", "43"));
        assert!(same_hex_id("ABCD", "0xabcd"));
        assert!(!same_hex_id("0x", "0"));
        assert!(!same_hex_id("zz", "zz"));
    }

    #[test]
    fn test_empty_index() {
        let index = CatalogIndex::from_toml("").unwrap();
        assert_eq!(index.version, "1.0");
        assert!(index.boards().is_empty());
    }

    #[test]
    fn test_invalid_index() {
        let result = CatalogIndex::from_toml("[[board]]\nname = 3");
        assert!(matches!(result, Err(CatalogError::ParseError(_))));
    }
}
