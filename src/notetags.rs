//! Occupant notetags.
//!
//! Hosts attach free-form notes to map events, e.g.
//! `A guard <sight block> <piercing sight>`. Tags are parsed once when an
//! occupant is loaded and folded into [`OccupantFlags`], so the tile walk
//! never touches strings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{TAG_NO_SIGHT_BLOCK, TAG_PIERCING_SIGHT, TAG_SIGHT_BLOCK};
use crate::world::{Occupant, OccupantFlags};

/// Value of a parsed notetag: `<key>` is a flag, `<key:value>` carries text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaValue {
    Flag,
    Text(String),
}

/// Tags found in a note, keyed by tag name
pub type NoteMeta = HashMap<String, MetaValue>;

/// Extract every `<key>` / `<key:value>` tag from a note.
///
/// Keys may not contain `<`, `>` or `:`. A later tag with the same key
/// replaces an earlier one. Unterminated tags are ignored.
pub fn parse_note(note: &str) -> NoteMeta {
    let mut meta = NoteMeta::new();
    let mut rest = note;

    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(|c: char| c == '<' || c == '>') else {
            break;
        };
        if after.as_bytes()[close] == b'<' {
            // Stray '<': restart from the nested one
            rest = &after[close..];
            continue;
        }

        let body = &after[..close];
        match body.split_once(':') {
            Some((key, value)) if !key.is_empty() => {
                meta.insert(key.to_string(), MetaValue::Text(value.to_string()));
            }
            None if !body.is_empty() => {
                meta.insert(body.to_string(), MetaValue::Flag);
            }
            _ => {}
        }
        rest = &after[close + 1..];
    }

    meta
}

/// Keys for the three sight notetags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagKeys {
    pub block: String,
    pub no_block: String,
    pub piercing: String,
}

impl Default for TagKeys {
    fn default() -> Self {
        Self {
            block: TAG_SIGHT_BLOCK.to_string(),
            no_block: TAG_NO_SIGHT_BLOCK.to_string(),
            piercing: TAG_PIERCING_SIGHT.to_string(),
        }
    }
}

impl TagKeys {
    /// Custom keys; surrounding whitespace is dropped and blank keys keep
    /// their default.
    pub fn new(block: &str, no_block: &str, piercing: &str) -> Self {
        let pick = |value: &str, fallback: &str| {
            let value = value.trim();
            if value.is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            block: pick(block, TAG_SIGHT_BLOCK),
            no_block: pick(no_block, TAG_NO_SIGHT_BLOCK),
            piercing: pick(piercing, TAG_PIERCING_SIGHT),
        }
    }

    /// Sight flags named by a note. A tag with an empty value (`<sight block:>`)
    /// counts as absent.
    pub fn flags_for(&self, meta: &NoteMeta) -> OccupantFlags {
        let mut flags = OccupantFlags::empty();
        flags.set(OccupantFlags::SIGHT_BLOCK, is_set(meta, &self.block));
        flags.set(OccupantFlags::NO_SIGHT_BLOCK, is_set(meta, &self.no_block));
        flags.set(OccupantFlags::PIERCING_SIGHT, is_set(meta, &self.piercing));
        flags
    }
}

fn is_set(meta: &NoteMeta, key: &str) -> bool {
    match meta.get(key) {
        Some(MetaValue::Flag) => true,
        Some(MetaValue::Text(value)) => !value.is_empty(),
        None => false,
    }
}

/// Drawing priority of an occupant relative to characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    Below,
    #[default]
    Same,
    Above,
}

impl Priority {
    /// Host priority code (0 below, 1 same, 2 above); unknown codes are `Same`
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Below,
            2 => Self::Above,
            _ => Self::Same,
        }
    }
}

/// Raw host description of an occupant, before tag resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OccupantSource {
    pub id: u32,
    /// Has an active page / is present
    pub active: bool,
    pub note: String,
    pub through: bool,
    pub priority: Priority,
    /// Sprite sheet file name, e.g. `!Door1`
    pub character_name: String,
}

/// Object sprites carry a `!` within their leading `!`/`$` prefix
pub fn is_object_character(name: &str) -> bool {
    name.chars()
        .take_while(|c| *c == '!' || *c == '$')
        .any(|c| c == '!')
}

impl Occupant {
    /// Resolve a raw host occupant into sight flags
    pub fn from_source(source: &OccupantSource, keys: &TagKeys) -> Self {
        let mut flags = keys.flags_for(&parse_note(&source.note));
        flags.set(OccupantFlags::ACTIVE, source.active);
        flags.set(OccupantFlags::THROUGH, source.through);
        flags.set(
            OccupantFlags::NORMAL_PRIORITY,
            source.priority == Priority::Same,
        );
        flags.set(
            OccupantFlags::OBJECT_CHARACTER,
            is_object_character(&source.character_name),
        );
        Occupant::new(source.id, flags)
    }
}
