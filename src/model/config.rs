//! Model configuration parsed from the embedded VW options string.
//!
//! Every VW model stores the command-line options it was trained with
//! (`--oaa 3 --link logistic -q ab ...`). [`OptionConfig::parse`] reads that
//! string once into a typed configuration; nothing downstream inspects the raw
//! text again.
//!
//! # Grammar
//!
//! Tokens are whitespace separated. An option is `--name=value`,
//! `--name value`, a bare `--name`, or a short `-x value` / `-xvalue`. A token
//! is treated as a value (and not as the next option) unless it starts with
//! `--` or with `-` followed by a letter, so `--hash_seed -1` parses.
//!
//! Unrecognized options are ignored. Options naming features this runtime
//! does not implement (cubic interactions, n-grams, skips, LDA) are rejected.
//!
//! # Example
//!
//! ```
//! use vw_slim::model::{LinkKind, OptionConfig};
//!
//! let config = OptionConfig::parse("--oaa 3 --link=logistic -q ab --noconstant").unwrap();
//! assert_eq!(config.classes(), 3);
//! assert_eq!(config.multiclass_bits(), 2);
//! assert_eq!(config.link(), LinkKind::Logistic);
//! assert!(!config.has_intercept());
//! assert!(config.interactions().is_enabled());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::link::LinkKind;
use crate::io::LoadError;

/// Largest supported one-vs-all class count; keeps the class shift below 32.
pub const MAX_CLASSES: u32 = 1 << 31;

/// Namespace key used for interactions when a namespace name is empty.
///
/// VW puts unnamed features in the default namespace `' '`.
pub const DEFAULT_NAMESPACE: char = ' ';

// =============================================================================
// Interactions
// =============================================================================

/// Quadratic interaction policy.
///
/// Pairs are directional: registering `ab` makes every namespace starting with
/// `a` interact with every namespace starting with `b`, and not the reverse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interactions {
    any_to_any: bool,
    pairs: BTreeMap<char, BTreeSet<char>>,
}

impl Interactions {
    /// Whether any interaction is configured.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.any_to_any || !self.pairs.is_empty()
    }

    /// Whether every namespace pair (including self pairs) interacts.
    #[inline]
    pub fn is_any_to_any(&self) -> bool {
        self.any_to_any
    }

    /// Namespace keys that interact with namespaces keyed `left`.
    #[inline]
    pub fn partners(&self, left: char) -> Option<&BTreeSet<char>> {
        self.pairs.get(&left)
    }

    /// Whether `(left, right)` was registered as a directional pair.
    pub fn contains(&self, left: char, right: char) -> bool {
        self.pairs
            .get(&left)
            .is_some_and(|partners| partners.contains(&right))
    }

    /// Iterate over registered directional pairs in key order.
    pub fn pairs(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.pairs
            .iter()
            .flat_map(|(&left, partners)| partners.iter().map(move |&right| (left, right)))
    }

    fn add(&mut self, option: &str, spec: &str) -> Result<(), LoadError> {
        if spec == "::" {
            self.any_to_any = true;
            return Ok(());
        }

        let chars: Vec<char> = spec.chars().collect();
        match chars.as_slice() {
            [left, right] if *left != ':' && *right != ':' => {
                self.pairs.entry(*left).or_default().insert(*right);
                Ok(())
            }
            [_, _] => Err(LoadError::unsupported(format!(
                "{option} {spec} (partial wildcard interaction)"
            ))),
            _ => Err(LoadError::unsupported(format!(
                "{option} {spec} (interaction of {} namespaces)",
                chars.len()
            ))),
        }
    }
}

// =============================================================================
// OptionConfig
// =============================================================================

/// Typed view of the options a model was trained with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionConfig {
    classes: u32,
    multiclass_bits: u32,
    link: LinkKind,
    has_intercept: bool,
    hash_all: bool,
    hash_seed: i32,
    interactions: Interactions,
}

impl Default for OptionConfig {
    fn default() -> Self {
        Self {
            classes: 1,
            multiclass_bits: 0,
            link: LinkKind::Identity,
            has_intercept: true,
            hash_all: false,
            hash_seed: 0,
            interactions: Interactions::default(),
        }
    }
}

impl OptionConfig {
    /// Parse a VW options string.
    pub fn parse(options: &str) -> Result<Self, LoadError> {
        let mut config = Self::default();
        for (name, value) in tokenize(options) {
            config.apply(name, value)?;
        }
        Ok(config)
    }

    fn apply(&mut self, name: &str, value: Option<&str>) -> Result<(), LoadError> {
        match name {
            "--oaa" => {
                let classes: u32 = parse_value(name, value)?;
                if classes == 0 || classes > MAX_CLASSES {
                    return Err(LoadError::invalid(
                        "options",
                        format!("--oaa must be in 1..={MAX_CLASSES}, got {classes}"),
                    ));
                }
                self.set_classes(classes);
            }
            "--link" => {
                let value = require_value(name, value)?;
                self.link = LinkKind::from_name(value)
                    .ok_or_else(|| LoadError::unsupported(format!("--link {value}")))?;
            }
            "--noconstant" => self.has_intercept = false,
            "--hash_seed" => self.hash_seed = parse_seed(require_value(name, value)?)?,
            "--hash" => self.hash_all = require_value(name, value)? == "all",
            "--quadratic" | "-q" | "--interactions" => {
                let spec = require_value(name, value)?;
                self.interactions.add(name, spec)?;
            }
            "--cubic" => return Err(LoadError::unsupported("--cubic")),
            "--ngram" | "--skip" | "--skips" | "--lda" => {
                if !matches!(value.map(str::parse::<i64>), Some(Ok(0))) {
                    return Err(LoadError::unsupported(format!(
                        "{name} {}",
                        value.unwrap_or_default()
                    )));
                }
            }
            _ => trace!(option = name, "ignoring unrecognized option"),
        }
        Ok(())
    }

    fn set_classes(&mut self, classes: u32) {
        self.classes = classes;
        self.multiclass_bits = ceil_log2(classes);
    }

    /// Number of one-vs-all classes (1 for a plain regressor/classifier).
    #[inline]
    pub fn classes(&self) -> u32 {
        self.classes
    }

    /// Low-order bucket bits reserved for the class index.
    #[inline]
    pub fn multiclass_bits(&self) -> u32 {
        self.multiclass_bits
    }

    #[inline]
    pub fn link(&self) -> LinkKind {
        self.link
    }

    /// Whether the intercept ("Constant") weight is added.
    #[inline]
    pub fn has_intercept(&self) -> bool {
        self.has_intercept
    }

    /// Whether integer-named features are string-hashed too (`--hash all`).
    #[inline]
    pub fn hash_all(&self) -> bool {
        self.hash_all
    }

    /// Seed for namespace hashing.
    #[inline]
    pub fn hash_seed(&self) -> i32 {
        self.hash_seed
    }

    #[inline]
    pub fn interactions(&self) -> &Interactions {
        &self.interactions
    }
}

/// VW stores the seed as an unsigned 32-bit value; negative seeds are
/// accepted as their two's complement.
fn parse_seed(value: &str) -> Result<i32, LoadError> {
    value
        .parse::<u32>()
        .map(|seed| seed as i32)
        .or_else(|_| value.parse::<i32>())
        .map_err(|_| LoadError::invalid("options", format!("--hash_seed {value}: not a 32-bit seed")))
}

/// `ceil(log2(n))`, 0 for `n <= 1`.
fn ceil_log2(n: u32) -> u32 {
    if n <= 1 {
        0
    } else {
        u32::BITS - (n - 1).leading_zeros()
    }
}

// =============================================================================
// Tokenizer
// =============================================================================

fn is_option_token(token: &str) -> bool {
    let bytes = token.as_bytes();
    token.starts_with("--") || (bytes.len() > 1 && bytes[0] == b'-' && bytes[1].is_ascii_alphabetic())
}

/// Split an options string into `(name, value)` pairs.
fn tokenize(options: &str) -> Vec<(&str, Option<&str>)> {
    let tokens: Vec<&str> = options.split_whitespace().collect();
    let mut out = Vec::with_capacity(tokens.len());

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        i += 1;

        if !is_option_token(token) {
            trace!(token, "skipping stray token in options");
            continue;
        }

        if let Some((name, value)) = token.split_once('=') {
            out.push((name, Some(value)));
            continue;
        }

        // Short options may carry their value inline: -qab, -b18.
        if !token.starts_with("--") && token.len() > 2 && token.is_char_boundary(2) {
            out.push((&token[..2], Some(&token[2..])));
            continue;
        }

        match tokens.get(i) {
            Some(next) if !is_option_token(next) => {
                out.push((token, Some(*next)));
                i += 1;
            }
            _ => out.push((token, None)),
        }
    }

    out
}

fn require_value<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, LoadError> {
    value.ok_or_else(|| LoadError::invalid("options", format!("{name} requires a value")))
}

fn parse_value<T: FromStr>(name: &str, value: Option<&str>) -> Result<T, LoadError>
where
    T::Err: std::fmt::Display,
{
    let value = require_value(name, value)?;
    value
        .parse()
        .map_err(|e| LoadError::invalid("options", format!("{name} {value}: {e}")))
}

// =============================================================================
// Tests
// =============================================================================
